//! Co-winner graph: people are nodes, shared projects are weighted edges.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::processor::AwardTables;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Centrality {
    pub degree: BTreeMap<String, f64>,
    pub betweenness: BTreeMap<String, f64>,
    pub closeness: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkAnalysis {
    pub node_count: usize,
    pub edge_count: usize,
    pub average_degree: f64,
    pub density: f64,
    pub clustering_coefficient: f64,
    /// Connected components, largest first, members sorted by name.
    pub components: Vec<Vec<String>>,
    pub centrality: Centrality,
}

/// Undirected weighted graph over winner names.
#[derive(Debug, Default)]
pub struct CoWinnerGraph {
    names: Vec<String>,
    index: HashMap<String, usize>,
    weights: BTreeMap<(usize, usize), u32>,
}

impl CoWinnerGraph {
    /// Links every pair of winners that share a project. Each project name is
    /// counted once, however many project rows carry it.
    pub fn from_tables(tables: &AwardTables) -> Self {
        let mut members: HashMap<&str, Vec<&str>> = HashMap::new();
        for winner in &tables.winners {
            let list = members.entry(winner.project_name.as_str()).or_default();
            if !list.contains(&winner.name.as_str()) {
                list.push(winner.name.as_str());
            }
        }

        let mut graph = Self::default();
        let mut seen = HashSet::new();
        for project in &tables.projects {
            if !seen.insert(project.name.as_str()) {
                continue;
            }
            let Some(names) = members.get(project.name.as_str()) else {
                continue;
            };
            for i in 0..names.len() {
                for j in i + 1..names.len() {
                    graph.add_edge(names[i], names[j]);
                }
            }
        }
        graph
    }

    fn node(&mut self, name: &str) -> usize {
        if let Some(&id) = self.index.get(name) {
            return id;
        }
        let id = self.names.len();
        self.names.push(name.to_string());
        self.index.insert(name.to_string(), id);
        id
    }

    /// Adds one to the weight of the edge between `a` and `b`.
    pub fn add_edge(&mut self, a: &str, b: &str) {
        let (a, b) = (self.node(a), self.node(b));
        if a == b {
            return;
        }
        *self.weights.entry((a.min(b), a.max(b))).or_insert(0) += 1;
    }

    /// Drops edges lighter than `min_weight`. Nodes are kept.
    pub fn prune(&mut self, min_weight: u32) {
        self.weights.retain(|_, weight| *weight >= min_weight);
    }

    pub fn node_count(&self) -> usize {
        self.names.len()
    }

    pub fn edge_count(&self) -> usize {
        self.weights.len()
    }

    pub fn weight(&self, a: &str, b: &str) -> Option<u32> {
        let (a, b) = (*self.index.get(a)?, *self.index.get(b)?);
        self.weights.get(&(a.min(b), a.max(b))).copied()
    }

    fn adjacency(&self) -> Vec<Vec<usize>> {
        let mut adjacency = vec![Vec::new(); self.names.len()];
        for &(a, b) in self.weights.keys() {
            adjacency[a].push(b);
            adjacency[b].push(a);
        }
        adjacency
    }

    /// Computes summary metrics and centralities.
    pub fn analyze(&self) -> NetworkAnalysis {
        let n = self.node_count();
        let adjacency = self.adjacency();

        let degree_sum: usize = adjacency.iter().map(Vec::len).sum();
        let average_degree = if n == 0 { 0.0 } else { degree_sum as f64 / n as f64 };
        let density = if n < 2 {
            0.0
        } else {
            2.0 * self.edge_count() as f64 / (n * (n - 1)) as f64
        };

        NetworkAnalysis {
            node_count: n,
            edge_count: self.edge_count(),
            average_degree,
            density,
            clustering_coefficient: average_clustering(&adjacency),
            components: self.components(&adjacency),
            centrality: Centrality {
                degree: self.by_name(degree_centrality(&adjacency)),
                betweenness: self.by_name(betweenness_centrality(&adjacency)),
                closeness: self.by_name(closeness_centrality(&adjacency)),
            },
        }
    }

    fn by_name(&self, values: Vec<f64>) -> BTreeMap<String, f64> {
        self.names.iter().cloned().zip(values).collect()
    }

    fn components(&self, adjacency: &[Vec<usize>]) -> Vec<Vec<String>> {
        let mut visited = vec![false; adjacency.len()];
        let mut components = Vec::new();
        for start in 0..adjacency.len() {
            if visited[start] {
                continue;
            }
            visited[start] = true;
            let mut component = Vec::new();
            let mut stack = vec![start];
            while let Some(node) = stack.pop() {
                component.push(self.names[node].clone());
                for &next in &adjacency[node] {
                    if !visited[next] {
                        visited[next] = true;
                        stack.push(next);
                    }
                }
            }
            component.sort();
            components.push(component);
        }
        components.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        components
    }
}

fn average_clustering(adjacency: &[Vec<usize>]) -> f64 {
    if adjacency.is_empty() {
        return 0.0;
    }
    let neighbor_sets: Vec<HashSet<usize>> = adjacency
        .iter()
        .map(|neighbors| neighbors.iter().copied().collect())
        .collect();

    let total: f64 = adjacency
        .iter()
        .map(|neighbors| {
            let k = neighbors.len();
            if k < 2 {
                return 0.0;
            }
            let mut links = 0usize;
            for i in 0..k {
                for j in i + 1..k {
                    if neighbor_sets[neighbors[i]].contains(&neighbors[j]) {
                        links += 1;
                    }
                }
            }
            2.0 * links as f64 / (k * (k - 1)) as f64
        })
        .sum();
    total / adjacency.len() as f64
}

fn degree_centrality(adjacency: &[Vec<usize>]) -> Vec<f64> {
    let n = adjacency.len();
    if n <= 1 {
        return vec![1.0; n];
    }
    adjacency
        .iter()
        .map(|neighbors| neighbors.len() as f64 / (n - 1) as f64)
        .collect()
}

/// Hop distances from `source`; unreachable nodes are `None`.
fn bfs_distances(adjacency: &[Vec<usize>], source: usize) -> Vec<Option<usize>> {
    let mut distances = vec![None; adjacency.len()];
    distances[source] = Some(0);
    let mut queue = VecDeque::from([source]);
    while let Some(node) = queue.pop_front() {
        let next_distance = distances[node].map(|d| d + 1);
        for &next in &adjacency[node] {
            if distances[next].is_none() {
                distances[next] = next_distance;
                queue.push_back(next);
            }
        }
    }
    distances
}

/// Brandes' algorithm on the unweighted graph, normalised by
/// `(n - 1)(n - 2)` when there are more than two nodes.
fn betweenness_centrality(adjacency: &[Vec<usize>]) -> Vec<f64> {
    let n = adjacency.len();
    let mut centrality = vec![0.0; n];

    for source in 0..n {
        let mut stack = Vec::with_capacity(n);
        let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut paths = vec![0.0f64; n];
        let mut distance: Vec<Option<usize>> = vec![None; n];
        paths[source] = 1.0;
        distance[source] = Some(0);

        let mut queue = VecDeque::from([source]);
        while let Some(v) = queue.pop_front() {
            stack.push(v);
            let dv = distance[v].unwrap_or(0);
            for &w in &adjacency[v] {
                if distance[w].is_none() {
                    distance[w] = Some(dv + 1);
                    queue.push_back(w);
                }
                if distance[w] == Some(dv + 1) {
                    paths[w] += paths[v];
                    predecessors[w].push(v);
                }
            }
        }

        let mut dependency = vec![0.0f64; n];
        while let Some(w) = stack.pop() {
            for &v in &predecessors[w] {
                dependency[v] += paths[v] / paths[w] * (1.0 + dependency[w]);
            }
            if w != source {
                centrality[w] += dependency[w];
            }
        }
    }

    if n > 2 {
        let scale = 1.0 / ((n - 1) * (n - 2)) as f64;
        for value in &mut centrality {
            *value *= scale;
        }
    }
    centrality
}

/// Closeness with the Wasserman-Faust correction for disconnected graphs.
fn closeness_centrality(adjacency: &[Vec<usize>]) -> Vec<f64> {
    let n = adjacency.len();
    (0..n)
        .map(|node| {
            let reachable: Vec<usize> = bfs_distances(adjacency, node).into_iter().flatten().collect();
            let total: usize = reachable.iter().sum();
            if total == 0 || n <= 1 {
                return 0.0;
            }
            let others = (reachable.len() - 1) as f64;
            (others / total as f64) * (others / (n - 1) as f64)
        })
        .collect()
}
