//! Statistical and network analysis of award tables.

mod network;
mod stats;

pub use network::{Centrality, CoWinnerGraph, NetworkAnalysis};
pub use stats::*;

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::processor::transformer::write_rows;
use crate::processor::AwardTables;
use crate::Result;

pub const ANALYSIS_FILE: &str = "analysis.json";
pub const BASIC_STATS_FILE: &str = "basic_stats.json";
pub const YEARLY_STATS_FILE: &str = "yearly_stats.csv";
pub const TYPE_STATS_FILE: &str = "type_stats.csv";
pub const ORGANIZATION_STATS_FILE: &str = "organization_stats.csv";
pub const WINNER_STATS_FILE: &str = "winner_stats.csv";

/// Default length of the organization and winner rankings.
pub const DEFAULT_TOP_N: usize = 10;

/// Every analysis over one set of tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub basic_stats: BasicStats,
    pub yearly_stats: Vec<YearlyStat>,
    pub type_stats: Vec<TypeStat>,
    pub organization_stats: Vec<OrganizationStat>,
    pub winner_stats: Vec<WinnerStat>,
    pub trend_analysis: TrendAnalysis,
    pub regional_analysis: Vec<RegionStat>,
    pub collaboration_analysis: CollaborationAnalysis,
    pub field_analysis: Vec<KeywordStat>,
    pub impact_analysis: ImpactAnalysis,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<NetworkAnalysis>,
}

/// Runs the analyses over a fixed set of tables.
pub struct AwardAnalyzer {
    tables: AwardTables,
    top_n: usize,
}

impl AwardAnalyzer {
    pub fn new(tables: AwardTables) -> Self {
        Self {
            tables,
            top_n: DEFAULT_TOP_N,
        }
    }

    /// Sets the length of the organization and winner rankings.
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn tables(&self) -> &AwardTables {
        &self.tables
    }

    pub fn analyze(&self) -> AnalysisReport {
        info!(
            "Analyzing {} awards, {} projects, {} winners",
            self.tables.awards.len(),
            self.tables.projects.len(),
            self.tables.winners.len()
        );
        let tables = &self.tables;
        AnalysisReport {
            basic_stats: basic_stats(tables),
            yearly_stats: yearly_stats(tables),
            type_stats: type_stats(tables),
            organization_stats: organization_stats(tables, self.top_n),
            winner_stats: winner_stats(tables, self.top_n),
            trend_analysis: trend_analysis(tables),
            regional_analysis: regional_analysis(tables),
            collaboration_analysis: collaboration_analysis(tables),
            field_analysis: field_analysis(tables),
            impact_analysis: impact_analysis(tables),
            network: None,
        }
    }

    /// Builds the co-winner graph, optionally dropping edges lighter than
    /// `min_weight`, and analyzes it.
    pub fn network_analysis(&self, min_weight: Option<u32>) -> NetworkAnalysis {
        let mut graph = CoWinnerGraph::from_tables(&self.tables);
        if let Some(min_weight) = min_weight.filter(|w| *w > 0) {
            graph.prune(min_weight);
        }
        let analysis = graph.analyze();
        debug!(
            "Co-winner graph: {} nodes, {} edges",
            analysis.node_count, analysis.edge_count
        );
        analysis
    }
}

#[derive(Serialize)]
struct YearlyRow {
    year: i32,
    award_count: usize,
    level_distribution: String,
}

#[derive(Serialize)]
struct TypeRow<'a> {
    award_type: &'a str,
    count: usize,
    level_distribution: String,
}

fn distribution_cell(distribution: &BTreeMap<String, usize>) -> Result<String> {
    Ok(serde_json::to_string(distribution)?)
}

/// Writes the full report as `analysis.json`, the basic statistics as
/// `basic_stats.json`, and the ranking tables as CSV. Empty rankings produce
/// no CSV file.
pub fn save_results(report: &AnalysisReport, dir: impl AsRef<Path>) -> Result<()> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    write_json(report, &dir.join(ANALYSIS_FILE))?;
    write_json(&report.basic_stats, &dir.join(BASIC_STATS_FILE))?;

    if !report.yearly_stats.is_empty() {
        let rows = report
            .yearly_stats
            .iter()
            .map(|stat| {
                Ok(YearlyRow {
                    year: stat.year,
                    award_count: stat.award_count,
                    level_distribution: distribution_cell(&stat.level_distribution)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        write_rows(&rows, &dir.join(YEARLY_STATS_FILE))?;
    }
    if !report.type_stats.is_empty() {
        let rows = report
            .type_stats
            .iter()
            .map(|stat| {
                Ok(TypeRow {
                    award_type: &stat.award_type,
                    count: stat.count,
                    level_distribution: distribution_cell(&stat.level_distribution)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        write_rows(&rows, &dir.join(TYPE_STATS_FILE))?;
    }
    if !report.organization_stats.is_empty() {
        write_rows(&report.organization_stats, &dir.join(ORGANIZATION_STATS_FILE))?;
    }
    if !report.winner_stats.is_empty() {
        write_rows(&report.winner_stats, &dir.join(WINNER_STATS_FILE))?;
    }

    info!("Saved analysis to {}", dir.display());
    Ok(())
}

/// Reads a report written by [`save_results`].
pub fn load_results(dir: impl AsRef<Path>) -> Result<AnalysisReport> {
    let path = dir.as_ref().join(ANALYSIS_FILE);
    let reader = BufReader::new(File::open(&path)?);
    let report = serde_json::from_reader(reader)?;
    debug!("Loaded analysis from {}", path.display());
    Ok(report)
}

fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    serde_json::to_writer_pretty(BufWriter::new(File::create(path)?), value)?;
    Ok(())
}
