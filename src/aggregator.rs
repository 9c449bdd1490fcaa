//! Merging of hits collected from several engines or pages.

use std::collections::HashMap;

use crate::SearchResult;

/// Deduplicates hits by normalized URL.
///
/// The first occurrence fixes a hit's position in the output. Later
/// duplicates contribute their engines, and a longer title or description
/// replaces a shorter one.
#[derive(Debug, Default)]
pub struct Aggregator {
    results: Vec<SearchResult>,
    index: HashMap<String, usize>,
}

impl Aggregator {
    /// Creates a new aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one hit, merging it into an existing entry when the URL was seen.
    /// Returns `true` when the hit was new.
    pub fn push(&mut self, result: SearchResult) -> bool {
        let key = result.normalized_url();
        match self.index.get(&key) {
            Some(&position) => {
                merge_results(&mut self.results[position], result);
                false
            }
            None => {
                self.index.insert(key, self.results.len());
                self.results.push(result);
                true
            }
        }
    }

    /// Adds a batch of hits.
    pub fn extend(&mut self, results: impl IntoIterator<Item = SearchResult>) {
        for result in results {
            self.push(result);
        }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Aggregates per-engine hit lists in engine order.
    pub fn aggregate(engine_results: Vec<(String, Vec<SearchResult>)>) -> Vec<SearchResult> {
        let mut aggregator = Self::new();
        for (engine_name, results) in engine_results {
            aggregator.extend(
                results
                    .into_iter()
                    .map(|result| result.with_engine(engine_name.clone())),
            );
        }
        aggregator.into_results()
    }

    /// Consumes the aggregator, returning hits in first-seen order.
    pub fn into_results(self) -> Vec<SearchResult> {
        self.results
    }
}

fn merge_results(existing: &mut SearchResult, new: SearchResult) {
    existing.engines.extend(new.engines);

    if new.title.chars().count() > existing.title.chars().count() {
        existing.title = new.title;
    }
    if new.description.chars().count() > existing.description.chars().count() {
        existing.description = new.description;
    }
    if existing.date.is_none() && new.date.is_some() {
        existing.date = new.date;
    }
    existing.is_pdf |= new.is_pdf;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregator_new() {
        let aggregator = Aggregator::new();
        assert!(aggregator.is_empty());
        assert_eq!(aggregator.len(), 0);
    }

    #[test]
    fn test_push_reports_new_hits() {
        let mut aggregator = Aggregator::new();
        assert!(aggregator.push(SearchResult::new("https://a.cn/1", "t", "d")));
        assert!(!aggregator.push(SearchResult::new("http://a.cn/1/", "t", "d")));
        assert_eq!(aggregator.len(), 1);
    }

    #[test]
    fn test_aggregate_empty_results() {
        let aggregated = Aggregator::aggregate(vec![]);
        assert!(aggregated.is_empty());
    }

    #[test]
    fn test_aggregate_tags_engine() {
        let results = vec![SearchResult::new("https://example.com", "Title", "Content")];
        let aggregated = Aggregator::aggregate(vec![("baidu".to_string(), results)]);
        assert_eq!(aggregated.len(), 1);
        assert!(aggregated[0].engines.contains("baidu"));
    }

    #[test]
    fn test_aggregate_deduplicates_by_url() {
        let results1 = vec![
            SearchResult::new("https://example.com/page", "科技奖", "短"),
            SearchResult::new("https://other.com", "Other", "Other content"),
        ];
        let results2 = vec![SearchResult::new(
            "http://example.com/page/",
            "科技进步奖名单",
            "更长的摘要内容",
        )
        .with_date("2023-01-01")];

        let aggregated = Aggregator::aggregate(vec![
            ("baidu".to_string(), results1),
            ("bing".to_string(), results2),
        ]);

        assert_eq!(aggregated.len(), 2);
        let merged = &aggregated[0];
        assert_eq!(merged.url, "https://example.com/page");
        assert_eq!(merged.title, "科技进步奖名单");
        assert_eq!(merged.description, "更长的摘要内容");
        assert_eq!(merged.date.as_deref(), Some("2023-01-01"));
        assert!(merged.engines.contains("baidu"));
        assert!(merged.engines.contains("bing"));
        assert_eq!(aggregated[1].url, "https://other.com");
    }

    #[test]
    fn test_merge_keeps_existing_date() {
        let mut aggregator = Aggregator::new();
        aggregator.push(SearchResult::new("https://a.cn", "t", "d").with_date("2021"));
        aggregator.push(SearchResult::new("https://a.cn", "t", "d").with_date("2022"));
        assert_eq!(aggregator.into_results()[0].date.as_deref(), Some("2021"));
    }
}
