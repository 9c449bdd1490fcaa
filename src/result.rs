//! Raw search result types as persisted by the crawler.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A single search-engine hit.
///
/// This is also the on-disk shape of a raw crawl file, so every field is
/// defaulted on read to tolerate hand-edited or partial input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Result title.
    #[serde(default)]
    pub title: String,
    /// Result URL.
    #[serde(default)]
    pub url: String,
    /// Result snippet.
    #[serde(default)]
    pub description: String,
    /// Date shown next to the hit, as printed by the engine.
    #[serde(default)]
    pub date: Option<String>,
    /// Whether the hit points at a PDF document.
    #[serde(default)]
    pub is_pdf: bool,
    /// Local time the hit was collected (`%Y-%m-%d %H:%M:%S`).
    #[serde(default)]
    pub crawled_at: Option<String>,
    /// Keyword that produced the hit.
    #[serde(default)]
    pub search_keyword: Option<String>,
    /// Engines that returned this hit.
    #[serde(default)]
    pub engines: BTreeSet<String>,
}

impl SearchResult {
    /// Creates a new search result.
    pub fn new(
        url: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    /// Sets the displayed date.
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    /// Marks the hit as a PDF document.
    pub fn with_pdf(mut self, is_pdf: bool) -> Self {
        self.is_pdf = is_pdf;
        self
    }

    /// Adds an engine that returned this hit.
    pub fn with_engine(mut self, engine: impl Into<String>) -> Self {
        self.engines.insert(engine.into());
        self
    }

    /// Alphabetically first engine shortcut among those that returned this hit.
    pub fn source_engine(&self) -> Option<&str> {
        self.engines.iter().next().map(String::as_str)
    }

    /// Returns a normalized URL for deduplication (without scheme and trailing slash).
    pub fn normalized_url(&self) -> String {
        let url = self
            .url
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_end_matches('/');
        url.to_lowercase()
    }
}
