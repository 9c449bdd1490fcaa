//! Search engine adapter trait and configuration.

use scraper::Selector;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{CrawlError, Result, SearchQuery, SearchResult};

/// Results requested per page from every supported engine.
pub const RESULTS_PER_PAGE: u32 = 10;

/// Configuration for a search engine adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Display name of the engine.
    pub name: String,
    /// Short identifier (e.g., "bing").
    pub shortcut: String,
    /// Result page endpoint.
    pub base_url: String,
    /// Relative engine weight; carried in the config, not used for ranking.
    #[serde(default = "default_weight")]
    pub weight: f64,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Whether the engine is enabled.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Whether pagination is supported.
    #[serde(default)]
    pub paging: bool,
}

fn default_weight() -> f64 {
    1.0
}

fn default_timeout() -> u64 {
    30
}

fn default_enabled() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            shortcut: String::new(),
            base_url: String::new(),
            weight: 1.0,
            timeout: 30,
            enabled: true,
            paging: false,
        }
    }
}

/// Per-provider logic for building result-page requests and reading their markup.
///
/// Adapters do no I/O; the crawler owns fetching, pacing and retries.
pub trait Engine: Send + Sync {
    /// Returns the engine configuration.
    fn config(&self) -> &EngineConfig;

    /// Query parameters for the given 1-indexed result page.
    fn search_params(&self, query: &SearchQuery, page: u32) -> Vec<(String, String)>;

    /// Extracts hits from a result page.
    fn parse_results(&self, html: &str) -> Result<Vec<SearchResult>>;

    /// Whether the result page links to a following page.
    fn has_next_page(&self, html: &str) -> bool;

    /// Full request URL for the given page.
    fn search_url(&self, query: &SearchQuery, page: u32) -> Result<Url> {
        let params = self.search_params(query, page);
        Ok(Url::parse_with_params(&self.config().base_url, &params)?)
    }

    /// Returns the engine name.
    fn name(&self) -> &str {
        &self.config().name
    }

    /// Returns the engine shortcut.
    fn shortcut(&self) -> &str {
        &self.config().shortcut
    }

    /// Returns the engine weight.
    fn weight(&self) -> f64 {
        self.config().weight
    }

    /// Returns whether the engine is enabled.
    fn is_enabled(&self) -> bool {
        self.config().enabled
    }
}

/// Compiles a CSS selector, mapping failures into a parse error.
pub(crate) fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css)
        .map_err(|e| CrawlError::Parse(format!("Failed to parse selector '{}': {:?}", css, e)))
}
