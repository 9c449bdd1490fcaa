//! Search query representation.

use serde::{Deserialize, Serialize};

use crate::{CrawlError, Result};

/// A keyword search to run against one or more engines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// The search terms.
    pub query: String,
    /// Page limit overriding the crawler settings.
    pub max_pages: Option<u32>,
    /// Specific engines to use (by shortcut).
    pub engines: Vec<String>,
}

impl SearchQuery {
    /// Creates a new search query with the given terms.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            max_pages: None,
            engines: Vec::new(),
        }
    }

    /// Sets the page limit.
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = Some(max_pages);
        self
    }

    /// Sets specific engines to use.
    pub fn with_engines(mut self, engines: Vec<String>) -> Self {
        self.engines = engines;
        self
    }

    /// Returns the trimmed keyword, rejecting blank queries.
    pub fn keyword(&self) -> Result<&str> {
        let keyword = self.query.trim();
        if keyword.is_empty() {
            return Err(CrawlError::InvalidQuery("Query cannot be empty".into()));
        }
        Ok(keyword)
    }

    /// Effective page limit given the configured default.
    pub fn page_limit(&self, default: u32) -> u32 {
        self.max_pages.unwrap_or(default).max(1)
    }
}
