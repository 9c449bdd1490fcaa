//! Runtime settings loaded from an optional JSON file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{CrawlError, Result};

/// Top-level settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub crawler: CrawlerSettings,
    #[serde(default)]
    pub filter: FilterSettings,
    #[serde(default)]
    pub text: TextSettings,
}

impl Settings {
    /// Loads settings from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&raw)
            .map_err(|e| CrawlError::Config(format!("{}: {}", path.display(), e)))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Rejects values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.max_pages == 0 {
            return Err(CrawlError::Config("crawler.max_pages must be at least 1".into()));
        }
        if self.crawler.user_agents.is_empty() {
            return Err(CrawlError::Config("crawler.user_agents cannot be empty".into()));
        }
        if self.text.min_text_length > self.text.max_text_length {
            return Err(CrawlError::Config(
                "text.min_text_length exceeds text.max_text_length".into(),
            ));
        }
        Ok(())
    }
}

/// Paging, pacing and retry behaviour of the crawler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerSettings {
    /// Base delay between result pages, in milliseconds.
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,
    /// Maximum number of result pages per keyword.
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
    /// Attempts per page before the crawl gives up.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Pause after a rate-limit page, in seconds.
    #[serde(default = "default_ban_wait_secs")]
    pub ban_wait_secs: u64,
    /// HTTP request timeout, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// User agents rotated across requests.
    #[serde(default = "default_user_agents")]
    pub user_agents: Vec<String>,
}

fn default_request_delay_ms() -> u64 {
    2000
}

fn default_max_pages() -> u32 {
    10
}

fn default_max_retries() -> u32 {
    3
}

fn default_ban_wait_secs() -> u64 {
    60
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_user_agents() -> Vec<String> {
    vec![
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/134.0.0.0 Safari/537.36".to_string(),
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15".to_string(),
        "Mozilla/5.0 (X11; Linux x86_64; rv:125.0) Gecko/20100101 Firefox/125.0".to_string(),
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36 Edg/124.0.0.0".to_string(),
    ]
}

impl Default for CrawlerSettings {
    fn default() -> Self {
        Self {
            request_delay_ms: default_request_delay_ms(),
            max_pages: default_max_pages(),
            max_retries: default_max_retries(),
            ban_wait_secs: default_ban_wait_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            user_agents: default_user_agents(),
        }
    }
}

/// Relevance filter applied to raw search results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterSettings {
    /// A result title must contain one of these.
    #[serde(default = "default_title_keywords")]
    pub title_keywords: Vec<String>,
    /// A result description must contain one of these.
    #[serde(default = "default_description_keywords")]
    pub description_keywords: Vec<String>,
    /// Oldest announcement year kept when a result carries a date.
    #[serde(default = "default_min_year")]
    pub min_year: i32,
}

fn default_title_keywords() -> Vec<String> {
    ["奖", "科技", "创新", "成果"].iter().map(|s| s.to_string()).collect()
}

fn default_description_keywords() -> Vec<String> {
    ["获奖", "授予", "表彰"].iter().map(|s| s.to_string()).collect()
}

fn default_min_year() -> i32 {
    2010
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            title_keywords: default_title_keywords(),
            description_keywords: default_description_keywords(),
            min_year: default_min_year(),
        }
    }
}

/// Length bounds used by the cleaner and validator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextSettings {
    #[serde(default = "default_min_text_length")]
    pub min_text_length: usize,
    #[serde(default = "default_max_text_length")]
    pub max_text_length: usize,
}

fn default_min_text_length() -> usize {
    2
}

fn default_max_text_length() -> usize {
    1000
}

impl Default for TextSettings {
    fn default() -> Self {
        Self {
            min_text_length: default_min_text_length(),
            max_text_length: default_max_text_length(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();
        assert_eq!(settings.crawler.request_delay_ms, 2000);
        assert_eq!(settings.crawler.max_pages, 10);
        assert_eq!(settings.crawler.max_retries, 3);
        assert_eq!(settings.crawler.ban_wait_secs, 60);
        assert_eq!(settings.crawler.request_timeout_secs, 30);
        assert!(!settings.crawler.user_agents.is_empty());
        assert_eq!(settings.filter.min_year, 2010);
        assert_eq!(settings.text.min_text_length, 2);
        assert_eq!(settings.text.max_text_length, 1000);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_settings_partial_json() {
        let json = r#"{"crawler":{"max_pages":3},"filter":{"min_year":2015}}"#;
        let settings: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.crawler.max_pages, 3);
        assert_eq!(settings.crawler.max_retries, 3); // default
        assert_eq!(settings.filter.min_year, 2015);
        assert_eq!(settings.filter.title_keywords.len(), 4); // default
        assert_eq!(settings.text.max_text_length, 1000); // default
    }

    #[test]
    fn test_settings_empty_json() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings.crawler.max_pages, 10);
    }

    #[test]
    fn test_settings_validate_rejects_zero_pages() {
        let mut settings = Settings::default();
        settings.crawler.max_pages = 0;
        assert!(matches!(settings.validate(), Err(CrawlError::Config(_))));
    }

    #[test]
    fn test_settings_validate_rejects_inverted_lengths() {
        let mut settings = Settings::default();
        settings.text.min_text_length = 50;
        settings.text.max_text_length = 10;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_settings_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"crawler":{"request_delay_ms":0}}"#).unwrap();
        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.crawler.request_delay_ms, 0);
    }

    #[test]
    fn test_settings_load_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(Settings::load(&path), Err(CrawlError::Config(_))));
    }
}
