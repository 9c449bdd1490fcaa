//! Error types for the crawler and processing pipeline.

use thiserror::Error;

/// Result type alias for crawler operations.
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Errors that can occur while crawling, parsing or processing award data.
#[derive(Error, Debug)]
pub enum CrawlError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status.
    #[error("HTTP status {0} for {1}")]
    Status(u16, String),

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// The search engine served a rate-limit or captcha page.
    #[error("Engine '{0}' is rate limiting requests")]
    Banned(String),

    /// Request timeout exceeded.
    #[error("Request timeout exceeded")]
    Timeout,

    /// No engines configured.
    #[error("No search engines configured")]
    NoEngines,

    /// Engine name not known to the registry.
    #[error("Unsupported search engine: {0}")]
    UnknownEngine(String),

    /// Invalid query.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// URL parsing error.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV encoding or decoding error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Invalid settings file.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Generic error.
    #[error("{0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_parse() {
        let err = CrawlError::Parse("bad selector".to_string());
        assert_eq!(err.to_string(), "Failed to parse response: bad selector");
    }

    #[test]
    fn test_error_display_status() {
        let err = CrawlError::Status(503, "https://cn.bing.com/search".to_string());
        assert_eq!(err.to_string(), "HTTP status 503 for https://cn.bing.com/search");
    }

    #[test]
    fn test_error_display_banned() {
        let err = CrawlError::Banned("Baidu".to_string());
        assert_eq!(err.to_string(), "Engine 'Baidu' is rate limiting requests");
    }

    #[test]
    fn test_error_display_unknown_engine() {
        let err = CrawlError::UnknownEngine("google".to_string());
        assert_eq!(err.to_string(), "Unsupported search engine: google");
    }

    #[test]
    fn test_error_display_timeout() {
        assert_eq!(CrawlError::Timeout.to_string(), "Request timeout exceeded");
    }

    #[test]
    fn test_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: CrawlError = io.into();
        assert!(matches!(err, CrawlError::Io(_)));
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<Vec<String>>("{").unwrap_err();
        let err: CrawlError = json_err.into();
        assert!(matches!(err, CrawlError::Json(_)));
    }

    #[test]
    fn test_error_debug() {
        let err = CrawlError::NoEngines;
        assert!(format!("{:?}", err).contains("NoEngines"));
    }
}
