//! Page fetcher abstraction for retrieving HTML content.

use async_trait::async_trait;

use crate::Result;

/// Trait for fetching the full HTML content of a URL.
///
/// All configuration (user-agent, timeouts, proxy) is set at construction
/// time; `fetch` is a simple URL-in, HTML-out interface.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches the HTML content of the given URL.
    async fn fetch(&self, url: &str) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct EchoFetcher;

    #[async_trait]
    impl PageFetcher for EchoFetcher {
        async fn fetch(&self, url: &str) -> Result<String> {
            Ok(format!("<html><body>{}</body></html>", url))
        }
    }

    #[tokio::test]
    async fn test_fetcher_as_trait_object() {
        let fetcher: Arc<dyn PageFetcher> = Arc::new(EchoFetcher);
        let html = fetcher.fetch("https://example.com").await.unwrap();
        assert!(html.contains("https://example.com"));
    }

    #[test]
    fn test_fetch_from_sync_context() {
        let fetcher = EchoFetcher;
        let html = tokio_test::block_on(fetcher.fetch("https://kjt.example.cn")).unwrap();
        assert!(html.starts_with("<html>"));
    }
}
