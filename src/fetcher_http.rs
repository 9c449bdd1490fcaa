//! HTTP-based page fetcher using reqwest.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::{Client, Proxy};
use tracing::debug;

use crate::fetcher::PageFetcher;
use crate::settings::CrawlerSettings;
use crate::{CrawlError, Result};

/// A page fetcher that uses plain HTTP requests via reqwest.
///
/// Each request carries the next user agent from a fixed rotation.
pub struct HttpFetcher {
    client: Client,
    user_agents: Vec<String>,
    next_agent: AtomicUsize,
}

impl HttpFetcher {
    /// Creates a fetcher from crawler settings.
    pub fn new(settings: &CrawlerSettings) -> Result<Self> {
        Self::builder(settings).build()
    }

    /// Starts a builder seeded from crawler settings.
    pub fn builder(settings: &CrawlerSettings) -> HttpFetcherBuilder {
        HttpFetcherBuilder {
            timeout: Duration::from_secs(settings.request_timeout_secs),
            user_agents: settings.user_agents.clone(),
            proxy: None,
        }
    }

    /// Creates an `HttpFetcher` with a custom reqwest client.
    pub fn with_client(client: Client, user_agents: Vec<String>) -> Self {
        Self {
            client,
            user_agents,
            next_agent: AtomicUsize::new(0),
        }
    }

    /// Returns the user agent for the next request, round robin.
    fn next_user_agent(&self) -> Option<&str> {
        if self.user_agents.is_empty() {
            return None;
        }
        let index = self.next_agent.fetch_add(1, Ordering::Relaxed) % self.user_agents.len();
        Some(self.user_agents[index].as_str())
    }
}

/// Builder for [`HttpFetcher`].
pub struct HttpFetcherBuilder {
    timeout: Duration,
    user_agents: Vec<String>,
    proxy: Option<String>,
}

impl HttpFetcherBuilder {
    /// Routes requests through a proxy (`http://`, `https://` or `socks5://`).
    pub fn proxy(mut self, url: impl Into<String>) -> Self {
        self.proxy = Some(url.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<HttpFetcher> {
        let mut builder = Client::builder().timeout(self.timeout);
        if let Some(proxy) = &self.proxy {
            builder = builder.proxy(Proxy::all(proxy.as_str())?);
        }
        let client = builder.build()?;
        Ok(HttpFetcher::with_client(client, self.user_agents))
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let mut request = self
            .client
            .get(url)
            .header(ACCEPT_LANGUAGE, "zh-CN,zh;q=0.9,en;q=0.6");
        if let Some(agent) = self.next_user_agent() {
            request = request.header(USER_AGENT, agent);
        }

        let response = request.send().await?;
        let status = response.status();
        debug!("GET {} -> {}", url, status);
        if !status.is_success() {
            return Err(CrawlError::Status(status.as_u16(), url.to_string()));
        }

        let html = response.text().await?;
        Ok(html)
    }
}
