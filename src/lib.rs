//! # award-crawler
//!
//! Collects science and technology award announcements from search engines
//! and turns them into award, project and winner tables ready for analysis.
//!
//! The pipeline has four stages:
//!
//! - Paged keyword crawling of Baidu and Bing with pacing, retries and ban detection
//! - Cleaning of raw hits into award records
//! - Flattening into CSV tables and a data-quality report
//! - Statistics and co-winner network analysis
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use award_crawler::engines::Baidu;
//! use award_crawler::processor::{transformer, DataCleaner};
//! use award_crawler::settings::Settings;
//! use award_crawler::{Crawler, HttpFetcher, SearchQuery};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::default();
//!     let fetcher = Arc::new(HttpFetcher::new(&settings.crawler)?);
//!     let crawler = Crawler::new(Arc::new(Baidu::new()), fetcher, settings.clone());
//!
//!     let hits = crawler.crawl(&SearchQuery::new("科技进步奖 获奖名单")).await?;
//!     let awards = DataCleaner::new(settings.text).clean_items(&hits);
//!     transformer::write_csv(&transformer::to_tables(&awards), "data/tables")?;
//!     Ok(())
//! }
//! ```

mod aggregator;
mod engine;
mod error;
mod fetcher;
mod fetcher_http;
mod query;
mod result;

pub mod analyzer;
pub mod catalog;
pub mod crawler;
pub mod engines;
pub mod parser;
pub mod processor;
pub mod record;
pub mod settings;
pub mod text;
pub mod validator;

pub use aggregator::Aggregator;
pub use crawler::{Crawler, MultiCrawler};
pub use engine::{Engine, EngineConfig, RESULTS_PER_PAGE};
pub use error::{CrawlError, Result};
pub use fetcher::PageFetcher;
pub use fetcher_http::{HttpFetcher, HttpFetcherBuilder};
pub use query::SearchQuery;
pub use result::SearchResult;
