//! Paged keyword crawling with pacing, retries and relevance filtering.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::Arc;

use futures::future::join_all;
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use scraper::Html;
use tokio::time::{sleep, timeout, Duration};
use tracing::{debug, error, info, warn};

use crate::engine::RESULTS_PER_PAGE;
use crate::fetcher::PageFetcher;
use crate::settings::Settings;
use crate::text::{current_year, timestamp};
use crate::{Aggregator, CrawlError, Engine, Result, SearchQuery, SearchResult};

/// Markers of a rate-limit or captcha page, matched against lower-cased page text.
const BAN_MARKERS: &[&str] = &["访问频率过高", "请输入验证码", "robot", "forbidden", "banned"];

static DATE_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"20\d{2}").unwrap());

/// Returns true when the visible text of a page looks like a block page.
pub fn is_banned(html: &str) -> bool {
    let document = Html::parse_document(html);
    let text = document.root_element().text().collect::<String>().to_lowercase();
    BAN_MARKERS.iter().any(|marker| text.contains(marker))
}

/// Crawls result pages of a single engine for one keyword.
pub struct Crawler {
    engine: Arc<dyn Engine>,
    fetcher: Arc<dyn PageFetcher>,
    settings: Settings,
}

impl Crawler {
    /// Creates a crawler for one engine.
    pub fn new(engine: Arc<dyn Engine>, fetcher: Arc<dyn PageFetcher>, settings: Settings) -> Self {
        Self {
            engine,
            fetcher,
            settings,
        }
    }

    /// Returns the engine this crawler drives.
    pub fn engine(&self) -> &Arc<dyn Engine> {
        &self.engine
    }

    /// Walks result pages until the page limit, an empty page, the last page,
    /// or the retry budget runs out. A page that cannot be requested or parsed
    /// ends the walk; hits gathered so far are still returned.
    pub async fn crawl(&self, query: &SearchQuery) -> Result<Vec<SearchResult>> {
        let keyword = query.keyword()?.to_string();
        let crawler = &self.settings.crawler;
        let max_pages = query.page_limit(crawler.max_pages);
        let wanted = (max_pages as usize).saturating_mul(RESULTS_PER_PAGE as usize);
        let name = self.engine.name().to_string();

        let mut collected = Aggregator::new();
        let mut page = 1;
        let mut retries = 0;

        while page <= max_pages {
            info!("{}: searching page {} for '{}'", name, page, keyword);

            let url = match self.engine.search_url(query, page) {
                Ok(url) => url,
                Err(e) => {
                    error!("{}: cannot build URL for page {}: {}", name, page, e);
                    break;
                }
            };
            let html = match self.fetch_page(url.as_str()).await {
                Ok(html) => html,
                Err(e) => {
                    if retries < crawler.max_retries {
                        retries += 1;
                        warn!("{}: page {} failed ({}), retry {}", name, page, e, retries);
                        if matches!(e, CrawlError::Banned(_)) {
                            sleep(Duration::from_secs(crawler.ban_wait_secs)).await;
                        }
                        sleep(Duration::from_millis(crawler.request_delay_ms.saturating_mul(2))).await;
                        continue;
                    }
                    error!("{}: retry limit reached, stopping at page {}", name, page);
                    break;
                }
            };
            retries = 0;

            let page_results = match self.engine.parse_results(&html) {
                Ok(results) => results,
                Err(e) => {
                    error!("{}: cannot parse page {}: {}", name, page, e);
                    break;
                }
            };
            if page_results.is_empty() {
                debug!("{}: page {} has no results", name, page);
                break;
            }

            let total = page_results.len();
            let kept = self.filter_results(page_results, &keyword);
            debug!("{}: page {} kept {}/{} results", name, page, kept.len(), total);
            collected.extend(kept);

            if collected.len() >= wanted {
                info!("{}: collected {} results, stopping", name, collected.len());
                break;
            }

            if !self.engine.has_next_page(&html) {
                debug!("{}: no next page after page {}", name, page);
                break;
            }

            if page == max_pages {
                break;
            }
            self.pause().await;
            page += 1;
        }

        Ok(collected.into_results())
    }

    /// Keeps award-related hits and stamps them with crawl metadata.
    pub fn filter_results(&self, results: Vec<SearchResult>, keyword: &str) -> Vec<SearchResult> {
        let filter = &self.settings.filter;
        let this_year = current_year();
        let crawled_at = timestamp();

        results
            .into_iter()
            .filter(|result| {
                filter
                    .title_keywords
                    .iter()
                    .any(|k| result.title.contains(k.as_str()))
            })
            .filter(|result| {
                filter
                    .description_keywords
                    .iter()
                    .any(|k| result.description.contains(k.as_str()))
            })
            .filter(|result| {
                let year = result
                    .date
                    .as_deref()
                    .and_then(|date| DATE_YEAR.find(date))
                    .and_then(|m| m.as_str().parse::<i32>().ok());
                match year {
                    Some(year) => (filter.min_year..=this_year).contains(&year),
                    None => true,
                }
            })
            .map(|mut result| {
                result.crawled_at = Some(crawled_at.clone());
                result.search_keyword = Some(keyword.to_string());
                result.engines.insert(self.engine.shortcut().to_string());
                result
            })
            .collect()
    }

    async fn fetch_page(&self, url: &str) -> Result<String> {
        let limit = Duration::from_secs(self.engine.config().timeout);
        let html = match timeout(limit, self.fetcher.fetch(url)).await {
            Ok(result) => result?,
            Err(_) => return Err(CrawlError::Timeout),
        };
        if is_banned(&html) {
            return Err(CrawlError::Banned(self.engine.name().to_string()));
        }
        Ok(html)
    }

    async fn pause(&self) {
        let base = self.settings.crawler.request_delay_ms;
        if base == 0 {
            return;
        }
        let jitter = rand::thread_rng().gen_range(0..1000);
        sleep(Duration::from_millis(base.saturating_add(jitter))).await;
    }
}

/// Runs the same keyword against several engines concurrently.
pub struct MultiCrawler {
    engines: Vec<Arc<dyn Engine>>,
    fetcher: Arc<dyn PageFetcher>,
    settings: Settings,
}

impl MultiCrawler {
    /// Creates a crawler with no engines.
    pub fn new(fetcher: Arc<dyn PageFetcher>, settings: Settings) -> Self {
        Self {
            engines: Vec::new(),
            fetcher,
            settings,
        }
    }

    /// Adds a search engine.
    pub fn add_engine(&mut self, engine: Box<dyn Engine>) {
        self.engines.push(Arc::from(engine));
    }

    /// Returns the number of configured engines.
    pub fn engine_count(&self) -> usize {
        self.engines.len()
    }

    /// Crawls all selected engines and merges their hits. A failing engine is
    /// logged and contributes nothing.
    pub async fn crawl(&self, query: SearchQuery) -> Result<Vec<SearchResult>> {
        if self.engines.is_empty() {
            return Err(CrawlError::NoEngines);
        }
        query.keyword()?;

        let query = Arc::new(query);
        let engines = self.select_engines(&query);
        if engines.is_empty() {
            return Err(CrawlError::NoEngines);
        }
        debug!("Crawling {} engines", engines.len());

        let futures: Vec<_> = engines
            .into_iter()
            .map(|engine| {
                let crawler =
                    Crawler::new(engine, Arc::clone(&self.fetcher), self.settings.clone());
                let query = Arc::clone(&query);

                async move {
                    let shortcut = crawler.engine().shortcut().to_string();
                    match crawler.crawl(&query).await {
                        Ok(results) => {
                            info!("Engine {} returned {} results", shortcut, results.len());
                            Some((shortcut, results))
                        }
                        Err(e) => {
                            warn!("Engine {} failed: {}", shortcut, e);
                            None
                        }
                    }
                }
            })
            .collect();

        let results: Vec<_> = join_all(futures).await.into_iter().flatten().collect();
        Ok(Aggregator::aggregate(results))
    }

    fn select_engines(&self, query: &SearchQuery) -> Vec<Arc<dyn Engine>> {
        self.engines
            .iter()
            .filter(|engine| engine.is_enabled())
            .filter(|engine| {
                query.engines.is_empty() || query.engines.iter().any(|s| s == engine.shortcut())
            })
            .cloned()
            .collect()
    }
}

/// Writes hits as a pretty-printed JSON array.
pub fn save_results(results: &[SearchResult], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, results)?;
    info!("Saved {} results to {}", results.len(), path.display());
    Ok(())
}

/// Reads a raw crawl file written by [`save_results`].
pub fn load_results(path: impl AsRef<Path>) -> Result<Vec<SearchResult>> {
    let reader = BufReader::new(File::open(path.as_ref())?);
    Ok(serde_json::from_reader(reader)?)
}
