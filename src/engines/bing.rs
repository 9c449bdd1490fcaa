//! Bing China search engine adapter.

use scraper::Html;

use crate::engine::{selector, RESULTS_PER_PAGE};
use crate::text::element_text;
use crate::{Engine, EngineConfig, Result, SearchQuery, SearchResult};

/// Bing China search engine (必应中国).
pub struct Bing {
    config: EngineConfig,
}

impl Bing {
    /// Creates a new Bing adapter.
    pub fn new() -> Self {
        Self {
            config: EngineConfig {
                name: "Bing".to_string(),
                shortcut: "bing".to_string(),
                base_url: "https://cn.bing.com/search".to_string(),
                weight: 1.0,
                timeout: 30,
                enabled: true,
                paging: true,
            },
        }
    }

    /// Creates with custom configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }
}

impl Default for Bing {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for Bing {
    fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn search_params(&self, query: &SearchQuery, page: u32) -> Vec<(String, String)> {
        let first = u64::from(page.saturating_sub(1)) * u64::from(RESULTS_PER_PAGE) + 1;
        vec![
            ("q".to_string(), query.query.clone()),
            ("first".to_string(), first.to_string()),
        ]
    }

    fn parse_results(&self, html: &str) -> Result<Vec<SearchResult>> {
        let document = Html::parse_document(html);

        let result_selector = selector("li.b_algo")?;
        let title_selector = selector("h2 a")?;
        let caption_selector = selector("div.b_caption")?;
        let date_selector = selector("div.news_dt, span.news_dt")?;

        let mut results = Vec::new();

        for element in document.select(&result_selector) {
            let Some(title_elem) = element.select(&title_selector).next() else {
                continue;
            };

            let title = element_text(title_elem);
            let url = title_elem
                .value()
                .attr("href")
                .unwrap_or_default()
                .trim()
                .to_string();

            let description = element
                .select(&caption_selector)
                .next()
                .map(element_text)
                .unwrap_or_default();

            let date = element
                .select(&date_selector)
                .next()
                .map(element_text)
                .filter(|d| !d.is_empty());

            if url.is_empty() || title.is_empty() {
                continue;
            }

            let is_pdf = url.to_lowercase().ends_with(".pdf");
            let mut result = SearchResult::new(url, title, description).with_pdf(is_pdf);
            result.date = date;
            results.push(result);
        }

        Ok(results)
    }

    fn has_next_page(&self, html: &str) -> bool {
        let document = Html::parse_document(html);
        match selector("a.sb_pagN") {
            Ok(next) => document.select(&next).next().is_some(),
            Err(_) => false,
        }
    }
}
