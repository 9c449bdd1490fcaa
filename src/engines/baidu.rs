//! Baidu search engine adapter.

use scraper::Html;

use crate::engine::{selector, RESULTS_PER_PAGE};
use crate::text::element_text;
use crate::{Engine, EngineConfig, Result, SearchQuery, SearchResult};

const NEXT_PAGE_TEXT: &str = "下一页>";

/// Baidu search engine (百度).
pub struct Baidu {
    config: EngineConfig,
}

impl Baidu {
    /// Creates a new Baidu adapter.
    pub fn new() -> Self {
        Self {
            config: EngineConfig {
                name: "Baidu".to_string(),
                shortcut: "baidu".to_string(),
                base_url: "https://www.baidu.com/s".to_string(),
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

impl Default for Baidu {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for Baidu {
    fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn search_params(&self, query: &SearchQuery, page: u32) -> Vec<(String, String)> {
        let pn = u64::from(page.saturating_sub(1)) * u64::from(RESULTS_PER_PAGE);
        vec![
            ("wd".to_string(), query.query.clone()),
            ("pn".to_string(), pn.to_string()),
            ("rn".to_string(), RESULTS_PER_PAGE.to_string()),
            ("ie".to_string(), "utf-8".to_string()),
        ]
    }

    fn parse_results(&self, html: &str) -> Result<Vec<SearchResult>> {
        let document = Html::parse_document(html);

        let result_selector = selector("div.result, div.c-container")?;
        let title_selector = selector("h3.t a")?;
        let fallback_title_selector = selector("h3 a")?;
        let abstract_selector = selector(".c-abstract")?;
        let fallback_selector = selector(".c-span-last")?;
        let date_selector = selector("span.c-color-gray2")?;

        let mut results = Vec::new();

        for element in document.select(&result_selector) {
            let title_elem = match element
                .select(&title_selector)
                .next()
                .or_else(|| element.select(&fallback_title_selector).next())
            {
                Some(el) => el,
                None => continue,
            };

            let title = element_text(title_elem);
            let url = title_elem
                .value()
                .attr("href")
                .unwrap_or_default()
                .trim()
                .to_string();

            let description = element
                .select(&abstract_selector)
                .next()
                .or_else(|| element.select(&fallback_selector).next())
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

            let is_pdf =
                description.to_lowercase().contains("pdf") || url.to_lowercase().ends_with(".pdf");

            let mut result = SearchResult::new(url, title, description).with_pdf(is_pdf);
            result.date = date;
            results.push(result);
        }

        Ok(results)
    }

    fn has_next_page(&self, html: &str) -> bool {
        let document = Html::parse_document(html);
        let Ok(link_selector) = selector("a") else {
            return false;
        };
        document
            .select(&link_selector)
            .any(|a| element_text(a) == NEXT_PAGE_TEXT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baidu_new() {
        let engine = Baidu::new();
        assert_eq!(engine.config.name, "Baidu");
        assert_eq!(engine.config.shortcut, "baidu");
        assert_eq!(engine.config.base_url, "https://www.baidu.com/s");
        assert_eq!(engine.config.timeout, 30);
        assert!(engine.config.enabled);
        assert!(engine.config.paging);
    }

    #[test]
    fn test_baidu_with_config() {
        let custom_config = EngineConfig {
            name: "Custom Baidu".to_string(),
            shortcut: "cbaidu".to_string(),
            weight: 1.5,
            ..Default::default()
        };
        let engine = Baidu::new().with_config(custom_config);
        assert_eq!(engine.name(), "Custom Baidu");
        assert_eq!(engine.shortcut(), "cbaidu");
        assert_eq!(engine.weight(), 1.5);
    }

    #[test]
    fn test_search_params_first_page() {
        let engine = Baidu::new();
        let params = engine.search_params(&SearchQuery::new("科技进步奖"), 1);
        assert_eq!(
            params,
            vec![
                ("wd".to_string(), "科技进步奖".to_string()),
                ("pn".to_string(), "0".to_string()),
                ("rn".to_string(), "10".to_string()),
                ("ie".to_string(), "utf-8".to_string()),
            ]
        );
    }

    #[test]
    fn test_search_params_offset() {
        let engine = Baidu::new();
        let params = engine.search_params(&SearchQuery::new("q"), 3);
        assert_eq!(params[1], ("pn".to_string(), "20".to_string()));
    }

    #[test]
    fn test_search_url() {
        let engine = Baidu::new();
        let url = engine.search_url(&SearchQuery::new("科技奖"), 2).unwrap();
        assert!(url.as_str().starts_with("https://www.baidu.com/s?wd="));
        assert!(url.as_str().contains("pn=10"));
    }

    #[test]
    fn test_parse_results_empty_html() {
        let engine = Baidu::new();
        let results = engine.parse_results("<html><body></body></html>").unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_parse_results_with_results() {
        let engine = Baidu::new();
        let html = r#"
            <html>
            <body>
                <div class="result c-container">
                    <h3 class="t"><a href="https://kjt.example.gov.cn/a/1.html">2022年度省科学技术奖获奖名单</a></h3>
                    <div class="c-abstract"><span class="c-color-gray2">2023-01-05</span>授予一等奖项目10项</div>
                </div>
                <div class="c-container">
                    <h3 class="t"><a href="https://example.edu.cn/files/list.PDF">获奖项目公示</a></h3>
                    <div class="c-span-last">公示名单</div>
                </div>
            </body>
            </html>
        "#;
        let results = engine.parse_results(html).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "2022年度省科学技术奖获奖名单");
        assert_eq!(results[0].url, "https://kjt.example.gov.cn/a/1.html");
        assert_eq!(results[0].description, "2023-01-05授予一等奖项目10项");
        assert_eq!(results[0].date.as_deref(), Some("2023-01-05"));
        assert!(!results[0].is_pdf);
        assert_eq!(results[1].description, "公示名单");
        assert!(results[1].is_pdf);
        assert!(results[1].date.is_none());
    }

    #[test]
    fn test_parse_results_pdf_from_description() {
        let engine = Baidu::new();
        let html = r#"
            <div class="result">
                <h3 class="t"><a href="https://a.cn/x">名单</a></h3>
                <div class="c-abstract">[PDF] 获奖名单</div>
            </div>
        "#;
        let results = engine.parse_results(html).unwrap();
        assert!(results[0].is_pdf);
    }

    #[test]
    fn test_parse_results_skips_missing_title() {
        let engine = Baidu::new();
        let html = r#"
            <div class="c-container">
                <div class="c-abstract">No title here</div>
            </div>
        "#;
        assert!(engine.parse_results(html).unwrap().is_empty());
    }

    #[test]
    fn test_parse_results_skips_empty_url() {
        let engine = Baidu::new();
        let html = r#"
            <div class="c-container">
                <h3 class="t"><a href="">Empty URL</a></h3>
            </div>
        "#;
        assert!(engine.parse_results(html).unwrap().is_empty());
    }

    #[test]
    fn test_has_next_page() {
        let engine = Baidu::new();
        let with_next = r#"<div id="page"><a href="/s?pn=10">下一页&gt;</a></div>"#;
        let without = r#"<div id="page"><a href="/s?pn=0">&lt;上一页</a></div>"#;
        assert!(engine.has_next_page(with_next));
        assert!(!engine.has_next_page(without));
    }

    #[test]
    fn test_has_next_page_requires_exact_label() {
        let engine = Baidu::new();
        assert!(!engine.has_next_page(r#"<a href="/x">下一页内容预告</a>"#));
        assert!(!engine.has_next_page(r#"<a href="/x">下一页</a>"#));
        assert!(engine.has_next_page(r#"<a href="/x"> 下一页&gt; </a>"#));
    }

    #[test]
    fn test_parse_results_prefers_title_heading() {
        let engine = Baidu::new();
        let html = r#"
            <div class="result">
                <h3 class="c-title-sub"><a href="https://a.cn/related">相关搜索</a></h3>
                <h3 class="t"><a href="https://a.cn/award">科技进步奖获奖名单</a></h3>
            </div>
            <div class="result">
                <h3><a href="https://a.cn/plain">技术发明奖公示</a></h3>
            </div>
        "#;
        let results = engine.parse_results(html).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].url, "https://a.cn/award");
        assert_eq!(results[0].title, "科技进步奖获奖名单");
        assert_eq!(results[1].url, "https://a.cn/plain");
    }

    #[test]
    fn test_search_params_far_page() {
        let engine = Baidu::new();
        let params = engine.search_params(&SearchQuery::new("q"), u32::MAX);
        assert_eq!(params[1].1, ((u64::from(u32::MAX) - 1) * 10).to_string());
    }
}
