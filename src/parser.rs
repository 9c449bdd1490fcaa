//! Parser for award announcement pages.
//!
//! Announcements are free-form government and university pages. The parser
//! tries a handful of common title/content containers, then reads projects
//! from tables (header-driven) or, failing that, from list items.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html};
use tracing::{debug, warn};

use crate::catalog;
use crate::engine::selector;
use crate::fetcher::PageFetcher;
use crate::record::{ParsedAward, Project, Winner};
use crate::text::element_text;
use crate::Result;

const TITLE_SELECTORS: &[&str] = &["h1", ".title", "#title", ".article-title"];
const CONTENT_SELECTORS: &[&str] = &[".content", "#content", ".article-content", "#article-content"];

static YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"20[1-2][0-9]").unwrap());
static ASCII_PARENS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\([^)]*\)").unwrap());
static WINNER_SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[,，、;；]").unwrap());
static BRACKETED_ORG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+?)\s*[（【［]\s*(.+?)\s*[）】］]\s*$").unwrap());
static SPACED_ORG: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\S+)\s+(.+)$").unwrap());
static WINNER_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:主要完成人|完成人|获奖人|作者)[：:]\s*([^。]+?)\s*(?:(?:完成)?单位[：:]|$)").unwrap());

static PROJECT_NAME_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"《(.+?)》",
        r#""(.+?)""#,
        r"“(.+?)”",
        r"项目名称[：:]\s*(\S+)",
        r"^(\d+[、.．]\s*\S*)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static ORGANIZATION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"单位[：:]\s*(\S+)",
        r"(\S+(?:大学|研究所|研究院|公司|企业|集团|中心|实验室))",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Column roles recognised in project tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Name,
    Winners,
    Organization,
    Level,
    Ignored,
}

impl Column {
    fn from_header(header: &str) -> Self {
        let has = |keys: &[&str]| keys.iter().any(|k| header.contains(k));
        if has(&["项目", "成果"]) {
            Column::Name
        } else if has(&["完成人", "获奖人", "作者"]) {
            Column::Winners
        } else if has(&["单位", "机构"]) {
            Column::Organization
        } else if has(&["等级", "级别"]) {
            Column::Level
        } else {
            Column::Ignored
        }
    }
}

/// Extracts award records from announcement pages.
#[derive(Debug, Default, Clone)]
pub struct AwardParser;

impl AwardParser {
    pub fn new() -> Self {
        Self
    }

    /// Fetches a page and parses it.
    pub async fn fetch_and_parse(&self, fetcher: &dyn PageFetcher, url: &str) -> Result<Option<ParsedAward>> {
        let html = fetcher.fetch(url).await?;
        debug!("Fetched {} ({} bytes)", url, html.len());
        Ok(self.parse(&html))
    }

    /// Parses an announcement page. Returns `None` for an empty document.
    pub fn parse(&self, html: &str) -> Option<ParsedAward> {
        if html.trim().is_empty() {
            return None;
        }
        let document = Html::parse_document(html);

        let title = first_text(&document, TITLE_SELECTORS);
        let content = first_text(&document, CONTENT_SELECTORS);
        let combined = format!("{}{}", title, content);

        Some(ParsedAward {
            year: extract_year(&title, &content),
            award_level: catalog::find_level(&combined).map(str::to_string),
            award_type: catalog::find_type(&combined).map(str::to_string),
            projects: self.extract_projects(&document),
            title,
            content,
        })
    }

    fn extract_projects(&self, document: &Html) -> Vec<Project> {
        let mut projects = Vec::new();

        if let Ok(table_selector) = selector("table") {
            for table in document.select(&table_selector) {
                projects.extend(parse_table(table));
            }
        }

        if projects.is_empty() {
            if let Ok(list_selector) = selector("ul, ol") {
                for list in document.select(&list_selector) {
                    projects.extend(parse_list(list));
                }
            }
        }

        projects
    }
}

fn first_text(document: &Html, selectors: &[&str]) -> String {
    for css in selectors {
        match selector(css) {
            Ok(sel) => {
                if let Some(el) = document.select(&sel).next() {
                    return element_text(el);
                }
            }
            Err(e) => warn!("{}", e),
        }
    }
    String::new()
}

fn extract_year(title: &str, content: &str) -> Option<i32> {
    YEAR.find(title)
        .or_else(|| YEAR.find(content))
        .and_then(|m| m.as_str().parse().ok())
}

/// Text of an element with text nodes separated by single spaces.
fn spaced_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_table(table: ElementRef<'_>) -> Vec<Project> {
    let (Ok(row_selector), Ok(header_selector), Ok(cell_selector)) =
        (selector("tr"), selector("th, td"), selector("td"))
    else {
        return Vec::new();
    };

    let mut rows = table.select(&row_selector);
    let Some(header_row) = rows.next() else {
        return Vec::new();
    };
    let columns: Vec<Column> = header_row
        .select(&header_selector)
        .map(|cell| Column::from_header(&element_text(cell).to_lowercase()))
        .collect();

    let mut projects = Vec::new();
    for row in rows {
        let mut project = Project::default();
        let mut touched = false;

        for (cell, column) in row.select(&cell_selector).zip(columns.iter()) {
            let value = element_text(cell);
            match column {
                Column::Name => project.name = value,
                Column::Winners => project.winners = parse_winners(&value),
                Column::Organization => project.organization = Some(value),
                Column::Level => project.level = Some(value),
                Column::Ignored => continue,
            }
            touched = true;
        }

        if touched {
            projects.push(project);
        }
    }
    projects
}

fn parse_list(list: ElementRef<'_>) -> Vec<Project> {
    let Ok(item_selector) = selector("li") else {
        return Vec::new();
    };

    list.select(&item_selector)
        .filter_map(|item| {
            let text = spaced_text(item);
            let name = extract_project_name(&text)?;
            let winners = WINNER_FIELD
                .captures(&text)
                .map(|caps| parse_winners(&caps[1]))
                .unwrap_or_default();
            Some(Project {
                name,
                winners,
                organization: extract_organization(&text),
                level: None,
            })
        })
        .collect()
}

/// Splits a winners cell into people, each with an optional organization in
/// full-width brackets or after whitespace.
pub fn parse_winners(text: &str) -> Vec<Winner> {
    let text = ASCII_PARENS.replace_all(text, "");

    WINNER_SEPARATORS
        .split(&text)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            if let Some(caps) = BRACKETED_ORG.captures(part) {
                Winner::new(caps[1].trim()).with_organization(caps[2].trim())
            } else if let Some(caps) = SPACED_ORG.captures(part) {
                Winner::new(&caps[1]).with_organization(caps[2].trim())
            } else {
                Winner::new(part)
            }
        })
        .collect()
}

/// Finds a project name in a list item.
pub fn extract_project_name(text: &str) -> Option<String> {
    PROJECT_NAME_PATTERNS
        .iter()
        .find_map(|re| re.captures(text))
        .map(|caps| caps[1].trim().to_string())
        .filter(|name| !name.is_empty())
}

/// Finds an organization name in a list item.
pub fn extract_organization(text: &str) -> Option<String> {
    ORGANIZATION_PATTERNS
        .iter()
        .find_map(|re| re.captures(text))
        .map(|caps| caps[1].trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    const TABLE_PAGE: &str = r#"
        <html><body>
        <h1>关于2022年度省科学技术奖励的决定</h1>
        <div class="content">经评审，授予下列项目科技进步奖一等奖。</div>
        <table>
            <tr><th>序号</th><th>项目名称</th><th>主要完成人</th><th>完成单位</th><th>等级</th></tr>
            <tr><td>1</td><td>高性能储能材料关键技术</td><td>张三（清华大学）、李四【浙江大学】</td><td>清华大学</td><td>一等奖</td></tr>
            <tr><td>2</td><td>智能电网调度系统</td><td>王五,赵六</td><td>国网电力公司</td><td>二等奖</td></tr>
            <tr></tr>
        </table>
        </body></html>
    "#;

    #[test]
    fn test_parse_empty_document() {
        assert!(AwardParser::new().parse("   ").is_none());
    }

    #[test]
    fn test_parse_basic_fields() {
        let award = AwardParser::new().parse(TABLE_PAGE).unwrap();
        assert_eq!(award.title, "关于2022年度省科学技术奖励的决定");
        assert_eq!(award.content, "经评审，授予下列项目科技进步奖一等奖。");
        assert_eq!(award.year, Some(2022));
        assert_eq!(award.award_level.as_deref(), Some("一等奖"));
        assert_eq!(award.award_type.as_deref(), Some("科技进步奖"));
    }

    #[test]
    fn test_parse_table_projects() {
        let award = AwardParser::new().parse(TABLE_PAGE).unwrap();
        assert_eq!(award.projects.len(), 2);

        let first = &award.projects[0];
        assert_eq!(first.name, "高性能储能材料关键技术");
        assert_eq!(first.organization.as_deref(), Some("清华大学"));
        assert_eq!(first.level.as_deref(), Some("一等奖"));
        assert_eq!(
            first.winners,
            vec![
                Winner::new("张三").with_organization("清华大学"),
                Winner::new("李四").with_organization("浙江大学"),
            ]
        );

        let second = &award.projects[1];
        assert_eq!(second.winners, vec![Winner::new("王五"), Winner::new("赵六")]);
    }

    #[test]
    fn test_parse_year_falls_back_to_content() {
        let html = r#"<h1>科技奖励公告</h1><div id="content">2019年度评审结果</div>"#;
        let award = AwardParser::new().parse(html).unwrap();
        assert_eq!(award.year, Some(2019));
        assert!(award.award_level.is_none());
    }

    #[test]
    fn test_parse_list_projects_when_no_table() {
        let html = r#"
            <html><body>
            <div class="title">2021年青年科技奖</div>
            <ul>
                <li>1、《深海探测装备研制》 完成人：陈一（中国科学院深海研究所）、周二 完成单位：中国科学院深海研究所</li>
                <li>“量子通信网络” 单位：合肥量子实验室</li>
                <li>首页</li>
            </ul>
            </body></html>
        "#;
        let award = AwardParser::new().parse(html).unwrap();
        assert_eq!(award.award_type.as_deref(), Some("青年科技奖"));
        assert_eq!(award.projects.len(), 2);

        let first = &award.projects[0];
        assert_eq!(first.name, "深海探测装备研制");
        assert_eq!(first.organization.as_deref(), Some("中国科学院深海研究所"));
        assert_eq!(first.winners.len(), 2);
        assert_eq!(first.winners[0].name, "陈一");
        assert_eq!(first.winners[0].organization.as_deref(), Some("中国科学院深海研究所"));
        assert_eq!(first.winners[1], Winner::new("周二"));

        let second = &award.projects[1];
        assert_eq!(second.name, "量子通信网络");
        assert_eq!(second.organization.as_deref(), Some("合肥量子实验室"));
        assert!(second.winners.is_empty());
    }

    #[test]
    fn test_parse_winners_drops_ascii_parentheses() {
        let winners = parse_winners("张三(教授)；李四 中南大学");
        assert_eq!(
            winners,
            vec![
                Winner::new("张三"),
                Winner::new("李四").with_organization("中南大学"),
            ]
        );
    }

    #[test]
    fn test_parse_winners_empty() {
        assert!(parse_winners(" ，、 ").is_empty());
    }

    #[test]
    fn test_extract_project_name_patterns() {
        assert_eq!(extract_project_name("《新材料》").as_deref(), Some("新材料"));
        assert_eq!(extract_project_name("项目名称：高铁减振 完成人").as_deref(), Some("高铁减振"));
        assert_eq!(extract_project_name("3. 桥梁健康监测 等").as_deref(), Some("3. 桥梁健康监测"));
        assert_eq!(extract_project_name("没有名称"), None);
    }

    #[test]
    fn test_extract_organization_patterns() {
        assert_eq!(extract_organization("单位：某某集团 其他").as_deref(), Some("某某集团"));
        assert_eq!(extract_organization("来自武汉大学的团队").as_deref(), Some("来自武汉大学"));
        assert_eq!(extract_organization("无机构"), None);
    }

    struct PageFetcherStub;

    #[async_trait]
    impl PageFetcher for PageFetcherStub {
        async fn fetch(&self, _url: &str) -> Result<String> {
            Ok(TABLE_PAGE.to_string())
        }
    }

    #[tokio::test]
    async fn test_fetch_and_parse() {
        let award = AwardParser::new()
            .fetch_and_parse(&PageFetcherStub, "https://kjt.example.gov.cn/1.html")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(award.projects.len(), 2);
    }
}
