//! Turns raw search hits into cleaned award records.

use std::path::Path;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

use crate::catalog;
use crate::crawler::load_results;
use crate::record::{AwardRecord, Project, Winner};
use crate::settings::TextSettings;
use crate::text::{timestamp, truncate_chars};
use crate::{Result, SearchResult};

/// Engine recorded for hits that carry no engine tag.
const FALLBACK_ENGINE: &str = "search";

static TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static TEXT_NOISE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[^\w\s\p{Han}，。：；！？、（）《》【】"'“”‘’]+"#).unwrap());
static NAME_NOISE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s\p{Han}]+").unwrap());
static URL_NOISE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"[<>"']+"#).unwrap());
static DATE_SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[年月日\s]+").unwrap());
static DASHES: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+").unwrap());
static AWARD_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(20\d{2})年").unwrap());
static BOOK_TITLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"《([^》]+)》").unwrap());
static QUOTED: Lazy<Regex> = Lazy::new(|| Regex::new(r#""([^"]+)""#).unwrap());

/// Cleans raw crawl output into [`AwardRecord`]s.
#[derive(Debug, Clone, Default)]
pub struct DataCleaner {
    settings: TextSettings,
}

impl DataCleaner {
    pub fn new(settings: TextSettings) -> Self {
        Self { settings }
    }

    /// Reads a raw crawl file and cleans every hit in it.
    pub fn clean_file(&self, path: impl AsRef<Path>) -> Result<Vec<AwardRecord>> {
        let path = path.as_ref();
        info!("Cleaning {}", path.display());
        let raw = load_results(path)?;
        Ok(self.clean_items(&raw))
    }

    /// Cleans a batch of hits, dropping the ones that do not yield a usable
    /// award.
    pub fn clean_items(&self, raw: &[SearchResult]) -> Vec<AwardRecord> {
        let cleaned: Vec<AwardRecord> = raw
            .iter()
            .map(|item| build_award(&fix_result_encoding(item)))
            .filter_map(|award| {
                let source = award.source_url.clone();
                let cleaned = self.clean_award(award);
                if cleaned.is_none() {
                    debug!("Dropped hit {}", source);
                }
                cleaned
            })
            .collect();
        info!(
            "Cleaned {} hits, {} usable awards",
            raw.len(),
            cleaned.len()
        );
        cleaned
    }

    /// Normalises an award and its projects. Returns `None` when the title is
    /// too short, the URL is unusable, or no project survives cleaning.
    pub fn clean_award(&self, award: AwardRecord) -> Option<AwardRecord> {
        let title = clean_text(&award.title);
        if title.chars().count() < self.settings.min_text_length.max(1) {
            return None;
        }

        let content = truncate_chars(&clean_text(&award.content), self.settings.max_text_length);
        let source_url = clean_url(&award.source_url)?;

        let projects: Vec<Project> = award
            .projects
            .into_iter()
            .filter_map(|project| self.clean_project(project))
            .collect();
        if projects.is_empty() {
            return None;
        }

        Some(AwardRecord {
            title,
            content,
            source_url,
            source_title: clean_text(&award.source_title),
            projects,
            ..award
        })
    }

    pub fn clean_project(&self, project: Project) -> Option<Project> {
        let name = clean_name(&project.name)?;
        let winners = project
            .winners
            .into_iter()
            .filter_map(|winner| self.clean_winner(winner))
            .collect();
        Some(Project {
            name,
            winners,
            organization: project.organization.as_deref().and_then(clean_organization),
            level: project.level,
        })
    }

    pub fn clean_winner(&self, winner: Winner) -> Option<Winner> {
        Some(Winner {
            name: clean_name(&winner.name)?,
            organization: winner.organization.as_deref().and_then(clean_organization),
        })
    }
}

/// Builds an uncleaned award from one hit.
fn build_award(item: &SearchResult) -> AwardRecord {
    AwardRecord {
        title: item.title.clone(),
        content: item.description.clone(),
        year: extract_year(item),
        award_level: extract_award_level(&item.description).map(str::to_string),
        award_type: Some(extract_award_type(item).to_string()),
        source_url: item.url.clone(),
        source_title: item.title.clone(),
        source_engine: Some(item.source_engine().unwrap_or(FALLBACK_ENGINE).to_string()),
        crawled_at: Some(timestamp()),
        projects: extract_projects(item),
    }
}

fn fix_result_encoding(item: &SearchResult) -> SearchResult {
    SearchResult {
        title: fix_encoding(&item.title),
        url: fix_encoding(&item.url),
        description: fix_encoding(&item.description),
        date: item.date.as_deref().map(fix_encoding),
        ..item.clone()
    }
}

/// Repairs UTF-8 text that was decoded as Latin-1.
///
/// Only strings made entirely of code points up to U+00FF whose bytes form
/// valid UTF-8 are rewritten; anything else is returned unchanged.
pub fn fix_encoding(value: &str) -> String {
    let bytes: Option<Vec<u8>> = value
        .chars()
        .map(|c| u8::try_from(u32::from(c)).ok())
        .collect();
    bytes
        .and_then(|b| String::from_utf8(b).ok())
        .unwrap_or_else(|| value.to_string())
}

fn extract_year(item: &SearchResult) -> Option<i32> {
    let text = format!("{} {}", item.title, item.description);
    AWARD_YEAR
        .captures(&text)
        .and_then(|caps| caps[1].parse().ok())
}

/// Award level named in a snippet. Abbreviated forms such as `一等` count.
pub fn extract_award_level(text: &str) -> Option<&'static str> {
    [("一等", "一等奖"), ("二等", "二等奖"), ("特等", "特等奖")]
        .into_iter()
        .find(|(marker, _)| text.contains(marker))
        .map(|(_, level)| level)
}

fn extract_award_type(item: &SearchResult) -> &'static str {
    let text = format!("{} {}", item.title, item.description);
    catalog::find_type(&text).unwrap_or(catalog::GENERIC_AWARD_TYPE)
}

/// Project names quoted in the snippet, falling back to the title.
fn extract_projects(item: &SearchResult) -> Vec<Project> {
    let mut names: Vec<&str> = BOOK_TITLE
        .captures_iter(&item.description)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect();
    if names.is_empty() {
        names = QUOTED
            .captures_iter(&item.description)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
            .collect();
    }
    if names.is_empty() && !item.title.is_empty() {
        names.push(&item.title);
    }
    names.into_iter().map(Project::new).collect()
}

/// Strips markup, collapses whitespace and drops symbols outside words and
/// CJK punctuation.
pub fn clean_text(text: &str) -> String {
    let text = TAGS.replace_all(text, "");
    let text = WHITESPACE.replace_all(&text, " ");
    TEXT_NOISE.replace_all(&text, "").trim().to_string()
}

/// Strips quoting characters; only `http` and `https` URLs are kept.
pub fn clean_url(url: &str) -> Option<String> {
    let url = URL_NOISE.replace_all(url, "");
    let url = url.trim();
    (url.starts_with("http://") || url.starts_with("https://")).then(|| url.to_string())
}

/// Normalises `2023年5月1日`, `2023-05`, `2023` and similar to `YYYY-MM-DD`.
pub fn clean_date(date: &str) -> Option<String> {
    let date = DATE_SEPARATORS.replace_all(date, "-");
    let date = DASHES.replace_all(&date, "-");
    let date = date.trim_matches('-');
    if date.is_empty() {
        return None;
    }

    let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{}-01", date), "%Y-%m-%d"))
        .ok()
        .or_else(|| {
            if date.len() == 4 && date.chars().all(|c| c.is_ascii_digit()) {
                date.parse().ok().and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1))
            } else {
                None
            }
        })?;
    Some(parsed.format("%Y-%m-%d").to_string())
}

/// Person or project name with symbols removed; at least two characters.
pub fn clean_name(name: &str) -> Option<String> {
    clean_with_min_len(name, 2)
}

/// Organization name with symbols removed; at least four characters.
pub fn clean_organization(organization: &str) -> Option<String> {
    clean_with_min_len(organization, 4)
}

fn clean_with_min_len(value: &str, min: usize) -> Option<String> {
    let value = NAME_NOISE.replace_all(value, "");
    let value = value.trim();
    (value.chars().count() >= min).then(|| value.to_string())
}
