//! Small text helpers shared across the pipeline.

use chrono::{Datelike, Local};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::ElementRef;

static FULL_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:19|20)\d{2}").unwrap());
static CN_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s*年").unwrap());

/// Text of an element with each text node trimmed and concatenated.
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().map(str::trim).collect()
}

/// Current calendar year in local time.
pub fn current_year() -> i32 {
    Local::now().year()
}

/// Local timestamp in the format used for crawl records.
pub fn timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// File name for a raw crawl dump, e.g. `search_results_20240102_030405.json`.
pub fn raw_results_filename() -> String {
    format!("search_results_{}.json", Local::now().format("%Y%m%d_%H%M%S"))
}

/// Best-effort year extraction from free text.
///
/// Tries a four-digit year, then a `N年` form where two-digit years below 31
/// map to 20xx and the rest to 19xx. Years outside `1990..=current_year` are
/// ignored; when nothing usable is found the current year is returned.
pub fn extract_year_from_text(text: &str, current_year: i32) -> i32 {
    let in_range = |year: i32| (1990..=current_year).contains(&year);

    if let Some(m) = FULL_YEAR.find(text) {
        if let Ok(year) = m.as_str().parse::<i32>() {
            if in_range(year) {
                return year;
            }
        }
    }

    if let Some(caps) = CN_YEAR.captures(text) {
        if let Ok(mut year) = caps[1].parse::<i32>() {
            if (0..=99).contains(&year) {
                year += if year <= 30 { 2000 } else { 1900 };
            }
            if in_range(year) {
                return year;
            }
        }
    }

    current_year
}

/// Truncates to at most `max` characters.
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
