//! Field validators and the data-quality report over award tables.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::catalog::{self, AWARD_LEVELS, AWARD_TYPES};
use crate::processor::AwardTables;
use crate::text::current_year;
use crate::Result;

/// Earliest year accepted by [`DataValidator::validate_year`].
pub const MIN_AWARD_YEAR: i32 = 2010;
/// Earliest year counted as accurate by the quality report.
pub const MIN_PLAUSIBLE_YEAR: i32 = 1990;

const COMPLETENESS_THRESHOLD: f64 = 0.9;

/// Outcome of a field check: `Err` carries every problem found.
pub type Validation = std::result::Result<(), Vec<String>>;

fn finish(errors: Vec<String>) -> Validation {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Checks that a text field is present and within `min..=max` characters.
pub fn validate_text(text: &str, field: &str, min: usize, max: usize) -> Validation {
    if text.is_empty() {
        return Err(vec![format!("{} must not be empty", field)]);
    }
    let len = text.chars().count();
    let mut errors = Vec::new();
    if len < min {
        errors.push(format!("{} must be at least {} characters", field, min));
    }
    if len > max {
        errors.push(format!("{} must be at most {} characters", field, max));
    }
    finish(errors)
}

pub fn validate_url(url: &str) -> Validation {
    if url.is_empty() {
        return Err(vec!["URL must not be empty".to_string()]);
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(vec![format!("URL is not http(s): {}", url)]);
    }
    Ok(())
}

pub fn validate_award_level(level: &str) -> Validation {
    if level.is_empty() {
        return Err(vec!["Award level must not be empty".to_string()]);
    }
    if !catalog::is_known_level(level) {
        return Err(vec![format!(
            "Award level must be one of: {}",
            AWARD_LEVELS.join(", ")
        )]);
    }
    Ok(())
}

pub fn validate_award_type(award_type: &str) -> Validation {
    if award_type.is_empty() {
        return Err(vec!["Award type must not be empty".to_string()]);
    }
    if !catalog::is_known_type(award_type) {
        return Err(vec![format!(
            "Award type must be one of: {}",
            AWARD_TYPES.join(", ")
        )]);
    }
    Ok(())
}

/// Per-table (or per-relation) entry of a quality dimension.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Detail {
    pub score: f64,
    pub rows: usize,
    pub metrics: BTreeMap<String, f64>,
}

/// One scored dimension of the quality report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    pub score: f64,
    pub details: BTreeMap<String, Detail>,
    pub issues: Vec<String>,
}

impl Dimension {
    /// Sets `score` to the mean of the detail scores, or 0 with no details.
    fn finish(mut self) -> Self {
        self.score = mean(self.details.values().map(|d| d.score)).unwrap_or(0.0);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub completeness: Dimension,
    pub accuracy: Dimension,
    pub consistency: Dimension,
    pub timeliness: Dimension,
    pub overall_score: f64,
}

impl QualityReport {
    pub fn issues(&self) -> impl Iterator<Item = &String> {
        self.completeness
            .issues
            .iter()
            .chain(&self.accuracy.issues)
            .chain(&self.consistency.issues)
            .chain(&self.timeliness.issues)
    }
}

/// Rows of one table viewed as JSON objects.
struct TableView {
    name: &'static str,
    rows: Vec<Map<String, Value>>,
}

impl TableView {
    fn new<T: Serialize>(name: &'static str, rows: &[T]) -> Result<Self> {
        let rows = rows
            .iter()
            .map(|row| -> Result<Map<String, Value>> {
                match serde_json::to_value(row)? {
                    Value::Object(map) => Ok(map),
                    _ => Ok(Map::new()),
                }
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { name, rows })
    }

    fn columns(&self) -> Vec<&str> {
        self.rows
            .first()
            .map(|row| row.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    fn has_column(&self, column: &str) -> bool {
        self.rows.first().is_some_and(|row| row.contains_key(column))
    }

    fn years(&self) -> Vec<Option<i64>> {
        self.rows
            .iter()
            .map(|row| row.get("year").and_then(Value::as_i64))
            .collect()
    }

    fn strings(&self, column: &str) -> Vec<Option<&str>> {
        self.rows
            .iter()
            .map(|row| row.get(column).and_then(Value::as_str).filter(|s| !s.is_empty()))
            .collect()
    }
}

fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

fn ratio(hits: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        hits as f64 / total as f64
    }
}

/// Scores award tables on completeness, accuracy, consistency and
/// timeliness.
#[derive(Debug, Clone)]
pub struct DataValidator {
    current_year: i32,
}

impl Default for DataValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl DataValidator {
    pub fn new() -> Self {
        Self::with_current_year(current_year())
    }

    /// Pins the reference year used for year ranges and timeliness.
    pub fn with_current_year(current_year: i32) -> Self {
        Self { current_year }
    }

    /// Checks that a year is present and within `2010..=current year`.
    pub fn validate_year(&self, year: Option<i32>) -> Validation {
        let Some(year) = year else {
            return Err(vec!["Year must not be empty".to_string()]);
        };
        if !(MIN_AWARD_YEAR..=self.current_year).contains(&year) {
            return Err(vec![format!(
                "Year must be between {} and {}",
                MIN_AWARD_YEAR, self.current_year
            )]);
        }
        Ok(())
    }

    /// Builds the four-dimension quality report.
    pub fn evaluate_quality(&self, tables: &AwardTables) -> Result<QualityReport> {
        let views = [
            TableView::new("awards", &tables.awards)?,
            TableView::new("projects", &tables.projects)?,
            TableView::new("winners", &tables.winners)?,
        ];

        let completeness = self.completeness(&views);
        let accuracy = self.accuracy(&views);
        let consistency = self.consistency(tables);
        let timeliness = self.timeliness(&views);

        let overall_score = 0.3 * completeness.score
            + 0.3 * accuracy.score
            + 0.2 * consistency.score
            + 0.2 * timeliness.score;
        debug!("Quality score {:.3}", overall_score);

        Ok(QualityReport {
            completeness,
            accuracy,
            consistency,
            timeliness,
            overall_score,
        })
    }

    fn completeness(&self, views: &[TableView]) -> Dimension {
        let mut dimension = Dimension::default();

        for view in views.iter().filter(|v| !v.rows.is_empty()) {
            let mut metrics = BTreeMap::new();
            for column in view.columns() {
                let present = view
                    .rows
                    .iter()
                    .filter(|row| is_present(row.get(column)))
                    .count();
                let column_ratio = ratio(present, view.rows.len());
                if column_ratio < COMPLETENESS_THRESHOLD {
                    dimension.issues.push(format!(
                        "{}.{} is {:.1}% complete",
                        view.name,
                        column,
                        column_ratio * 100.0
                    ));
                }
                metrics.insert(column.to_string(), column_ratio);
            }

            dimension.details.insert(
                view.name.to_string(),
                Detail {
                    score: mean(metrics.values().copied()).unwrap_or(0.0),
                    rows: view.rows.len(),
                    metrics,
                },
            );
        }

        dimension.finish()
    }

    fn accuracy(&self, views: &[TableView]) -> Dimension {
        let mut dimension = Dimension::default();
        let year_range = MIN_PLAUSIBLE_YEAR as i64..=self.current_year as i64;

        for view in views.iter().filter(|v| !v.rows.is_empty()) {
            let mut metrics = BTreeMap::new();
            let total = view.rows.len();

            let mut check = |column: &str, valid: usize, what: &str, issues: &mut Vec<String>| {
                if valid < total {
                    issues.push(format!("{} has {} invalid {}", view.name, total - valid, what));
                }
                metrics.insert(column.to_string(), ratio(valid, total));
            };

            if view.has_column("year") {
                let valid = view
                    .years()
                    .into_iter()
                    .filter(|y| y.is_some_and(|y| year_range.contains(&y)))
                    .count();
                check("year", valid, "years", &mut dimension.issues);
            }
            if view.has_column("award_level") {
                let valid = view
                    .strings("award_level")
                    .into_iter()
                    .filter(|l| l.is_some_and(catalog::is_known_level))
                    .count();
                check("award_level", valid, "award levels", &mut dimension.issues);
            }
            if view.has_column("award_type") {
                let valid = view
                    .strings("award_type")
                    .into_iter()
                    .filter(|t| t.is_some_and(catalog::is_known_type))
                    .count();
                check("award_type", valid, "award types", &mut dimension.issues);
            }

            dimension.details.insert(
                view.name.to_string(),
                Detail {
                    score: mean(metrics.values().copied()).unwrap_or(1.0),
                    rows: total,
                    metrics,
                },
            );
        }

        dimension.finish()
    }

    fn consistency(&self, tables: &AwardTables) -> Dimension {
        let mut dimension = Dimension::default();

        let project_names: HashSet<&str> = tables.projects.iter().map(|p| p.name.as_str()).collect();
        let award_titles: HashSet<&str> = tables.awards.iter().map(|a| a.title.as_str()).collect();

        let relations = [
            (
                "project_winner_relation",
                tables
                    .winners
                    .iter()
                    .map(|w| project_names.contains(w.project_name.as_str()))
                    .collect::<Vec<_>>(),
                "winners reference a missing project",
            ),
            (
                "award_project_relation",
                tables
                    .projects
                    .iter()
                    .map(|p| award_titles.contains(p.award_title.as_str()))
                    .collect::<Vec<_>>(),
                "projects reference a missing award",
            ),
        ];

        for (relation, checks, message) in relations {
            if checks.is_empty() {
                continue;
            }
            let valid = checks.iter().filter(|ok| **ok).count();
            let invalid = checks.len() - valid;
            if invalid > 0 {
                dimension.issues.push(format!("{} {}", invalid, message));
            }
            dimension.details.insert(
                relation.to_string(),
                Detail {
                    score: ratio(valid, checks.len()),
                    rows: checks.len(),
                    metrics: BTreeMap::from([("invalid_count".to_string(), invalid as f64)]),
                },
            );
        }

        dimension.finish()
    }

    fn timeliness(&self, views: &[TableView]) -> Dimension {
        let mut dimension = Dimension::default();
        let current = self.current_year as i64;

        for view in views.iter().filter(|v| v.has_column("year")) {
            let all = view.years();
            let years: Vec<i64> = all.iter().flatten().copied().collect();
            let (Some(&min_year), Some(&max_year)) = (years.iter().min(), years.iter().max()) else {
                continue;
            };

            let mean_year = mean(years.iter().map(|&y| y as f64)).unwrap_or(0.0);
            let recent = years.iter().filter(|&&y| y >= current - 5).count();
            let recent_ratio = ratio(recent, all.len());

            let latest_score = 1.0 - (current - max_year) as f64 / 10.0;
            let span_score = (max_year - min_year) as f64 / 30.0;
            let score = 0.4 * latest_score + 0.3 * span_score + 0.3 * recent_ratio;

            if max_year < current - 2 {
                dimension.issues.push(format!(
                    "{} newest data is from {}, consider refreshing",
                    view.name, max_year
                ));
            }

            dimension.details.insert(
                view.name.to_string(),
                Detail {
                    score,
                    rows: all.len(),
                    metrics: BTreeMap::from([
                        ("min_year".to_string(), min_year as f64),
                        ("max_year".to_string(), max_year as f64),
                        ("mean_year".to_string(), mean_year),
                        ("recent_years_ratio".to_string(), recent_ratio),
                    ]),
                },
            );
        }

        dimension.finish()
    }
}
