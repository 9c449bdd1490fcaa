//! Flattening of award records into award, project and winner tables.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::record::AwardRecord;
use crate::Result;

pub const AWARDS_FILE: &str = "awards.csv";
pub const PROJECTS_FILE: &str = "projects.csv";
pub const WINNERS_FILE: &str = "winners.csv";

/// One row per award announcement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AwardRow {
    pub title: String,
    pub content: Option<String>,
    pub year: Option<i32>,
    pub award_level: Option<String>,
    pub award_type: Option<String>,
    pub source_url: Option<String>,
    pub source_title: Option<String>,
    pub source_engine: Option<String>,
    pub crawled_at: Option<String>,
}

/// One row per project, keyed to its award by title.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectRow {
    pub award_title: String,
    pub year: Option<i32>,
    pub name: String,
    pub organization: Option<String>,
    pub level: Option<String>,
}

/// One row per winner, keyed to its project by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WinnerRow {
    pub project_name: String,
    pub name: String,
    pub organization: Option<String>,
}

/// The three tables derived from a set of award records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AwardTables {
    pub awards: Vec<AwardRow>,
    pub projects: Vec<ProjectRow>,
    pub winners: Vec<WinnerRow>,
}

impl AwardTables {
    pub fn is_empty(&self) -> bool {
        self.awards.is_empty() && self.projects.is_empty() && self.winners.is_empty()
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Flattens records into tables.
pub fn to_tables(records: &[AwardRecord]) -> AwardTables {
    let mut tables = AwardTables::default();

    for record in records {
        tables.awards.push(AwardRow {
            title: record.title.clone(),
            content: non_empty(&record.content),
            year: record.year,
            award_level: record.award_level.clone(),
            award_type: record.award_type.clone(),
            source_url: non_empty(&record.source_url),
            source_title: non_empty(&record.source_title),
            source_engine: record.source_engine.clone(),
            crawled_at: record.crawled_at.clone(),
        });

        for project in &record.projects {
            tables.projects.push(ProjectRow {
                award_title: record.title.clone(),
                year: record.year,
                name: project.name.clone(),
                organization: project.organization.clone(),
                level: project.level.clone(),
            });

            tables.winners.extend(project.winners.iter().map(|winner| WinnerRow {
                project_name: project.name.clone(),
                name: winner.name.clone(),
                organization: winner.organization.clone(),
            }));
        }
    }

    debug!(
        "Built tables: {} awards, {} projects, {} winners",
        tables.awards.len(),
        tables.projects.len(),
        tables.winners.len()
    );
    tables
}

/// Concatenates several table sets in order.
pub fn merge(tables: impl IntoIterator<Item = AwardTables>) -> AwardTables {
    tables
        .into_iter()
        .fold(AwardTables::default(), |mut merged, next| {
            merged.awards.extend(next.awards);
            merged.projects.extend(next.projects);
            merged.winners.extend(next.winners);
            merged
        })
}

/// Writes `awards.csv`, `projects.csv` and `winners.csv` into `dir`.
pub fn write_csv(tables: &AwardTables, dir: impl AsRef<Path>) -> Result<()> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;
    write_rows(&tables.awards, &dir.join(AWARDS_FILE))?;
    write_rows(&tables.projects, &dir.join(PROJECTS_FILE))?;
    write_rows(&tables.winners, &dir.join(WINNERS_FILE))?;
    info!("Wrote tables to {}", dir.display());
    Ok(())
}

/// Reads tables written by [`write_csv`]. Missing files read as empty tables.
pub fn read_csv(dir: impl AsRef<Path>) -> Result<AwardTables> {
    let dir = dir.as_ref();
    Ok(AwardTables {
        awards: read_rows(&dir.join(AWARDS_FILE))?,
        projects: read_rows(&dir.join(PROJECTS_FILE))?,
        winners: read_rows(&dir.join(WINNERS_FILE))?,
    })
}

/// Writes the tables as one JSON object with `awards`, `projects` and
/// `winners` arrays.
pub fn write_json(tables: &AwardTables, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    serde_json::to_writer_pretty(BufWriter::new(File::create(path)?), tables)?;
    Ok(())
}

pub(crate) fn write_rows<T: Serialize>(rows: &[T], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    debug!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

pub(crate) fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        debug!("{} not found, using an empty table", path.display());
        return Ok(Vec::new());
    }
    let mut reader = csv::Reader::from_reader(BufReader::new(File::open(path)?));
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}
