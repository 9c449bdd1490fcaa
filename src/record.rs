//! Award, project and winner records produced by the parser and cleaner.

use serde::{Deserialize, Serialize};

use crate::text::timestamp;

/// A person credited on a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Winner {
    pub name: String,
    #[serde(default)]
    pub organization: Option<String>,
}

impl Winner {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            organization: None,
        }
    }

    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }
}

/// A scientific achievement listed under an award.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    #[serde(default)]
    pub winners: Vec<Winner>,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// One cleaned award announcement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AwardRecord {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub award_level: Option<String>,
    #[serde(default)]
    pub award_type: Option<String>,
    pub source_url: String,
    #[serde(default)]
    pub source_title: String,
    #[serde(default)]
    pub source_engine: Option<String>,
    #[serde(default)]
    pub crawled_at: Option<String>,
    #[serde(default)]
    pub projects: Vec<Project>,
}

/// Fields read from an award announcement page, before cleaning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedAward {
    pub title: String,
    pub content: String,
    pub year: Option<i32>,
    pub award_level: Option<String>,
    pub award_type: Option<String>,
    pub projects: Vec<Project>,
}

impl ParsedAward {
    /// Attaches the page URL, producing a record ready for cleaning.
    pub fn into_record(self, source_url: impl Into<String>) -> AwardRecord {
        AwardRecord {
            source_title: self.title.clone(),
            title: self.title,
            content: self.content,
            year: self.year,
            award_level: self.award_level,
            award_type: self.award_type,
            source_url: source_url.into(),
            source_engine: None,
            crawled_at: Some(timestamp()),
            projects: self.projects,
        }
    }
}
