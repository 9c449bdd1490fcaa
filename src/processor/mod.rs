//! Cleaning of raw crawl output and conversion into tables.

pub mod cleaner;
pub mod transformer;

pub use cleaner::DataCleaner;
pub use transformer::{AwardRow, AwardTables, ProjectRow, WinnerRow};
