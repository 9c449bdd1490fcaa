//! Search engine adapters and the name-based registry.

mod baidu;
mod bing;

pub use baidu::Baidu;
pub use bing::Bing;

use crate::{CrawlError, Engine, Result};

/// Shortcuts accepted by [`create_engine`].
pub fn supported_engines() -> Vec<&'static str> {
    vec!["baidu", "bing"]
}

/// Creates an adapter by name (case-insensitive).
pub fn create_engine(name: &str) -> Result<Box<dyn Engine>> {
    match name.trim().to_lowercase().as_str() {
        "baidu" => Ok(Box::new(Baidu::new())),
        "bing" | "bing_cn" => Ok(Box::new(Bing::new())),
        other => Err(CrawlError::UnknownEngine(other.to_string())),
    }
}
