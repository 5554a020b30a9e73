//! Process-wide scraping configuration.
//!
//! The configuration is loaded exactly once at startup, either from a YAML
//! file or from built-in defaults, and is read-only afterwards. It holds the
//! two source base URLs, the browser identification header sent with every
//! request, the fetch timeout, and the keyword table used to route a
//! category to the food source.
//!
//! # Example
//!
//! ```yaml
//! general_base_url: https://www.jumia.com.ng
//! food_base_url: https://www.supermart.ng
//! timeout_secs: 10
//! food_keywords: [food, groceries, beverages, snacks, cooking, drinks]
//! ```

use crate::error::ScrapeError;
use serde::Deserialize;
use std::path::Path;
use tracing::{info, instrument};

pub const DEFAULT_GENERAL_BASE_URL: &str = "https://www.jumia.com.ng";
pub const DEFAULT_FOOD_BASE_URL: &str = "https://www.supermart.ng";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/89.0.4389.82 Safari/537.36";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_FOOD_KEYWORDS: [&str; 6] =
    ["food", "groceries", "beverages", "snacks", "cooking", "drinks"];

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScrapeConfig {
    /// Base URL of the general-merchandise site (site A, always tried first).
    pub general_base_url: String,
    /// Base URL of the grocery site (site B, the fallback).
    pub food_base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Lowercase substrings that mark a category as food/grocery.
    pub food_keywords: Vec<String>,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            general_base_url: DEFAULT_GENERAL_BASE_URL.to_string(),
            food_base_url: DEFAULT_FOOD_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            food_keywords: DEFAULT_FOOD_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl ScrapeConfig {
    /// Load the configuration from `path`, or use the defaults when no path is given.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Config`] if the file cannot be read, is not
    /// valid YAML, or fails [`ScrapeConfig::validate`].
    #[instrument(level = "info")]
    pub fn load(path: Option<&str>) -> Result<Self, ScrapeError> {
        let config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(Path::new(path)).map_err(|e| {
                    ScrapeError::Config {
                        path: path.to_string(),
                        reason: e.to_string(),
                    }
                })?;
                Self::from_yaml(&raw, path)?
            }
            None => Self::default(),
        };
        info!(
            general = %config.general_base_url,
            food = %config.food_base_url,
            timeout_secs = config.timeout_secs,
            keywords = config.food_keywords.len(),
            "Loaded scrape configuration"
        );
        Ok(config)
    }

    /// Parse a YAML document; `origin` is only used in error messages.
    pub fn from_yaml(raw: &str, origin: &str) -> Result<Self, ScrapeError> {
        let config: Self = serde_yaml::from_str(raw).map_err(|e| ScrapeError::Config {
            path: origin.to_string(),
            reason: e.to_string(),
        })?;
        config.normalized().validate(origin)
    }

    fn normalized(mut self) -> Self {
        self.general_base_url = self.general_base_url.trim_end_matches('/').to_string();
        self.food_base_url = self.food_base_url.trim_end_matches('/').to_string();
        self.food_keywords = self
            .food_keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        self
    }

    fn validate(self, origin: &str) -> Result<Self, ScrapeError> {
        let invalid = |reason: String| ScrapeError::Config {
            path: origin.to_string(),
            reason,
        };
        for base in [&self.general_base_url, &self.food_base_url] {
            url::Url::parse(base).map_err(|e| invalid(format!("bad base URL {base:?}: {e}")))?;
        }
        if self.timeout_secs == 0 {
            return Err(invalid("timeout_secs must be greater than zero".into()));
        }
        Ok(self)
    }

    /// True when `category` contains any food keyword, case-insensitively.
    pub fn is_food_category(&self, category: &str) -> bool {
        let category = category.to_lowercase();
        self.food_keywords.iter().any(|k| category.contains(k.as_str()))
    }
}
