//! Error and warning types for the scraping core.
//!
//! Nothing in here escapes the public scraping operations: the fetcher
//! folds [`ScrapeError`] into a [`crate::fetch::FetchOutcome`], parsers
//! collect [`ExtractionWarning`]s per record, and the normalizer's
//! validation errors are logged and the record dropped.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("page not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("product \"{title}\" failed validation: {reason}")]
    Validation { title: String, reason: String },

    #[error("invalid config at {path}: {reason}")]
    Config { path: String, reason: String },

    #[error("failed writing output to {path}: {source}")]
    Output {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// A single field that could not be extracted and was replaced by its sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionWarning {
    pub field: &'static str,
    pub reason: String,
}

impl ExtractionWarning {
    pub fn missing(field: &'static str) -> Self {
        Self {
            field,
            reason: "node not found".to_string(),
        }
    }

    pub fn invalid(field: &'static str, raw: &str) -> Self {
        Self {
            field,
            reason: format!("unparseable value {raw:?}"),
        }
    }
}

impl fmt::Display for ExtractionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Collects per-field outcomes for one record so they can be logged as a batch.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct WarningLog {
    warnings: Vec<ExtractionWarning>,
}

impl WarningLog {
    /// Unwrap a field result, recording the warning and substituting `sentinel` on failure.
    pub fn take<T>(&mut self, result: Result<T, ExtractionWarning>, sentinel: T) -> T {
        match result {
            Ok(value) => value,
            Err(warning) => {
                self.warnings.push(warning);
                sentinel
            }
        }
    }

    /// Pass through a lookup that should have found something, recording `field` as missing otherwise.
    pub fn require<T>(&mut self, value: Option<T>, field: &'static str) -> Option<T> {
        if value.is_none() {
            self.warnings.push(ExtractionWarning::missing(field));
        }
        value
    }

    pub fn push(&mut self, warning: ExtractionWarning) {
        self.warnings.push(warning);
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn fields(&self) -> Vec<&'static str> {
        self.warnings.iter().map(|w| w.field).collect()
    }

    /// Render all warnings as `field: reason; field: reason`.
    pub fn summary(&self) -> String {
        self.warnings
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}
