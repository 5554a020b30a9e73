//! JSON output of scrape results.
//!
//! Results always go to stdout. When an output directory is configured they
//! are also written to a dated file:
//!
//! ```text
//! output_dir/
//! └── 2025-05-06/
//!     ├── search-081503.json
//!     └── detail-091244.json
//! ```

use crate::error::ScrapeError;
use chrono::Local;
use serde::Serialize;
use tokio::fs;
use tracing::{error, info, instrument};

/// Serialize `results` as pretty JSON.
pub fn to_pretty_json<T: Serialize>(results: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(results)
}

/// Write `json` to `{output_dir}/{date}/{command}-{HHMMSS}.json`.
///
/// # Arguments
///
/// * `json` - Serialized results
/// * `output_dir` - Root output directory; the dated subdirectory is created if needed
/// * `command` - Subcommand name used as the file prefix
///
/// # Returns
///
/// The path of the written file.
///
/// # Errors
///
/// Returns [`ScrapeError::Output`] if the directory cannot be created or
/// the file cannot be written.
#[instrument(level = "info", skip(json))]
pub async fn write_results(
    json: &str,
    output_dir: &str,
    command: &str,
) -> Result<String, ScrapeError> {
    let now = Local::now();
    let dated_dir = format!(
        "{}/{}",
        output_dir.trim_end_matches('/'),
        now.date_naive()
    );

    if let Err(e) = fs::create_dir_all(&dated_dir).await {
        error!(%dated_dir, error = %e, "Failed to create output dir");
        return Err(ScrapeError::Output {
            path: dated_dir,
            source: e,
        });
    }

    let path = format!("{}/{}-{}.json", dated_dir, command, now.format("%H%M%S"));
    fs::write(&path, json)
        .await
        .map_err(|source| ScrapeError::Output {
            path: path.clone(),
            source,
        })?;
    info!(%path, bytes = json.len(), "Wrote results");
    Ok(path)
}
