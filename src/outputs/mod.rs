//! Output of scrape results.
//!
//! - [`json`]: pretty JSON for stdout and dated result files

pub mod json;
