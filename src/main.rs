//! # Shelf Scrape CLI
//!
//! Runs one scraping operation and prints the result as JSON.
//!
//! ## Usage
//!
//! ```sh
//! shelf_scrape search "golden penny rice"
//! RUST_LOG=debug shelf_scrape -o ./out detail samsung-galaxy-a15-12345
//! ```

use clap::Parser;
use shelf_scrape::outputs::json;
use shelf_scrape::{ScrapeConfig, ScrapingService};
use std::error::Error;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;

use cli::{Cli, Command};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let config = match ScrapeConfig::load(args.config.as_deref()) {
        Ok(config) => Arc::new(config),
        Err(e) => {
            error!(error = %e, "Could not load configuration");
            return Err(e.into());
        }
    };
    let service = ScrapingService::new(config);

    let output = match &args.command {
        Command::Search { query, page } => {
            json::to_pretty_json(&service.search_products(query, *page).await)?
        }
        Command::Category { category, query } => json::to_pretty_json(
            &service.search_by_category_and_query(category, query).await,
        )?,
        Command::Browse { category, page } => {
            json::to_pretty_json(&service.browse_category(category, *page).await)?
        }
        Command::Detail { slug } => json::to_pretty_json(&service.get_product_detail(slug).await)?,
    };

    println!("{output}");

    if let Some(dir) = &args.output_dir {
        if let Err(e) = json::write_results(&output, dir, args.command.name()).await {
            error!(error = %e, "Failed to write results file");
            return Err(e.into());
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        command = args.command.name(),
        ?elapsed,
        millis = elapsed.as_millis() as u64,
        "Execution complete"
    );
    Ok(())
}
