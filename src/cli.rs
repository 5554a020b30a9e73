//! Command-line interface definitions.
//!
//! One subcommand per scraping operation. Results are printed to stdout as
//! JSON; logs go to stderr.

use clap::{Parser, Subcommand};

/// Command-line arguments for the product scraper.
///
/// # Examples
///
/// ```sh
/// shelf_scrape search "golden penny rice" --page 2
/// shelf_scrape category "Frozen Groceries" chicken
/// shelf_scrape --output-dir ./out browse "phones tablets"
/// shelf_scrape detail samsung-galaxy-a15-12345
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML config file
    #[arg(short, long, env = "SHELF_SCRAPE_CONFIG")]
    pub config: Option<String>,

    /// Also write results under this directory, grouped by date
    #[arg(short, long)]
    pub output_dir: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Search the general site, falling back to the grocery site
    Search {
        query: String,
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
    /// Search one site picked by category keywords
    Category { category: String, query: String },
    /// Browse a category, falling back to the grocery site
    Browse {
        category: String,
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
    /// Fetch a single product detail page by slug
    Detail { slug: String },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Search { .. } => "search",
            Command::Category { .. } => "category",
            Command::Browse { .. } => "browse",
            Command::Detail { .. } => "detail",
        }
    }
}
