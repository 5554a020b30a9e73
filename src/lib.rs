//! # Shelf Scrape
//!
//! Scrapes product listings and product detail pages from two retail sites
//! and normalizes them into one canonical product schema.
//!
//! ## Architecture
//!
//! 1. **Routing**: [`router::ScrapingService`] picks the source to try first
//! 2. **Fetching**: [`fetch::Fetcher`] downloads a page and classifies the outcome
//! 3. **Parsing**: a [`scrapers::SiteParser`] extracts fragments using site-specific selectors
//! 4. **Normalizing**: [`normalize`] validates fragments into [`models::CanonicalProduct`]s
//! 5. **Fallback**: an empty, missing, or failed primary source hands over to the secondary
//!
//! Every scraping operation returns data, never an error: failures are
//! logged through `tracing` and surface as empty results.

pub mod config;
pub mod error;
pub mod fetch;
pub mod models;
pub mod normalize;
pub mod outputs;
pub mod price;
pub mod router;
pub mod scrapers;
pub mod utils;

pub use config::ScrapeConfig;
pub use error::{ExtractionWarning, ScrapeError};
pub use models::{CanonicalProduct, Category, ProductDetail};
pub use router::ScrapingService;
