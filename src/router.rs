//! Source routing and primary → secondary fallback.
//!
//! [`ScrapingService`] exposes the four scraping operations. Each call
//! builds its own [`Fetcher`], runs at most two fetches strictly in
//! sequence, and always returns data (possibly empty) rather than an error.
//!
//! # Fallback
//!
//! ```text
//! TRY_PRIMARY ──found──────────────────────────────▶ DONE
//!      │ empty / 404 / transport error
//!      ▼
//! TRY_SECONDARY ──found / empty / 404 / error──────▶ DONE
//! ```
//!
//! Search, category browse and detail lookups follow that shape with the
//! general site as primary and the food site as secondary. Keyword-routed
//! search ([`ScrapingService::search_by_category_and_query`]) is a one-shot
//! dispatch with no fallback.

use crate::config::ScrapeConfig;
use crate::error::ScrapeError;
use crate::fetch::{FetchOutcome, Fetcher};
use crate::models::{CanonicalProduct, ProductDetail};
use crate::normalize::normalize_batch;
use crate::scrapers::{FoodSiteParser, GeneralSiteParser, SiteParser, Source};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Result of one fetch + parse + normalize pass against a single source.
#[derive(Debug)]
enum Attempt {
    Found(Vec<CanonicalProduct>),
    Empty,
    NotFound,
    Failed(ScrapeError),
}

#[derive(Debug, Clone)]
pub struct ScrapingService {
    config: Arc<ScrapeConfig>,
    general: GeneralSiteParser,
    food: FoodSiteParser,
}

impl ScrapingService {
    pub fn new(config: Arc<ScrapeConfig>) -> Self {
        Self {
            general: GeneralSiteParser::new(&config.general_base_url),
            food: FoodSiteParser::new(&config.food_base_url),
            config,
        }
    }

    /// Which source serves `category` under keyword routing.
    pub fn route(&self, category: &str) -> Source {
        if self.config.is_food_category(category) {
            Source::Food
        } else {
            Source::General
        }
    }

    fn parser(&self, source: Source) -> &dyn SiteParser {
        match source {
            Source::General => &self.general,
            Source::Food => &self.food,
        }
    }

    fn fetcher(&self) -> Option<Fetcher> {
        match Fetcher::new(&self.config) {
            Ok(fetcher) => Some(fetcher),
            Err(e) => {
                error!(error = %e, "Could not build HTTP client; returning no results");
                None
            }
        }
    }

    /// Search one source chosen by category keywords. No fallback.
    #[instrument(level = "info", skip(self))]
    pub async fn search_by_category_and_query(
        &self,
        category: &str,
        query: &str,
    ) -> Vec<CanonicalProduct> {
        if category.trim().is_empty() || query.trim().is_empty() {
            error!("Category and query cannot be empty");
            return Vec::new();
        }
        let Some(fetcher) = self.fetcher() else {
            return Vec::new();
        };

        let source = self.route(category);
        info!(%source, "Routing category");
        let parser = self.parser(source);
        let url = parser.search_url(query, 1);

        match self.attempt(&fetcher, parser, &url, query).await {
            Attempt::Found(products) => products,
            Attempt::Empty => {
                warn!(%source, %url, "No products found for query");
                Vec::new()
            }
            Attempt::NotFound | Attempt::Failed(_) => Vec::new(),
        }
    }

    /// Search the general site, falling back to the food site.
    ///
    /// # Arguments
    ///
    /// * `query` - Free-text search terms; blank input returns nothing
    /// * `page` - 1-based results page; `0` is treated as `1`
    ///
    /// # Returns
    ///
    /// The products from the first source that yields any valid record. The
    /// food site is tried once when the general site returns no products, a
    /// 404, or a failure. Both sources failing gives an empty list.
    #[instrument(level = "info", skip(self))]
    pub async fn search_products(&self, query: &str, page: u32) -> Vec<CanonicalProduct> {
        if query.trim().is_empty() {
            error!("Query cannot be empty");
            return Vec::new();
        }
        let page = page.max(1);
        let primary = self.general.search_url(query, page);
        let secondary = self.food.search_url(query, page);
        self.listing_with_fallback(&primary, &secondary, query).await
    }

    /// Browse a category on the general site, falling back to the food site.
    #[instrument(level = "info", skip(self))]
    pub async fn browse_category(&self, category: &str, page: u32) -> Vec<CanonicalProduct> {
        if category.trim().is_empty() {
            error!("Category cannot be empty");
            return Vec::new();
        }
        let page = page.max(1);
        let primary = self.general.category_url(category, page);
        let secondary = self.food.category_url(category, page);
        self.listing_with_fallback(&primary, &secondary, category).await
    }

    /// Fetch a product detail page from the general site, falling back to the food site.
    ///
    /// # Arguments
    ///
    /// * `slug` - Product slug as it appears in either site's detail URL
    ///
    /// # Returns
    ///
    /// The first detail page that yields a title. A 2xx general page with
    /// no title falls back like a 404 does. Returns
    /// [`ProductDetail::default`] when neither source has the product.
    #[instrument(level = "info", skip(self))]
    pub async fn get_product_detail(&self, slug: &str) -> ProductDetail {
        if slug.trim().is_empty() {
            error!("Slug cannot be empty");
            return ProductDetail::default();
        }
        let Some(fetcher) = self.fetcher() else {
            return ProductDetail::default();
        };

        let primary = self.general.detail_url(slug);
        match fetcher.fetch(&primary).await {
            FetchOutcome::Success(page) => {
                let detail = self.general.parse_detail(&page);
                if !detail.is_empty() {
                    return detail;
                }
                warn!(url = %primary, "Primary detail page had no product; trying secondary source");
            }
            FetchOutcome::NotFound => {
                warn!(url = %primary, "Primary detail page not found; trying secondary source");
            }
            FetchOutcome::TransportError(e) => {
                error!(url = %primary, error = %e, "Primary detail request failed; trying secondary source");
            }
        }

        let secondary = self.food.detail_url(slug);
        match fetcher.fetch(&secondary).await {
            FetchOutcome::Success(page) => {
                let detail = self.food.parse_detail(&page);
                if detail.is_empty() {
                    warn!(url = %secondary, "Secondary detail page had no product");
                    return ProductDetail::default();
                }
                detail
            }
            FetchOutcome::NotFound => {
                warn!(url = %secondary, "Product not found on either source");
                ProductDetail::default()
            }
            FetchOutcome::TransportError(e) => {
                error!(url = %secondary, error = %e, "Secondary detail request failed");
                ProductDetail::default()
            }
        }
    }

    async fn listing_with_fallback(
        &self,
        primary_url: &str,
        secondary_url: &str,
        context: &str,
    ) -> Vec<CanonicalProduct> {
        let Some(fetcher) = self.fetcher() else {
            return Vec::new();
        };

        match self.attempt(&fetcher, &self.general, primary_url, context).await {
            Attempt::Found(products) => {
                info!(%context, count = products.len(), source = %Source::General, "Listing served by primary source");
                return products;
            }
            Attempt::Empty => {
                warn!(%context, url = %primary_url, "No products on primary source; trying secondary source");
            }
            Attempt::NotFound => {
                warn!(%context, url = %primary_url, "Primary source returned 404; trying secondary source");
            }
            Attempt::Failed(e) => {
                error!(%context, url = %primary_url, error = %e, "Primary source request failed; trying secondary source");
            }
        }

        match self.attempt(&fetcher, &self.food, secondary_url, context).await {
            Attempt::Found(products) => {
                info!(%context, count = products.len(), source = %Source::Food, "Listing served by secondary source");
                products
            }
            Attempt::Empty => {
                warn!(%context, url = %secondary_url, "No products on secondary source either");
                Vec::new()
            }
            Attempt::NotFound => {
                warn!(%context, url = %secondary_url, "Secondary source returned 404; giving up");
                Vec::new()
            }
            Attempt::Failed(e) => {
                error!(%context, url = %secondary_url, error = %e, "Secondary source request failed; giving up");
                Vec::new()
            }
        }
    }

    async fn attempt(
        &self,
        fetcher: &Fetcher,
        parser: &dyn SiteParser,
        url: &str,
        context: &str,
    ) -> Attempt {
        match fetcher.fetch(url).await {
            FetchOutcome::Success(page) => {
                let products = normalize_batch(parser.parse_listing(&page, context), context);
                if products.is_empty() {
                    Attempt::Empty
                } else {
                    Attempt::Found(products)
                }
            }
            FetchOutcome::NotFound => Attempt::NotFound,
            FetchOutcome::TransportError(e) => Attempt::Failed(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> ScrapingService {
        ScrapingService::new(Arc::new(ScrapeConfig::default()))
    }

    #[test]
    fn routes_food_keywords_to_food_source() {
        let service = service();
        assert_eq!(service.route("Frozen Groceries"), Source::Food);
        assert_eq!(service.route("cooking oils"), Source::Food);
        assert_eq!(service.route("Electronics"), Source::General);
        assert_eq!(service.route("Phones & Tablets"), Source::General);
    }

    #[tokio::test]
    async fn blank_inputs_short_circuit_without_network() {
        let service = service();
        assert!(service.search_products("   ", 1).await.is_empty());
        assert!(service.browse_category("", 1).await.is_empty());
        assert!(service.search_by_category_and_query("food", " ").await.is_empty());
        assert!(service.search_by_category_and_query("", "rice").await.is_empty());
        assert!(service.get_product_detail("  ").await.is_empty());
    }
}
