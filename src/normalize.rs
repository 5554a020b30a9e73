//! Turns extracted fragments into validated [`CanonicalProduct`] records.
//!
//! A fragment that violates the canonical invariants is dropped with an
//! error log; the remaining fragments in the batch are still processed.

use crate::error::ScrapeError;
use crate::models::{CanonicalProduct, Category, ExtractedFragment};
use crate::price::discount_percentage;
use itertools::Itertools;
use tracing::{debug, error, warn};

/// Hyphen-joined lowercase title with punctuation removed.
///
/// ```ignore
/// assert_eq!(slug_from_title("Fresh Bread Loaf"), "fresh-bread-loaf");
/// ```
pub fn slug_from_title(title: &str) -> String {
    title
        .to_lowercase()
        .replace(|c: char| !c.is_alphanumeric() && !c.is_whitespace() && c != '-', "")
        .split_whitespace()
        .join("-")
}

/// Last path segment of `url` without its file extension, or `prod-{id}`.
///
/// ```ignore
/// assert_eq!(slug_from_url("https://shop.ng/golden-penny-rice-12345.html", 1), "golden-penny-rice-12345");
/// assert_eq!(slug_from_url("https://shop.ng/", 7), "prod-7");
/// ```
pub fn slug_from_url(url: &str, id: u64) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .path_segments()
                .and_then(|mut segments| segments.rfind(|s| !s.is_empty()).map(str::to_string))
        })
        .map(|segment| match segment.rsplit_once('.') {
            Some((stem, _ext)) => stem.to_string(),
            None => segment,
        })
        .filter(|slug| !slug.is_empty())
        .unwrap_or_else(|| format!("prod-{id}"))
}

/// Build and validate one canonical record.
///
/// # Errors
///
/// Returns [`ScrapeError::Validation`] when the record breaks an invariant:
/// blank title, negative price, discount outside `0..=100`, or a negative
/// or non-finite rating.
pub fn normalize(fragment: ExtractedFragment) -> Result<CanonicalProduct, ScrapeError> {
    let title = fragment.title.trim().to_string();
    let discount = discount_percentage(fragment.price, fragment.old_price);
    let product = CanonicalProduct {
        id: fragment.site_id.unwrap_or(fragment.position),
        slug: slug_from_title(&title),
        description: None,
        price: fragment.price,
        discount_percentage: discount,
        rating: fragment.rating,
        stock: 0,
        brand: fragment.brand,
        images: if fragment.image.is_empty() {
            Vec::new()
        } else {
            vec![fragment.image.clone()]
        },
        thumbnail: fragment.image,
        is_published: true,
        product_type: fragment.type_label,
        category_id: fragment.position,
        category: Category {
            id: fragment.position,
            name: fragment
                .category_path
                .iter()
                .map(|p| p.trim())
                .filter(|p| !p.is_empty())
                .join("/"),
        },
        title,
    };
    validate(product)
}

fn validate(product: CanonicalProduct) -> Result<CanonicalProduct, ScrapeError> {
    let reject = |reason: String| ScrapeError::Validation {
        title: product.title.clone(),
        reason,
    };
    if product.title.is_empty() {
        return Err(reject("title is empty".into()));
    }
    if product.price < 0 {
        return Err(reject(format!("price {} is negative", product.price)));
    }
    if !(0.0..=100.0).contains(&product.discount_percentage) {
        return Err(reject(format!(
            "discount_percentage {} outside 0..=100",
            product.discount_percentage
        )));
    }
    if !product.rating.is_finite() || product.rating < 0.0 {
        return Err(reject(format!("rating {} is invalid", product.rating)));
    }
    Ok(product)
}

/// Normalize a listing, logging degraded fields and dropping invalid records.
///
/// # Arguments
///
/// * `fragments` - Cards from one listing page, in page order
/// * `context` - The query or category being served, attached to every log line
///
/// # Returns
///
/// The records that passed validation, in their original order. Each
/// fragment with degraded fields produces one `warn` line; each rejected
/// record produces one `error` line naming its title.
pub fn normalize_batch(fragments: Vec<ExtractedFragment>, context: &str) -> Vec<CanonicalProduct> {
    let total = fragments.len();
    let products: Vec<CanonicalProduct> = fragments
        .into_iter()
        .filter_map(|fragment| {
            if !fragment.warnings.is_empty() {
                warn!(
                    %context,
                    title = %fragment.title,
                    position = fragment.position,
                    fields = ?fragment.warnings.fields(),
                    details = %fragment.warnings.summary(),
                    "Degraded fields replaced with defaults"
                );
            }
            match normalize(fragment) {
                Ok(product) => Some(product),
                Err(e) => {
                    error!(%context, error = %e, "Dropping product that failed validation");
                    None
                }
            }
        })
        .collect();
    debug!(%context, total, kept = products.len(), "Normalized listing");
    products
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ExtractionWarning, WarningLog};

    fn fragment(position: u64, title: &str, price: i64, old_price: i64) -> ExtractedFragment {
        ExtractedFragment {
            position,
            site_id: None,
            title: title.to_string(),
            brand: "Unknown".to_string(),
            price,
            old_price,
            image: "https://cdn.example.com/bread.jpg".to_string(),
            rating: 0.0,
            category_path: vec!["Food & Beverages".into(), "Bread".into()],
            type_label: "Food Products".to_string(),
            warnings: WarningLog::default(),
        }
    }

    #[test]
    fn slug_from_title_examples() {
        assert_eq!(slug_from_title("Fresh Bread Loaf"), "fresh-bread-loaf");
        assert_eq!(slug_from_title("  M'Aku  Palm Oil 1L "), "maku-palm-oil-1l");
        assert_eq!(slug_from_title("Coca-Cola (50cl)"), "coca-cola-50cl");
    }

    #[test]
    fn slug_from_url_examples() {
        assert_eq!(
            slug_from_url("https://www.jumia.com.ng/golden-penny-rice-12345.html", 1),
            "golden-penny-rice-12345"
        );
        assert_eq!(
            slug_from_url("https://www.supermart.ng/products/nini-fresh-milk/", 2),
            "nini-fresh-milk"
        );
        assert_eq!(slug_from_url("https://www.supermart.ng/", 7), "prod-7");
        assert_eq!(slug_from_url("not a url", 3), "prod-3");
    }

    #[test]
    fn builds_canonical_record() {
        let product = normalize(fragment(2, "Fresh Bread Loaf", 750, 1000)).unwrap();
        assert_eq!(product.id, 2);
        assert_eq!(product.slug, "fresh-bread-loaf");
        assert_eq!(product.discount_percentage, 25.0);
        assert_eq!(product.images, vec!["https://cdn.example.com/bread.jpg".to_string()]);
        assert_eq!(product.category.name, "Food & Beverages/Bread");
        assert_eq!(product.category.id, 2);
        assert_eq!(product.category_id, 2);
        assert!(product.is_published);
    }

    #[test]
    fn site_id_wins_over_position() {
        let mut f = fragment(3, "Phone", 50000, 0);
        f.site_id = Some(987654);
        let product = normalize(f).unwrap();
        assert_eq!(product.id, 987654);
        assert_eq!(product.category_id, 3);
    }

    #[test]
    fn missing_image_gives_empty_list() {
        let mut f = fragment(1, "Rice", 100, 0);
        f.image.clear();
        let product = normalize(f).unwrap();
        assert!(product.images.is_empty());
        assert_eq!(product.thumbnail, "");
    }

    #[test]
    fn rejects_invariant_violations() {
        assert!(matches!(
            normalize(fragment(1, "   ", 100, 0)),
            Err(ScrapeError::Validation { .. })
        ));
        assert!(normalize(fragment(1, "Refund", -5, 0)).is_err());
        // Old price below current price gives a negative discount.
        assert!(normalize(fragment(1, "Markup", 1500, 1000)).is_err());
    }

    #[test]
    fn batch_drops_invalid_and_keeps_the_rest() {
        let mut degraded = fragment(3, "Unknown Title", 0, 0);
        degraded
            .warnings
            .push(ExtractionWarning::missing("title"));
        let batch = vec![
            fragment(1, "Good Bread", 500, 0),
            fragment(2, "Bad Bread", 1500, 1000),
            degraded,
        ];
        let products = normalize_batch(batch, "bread");
        let titles: Vec<_> = products.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Good Bread", "Unknown Title"]);
    }

    #[test]
    fn extreme_prices_are_rejected_without_losing_the_batch() {
        let batch = vec![
            fragment(1, "Glitch", -1, i64::MAX),
            fragment(2, "Huge Markup", i64::MAX, 1),
            fragment(3, "Fine", 100, 0),
        ];
        let products = normalize_batch(batch, "glitch");
        let titles: Vec<_> = products.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Fine"]);
    }

    #[test]
    fn normalization_is_deterministic() {
        let a = normalize_batch(vec![fragment(1, "Rice", 100, 200)], "rice");
        let b = normalize_batch(vec![fragment(1, "Rice", 100, 200)], "rice");
        assert_eq!(a, b);
    }
}
