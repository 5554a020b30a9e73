//! Data models for scraped product data.
//!
//! - [`RawPage`]: markup fetched from a source, discarded after parsing
//! - [`ExtractedFragment`]: unvalidated per-card extraction from a listing
//! - [`CanonicalProduct`]: the validated record returned to callers
//! - [`ProductDetail`]: the richer single-product shape from a detail page
//!
//! All of these are request-scoped and never mutated once built.

use crate::error::WarningLog;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// Markup text plus the URL it was fetched from.
#[derive(Debug, Clone)]
pub struct RawPage {
    pub url: String,
    pub body: String,
}

/// One listing card as read from markup, before validation.
///
/// Fields that could not be read already hold their sentinel value;
/// `warnings` records which ones.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedFragment {
    /// 1-based position of the card in the listing.
    pub position: u64,
    /// Numeric identifier published by the site, if any.
    pub site_id: Option<u64>,
    pub title: String,
    pub brand: String,
    pub price: i64,
    pub old_price: i64,
    /// Image URL, empty when absent.
    pub image: String,
    pub rating: f64,
    /// Category breadcrumb, outermost first.
    pub category_path: Vec<String>,
    pub type_label: String,
    pub warnings: WarningLog,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    pub name: String,
}

/// A validated product record.
///
/// Every instance satisfies: non-empty `title`, `price >= 0`,
/// `discount_percentage` within `0..=100`, `rating >= 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalProduct {
    pub id: u64,
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub price: i64,
    pub discount_percentage: f64,
    pub rating: f64,
    pub stock: u32,
    pub brand: String,
    pub thumbnail: String,
    pub images: Vec<String>,
    pub is_published: bool,
    #[serde(rename = "type")]
    pub product_type: String,
    pub category_id: u64,
    pub category: Category,
}

/// Everything a detail page exposes about a single product.
///
/// Every field is optional in practice; the two sources fill disjoint
/// subsets. [`ProductDetail::default`] is the "nothing found" value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductDetail {
    pub slug: String,
    pub title: Option<String>,
    pub brand: Option<String>,
    pub price: Option<i64>,
    pub old_price: Option<i64>,
    /// Discount label as shown to shoppers, e.g. `-25%`.
    pub discount: Option<String>,
    pub stock: Option<u32>,
    pub stock_info: Option<String>,
    pub shipping_info: Option<String>,
    pub rating: Option<f64>,
    pub reviews_count: u32,
    pub images: Vec<String>,
    pub description: Option<String>,
    pub key_features: Vec<String>,
    pub specifications: BTreeMap<String, String>,
}

impl ProductDetail {
    /// True when no product was found at all.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> CanonicalProduct {
        CanonicalProduct {
            id: 1,
            slug: "fresh-bread-loaf".to_string(),
            title: "Fresh Bread Loaf".to_string(),
            description: None,
            price: 1200,
            discount_percentage: 0.0,
            rating: 0.0,
            stock: 0,
            brand: "Unknown".to_string(),
            thumbnail: String::new(),
            images: vec![],
            is_published: true,
            product_type: "Food Products".to_string(),
            category_id: 1,
            category: Category {
                id: 1,
                name: "Food & Beverages/Bread".to_string(),
            },
        }
    }

    #[test]
    fn canonical_product_serializes_type_field() {
        let json = serde_json::to_value(product()).unwrap();
        assert_eq!(json["type"], "Food Products");
        assert_eq!(json["category"]["name"], "Food & Beverages/Bread");
        assert!(json.get("product_type").is_none());
    }

    #[test]
    fn canonical_product_deserializes_back() {
        let json = serde_json::to_string(&product()).unwrap();
        let parsed: CanonicalProduct = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, product());
    }

    #[test]
    fn default_detail_is_empty() {
        let detail = ProductDetail::default();
        assert!(detail.is_empty());
        assert!(detail.images.is_empty());
        assert_eq!(detail.reviews_count, 0);
    }
}
