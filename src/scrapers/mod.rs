//! Site-specific markup parsers.
//!
//! Each retail source gets one [`SiteParser`] implementation that knows the
//! source's URL layout and its markup grammar. Selector rules live as named
//! constants inside each module, so when a site changes its markup only
//! that module needs updating.
//!
//! # Supported Sources
//!
//! | Source | Module | Role | Ratings | Stock |
//! |--------|--------|------|---------|-------|
//! | General merchandise | [`general`] | primary | yes | detail label only |
//! | Groceries | [`food`] | secondary / food routing | no | detail inventory JSON |
//!
//! Parsers never fail: a missing node degrades that one field to its
//! sentinel and is recorded on the fragment's warning log.

pub mod food;
pub mod general;

pub use food::FoodSiteParser;
pub use general::GeneralSiteParser;

use crate::error::{ExtractionWarning, WarningLog};
use crate::models::{ExtractedFragment, ProductDetail, RawPage};
use crate::price::parse_price;
use itertools::Itertools;
use scraper::{ElementRef, Selector};
use std::fmt;
use tracing::warn;

/// Which retail site a parser speaks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    General,
    Food,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::General => f.write_str("general"),
            Source::Food => f.write_str("food"),
        }
    }
}

/// URL layout plus listing and detail grammars for one retail site.
pub trait SiteParser: Send + Sync {
    fn source(&self) -> Source;

    /// Search results URL; pages after the first carry a page parameter and anchor.
    fn search_url(&self, query: &str, page: u32) -> String;

    /// Category browse URL.
    fn category_url(&self, category: &str, page: u32) -> String;

    /// Product detail URL for a slug.
    fn detail_url(&self, slug: &str) -> String;

    /// Extract one fragment per product card, in page order.
    ///
    /// `context` is the query or category being served; sources that lack a
    /// category breadcrumb derive the category from it.
    fn parse_listing(&self, page: &RawPage, context: &str) -> Vec<ExtractedFragment>;

    /// Extract a product detail record. Missing nodes leave fields unset.
    fn parse_detail(&self, page: &RawPage) -> ProductDetail;
}

/// `a b  c` → `a+b+c`, each word percent-encoded.
pub(crate) fn plus_joined(query: &str) -> String {
    query
        .split_whitespace()
        .map(|word| urlencoding::encode(word).into_owned())
        .join("+")
}

/// Element text with runs of whitespace collapsed to single spaces.
pub(crate) fn collapse_text(element: ElementRef<'_>) -> String {
    element.text().flat_map(str::split_whitespace).join(" ")
}

/// Collapsed text of the first match under `scope`, if non-empty.
pub(crate) fn first_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope
        .select(selector)
        .next()
        .map(collapse_text)
        .filter(|text| !text.is_empty())
}

/// Collapsed text of every non-empty match under `scope`.
pub(crate) fn all_text(scope: ElementRef<'_>, selector: &Selector) -> Vec<String> {
    scope
        .select(selector)
        .map(collapse_text)
        .filter(|text| !text.is_empty())
        .collect()
}

pub(crate) fn required_text(
    scope: ElementRef<'_>,
    selector: &Selector,
    field: &'static str,
) -> Result<String, ExtractionWarning> {
    first_text(scope, selector).ok_or_else(|| ExtractionWarning::missing(field))
}

/// A price node that must be present.
pub(crate) fn required_price(
    scope: ElementRef<'_>,
    selector: &Selector,
    field: &'static str,
) -> Result<i64, ExtractionWarning> {
    let raw = required_text(scope, selector, field)?;
    parse_price(&raw, field)
}

/// A price node that may legitimately be absent (no old price means no discount).
pub(crate) fn optional_price(
    scope: ElementRef<'_>,
    selector: &Selector,
    field: &'static str,
) -> Result<i64, ExtractionWarning> {
    match first_text(scope, selector) {
        Some(raw) => parse_price(&raw, field),
        None => Ok(0),
    }
}

/// A detail-page price. Absent is `None`; unreadable text is also `None` and recorded on `log`.
pub(crate) fn detail_price(
    root: ElementRef<'_>,
    selector: &Selector,
    field: &'static str,
    log: &mut WarningLog,
) -> Option<i64> {
    let raw = first_text(root, selector)?;
    match parse_price(&raw, field) {
        Ok(price) => Some(price),
        Err(warning) => {
            log.push(warning);
            None
        }
    }
}

/// Emit one warning for a detail page whose fields degraded.
pub(crate) fn log_detail_warnings(source: Source, url: &str, log: &WarningLog) {
    if !log.is_empty() {
        warn!(
            %source,
            %url,
            fields = ?log.fields(),
            details = %log.summary(),
            "Degraded detail fields left empty"
        );
    }
}

/// Lazy-loaded image URL (`data-src`, then `src`), with protocol-relative URLs made absolute.
pub(crate) fn image_src(img: ElementRef<'_>) -> Option<String> {
    let value = img.value();
    [value.attr("data-src"), value.attr("src")]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|src| !src.is_empty())
        .map(|src| {
            if src.starts_with("//") {
                format!("https:{src}")
            } else {
                src.to_string()
            }
        })
}

/// Split `Key: value` rows; rows without a colon keep the whole text as key.
pub(crate) fn spec_row(row: &str) -> (String, String) {
    match row.split_once(':') {
        Some((key, value)) => (key.trim().to_string(), value.trim().to_string()),
        None => (row.trim().to_string(), String::new()),
    }
}
