//! Grocery source (site B): the fallback for general searches and the
//! exclusive target for food categories.
//!
//! The storefront publishes no ratings and no brand on listing cards, so
//! ratings stay at `0.0` and the brand is inferred from a small table of
//! title keywords. Detail pages embed an inventory JSON blob in a
//! `script[data-product-inventory]` tag that carries the stock quantity.
//!
//! # URL Pattern
//!
//! - search: `/search?options[prefix]=last&q=golden+penny`, later pages `&page=2#main-collection`
//! - category: `/collections/{slug}`, later pages `?page=2#main-collection`
//! - detail: `/products/{slug}`

use super::{
    SiteParser, Source, all_text, detail_price, first_text, image_src, log_detail_warnings,
    optional_price, plus_joined, required_price, required_text,
};
use crate::error::{ExtractionWarning, WarningLog};
use crate::models::{ExtractedFragment, ProductDetail, RawPage, UNKNOWN_TITLE};
use crate::normalize::{slug_from_title, slug_from_url};
use crate::price::{discount_percentage, parse_price};
use crate::utils::{title_case, truncate_for_log};
use itertools::Itertools;
use scraper::{ElementRef, Html};
use serde::Deserialize;
use tracing::{debug, instrument};

const PAGE_ANCHOR: &str = "main-collection";
const CATEGORY_ROOT: &str = "Food & Beverages";
const TYPE_LABEL: &str = "Food Products";
const UNKNOWN_BRAND: &str = "Unknown";

/// Lowercase title keyword → brand name.
const BRAND_HINTS: [(&str, &str); 3] = [
    ("nini", "Nini Foods"),
    ("okomu", "Okomu"),
    ("maku", "M'Aku"),
];

mod selectors {
    use once_cell::sync::Lazy;
    use scraper::Selector;

    fn sel(css: &str) -> Selector {
        Selector::parse(css).expect("valid selector")
    }

    pub static CARD: Lazy<Selector> = Lazy::new(|| sel("li.js-pagination-result"));
    pub static CARD_TITLE: Lazy<Selector> = Lazy::new(|| sel("p.card__title a"));
    pub static CARD_PRICE: Lazy<Selector> = Lazy::new(|| sel("span.price__current"));
    pub static CARD_OLD_PRICE: Lazy<Selector> = Lazy::new(|| sel("s.price__was"));
    pub static CARD_IMAGE: Lazy<Selector> = Lazy::new(|| sel("img.card__main-image"));

    pub static TITLE: Lazy<Selector> = Lazy::new(|| sel("h1.product__title"));
    pub static VENDOR: Lazy<Selector> = Lazy::new(|| sel("p.product__vendor"));
    pub static PRICE: Lazy<Selector> = Lazy::new(|| sel("div.product__price span.price__current"));
    pub static OLD_PRICE: Lazy<Selector> = Lazy::new(|| sel("div.product__price s.price__was"));
    pub static INVENTORY: Lazy<Selector> = Lazy::new(|| sel("script[data-product-inventory]"));
    pub static STOCK_LABEL: Lazy<Selector> = Lazy::new(|| sel("p.product__inventory"));
    pub static SHIPPING: Lazy<Selector> = Lazy::new(|| sel("div.product__shipping"));
    pub static IMAGES: Lazy<Selector> = Lazy::new(|| sel("div.product__media img"));
    pub static DESCRIPTION: Lazy<Selector> = Lazy::new(|| sel("div.product__description"));
    pub static FEATURES: Lazy<Selector> = Lazy::new(|| sel("div.product__description ul li"));
    pub static SPEC_ROWS: Lazy<Selector> = Lazy::new(|| sel("table.product__specs tr"));
    pub static SPEC_KEY: Lazy<Selector> = Lazy::new(|| sel("th"));
    pub static SPEC_VALUE: Lazy<Selector> = Lazy::new(|| sel("td"));
}

#[derive(Debug, Deserialize)]
struct InventoryPayload {
    quantity: u32,
}

fn infer_brand(title: &str) -> String {
    let normalized = title.to_lowercase().replace(['\'', '’'], "");
    BRAND_HINTS
        .iter()
        .find(|(hint, _)| normalized.contains(*hint))
        .map_or(UNKNOWN_BRAND, |&(_, brand)| brand)
        .to_string()
}

/// Stock quantity from the embedded inventory blob.
///
/// A page without the blob has no stock figure; malformed JSON leaves it
/// unset and is recorded on `log`.
fn inventory_quantity(root: ElementRef<'_>, log: &mut WarningLog) -> Option<u32> {
    let script = root.select(&selectors::INVENTORY).next()?;
    let raw: String = script.text().collect();
    match serde_json::from_str::<InventoryPayload>(raw.trim()) {
        Ok(payload) => Some(payload.quantity),
        Err(e) => {
            debug!(error = %e, "Unparseable inventory payload");
            log.push(ExtractionWarning::invalid("stock", &truncate_for_log(raw.trim(), 60)));
            None
        }
    }
}

#[derive(Debug, Clone)]
pub struct FoodSiteParser {
    base_url: String,
}

impl FoodSiteParser {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn parse_card(&self, card: ElementRef<'_>, position: u64, category: &str) -> ExtractedFragment {
        let mut log = WarningLog::default();

        let title = log.take(
            required_text(card, &selectors::CARD_TITLE, "title"),
            UNKNOWN_TITLE.to_string(),
        );
        let price = log.take(required_price(card, &selectors::CARD_PRICE, "price"), 0);
        let old_price = log.take(optional_price(card, &selectors::CARD_OLD_PRICE, "old_price"), 0);
        let image = log.take(
            card.select(&selectors::CARD_IMAGE)
                .next()
                .and_then(image_src)
                .ok_or_else(|| ExtractionWarning::missing("image")),
            String::new(),
        );

        ExtractedFragment {
            position,
            site_id: None,
            brand: infer_brand(&title),
            title,
            price,
            old_price,
            image,
            rating: 0.0,
            category_path: vec![CATEGORY_ROOT.to_string(), category.to_string()],
            type_label: TYPE_LABEL.to_string(),
            warnings: log,
        }
    }

    /// Detail record plus every field that had to be left empty.
    ///
    /// The storefront has no ratings, so an absent rating is not recorded.
    fn extract_detail(&self, page: &RawPage) -> (ProductDetail, WarningLog) {
        let document = Html::parse_document(&page.body);
        let root = document.root_element();
        let mut log = WarningLog::default();

        let title = log.require(first_text(root, &selectors::TITLE), "title");
        let brand = log.require(first_text(root, &selectors::VENDOR), "brand");
        let price = match first_text(root, &selectors::PRICE) {
            Some(raw) => log.take(parse_price(&raw, "price").map(Some), None),
            None => log.require(None, "price"),
        };
        let old_price = detail_price(root, &selectors::OLD_PRICE, "old_price", &mut log);
        let discount = match (price, old_price) {
            (Some(price), Some(old)) if old > price => {
                Some(format!("-{}%", discount_percentage(price, old).round() as i64))
            }
            _ => None,
        };

        let stock = inventory_quantity(root, &mut log);
        let images: Vec<String> = root
            .select(&selectors::IMAGES)
            .filter_map(image_src)
            .unique()
            .collect();
        if images.is_empty() {
            log.push(ExtractionWarning::missing("images"));
        }

        let detail = ProductDetail {
            slug: slug_from_url(&page.url, 1),
            title,
            brand,
            price,
            old_price,
            discount,
            stock,
            stock_info: first_text(root, &selectors::STOCK_LABEL),
            shipping_info: first_text(root, &selectors::SHIPPING),
            rating: None,
            reviews_count: 0,
            images,
            description: first_text(root, &selectors::DESCRIPTION),
            key_features: all_text(root, &selectors::FEATURES),
            specifications: root
                .select(&selectors::SPEC_ROWS)
                .filter_map(|row| {
                    let key = first_text(row, &selectors::SPEC_KEY)?;
                    Some((key, first_text(row, &selectors::SPEC_VALUE).unwrap_or_default()))
                })
                .collect(),
        };
        (detail, log)
    }
}

impl SiteParser for FoodSiteParser {
    fn source(&self) -> Source {
        Source::Food
    }

    fn search_url(&self, query: &str, page: u32) -> String {
        let mut url = format!(
            "{}/search?options[prefix]=last&q={}",
            self.base_url,
            plus_joined(query.trim())
        );
        if page > 1 {
            url.push_str(&format!("&page={page}#{PAGE_ANCHOR}"));
        }
        url
    }

    fn category_url(&self, category: &str, page: u32) -> String {
        let mut url = format!("{}/collections/{}", self.base_url, slug_from_title(category));
        if page > 1 {
            url.push_str(&format!("?page={page}#{PAGE_ANCHOR}"));
        }
        url
    }

    fn detail_url(&self, slug: &str) -> String {
        format!("{}/products/{}", self.base_url, urlencoding::encode(slug.trim()))
    }

    #[instrument(level = "debug", skip_all, fields(url = %page.url, %context))]
    fn parse_listing(&self, page: &RawPage, context: &str) -> Vec<ExtractedFragment> {
        let document = Html::parse_document(&page.body);
        let category = title_case(context);
        let fragments: Vec<ExtractedFragment> = document
            .select(&selectors::CARD)
            .enumerate()
            .map(|(index, card)| self.parse_card(card, index as u64 + 1, &category))
            .collect();
        debug!(count = fragments.len(), "Parsed food listing");
        fragments
    }

    #[instrument(level = "debug", skip_all, fields(url = %page.url))]
    fn parse_detail(&self, page: &RawPage) -> ProductDetail {
        let (detail, log) = self.extract_detail(page);
        log_detail_warnings(Source::Food, &page.url, &log);
        detail
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_batch;

    const LISTING: &str = r#"
    <html><body><ul id="product-grid">
      <li class="grid__item js-pagination-result">
        <div class="card">
          <img class="img-fit img-fit--contain card__main-image" data-src="//cdn.shopify.com/bread.jpg" src="">
          <p class="card__title"><a href="/products/fresh-bread-loaf">Fresh Bread Loaf</a></p>
          <div class="price"><s class="price__was">₦1,000</s><span class="price__current">₦750</span></div>
        </div>
      </li>
      <li class="grid__item js-pagination-result">
        <div class="card">
          <p class="card__title"><a href="/products/nini-milk">Nini Fresh Milk 1L</a></p>
          <div class="price"><span class="price__current">N/A</span></div>
        </div>
      </li>
      <li class="grid__item js-pagination-result"><div class="card"></div></li>
    </ul></body></html>"#;

    const DETAIL: &str = r#"
    <html><body>
      <div class="product__media"><img src="//cdn.shopify.com/oil-1.jpg"><img data-src="//cdn.shopify.com/oil-2.jpg"></div>
      <p class="product__vendor">Okomu</p>
      <h1 class="product__title">Okomu Red Palm Oil 1L</h1>
      <div class="product__price"><s class="price__was">₦4,000</s><span class="price__current">₦3,000</span></div>
      <p class="product__inventory">In stock</p>
      <script type="application/json" data-product-inventory>{"id": 4411, "quantity": 12}</script>
      <div class="product__shipping">Same-day delivery within Lagos</div>
      <div class="product__description"><p>Pure unrefined palm oil.</p><ul><li>Cholesterol free</li><li>1 litre</li></ul></div>
      <table class="product__specs">
        <tr><th>Weight</th><td>1 kg</td></tr>
        <tr><th>Origin</th><td>Edo, Nigeria</td></tr>
      </table>
    </body></html>"#;

    fn parser() -> FoodSiteParser {
        FoodSiteParser::new("https://www.supermart.ng")
    }

    fn page(url: &str, body: &str) -> RawPage {
        RawPage {
            url: url.to_string(),
            body: body.to_string(),
        }
    }

    #[test]
    fn urls_follow_site_layout() {
        let p = parser();
        assert_eq!(
            p.search_url("Golden Penny", 1),
            "https://www.supermart.ng/search?options[prefix]=last&q=Golden+Penny"
        );
        assert_eq!(
            p.search_url("rice", 2),
            "https://www.supermart.ng/search?options[prefix]=last&q=rice&page=2#main-collection"
        );
        assert_eq!(
            p.category_url("Frozen Foods", 1),
            "https://www.supermart.ng/collections/frozen-foods"
        );
        assert_eq!(
            p.category_url("Frozen Foods", 4),
            "https://www.supermart.ng/collections/frozen-foods?page=4#main-collection"
        );
        assert_eq!(p.detail_url("nini-milk"), "https://www.supermart.ng/products/nini-milk");
    }

    #[test]
    fn infers_brand_from_title() {
        assert_eq!(infer_brand("Nini Fresh Milk"), "Nini Foods");
        assert_eq!(infer_brand("M'Aku Mango Juice"), "M'Aku");
        assert_eq!(infer_brand("OKOMU Palm Oil"), "Okomu");
        assert_eq!(infer_brand("Golden Penny Semovita"), "Unknown");
    }

    #[test]
    fn parses_cards_with_derived_category() {
        let fragments = parser().parse_listing(&page("https://x/search", LISTING), "fresh bread");
        assert_eq!(fragments.len(), 3);

        let first = &fragments[0];
        assert_eq!(first.position, 1);
        assert_eq!(first.title, "Fresh Bread Loaf");
        assert_eq!(first.price, 750);
        assert_eq!(first.old_price, 1000);
        assert_eq!(first.image, "https://cdn.shopify.com/bread.jpg");
        assert_eq!(first.rating, 0.0);
        assert_eq!(first.category_path, vec!["Food & Beverages", "Fresh Bread"]);
        assert!(first.warnings.is_empty());

        let second = &fragments[1];
        assert_eq!(second.brand, "Nini Foods");
        assert_eq!(second.price, 0);
        assert_eq!(second.warnings.fields(), vec!["price", "image"]);

        let third = &fragments[2];
        assert_eq!(third.title, "Unknown Title");
        assert_eq!(third.warnings.fields(), vec!["title", "price", "image"]);
    }

    #[test]
    fn listing_normalizes_with_position_ids() {
        let fragments = parser().parse_listing(&page("https://x/search", LISTING), "fresh bread");
        let products = normalize_batch(fragments, "fresh bread");
        let ids: Vec<u64> = products.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        let bread = &products[0];
        assert_eq!(bread.slug, "fresh-bread-loaf");
        assert_eq!(bread.discount_percentage, 25.0);
        assert_eq!(bread.category.name, "Food & Beverages/Fresh Bread");
        assert_eq!(bread.product_type, "Food Products");
        assert_eq!(bread.stock, 0);
        assert_eq!(bread.images, vec!["https://cdn.shopify.com/bread.jpg".to_string()]);
    }

    #[test]
    fn parses_detail_with_inventory_blob() {
        let (detail, warnings) = parser().extract_detail(&page(
            "https://www.supermart.ng/products/okomu-red-palm-oil-1l",
            DETAIL,
        ));
        assert!(warnings.is_empty(), "unexpected warnings: {}", warnings.summary());
        assert_eq!(detail.slug, "okomu-red-palm-oil-1l");
        assert_eq!(detail.title.as_deref(), Some("Okomu Red Palm Oil 1L"));
        assert_eq!(detail.brand.as_deref(), Some("Okomu"));
        assert_eq!(detail.price, Some(3000));
        assert_eq!(detail.old_price, Some(4000));
        assert_eq!(detail.discount.as_deref(), Some("-25%"));
        assert_eq!(detail.stock, Some(12));
        assert_eq!(detail.stock_info.as_deref(), Some("In stock"));
        assert_eq!(detail.shipping_info.as_deref(), Some("Same-day delivery within Lagos"));
        assert_eq!(detail.rating, None);
        assert_eq!(
            detail.images,
            vec![
                "https://cdn.shopify.com/oil-1.jpg".to_string(),
                "https://cdn.shopify.com/oil-2.jpg".to_string()
            ]
        );
        assert_eq!(detail.key_features, vec!["Cholesterol free", "1 litre"]);
        assert_eq!(detail.specifications.get("Weight").map(String::as_str), Some("1 kg"));
        assert_eq!(detail.specifications.get("Origin").map(String::as_str), Some("Edo, Nigeria"));
    }

    #[test]
    fn blank_detail_page_records_missing_title() {
        let (detail, warnings) =
            parser().extract_detail(&page("https://www.supermart.ng/products/x", "<html></html>"));
        assert!(detail.is_empty());
        assert_eq!(warnings.fields(), vec!["title", "brand", "price", "images"]);
    }

    #[test]
    fn malformed_inventory_leaves_stock_unset() {
        let body = r#"<html><h1 class="product__title">Rice</h1>
            <script data-product-inventory>{"quantity": "lots"</script></html>"#;
        let (detail, warnings) =
            parser().extract_detail(&page("https://www.supermart.ng/products/rice", body));
        assert_eq!(detail.title.as_deref(), Some("Rice"));
        assert_eq!(detail.stock, None);
        assert_eq!(detail.discount, None);
        assert_eq!(warnings.fields(), vec!["brand", "price", "stock", "images"]);
    }
}
