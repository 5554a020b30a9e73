//! General-merchandise source (site A, the primary source).
//!
//! Listing cards are `article.prd` nodes. Most product facts are published
//! as analytics attributes on the card's `a.core` anchor (`data-ga4-*`),
//! with price and image in visible child nodes.
//!
//! # URL Pattern
//!
//! - search: `/catalog/?q=golden+penny`, later pages `&page=2#catalog-listing`
//! - category: `/phones-tablets/`, later pages `?page=2#catalog-listing`
//! - detail: `/{slug}.html`

use super::{
    SiteParser, Source, all_text, collapse_text, detail_price, first_text, image_src,
    log_detail_warnings, optional_price, plus_joined, required_price, spec_row,
};
use crate::error::{ExtractionWarning, WarningLog};
use crate::models::{ExtractedFragment, ProductDetail, RawPage, UNKNOWN_TITLE};
use crate::normalize::{slug_from_title, slug_from_url};
use crate::price::{first_number, parse_price, parse_rating};
use crate::utils::title_case;
use itertools::Itertools;
use scraper::{ElementRef, Html};
use tracing::{debug, instrument};

const PAGE_ANCHOR: &str = "catalog-listing";
const ITEM_ID_PREFIX: &str = "NAFAMZ";
const UNKNOWN_BRAND: &str = "Unknown Brand";
const DEFAULT_TYPE: &str = "Products";

mod attrs {
    pub const ITEM_ID: &str = "data-ga4-item_id";
    pub const ITEM_NAME: &str = "data-ga4-item_name";
    pub const ITEM_BRAND: &str = "data-ga4-item_brand";
    pub const CATEGORIES: [&str; 4] = [
        "data-ga4-item_category",
        "data-ga4-item_category2",
        "data-ga4-item_category3",
        "data-ga4-item_category4",
    ];
    pub const RATING: &str = "data-gtm-dimension27";
}

mod selectors {
    use once_cell::sync::Lazy;
    use scraper::Selector;

    fn sel(css: &str) -> Selector {
        Selector::parse(css).expect("valid selector")
    }

    pub static CARD: Lazy<Selector> = Lazy::new(|| sel("article.prd"));
    pub static CORE_LINK: Lazy<Selector> = Lazy::new(|| sel("a.core"));
    pub static CARD_NAME: Lazy<Selector> = Lazy::new(|| sel("h3.name"));
    pub static CARD_PRICE: Lazy<Selector> = Lazy::new(|| sel("div.prc"));
    pub static CARD_OLD_PRICE: Lazy<Selector> = Lazy::new(|| sel("div.old"));
    pub static CARD_IMAGE: Lazy<Selector> = Lazy::new(|| sel("div.img-c img"));
    pub static CARD_STARS: Lazy<Selector> = Lazy::new(|| sel("div.rev div.stars"));

    pub static TITLE: Lazy<Selector> = Lazy::new(|| sel("h1"));
    pub static BRAND: Lazy<Selector> = Lazy::new(|| sel("div.-pvxs a._more"));
    pub static PRICE: Lazy<Selector> = Lazy::new(|| sel("span.-b.-ltr.-tal.-fs24"));
    pub static OLD_PRICE: Lazy<Selector> = Lazy::new(|| sel("span.-tal.-gy5.-lthr.-fs16"));
    pub static DISCOUNT: Lazy<Selector> = Lazy::new(|| sel("span.bdg._dsct"));
    pub static STOCK: Lazy<Selector> = Lazy::new(|| sel("p.-df.-i-ctr.-fs12.-pbs.-rd5"));
    pub static SHIPPING: Lazy<Selector> = Lazy::new(|| sel("div.delivery-info p"));
    pub static RATING: Lazy<Selector> = Lazy::new(|| sel("div.stars._m._al"));
    pub static REVIEWS: Lazy<Selector> = Lazy::new(|| sel("a.-plxs._more"));
    pub static IMAGES: Lazy<Selector> = Lazy::new(|| sel("#imgs img"));
    pub static DESCRIPTION: Lazy<Selector> = Lazy::new(|| sel("div.markup.-mhm.-pvl.-oxa.-sc"));
    pub static KEY_FEATURES: Lazy<Selector> = Lazy::new(|| sel("div.markup.-pam ul li"));
    pub static SPECIFICATIONS: Lazy<Selector> = Lazy::new(|| sel("ul.-pvs.-mvxs.-phm.-lsn li"));
}

#[derive(Debug, Clone)]
pub struct GeneralSiteParser {
    base_url: String,
}

impl GeneralSiteParser {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn parse_card(&self, card: ElementRef<'_>, position: u64, context: &str) -> ExtractedFragment {
        let mut log = WarningLog::default();
        let anchor = card.select(&selectors::CORE_LINK).next().unwrap_or(card);
        let attr = |name: &str| {
            anchor
                .value()
                .attr(name)
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        let title = attr(attrs::ITEM_NAME)
            .map(str::to_string)
            .or_else(|| first_text(card, &selectors::CARD_NAME))
            .ok_or_else(|| ExtractionWarning::missing("title"));
        let title = log.take(title, UNKNOWN_TITLE.to_string());

        let brand = attr(attrs::ITEM_BRAND).unwrap_or(UNKNOWN_BRAND).to_string();
        let price = log.take(required_price(card, &selectors::CARD_PRICE, "price"), 0);
        let old_price = log.take(optional_price(card, &selectors::CARD_OLD_PRICE, "old_price"), 0);

        let image = card
            .select(&selectors::CARD_IMAGE)
            .next()
            .and_then(image_src)
            .ok_or_else(|| ExtractionWarning::missing("image"));
        let image = log.take(image, String::new());

        let rating = match attr(attrs::RATING) {
            Some(raw) => parse_rating(raw),
            None => first_text(card, &selectors::CARD_STARS)
                .and_then(|text| first_number(&text))
                .ok_or_else(|| ExtractionWarning::missing("rating")),
        };
        let rating = log.take(rating, 0.0);

        let site_id = attr(attrs::ITEM_ID).and_then(|raw| {
            let cleaned = raw.replace(ITEM_ID_PREFIX, "");
            match cleaned.parse::<u64>() {
                Ok(id) => Some(id),
                Err(_) => {
                    log.push(ExtractionWarning::invalid("site_id", &cleaned));
                    None
                }
            }
        });

        let levels: Vec<Option<&str>> = attrs::CATEGORIES.iter().map(|name| attr(*name)).collect();
        let mut category_path: Vec<String> = levels.iter().flatten().map(|s| s.to_string()).collect();
        if category_path.is_empty() {
            category_path.push(title_case(context));
        }
        let type_label = levels[2].unwrap_or(DEFAULT_TYPE).to_string();

        ExtractedFragment {
            position,
            site_id,
            title,
            brand,
            price,
            old_price,
            image,
            rating,
            category_path,
            type_label,
            warnings: log,
        }
    }

    /// Detail record plus every field that had to be left empty.
    fn extract_detail(&self, page: &RawPage) -> (ProductDetail, WarningLog) {
        let document = Html::parse_document(&page.body);
        let root = document.root_element();
        let mut log = WarningLog::default();

        let title = log.require(first_text(root, &selectors::TITLE), "title");
        let brand = log.require(first_text(root, &selectors::BRAND), "brand");
        let price = match first_text(root, &selectors::PRICE) {
            Some(raw) => log.take(parse_price(&raw, "price").map(Some), None),
            None => log.require(None, "price"),
        };
        let old_price = detail_price(root, &selectors::OLD_PRICE, "old_price", &mut log);

        let rating = match first_text(root, &selectors::RATING) {
            Some(text) => {
                let value = first_number(&text);
                if value.is_none() {
                    log.push(ExtractionWarning::invalid("rating", &text));
                }
                value
            }
            None => log.require(None, "rating"),
        };

        let images: Vec<String> = root
            .select(&selectors::IMAGES)
            .filter_map(image_src)
            .unique()
            .collect();
        if images.is_empty() {
            log.push(ExtractionWarning::missing("images"));
        }

        let stock_info = first_text(root, &selectors::STOCK);
        let detail = ProductDetail {
            slug: slug_from_url(&page.url, 1),
            title,
            brand,
            price,
            old_price,
            discount: first_text(root, &selectors::DISCOUNT),
            stock: stock_info
                .as_deref()
                .and_then(first_number)
                .map(|n| n as u32),
            stock_info,
            shipping_info: root
                .select(&selectors::SHIPPING)
                .map(collapse_text)
                .filter(|t| !t.is_empty())
                .reduce(|acc, t| format!("{acc} {t}")),
            rating,
            reviews_count: first_text(root, &selectors::REVIEWS)
                .and_then(|t| first_number(&t))
                .map_or(0, |n| n as u32),
            images,
            description: first_text(root, &selectors::DESCRIPTION),
            key_features: all_text(root, &selectors::KEY_FEATURES),
            specifications: all_text(root, &selectors::SPECIFICATIONS)
                .iter()
                .map(|row| spec_row(row))
                .collect(),
        };
        (detail, log)
    }
}

impl SiteParser for GeneralSiteParser {
    fn source(&self) -> Source {
        Source::General
    }

    fn search_url(&self, query: &str, page: u32) -> String {
        let mut url = format!(
            "{}/catalog/?q={}",
            self.base_url,
            plus_joined(&query.trim().to_lowercase())
        );
        if page > 1 {
            url.push_str(&format!("&page={page}#{PAGE_ANCHOR}"));
        }
        url
    }

    fn category_url(&self, category: &str, page: u32) -> String {
        let mut url = format!("{}/{}/", self.base_url, slug_from_title(category));
        if page > 1 {
            url.push_str(&format!("?page={page}#{PAGE_ANCHOR}"));
        }
        url
    }

    fn detail_url(&self, slug: &str) -> String {
        format!("{}/{}.html", self.base_url, urlencoding::encode(slug.trim()))
    }

    #[instrument(level = "debug", skip_all, fields(url = %page.url, %context))]
    fn parse_listing(&self, page: &RawPage, context: &str) -> Vec<ExtractedFragment> {
        let document = Html::parse_document(&page.body);
        let fragments: Vec<ExtractedFragment> = document
            .select(&selectors::CARD)
            .enumerate()
            .map(|(index, card)| self.parse_card(card, index as u64 + 1, context))
            .collect();
        debug!(count = fragments.len(), "Parsed general listing");
        fragments
    }

    #[instrument(level = "debug", skip_all, fields(url = %page.url))]
    fn parse_detail(&self, page: &RawPage) -> ProductDetail {
        let (detail, log) = self.extract_detail(page);
        log_detail_warnings(Source::General, &page.url, &log);
        detail
    }
}
