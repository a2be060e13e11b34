//! Category and product discovery by link scanning.
//!
//! Both stages look for anchors whose resolved path contains a WooCommerce
//! permalink marker and take the remainder of the path as the slug. Failures
//! to fetch a listing page are soft: the stage logs and returns nothing.

use std::collections::HashSet;
use std::sync::LazyLock;

use artesana_core::{Category, Product};
use reqwest::Url;
use scraper::{Html, Selector};

use crate::client::{absolutize_url, StorefrontClient};
use crate::html::{attr, element_text, title_case_slug};

const CATEGORY_MARKER: &str = "/product-category/";
const PRODUCT_MARKER: &str = "/product/";

static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid anchor selector"));

/// One anchor that matched a permalink marker.
struct MarkedLink {
    slug: String,
    url: String,
    text: String,
    title: Option<String>,
}

fn scan_marked_links(html: &str, base: &Url, marker: &str) -> Vec<MarkedLink> {
    let document = Html::parse_document(html);
    document
        .select(&ANCHOR_SELECTOR)
        .filter_map(|anchor| {
            let url = absolutize_url(base, anchor.value().attr("href")?)?;
            let slug = slug_after_marker(&url, marker)?;
            Some(MarkedLink {
                slug,
                url,
                text: element_text(anchor),
                title: attr(anchor, "title").map(str::to_string),
            })
        })
        .collect()
}

/// Path remainder after `marker`, trimmed of slashes. `None` when the marker
/// is absent or nothing follows it.
fn slug_after_marker(url: &str, marker: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let path = parsed.path();
    let start = path.find(marker)? + marker.len();
    let slug = path[start..].trim_matches('/');
    (!slug.is_empty()).then(|| slug.to_string())
}

/// Extracts categories from the shop index page, deduplicated by slug in
/// discovery order.
#[must_use]
pub fn parse_categories(html: &str, base: &Url) -> Vec<Category> {
    let mut seen = HashSet::new();
    scan_marked_links(html, base, CATEGORY_MARKER)
        .into_iter()
        .filter(|link| seen.insert(link.slug.clone()))
        .map(|link| Category {
            name: if link.text.is_empty() {
                title_case_slug(&link.slug)
            } else {
                link.text
            },
            slug: link.slug,
            url: link.url,
        })
        .collect()
}

/// Extracts the products linked from one category page, deduplicated by slug
/// within that category.
///
/// Name precedence is anchor text, then the `title` attribute, then the
/// title-cased slug.
#[must_use]
pub fn parse_products(html: &str, base: &Url, category: &Category) -> Vec<Product> {
    let mut seen = HashSet::new();
    scan_marked_links(html, base, PRODUCT_MARKER)
        .into_iter()
        .filter(|link| seen.insert(link.slug.clone()))
        .map(|link| {
            let name = if !link.text.is_empty() {
                link.text
            } else if let Some(title) = link.title {
                title
            } else {
                title_case_slug(&link.slug)
            };
            Product {
                name,
                slug: link.slug,
                url: link.url,
                category_slug: category.slug.clone(),
            }
        })
        .collect()
}

/// Fetches the shop index and returns its categories. An unreachable page
/// yields an empty list.
pub async fn discover_categories(client: &StorefrontClient, shop_url: &str) -> Vec<Category> {
    let html = match client.fetch_page(shop_url).await {
        Ok(html) => html,
        Err(e) => {
            tracing::warn!(url = shop_url, error = %e, "shop index unreachable; no categories");
            return Vec::new();
        }
    };
    let categories = parse_categories(&html, client.base_url());
    tracing::info!(count = categories.len(), "discovered categories");
    categories
}

/// Fetches one category page and returns its products. An unreachable page
/// yields an empty list.
pub async fn discover_products(client: &StorefrontClient, category: &Category) -> Vec<Product> {
    let html = match client.fetch_page(&category.url).await {
        Ok(html) => html,
        Err(e) => {
            tracing::warn!(
                category = %category.slug,
                url = %category.url,
                error = %e,
                "category page unreachable; no products"
            );
            return Vec::new();
        }
    };
    let products = parse_products(&html, client.base_url(), category);
    tracing::info!(category = %category.slug, count = products.len(), "discovered products");
    products
}
