//! Primary product image lookup.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::Url;
use scraper::{Html, Selector};

use crate::client::absolutize_url;
use crate::html::{attr, has_image_extension};

static ZOOM_IMG_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img.zoomImg").expect("valid zoom selector"));
static GALLERY_CONTAINER_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div[class], figure[class]").expect("valid container selector"));
static IMG_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img").expect("valid img selector"));
static GALLERY_CLASS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"product-image|main-image|featured-image|woocommerce-product-gallery")
        .expect("valid gallery class regex")
});

/// Finds the product's primary image.
///
/// The gallery's zoom overlay image wins when present. Otherwise the first
/// `<img>` of each gallery-like `div`/`figure` is tried in document order and
/// accepted if its `src` looks like a photo.
pub(crate) fn find_main_image(document: &Html, base: &Url) -> Option<String> {
    let zoom = document
        .select(&ZOOM_IMG_SELECTOR)
        .next()
        .and_then(|img| attr(img, "src"));

    let src = zoom.or_else(|| {
        document
            .select(&GALLERY_CONTAINER_SELECTOR)
            .filter(|el| el.value().classes().any(|c| GALLERY_CLASS_RE.is_match(c)))
            .find_map(|container| {
                let img = container.select(&IMG_SELECTOR).next()?;
                attr(img, "src").filter(|src| has_image_extension(src))
            })
    })?;

    absolutize_url(base, src)
}
