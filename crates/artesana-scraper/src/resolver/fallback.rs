//! Tier 2: keyword-guessed labels sharing the page's product photos.
//!
//! Without swatches there is no way to tell which photo shows which color,
//! so every guessed label receives the same first few photos.
//!
//! Label guessing scans the whole page text, so a color mentioned anywhere
//! (a description, a related product) produces a variant too.

use std::collections::HashSet;
use std::sync::LazyLock;

use artesana_core::{VariantMap, DEFAULT_VARIANT};
use reqwest::Url;
use scraper::{Html, Selector};

use crate::client::absolutize_url;
use crate::html::{attr, has_image_extension, title_case_word};

/// Color and material words used by the storefront's product copy.
pub(crate) const COLOR_VOCABULARY: [&str; 15] = [
    "beige", "café", "chocolate", "negro", "blanco", "rojo", "azul", "verde", "amarillo", "rosa",
    "morado", "gris", "marrón", "naranja", "crema",
];

/// Every harvested image must come from the media library.
const UPLOADS_MARKER: &str = "upload";

/// Site chrome that lives in the media library but is not product imagery.
const EXCLUDED_IMAGE_TERMS: [&str; 5] = ["logo", "icon", "banner", "header", "flag"];

/// Attributes checked, in order, for an image source (lazy loaders move the
/// real URL out of `src`).
const IMAGE_SOURCE_ATTRS: [&str; 3] = ["src", "data-src", "data-lazy-src"];

pub(crate) const MAX_SHARED_IMAGES: usize = 3;

static IMG_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img").expect("valid img selector"));

pub(crate) fn heuristic_variants(document: &Html, base: &Url) -> VariantMap {
    let labels = guess_labels(document);
    let images: Vec<String> = harvest_images(document, base)
        .into_iter()
        .take(MAX_SHARED_IMAGES)
        .collect();

    let mut variants = VariantMap::new();
    for label in labels {
        variants.insert(label, images.clone());
    }
    variants
}

/// Title-cased vocabulary terms present in the page text, in vocabulary
/// order, or `["default"]` when none appear.
pub(crate) fn guess_labels(document: &Html) -> Vec<String> {
    let text = document.root_element().text().collect::<String>().to_lowercase();
    let labels: Vec<String> = COLOR_VOCABULARY
        .iter()
        .filter(|term| text.contains(*term))
        .map(|term| title_case_word(term))
        .collect();
    if labels.is_empty() {
        vec![DEFAULT_VARIANT.to_string()]
    } else {
        labels
    }
}

/// Product-looking images in document order, absolutized and deduplicated.
pub(crate) fn harvest_images(document: &Html, base: &Url) -> Vec<String> {
    let mut seen = HashSet::new();
    document
        .select(&IMG_SELECTOR)
        .filter_map(|img| IMAGE_SOURCE_ATTRS.iter().find_map(|name| attr(img, name)))
        .filter(|src| is_product_image(src))
        .filter_map(|src| absolutize_url(base, src))
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

fn is_product_image(src: &str) -> bool {
    let lower = src.to_lowercase();
    lower.contains(UPLOADS_MARKER)
        && !EXCLUDED_IMAGE_TERMS.iter().any(|term| lower.contains(term))
        && has_image_extension(&lower)
}
