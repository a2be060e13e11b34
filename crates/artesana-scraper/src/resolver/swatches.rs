//! Tier 1: per-variant imagery from the variation swatches widget.
//!
//! The widget renders one `cfvsw-swatches-option` per variant, labelled via
//! `data-*` attributes, with the variant photo set as an inline
//! `background-image` on its `cfvsw-swatch-inner` child.

use std::sync::LazyLock;

use artesana_core::VariantMap;
use regex::Regex;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

use crate::client::absolutize_url;
use crate::html::{attr, title_case_slug};

static CONTAINER_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("div.cfvsw-swatches-container").expect("valid swatch container selector")
});
static OPTION_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("div.cfvsw-swatches-option").expect("valid swatch option selector")
});
static INNER_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("div.cfvsw-swatch-inner").expect("valid swatch inner selector")
});
static BACKGROUND_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"background-image\s*:\s*url\(\s*['"]?([^'")]+)['"]?\s*\)"#)
        .expect("valid background-image regex")
});

/// Maps each fully described swatch to its single image.
///
/// A swatch counts only when it has both a label and a background image.
/// Returns an empty map when the widget is absent or no swatch qualifies.
pub(crate) fn swatch_variants(document: &Html, base: &Url) -> VariantMap {
    let mut variants = VariantMap::new();
    let Some(container) = document.select(&CONTAINER_SELECTOR).next() else {
        tracing::debug!("no swatch container on page");
        return variants;
    };

    for swatch in container.select(&OPTION_SELECTOR) {
        let label = swatch_label(swatch);
        let image = swatch_image(swatch).and_then(|raw| absolutize_url(base, &raw));
        match (label, image) {
            (Some(label), Some(image)) => {
                tracing::debug!(label = %label, image = %image, "swatch variant");
                variants.insert(label, vec![image]);
            }
            (label, image) => {
                tracing::debug!(
                    has_label = label.is_some(),
                    has_image = image.is_some(),
                    "skipping incomplete swatch"
                );
            }
        }
    }
    variants
}

/// First available of `data-title`, title-cased `data-slug`, `data-tooltip`.
fn swatch_label(swatch: ElementRef<'_>) -> Option<String> {
    let label = attr(swatch, "data-title")
        .map(str::to_string)
        .or_else(|| attr(swatch, "data-slug").map(title_case_slug))
        .or_else(|| attr(swatch, "data-tooltip").map(str::to_string))?;
    let label = label.trim();
    (!label.is_empty()).then(|| label.to_string())
}

fn swatch_image(swatch: ElementRef<'_>) -> Option<String> {
    let inner = swatch.select(&INNER_SELECTOR).next()?;
    let style = attr(inner, "style")?;
    background_image_url(style)
}

/// URL inside a `background-image:url(...)` declaration, with or without
/// quotes.
pub(crate) fn background_image_url(style: &str) -> Option<String> {
    let caps = BACKGROUND_URL_RE.captures(style)?;
    let url = caps.get(1)?.as_str().trim();
    (!url.is_empty()).then(|| url.to_string())
}
