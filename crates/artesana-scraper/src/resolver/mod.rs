//! Variant resolution for a single product page.
//!
//! Variant imagery is resolved by an ordered cascade of tiers, each a pure
//! function of the parsed page. The first tier that yields any mapping wins
//! and later tiers are never evaluated:
//!
//! 1. [`swatches::swatch_variants`] picks structured per-variant swatch images.
//! 2. [`fallback::heuristic_variants`] matches color keywords to shared page photos.
//!
//! The primary image is looked up independently of the cascade. Whatever the
//! input, the resulting variant map is never empty: the last resort is a
//! single `"default"` entry with no candidates.

mod fallback;
mod main_image;
mod swatches;

use artesana_core::{Product, ResolutionStatus, VariantImageSet, VariantMap};
use reqwest::Url;
use scraper::Html;

use crate::client::StorefrontClient;

type VariantTier = fn(&Html, &Url) -> VariantMap;

/// Variant tiers in precedence order.
const VARIANT_TIERS: [(&str, VariantTier); 2] = [
    ("swatches", swatches::swatch_variants),
    ("heuristic", fallback::heuristic_variants),
];

/// Outcome of resolving one product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The page yielded a main image or at least one variant candidate.
    Found(VariantImageSet),
    /// The page was parsed but held no usable imagery.
    Empty(VariantImageSet),
    /// The product page could not be fetched.
    FetchFailed,
}

impl Resolution {
    /// Classifies a resolved image set.
    #[must_use]
    pub fn from_image_set(images: VariantImageSet) -> Self {
        if images.main_image.is_some() || images.variants.has_candidates() {
            Self::Found(images)
        } else {
            Self::Empty(images)
        }
    }

    #[must_use]
    pub fn status(&self) -> ResolutionStatus {
        match self {
            Self::Found(_) => ResolutionStatus::Found,
            Self::Empty(_) => ResolutionStatus::Empty,
            Self::FetchFailed => ResolutionStatus::FetchFailed,
        }
    }

    /// The image set to materialize. A failed fetch becomes
    /// [`VariantImageSet::empty`].
    #[must_use]
    pub fn into_image_set(self) -> VariantImageSet {
        match self {
            Self::Found(images) | Self::Empty(images) => images,
            Self::FetchFailed => VariantImageSet::empty(),
        }
    }
}

/// Resolves a product page that has already been fetched.
#[must_use]
pub fn resolve_document(html: &str, base: &Url) -> VariantImageSet {
    let document = Html::parse_document(html);
    VariantImageSet {
        main_image: main_image::find_main_image(&document, base),
        variants: resolve_variants(&document, base),
    }
}

fn resolve_variants(document: &Html, base: &Url) -> VariantMap {
    VARIANT_TIERS
        .iter()
        .find_map(|(name, tier)| {
            let variants = tier(document, base);
            if variants.is_empty() {
                None
            } else {
                tracing::debug!(tier = *name, variants = variants.len(), "variant tier matched");
                Some(variants)
            }
        })
        .unwrap_or_else(VariantMap::default_only)
}

/// Fetches and resolves one product page.
///
/// A fetch failure is soft: it is logged and reported as
/// [`Resolution::FetchFailed`], never as an error.
pub async fn resolve_product(client: &StorefrontClient, product: &Product) -> Resolution {
    let html = match client.fetch_page(&product.url).await {
        Ok(html) => html,
        Err(e) => {
            tracing::warn!(
                product = %product.slug,
                url = %product.url,
                error = %e,
                "product page unreachable"
            );
            return Resolution::FetchFailed;
        }
    };

    let images = resolve_document(&html, client.base_url());
    tracing::info!(
        product = %product.slug,
        variants = images.variants.len(),
        candidates = images.variants.candidate_count(),
        has_main_image = images.main_image.is_some(),
        "resolved product"
    );
    Resolution::from_image_set(images)
}

#[cfg(test)]
#[path = "resolver_test.rs"]
mod tests;
