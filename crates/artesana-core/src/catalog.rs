use serde::{Deserialize, Serialize};

/// A storefront category discovered from the shop index page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Visible link text, or the title-cased slug when the link has none.
    pub name: String,
    /// Path remainder after `/product-category/`, e.g. `"bolsas"`. Unique key.
    pub slug: String,
    /// Absolute URL of the category listing page.
    pub url: String,
}

/// A product linked from a category page.
///
/// `name` is kept exactly as scraped and may still carry a price suffix such
/// as `"Bolsa Tejida MXN $480.00"`. Price stripping happens only when the name
/// is turned into a directory component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    /// Path remainder after `/product/`. Unique within its category only.
    pub slug: String,
    pub url: String,
    pub category_slug: String,
}
