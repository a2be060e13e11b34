//! Product name cleaning, price extraction, and filesystem-safe naming.

use std::sync::LazyLock;

use regex::Regex;

/// Characters Windows rejects in file and directory names.
const FORBIDDEN_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Upper bound, in characters, for a single path component.
pub const MAX_COMPONENT_CHARS: usize = 100;

static PRICE_STRIP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:MXN\s*)?\$[\d,]+\.?\d*").expect("valid price regex"));
static PRICE_EXTRACT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"MXN \$[\d,]+\.?\d*|\$[\d,]+\.?\d*").expect("valid price regex")
});

/// Makes one path component safe: forbidden characters become `_`, the
/// result is cut to [`MAX_COMPONENT_CHARS`] characters and then trimmed.
///
/// Applied separately to each component, never to a joined path.
#[must_use]
pub fn sanitize_component(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| if FORBIDDEN_CHARS.contains(&c) { '_' } else { c })
        .take(MAX_COMPONENT_CHARS)
        .collect();
    replaced.trim().to_string()
}

/// Strips embedded prices (`"MXN $480.00"`, `"$1,200"`) from a product name
/// and collapses whitespace.
#[must_use]
pub fn clean_product_name(name: &str) -> String {
    let stripped = PRICE_STRIP_RE.replace_all(name, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First price found in a raw product name, or an empty string.
#[must_use]
pub fn extract_price(name: &str) -> String {
    PRICE_EXTRACT_RE
        .find(name)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}
