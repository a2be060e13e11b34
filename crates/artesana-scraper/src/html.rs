//! Small text helpers over parsed storefront markup.

use scraper::ElementRef;

/// Image formats the storefront serves for product photos.
pub(crate) const IMAGE_EXTENSIONS: [&str; 4] = [".jpg", ".jpeg", ".png", ".webp"];

/// Collapses runs of whitespace to single spaces and trims the ends.
pub(crate) fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Visible text of an element, whitespace-normalized.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    normalize_whitespace(&element.text().collect::<String>())
}

/// Non-blank, trimmed attribute value.
pub(crate) fn attr<'a>(element: ElementRef<'a>, name: &str) -> Option<&'a str> {
    element
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// `"bolsa-tejida-grande"` → `"Bolsa Tejida Grande"`.
pub(crate) fn title_case_slug(slug: &str) -> String {
    slug.replace('-', " ")
        .split_whitespace()
        .map(title_case_word)
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn title_case_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// `true` if the URL mentions a known image extension anywhere
/// (case-insensitive), which also admits `photo.jpg?resize=300`.
pub(crate) fn has_image_extension(url: &str) -> bool {
    let lower = url.to_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| lower.contains(ext))
}
