//! URL helpers shared by discovery, resolution, and download naming.

use reqwest::Url;

use crate::error::ScraperError;

/// Parses the configured storefront base URL.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidBaseUrl`] if `base_url` is not an absolute
/// http(s) URL.
pub fn parse_base_url(base_url: &str) -> Result<Url, ScraperError> {
    let url = Url::parse(base_url).map_err(|e| ScraperError::InvalidBaseUrl {
        base_url: base_url.to_owned(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ScraperError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: format!("unsupported scheme \"{}\"", url.scheme()),
        });
    }
    Ok(url)
}

/// Resolves `candidate` (absolute, root-relative, or relative) against `base`.
///
/// HTML-escaped ampersands are unescaped first. Returns `None` for blank or
/// unparseable references.
#[must_use]
pub fn absolutize_url(base: &Url, candidate: &str) -> Option<String> {
    let candidate = candidate.trim().replace("&amp;", "&");
    if candidate.is_empty() {
        return None;
    }
    base.join(&candidate).ok().map(|u| u.to_string())
}

/// File extension of the URL's path, including the leading dot.
///
/// `"https://x/wp-content/uploads/bolsa.PNG?v=2"` → `Some(".PNG")`.
#[must_use]
pub fn path_extension(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let last = parsed.path_segments()?.next_back()?;
    let (stem, ext) = last.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(format!(".{ext}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        parse_base_url("http://estudioartesana.local").unwrap()
    }

    #[test]
    fn absolutize_root_relative_path() {
        assert_eq!(
            absolutize_url(&base(), "/product/bolsa-tejida/").as_deref(),
            Some("http://estudioartesana.local/product/bolsa-tejida/")
        );
    }

    #[test]
    fn absolutize_keeps_absolute_url() {
        assert_eq!(
            absolutize_url(&base(), "https://cdn.example.com/a.jpg").as_deref(),
            Some("https://cdn.example.com/a.jpg")
        );
    }

    #[test]
    fn absolutize_unescapes_ampersands() {
        assert_eq!(
            absolutize_url(&base(), "/img.jpg?w=1&amp;h=2").as_deref(),
            Some("http://estudioartesana.local/img.jpg?w=1&h=2")
        );
    }

    #[test]
    fn absolutize_rejects_blank() {
        assert_eq!(absolutize_url(&base(), "   "), None);
    }

    #[test]
    fn parse_base_url_rejects_non_http_scheme() {
        let err = parse_base_url("mailto:shop@example.com").unwrap_err();
        assert!(matches!(err, ScraperError::InvalidBaseUrl { .. }));
    }

    #[test]
    fn path_extension_ignores_query_string() {
        assert_eq!(
            path_extension("http://x.test/wp-content/uploads/bolsa.webp?ver=3").as_deref(),
            Some(".webp")
        );
    }

    #[test]
    fn path_extension_absent_without_dot() {
        assert_eq!(path_extension("http://x.test/images/bolsa"), None);
        assert_eq!(path_extension("http://x.test/"), None);
    }
}
