//! Relative-to-absolute URL resolution for links and image sources.

use url::Url;

/// Prefixes that never point at a fetchable page or image.
const UNRESOLVABLE_PREFIXES: &[&str] = &["#", "javascript:", "mailto:", "data:", "tel:"];

/// Returns true if `href` names something that can be fetched once resolved.
pub fn is_fetchable_href(href: &str) -> bool {
    let href = href.trim();
    if href.is_empty() {
        return false;
    }
    let lower = href.to_ascii_lowercase();
    !UNRESOLVABLE_PREFIXES.iter().any(|p| lower.starts_with(p))
}

/// Resolve `href` against the page it was found on.
///
/// - Anything containing `://` is returned unchanged.
/// - `//host/path` takes the page's scheme.
/// - `/path` takes the page's `scheme://host[:port]`.
/// - Otherwise `base_override` is prepended when non-empty, else the page's
///   origin plus the directory part of its path (everything up to and
///   including the last `/`).
///
/// Fragments, `javascript:` and similar hrefs are returned unchanged, as is
/// everything when `page_url` does not parse.
pub fn resolve(href: &str, page_url: &str, base_override: &str) -> String {
    let href = href.trim();
    if href.contains("://") || !is_fetchable_href(href) {
        return href.to_string();
    }

    let page = match Url::parse(page_url) {
        Ok(page) => page,
        Err(e) => {
            tracing::debug!(page_url, error = %e, "Page URL does not parse, leaving href as-is");
            return href.to_string();
        }
    };

    if let Some(rest) = href.strip_prefix("//") {
        return format!("{}://{rest}", page.scheme());
    }

    let origin = origin(&page);
    if href.starts_with('/') {
        return format!("{origin}{href}");
    }

    let href = href.strip_prefix("./").unwrap_or(href);
    if !base_override.is_empty() {
        return format!("{base_override}{href}");
    }

    let path = page.path();
    let dir = match path.rfind('/') {
        Some(idx) => &path[..=idx],
        None => "/",
    };
    format!("{origin}{dir}{href}")
}

/// `scheme://host[:port]` of a parsed URL; the port appears only when non-default.
fn origin(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}://{host}:{port}", url.scheme()),
        None => format!("{}://{host}", url.scheme()),
    }
}
