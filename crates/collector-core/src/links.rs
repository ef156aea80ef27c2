//! Link discovery on list pages, feeds and pagination regions.

use crate::config::ExtractionConfig;
use crate::error::AppError;
use crate::models::CandidateLink;
use crate::patterns::{ANCHOR, CLOSING_ANCHOR, TAG};
use crate::resolve::{is_fetchable_href, resolve};
use crate::rule::{cut, strip_line_breaks};

/// Scan a region for `<a href>` anchors, in document order.
///
/// Hrefs are returned as written (unresolved) and anchor text has its tags
/// stripped. Line breaks are removed and every `</a>` is then made to end a
/// line, so each match stays inside one anchor.
pub fn scan_anchors(region: &str) -> Vec<CandidateLink> {
    let flat = strip_line_breaks(region);
    let normalized = CLOSING_ANCHOR.replace_all(&flat, "</a>\n");

    ANCHOR
        .captures_iter(&normalized)
        .filter_map(|caps| {
            let href = caps
                .get(1)
                .or_else(|| caps.get(2))
                .or_else(|| caps.get(3))?
                .as_str()
                .trim();
            let text = caps.get(4).map_or("", |m| m.as_str());
            Some(CandidateLink::new(href, strip_tags(text)))
        })
        .collect()
}

/// Remove every tag from `html` and trim the result.
pub fn strip_tags(html: &str) -> String {
    TAG.replace_all(html, "").trim().to_string()
}

/// Extract candidate content links from a fetched list page.
///
/// The page is narrowed to `list_region_start..list_region_end` (the whole
/// page when both are empty). Each anchor must contain `url_must_contain` and
/// must not contain `url_must_not_contain` (empty filters pass everything)
/// before its href is resolved against `page_url`. Duplicates are kept.
pub fn extract_list_links(
    html: &str,
    config: &ExtractionConfig,
    page_url: &str,
) -> Vec<CandidateLink> {
    let region = if config.list_region_start.is_empty() && config.list_region_end.is_empty() {
        html.to_string()
    } else {
        match cut(html, &config.list_region_start, &config.list_region_end) {
            Some(region) => region,
            None => {
                tracing::warn!(url = %page_url, "List region markers not found on list page");
                return Vec::new();
            }
        }
    };

    let links: Vec<CandidateLink> = scan_anchors(&region)
        .into_iter()
        .filter(|link| is_fetchable_href(&link.url))
        .filter(|link| passes_url_filters(&link.url, config))
        .map(|link| CandidateLink {
            url: resolve(&link.url, page_url, &config.base_url_override),
            title: link.title,
        })
        .collect();

    tracing::debug!(url = %page_url, count = links.len(), "Extracted list links");
    links
}

fn passes_url_filters(href: &str, config: &ExtractionConfig) -> bool {
    if !config.url_must_contain.is_empty() && !href.contains(&config.url_must_contain) {
        return false;
    }
    if !config.url_must_not_contain.is_empty() && href.contains(&config.url_must_not_contain) {
        return false;
    }
    true
}

/// Parse an RSS/Atom body into `(link, title)` pairs, one per entry.
///
/// Entries without a link are skipped.
pub fn parse_feed_links(body: &[u8]) -> Result<Vec<CandidateLink>, AppError> {
    let feed = feed_rs::parser::parse(body).map_err(|e| AppError::FeedError(e.to_string()))?;

    Ok(feed
        .entries
        .into_iter()
        .filter_map(|entry| {
            let url = entry.links.first()?.href.trim().to_string();
            if url.is_empty() {
                return None;
            }
            let title = entry
                .title
                .map(|t| t.content.trim().to_string())
                .unwrap_or_default();
            Some(CandidateLink { url, title })
        })
        .collect())
}
