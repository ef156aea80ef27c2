//! Multi-page content: following "next page" chains and enumerating page links.
//!
//! NextPage mode recurses page by page, each page contributing its content
//! fragment and its own pagination region. EnumerateAll mode reads the
//! pagination region of the seed page only and works through the links it
//! finds as a queue, without expanding further. Both modes share the
//! context's `VisitedSet`, so no URL is fetched twice in one call, and both
//! stop once `max_pages` pagination fetches have been made.

use std::collections::VecDeque;

use futures::future::BoxFuture;

use crate::collect::{Collector, field_value};
use crate::config::{ExtractionConfig, JoinMode, PaginationMode};
use crate::context::CrawlContext;
use crate::links::scan_anchors;
use crate::models::PAGE_MARKER;
use crate::resolve::{is_fetchable_href, resolve};
use crate::rule::cut;
use crate::traits::{Fetcher, Transcoder};

impl<F, T> Collector<F, T>
where
    F: Fetcher,
    T: Transcoder,
{
    /// Append the fragments of every further page reachable from the seed page.
    pub(crate) async fn expand_pagination(
        &self,
        ctx: &mut CrawlContext<'_>,
        seed_html: &str,
        fragments: &mut Vec<String>,
    ) {
        let config = ctx.config;
        let settings = &config.settings;
        if !settings.has_pagination() {
            return;
        }
        let seed_url = ctx.seed_url.clone();
        match settings.pagination_mode {
            PaginationMode::NextPage => {
                self.follow_next_pages(ctx, seed_url, seed_html.to_string(), fragments)
                    .await;
            }
            PaginationMode::EnumerateAll => {
                self.enumerate_pages(ctx, &seed_url, seed_html, fragments)
                    .await;
            }
        }
    }

    /// Depth-first walk of the "next page" chain starting at `page_url`.
    fn follow_next_pages<'a, 'c: 'a>(
        &'a self,
        ctx: &'a mut CrawlContext<'c>,
        page_url: String,
        html: String,
        fragments: &'a mut Vec<String>,
    ) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            let config = ctx.config;
            let settings = &config.settings;
            for url in next_page_candidates(settings, &html, &page_url) {
                if ctx.visited.contains(&url) {
                    tracing::debug!(url = %url, "Already visited, skipping next page");
                    continue;
                }
                if ctx.budget_exhausted() {
                    tracing::warn!(max_pages = settings.max_pages, "Pagination limit reached");
                    return;
                }
                ctx.visited.insert(&url);
                ctx.pages_fetched += 1;

                let Some(next_html) = self.fetch_page(ctx, &url).await else {
                    continue;
                };
                tracing::debug!(url = %url, "Following next page");
                fragments.push(field_value(ctx, &config.content, &next_html));
                self.follow_next_pages(ctx, url, next_html, fragments).await;
            }
        })
    }

    /// Fetch every distinct link in the seed page's pagination region, in order.
    async fn enumerate_pages(
        &self,
        ctx: &mut CrawlContext<'_>,
        seed_url: &str,
        seed_html: &str,
        fragments: &mut Vec<String>,
    ) {
        let config = ctx.config;
        let settings = &config.settings;
        let mut queue: VecDeque<String> = region_links(settings, seed_html, seed_url).into();

        while let Some(url) = queue.pop_front() {
            if ctx.visited.contains(&url) {
                continue;
            }
            if ctx.budget_exhausted() {
                tracing::warn!(max_pages = settings.max_pages, "Pagination limit reached");
                break;
            }
            ctx.visited.insert(&url);
            ctx.pages_fetched += 1;

            let Some(html) = self.fetch_page(ctx, &url).await else {
                continue;
            };
            let fragment = field_value(ctx, &config.content, &html);
            if fragment.is_empty() || fragments.contains(&fragment) {
                tracing::debug!(url = %url, "Empty or duplicate fragment dropped");
                continue;
            }
            fragments.push(fragment);
        }
    }
}

/// Resolved hrefs of every fetchable anchor in the page's pagination region.
fn region_links(config: &ExtractionConfig, html: &str, page_url: &str) -> Vec<String> {
    let Some(region) = cut(html, &config.page_region_start, &config.page_region_end) else {
        tracing::debug!(url = page_url, "No pagination region on page");
        return Vec::new();
    };
    scan_anchors(&region)
        .into_iter()
        .filter(|anchor| is_fetchable_href(&anchor.url))
        .map(|anchor| resolve(&anchor.url, page_url, &config.base_url_override))
        .collect()
}

/// Resolved hrefs of anchors in the pagination region whose text contains the
/// next-page label.
pub fn next_page_candidates(config: &ExtractionConfig, html: &str, page_url: &str) -> Vec<String> {
    let Some(region) = cut(html, &config.page_region_start, &config.page_region_end) else {
        tracing::debug!(url = page_url, "No pagination region on page");
        return Vec::new();
    };
    scan_anchors(&region)
        .into_iter()
        .filter(|anchor| anchor.title.contains(&config.next_page_label))
        .filter(|anchor| is_fetchable_href(&anchor.url))
        .map(|anchor| resolve(&anchor.url, page_url, &config.base_url_override))
        .collect()
}

/// Join page fragments into one content value, skipping empty ones.
pub fn join_fragments(fragments: &[String], mode: JoinMode) -> String {
    let separator = match mode {
        JoinMode::PageMarkerJoin => PAGE_MARKER,
        JoinMode::Concat => "",
    };
    fragments
        .iter()
        .filter(|f| !f.is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(separator)
}
