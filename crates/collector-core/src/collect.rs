use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};

use crate::config::{CompiledConfig, CompiledField, SourceType};
use crate::context::CrawlContext;
use crate::error::AppError;
use crate::images::rewrite_image_urls;
use crate::links::{extract_list_links, parse_feed_links};
use crate::models::{CandidateLink, ExtractedRecord};
use crate::pagination::join_fragments;
use crate::source::source_urls;
use crate::traits::{Fetcher, Transcoder};

/// Runs a compiled rule set against remote pages: fetch → slice → filter →
/// paginate → rewrite images.
///
/// Generic over the fetch and transcode collaborators via traits, so tests
/// drive it without real HTTP.
pub struct Collector<F, T>
where
    F: Fetcher,
    T: Transcoder,
{
    pub(crate) fetcher: F,
    pub(crate) transcoder: T,
    pub(crate) config: CompiledConfig,
}

impl<F, T> Collector<F, T>
where
    F: Fetcher,
    T: Transcoder,
{
    pub fn new(fetcher: F, transcoder: T, config: CompiledConfig) -> Self {
        Self {
            fetcher,
            transcoder,
            config,
        }
    }

    pub fn config(&self) -> &CompiledConfig {
        &self.config
    }

    /// Extract one record from `seed_url`, stamped with the current time.
    pub async fn collect(&self, seed_url: &str) -> ExtractedRecord {
        self.collect_at(seed_url, Utc::now()).await
    }

    /// Extract one record from `seed_url` with an explicit `fetched_at`.
    pub async fn collect_at(&self, seed_url: &str, fetched_at: DateTime<Utc>) -> ExtractedRecord {
        let mut ctx = CrawlContext::new(seed_url, &self.config);
        self.collect_with(&mut ctx, fetched_at).await
    }

    /// Extract one record using a caller-owned context.
    ///
    /// Rules, filters, regions and the pagination budget all come from
    /// `ctx.config`, so a context built from another rule set is honoured as
    /// a whole. Never fails: a seed page that cannot be fetched yields an
    /// empty record, and failed pagination pages are left out of the content.
    pub async fn collect_with(
        &self,
        ctx: &mut CrawlContext<'_>,
        fetched_at: DateTime<Utc>,
    ) -> ExtractedRecord {
        let config = ctx.config;
        let seed_url = ctx.seed_url.clone();
        tracing::info!("Collecting {}", seed_url);
        ctx.visited.insert(&seed_url);

        let Some(html) = self.fetch_page(ctx, &seed_url).await else {
            return ExtractedRecord::empty(&seed_url, fetched_at);
        };
        tracing::debug!("Fetched {} bytes of HTML", html.len());

        let title = field_value(ctx, &config.title, &html);
        let category = field_value(ctx, &config.category, &html);
        let custom_fields: BTreeMap<String, String> = config
            .custom_fields
            .iter()
            .map(|field| (field.name.clone(), field_value(ctx, field, &html)))
            .collect();

        let mut fragments = vec![field_value(ctx, &config.content, &html)];
        self.expand_pagination(ctx, &html, &mut fragments).await;

        let settings = &config.settings;
        let content = join_fragments(&fragments, settings.join_mode);
        let content = rewrite_image_urls(&content, &seed_url, &settings.base_url_override);

        tracing::info!(
            pages = ctx.visited.len(),
            content_bytes = content.len(),
            "Collected {}",
            seed_url
        );

        ExtractedRecord {
            url: seed_url,
            title,
            category,
            content,
            custom_fields,
            fetched_at,
        }
    }

    /// Fetch one list page (or feed) and return its candidate content links.
    pub async fn list_links(&self, list_url: &str) -> Result<Vec<CandidateLink>, AppError> {
        let settings = &self.config.settings;
        let bytes = self.fetcher.fetch(list_url).await?;

        if settings.source_type == SourceType::Rss {
            return parse_feed_links(&bytes);
        }

        let html = self
            .transcoder
            .transcode(&bytes, &settings.source_charset)?;
        Ok(extract_list_links(&html, settings, list_url))
    }

    /// Run the whole source: list pages → links → one record per link.
    ///
    /// List pages that fail are logged and skipped. A link seen on an earlier
    /// list page is not collected twice. When the title rule yields nothing,
    /// the link's anchor (or feed) title is used. `limit` caps the number of
    /// records.
    pub async fn crawl(
        &self,
        page_override: Option<u32>,
        limit: Option<usize>,
    ) -> Vec<ExtractedRecord> {
        let mut records = Vec::new();
        let mut seen = HashSet::new();

        for list_url in source_urls(&self.config.settings, page_override) {
            let links = match self.list_links(&list_url).await {
                Ok(links) => links,
                Err(e) => {
                    tracing::warn!(
                        url = %list_url,
                        error = %e,
                        retryable = e.is_retryable(),
                        "List page failed, skipping"
                    );
                    continue;
                }
            };
            tracing::info!(url = %list_url, count = links.len(), "Listed links");

            for link in links {
                if limit.is_some_and(|max| records.len() >= max) {
                    return records;
                }
                if !seen.insert(link.url.clone()) {
                    continue;
                }
                let mut record = self.collect(&link.url).await;
                if record.title.is_empty() {
                    record.title = link.title;
                }
                records.push(record);
            }
        }
        records
    }

    /// Fetch and decode a page with the context's charset, making it the
    /// context's current page; any failure is logged and yields `None`.
    pub(crate) async fn fetch_page(&self, ctx: &mut CrawlContext<'_>, url: &str) -> Option<String> {
        ctx.current_url = url.to_string();

        let bytes = match self.fetcher.fetch(url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(url, error = %e, "Fetch failed, no data for page");
                return None;
            }
        };

        match self
            .transcoder
            .transcode(&bytes, &ctx.config.settings.source_charset)
        {
            Ok(html) => Some(html),
            Err(e) => {
                tracing::warn!(url, error = %e, "Transcode failed, no data for page");
                None
            }
        }
    }
}

/// Extract a field from the context's current page, logging a rule mismatch
/// and falling back to an empty value.
pub(crate) fn field_value(ctx: &CrawlContext<'_>, field: &CompiledField, html: &str) -> String {
    match field.extract(html) {
        Some(value) => value,
        None => {
            tracing::warn!(
                field = %field.name,
                url = %ctx.current_url,
                "Rule mismatch: markers not found"
            );
            String::new()
        }
    }
}
