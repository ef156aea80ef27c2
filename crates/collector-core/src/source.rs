//! Expansion of a source descriptor into the list pages to crawl.

use crate::config::{ExtractionConfig, PAGE_PLACEHOLDER, SourceType};

/// Generate the ordered list-page URLs for a source.
///
/// For `Sequential` sources `page_override` replaces `page_end`; an override
/// below `page_start` is clamped up to `page_start`. Other source types ignore it.
pub fn source_urls(config: &ExtractionConfig, page_override: Option<u32>) -> Vec<String> {
    match config.source_type {
        SourceType::Sequential => {
            let start = config.page_start;
            let end = page_override.map_or(config.page_end, |n| n.max(start));
            let step = config.page_step.max(1) as usize;
            (start..=end)
                .step_by(step)
                .map(|page| {
                    config
                        .url_template
                        .replace(PAGE_PLACEHOLDER, &page.to_string())
                })
                .collect()
        }
        SourceType::ExplicitList => config
            .url_template
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect(),
        SourceType::Single | SourceType::Rss => {
            let url = config.url_template.trim();
            if url.is_empty() {
                Vec::new()
            } else {
                vec![url.to_string()]
            }
        }
    }
}
