use collector_core::testutil::{MockFetcher, MockTranscoder};
use collector_core::{Collector, ExtractionConfig, PaginationMode, SourceType};

pub type TestCollector = Collector<MockFetcher, MockTranscoder>;

/// Rule set for article pages with a `<div class="pages">` navigation bar.
pub fn article_config(mode: PaginationMode) -> ExtractionConfig {
    ExtractionConfig {
        source_type: SourceType::Single,
        url_template: "http://x.com/news/".into(),
        title_rule: "<h1>[内容]</h1>".into(),
        content_rule: r#"<div class="body">[内容]</div>"#.into(),
        page_region_start: r#"<div class="pages">"#.into(),
        page_region_end: "</div>".into(),
        pagination_mode: mode,
        ..Default::default()
    }
}

/// An article page whose body is `body` and whose navigation bar holds `nav`.
pub fn article_page(title: &str, body: &str, nav: &str) -> String {
    format!(
        "<html><body>\n<h1>{title}</h1>\n<div class=\"body\">\n{body}\n</div>\n<div class=\"pages\">{nav}</div>\n</body></html>"
    )
}

pub fn collector(fetcher: &MockFetcher, config: ExtractionConfig) -> TestCollector {
    Collector::new(
        fetcher.clone(),
        MockTranscoder::passthrough(),
        config.compile().expect("test config compiles"),
    )
}
