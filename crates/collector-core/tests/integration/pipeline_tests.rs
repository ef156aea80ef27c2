use collector_core::testutil::MockFetcher;
use collector_core::{AppError, ExtractionConfig, PaginationMode, SourceType};

use crate::common::{article_config, article_page, collector};

fn list_page(items: &str) -> String {
    format!(
        "<html><body>\n<div class=\"menu\"><a href=\"/about.html\">About</a></div>\n<ul class=\"list\">\n{items}\n</ul>\n</body></html>"
    )
}

fn sequential_config() -> ExtractionConfig {
    ExtractionConfig {
        source_type: SourceType::Sequential,
        url_template: "http://x.com/news/list_(*).html".into(),
        page_start: 1,
        page_end: 2,
        list_region_start: r#"<ul class="list">"#.into(),
        list_region_end: "</ul>".into(),
        url_must_contain: "/news/".into(),
        url_must_not_contain: "ad_".into(),
        title_filter: r"\s*\|\s*X News$[|]".into(),
        type_rule: "News".into(),
        ..article_config(PaginationMode::NextPage)
    }
}

fn sequential_site() -> MockFetcher {
    MockFetcher::new()
        .with_page(
            "http://x.com/news/list_1.html",
            &list_page(
                r#"<li><a href="/news/1.html">One</a></li>
<li><a href="/news/ad_9.html">Sponsored</a></li>
<li><a href="/news/2.html">Two</a></li>"#,
            ),
        )
        .with_page(
            "http://x.com/news/list_2.html",
            &list_page(
                r#"<li><a href="/news/2.html">Two again</a></li>
<li><a href="/news/3.html">Three</a></li>"#,
            ),
        )
        .with_page(
            "http://x.com/news/1.html",
            &article_page("First | X News", "first body", r#"<a href="1_2.html">下一页</a>"#),
        )
        .with_page("http://x.com/news/1_2.html", &article_page("", "first cont.", ""))
        .with_page("http://x.com/news/2.html", &article_page("Second | X News", "second body", ""))
        .with_page("http://x.com/news/3.html", &article_page("Third", "third body", ""))
}

#[tokio::test]
async fn sequential_crawl_end_to_end() {
    let fetcher = sequential_site();
    let svc = collector(&fetcher, sequential_config());

    let records = svc.crawl(None, None).await;

    let summary: Vec<(&str, &str, &str)> = records
        .iter()
        .map(|r| (r.url.as_str(), r.title.as_str(), r.content.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("http://x.com/news/1.html", "First", "first body[page]first cont."),
            ("http://x.com/news/2.html", "Second", "second body"),
            ("http://x.com/news/3.html", "Third", "third body"),
        ]
    );
    assert!(records.iter().all(|r| r.category == "News"));
    assert_eq!(fetcher.request_count("http://x.com/news/ad_9.html"), 0);
    assert_eq!(fetcher.request_count("http://x.com/about.html"), 0);
    assert_eq!(fetcher.request_count("http://x.com/news/2.html"), 1);
}

#[tokio::test]
async fn page_override_limits_list_pages() {
    let fetcher = sequential_site();
    let svc = collector(&fetcher, sequential_config());

    let records = svc.crawl(Some(1), None).await;

    assert_eq!(records.len(), 2);
    assert_eq!(fetcher.request_count("http://x.com/news/list_2.html"), 0);
}

#[tokio::test]
async fn failed_list_page_does_not_stop_the_crawl() {
    let fetcher = sequential_site().with_timeout("http://x.com/news/list_1.html");
    let svc = collector(&fetcher, sequential_config());

    let records = svc.crawl(None, None).await;

    let urls: Vec<&str> = records.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(urls, vec!["http://x.com/news/2.html", "http://x.com/news/3.html"]);
}

#[tokio::test]
async fn explicit_list_source() {
    let fetcher = sequential_site();
    let config = ExtractionConfig {
        source_type: SourceType::ExplicitList,
        url_template: "http://x.com/news/list_2.html\n\n  http://x.com/news/list_1.html  \n".into(),
        ..sequential_config()
    };
    let svc = collector(&fetcher, config);

    let records = svc.crawl(None, Some(2)).await;

    let urls: Vec<&str> = records.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(urls, vec!["http://x.com/news/2.html", "http://x.com/news/3.html"]);
}

const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>X News</title>
    <link>http://x.com/</link>
    <description>Latest</description>
    <item>
      <title>Feed One</title>
      <link>http://x.com/news/1.html</link>
    </item>
    <item>
      <title>Feed Three</title>
      <link>http://x.com/news/3.html</link>
    </item>
  </channel>
</rss>"#;

#[tokio::test]
async fn rss_crawl_uses_feed_entries() {
    let fetcher = sequential_site()
        .with_page("http://x.com/rss.xml", FEED)
        .with_page("http://x.com/news/3.html", &article_page("", "third body", ""));
    let config = ExtractionConfig {
        source_type: SourceType::Rss,
        url_template: "http://x.com/rss.xml".into(),
        ..sequential_config()
    };
    let svc = collector(&fetcher, config);

    let links = svc.list_links("http://x.com/rss.xml").await.unwrap();
    assert_eq!(links.len(), 2);
    assert_eq!(links[0].title, "Feed One");

    let records = svc.crawl(None, None).await;

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].title, "First");
    // Empty title on the page, so the feed entry title is used.
    assert_eq!(records[1].title, "Feed Three");
    assert_eq!(records[1].content, "third body");
}

#[tokio::test]
async fn malformed_feed_is_an_error() {
    let fetcher = MockFetcher::new().with_page("http://x.com/rss.xml", "not a feed at all");
    let config = ExtractionConfig {
        source_type: SourceType::Rss,
        url_template: "http://x.com/rss.xml".into(),
        ..article_config(PaginationMode::NextPage)
    };
    let svc = collector(&fetcher, config);

    let err = svc.list_links("http://x.com/rss.xml").await.unwrap_err();

    assert!(matches!(err, AppError::FeedError(_)), "unexpected error: {err}");
    assert!(svc.crawl(None, None).await.is_empty());
}

#[tokio::test]
async fn config_loaded_from_json_drives_collection() {
    let json = r#"{
        "title_rule": "<h1>[内容]</h1>",
        "content_rule": "<div class=\"body\">[内容]</div>",
        "content_filter": "secret[|]***\n(\\d+) apples[|]$1 pears",
        "custom_fields": [{ "name": "source", "rule": "X News" }],
        "list_region_start": "<ul class=\"list\">",
        "list_region_end": "</ul>",
        "source_type": "single",
        "url_template": "http://x.com/news/index.html"
    }"#;
    let config = ExtractionConfig::from_json_str(json).unwrap();
    let fetcher = MockFetcher::new()
        .with_page(
            "http://x.com/news/index.html",
            &list_page(r#"<li><a href="5.html">Five</a></li>"#),
        )
        .with_page(
            "http://x.com/news/5.html",
            &article_page("Five", "the SECRET is 3 apples", ""),
        );
    let svc = collector(&fetcher, config);

    let records = svc.crawl(None, None).await;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].title, "Five");
    assert_eq!(records[0].content, "the *** is 3 pears");
    assert_eq!(records[0].custom_fields["source"], "X News");
    // No pagination region configured: the list page and the article only.
    assert_eq!(fetcher.requests().len(), 2);
}
