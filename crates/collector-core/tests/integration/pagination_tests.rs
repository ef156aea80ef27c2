use chrono::Utc;
use collector_core::testutil::MockFetcher;
use collector_core::{CrawlContext, ExtractionConfig, JoinMode, PaginationMode};

use crate::common::{article_config, article_page, collector};

const P1: &str = "http://x.com/news/1.html";
const P2: &str = "http://x.com/news/1_2.html";
const P3: &str = "http://x.com/news/1_3.html";

fn three_page_chain() -> MockFetcher {
    MockFetcher::new()
        .with_page(
            P1,
            &article_page("Story", "part one", r#"<a href="1_2.html">2</a><a href="1_2.html">下一页</a>"#),
        )
        .with_page(
            P2,
            &article_page(
                "ignored",
                "part two",
                r#"<a href="1.html">上一页</a><a href="/news/1_3.html">下一页</a>"#,
            ),
        )
        .with_page(
            P3,
            &article_page("ignored", "part three", r#"<a href="1_2.html">上一页</a>"#),
        )
}

#[tokio::test]
async fn next_page_chain_assembles_three_fragments_in_order() {
    let fetcher = three_page_chain();
    let svc = collector(&fetcher, article_config(PaginationMode::NextPage));
    let mut ctx = CrawlContext::new(P1, svc.config());

    let record = svc.collect_with(&mut ctx, Utc::now()).await;

    assert_eq!(record.title, "Story");
    assert_eq!(record.content, "part one[page]part two[page]part three");
    assert_eq!(record.page_count(), 3);
    assert_eq!(ctx.visited.len(), 3);
    assert_eq!(ctx.visited.iter().collect::<Vec<_>>(), vec![P1, P2, P3]);
    assert_eq!(fetcher.requests(), vec![P1, P2, P3]);
}

#[tokio::test]
async fn next_page_cycle_back_to_seed_is_not_refetched() {
    let fetcher = MockFetcher::new()
        .with_page(P1, &article_page("Story", "one", r#"<a href="1_2.html">下一页</a>"#))
        .with_page(P2, &article_page("", "two", r#"<a href="1.html">下一页</a>"#));
    let svc = collector(&fetcher, article_config(PaginationMode::NextPage));
    let mut ctx = CrawlContext::new(P1, svc.config());

    let record = svc.collect_with(&mut ctx, Utc::now()).await;

    assert_eq!(record.content, "one[page]two");
    assert_eq!(ctx.visited.len(), 2);
    assert_eq!(fetcher.request_count(P1), 1);
}

#[tokio::test]
async fn next_page_concat_join() {
    let fetcher = three_page_chain();
    let config = ExtractionConfig {
        join_mode: JoinMode::Concat,
        ..article_config(PaginationMode::NextPage)
    };
    let svc = collector(&fetcher, config);

    let record = svc.collect(P1).await;

    assert_eq!(record.content, "part onepart twopart three");
}

#[tokio::test]
async fn next_page_failed_branch_is_omitted() {
    let fetcher = MockFetcher::new()
        .with_page(P1, &article_page("Story", "one", r#"<a href="1_2.html">下一页</a>"#))
        .with_timeout(P2);
    let svc = collector(&fetcher, article_config(PaginationMode::NextPage));

    let record = svc.collect(P1).await;

    assert_eq!(record.title, "Story");
    assert_eq!(record.content, "one");
    assert_eq!(fetcher.request_count(P2), 1);
}

#[tokio::test]
async fn next_page_respects_max_pages() {
    let fetcher = three_page_chain();
    let config = ExtractionConfig {
        max_pages: 1,
        ..article_config(PaginationMode::NextPage)
    };
    let svc = collector(&fetcher, config);

    let record = svc.collect(P1).await;

    assert_eq!(record.content, "part one[page]part two");
    assert_eq!(fetcher.request_count(P3), 0);
}

#[tokio::test]
async fn custom_next_page_label() {
    let fetcher = MockFetcher::new()
        .with_page(P1, &article_page("Story", "one", r#"<a href="1_2.html">Next &raquo;</a>"#))
        .with_page(P2, &article_page("", "two", ""));
    let config = ExtractionConfig {
        next_page_label: "Next".into(),
        ..article_config(PaginationMode::NextPage)
    };
    let svc = collector(&fetcher, config);

    assert_eq!(svc.collect(P1).await.content, "one[page]two");
}

fn enumerated_site() -> MockFetcher {
    let nav = [
        r#"<a href="1.html">1</a>"#,
        r#"<a href="1_2.html">2</a>"#,
        r#"<a href="1_3.html">3</a>"#,
        r#"<a href="1_4.html">4</a>"#,
        r#"<a href="1_5.html">5</a>"#,
        r#"<a href="1_6.html">6</a>"#,
        r#"<a href="1_3.html">下一页</a>"#,
    ]
    .concat();
    let mut fetcher = MockFetcher::new().with_page(P1, &article_page("Story", "page 1", &nav));
    for n in 2..=6 {
        fetcher = fetcher.with_page(
            &format!("http://x.com/news/1_{n}.html"),
            &article_page("", &format!("page {n}"), &nav),
        );
    }
    fetcher
}

#[tokio::test]
async fn enumerate_all_fetches_each_distinct_link_once() {
    let fetcher = enumerated_site();
    let svc = collector(&fetcher, article_config(PaginationMode::EnumerateAll));
    let mut ctx = CrawlContext::new(P1, svc.config());

    let record = svc.collect_with(&mut ctx, Utc::now()).await;

    // Seed plus five distinct pages; the duplicate and the self-link are skipped.
    assert_eq!(fetcher.requests().len(), 6);
    assert_eq!(ctx.pages_fetched, 5);
    assert_eq!(ctx.visited.len(), 6);
    assert_eq!(
        record.content,
        "page 1[page]page 2[page]page 3[page]page 4[page]page 5[page]page 6"
    );
}

#[tokio::test]
async fn enumerate_all_does_not_expand_beyond_seed_region() {
    let fetcher = MockFetcher::new()
        .with_page(P1, &article_page("Story", "one", r#"<a href="1_2.html">2</a>"#))
        .with_page(P2, &article_page("", "two", r#"<a href="1_3.html">3</a>"#))
        .with_page(P3, &article_page("", "three", ""));
    let svc = collector(&fetcher, article_config(PaginationMode::EnumerateAll));

    let record = svc.collect(P1).await;

    assert_eq!(record.content, "one[page]two");
    assert_eq!(fetcher.request_count(P3), 0);
}

#[tokio::test]
async fn enumerate_all_drops_empty_and_duplicate_fragments() {
    let nav = r#"<a href="1_2.html">2</a><a href="1_3.html">3</a><a href="1_4.html">4</a>"#;
    let fetcher = MockFetcher::new()
        .with_page(P1, &article_page("Story", "one", nav))
        .with_page(P2, &article_page("", "two", nav))
        .with_page(P3, &article_page("", "two", nav))
        .with_page("http://x.com/news/1_4.html", "<p>no body markers</p>");
    let svc = collector(&fetcher, article_config(PaginationMode::EnumerateAll));

    let record = svc.collect(P1).await;

    assert_eq!(record.content, "one[page]two");
    assert_eq!(fetcher.requests().len(), 4);
}

#[tokio::test]
async fn enumerate_all_failed_link_is_omitted() {
    let nav = r#"<a href="1_2.html">2</a><a href="1_3.html">3</a>"#;
    let fetcher = MockFetcher::new()
        .with_page(P1, &article_page("Story", "one", nav))
        .with_page(P3, &article_page("", "three", nav));
    let svc = collector(&fetcher, article_config(PaginationMode::EnumerateAll));

    let record = svc.collect(P1).await;

    assert_eq!(record.content, "one[page]three");
}

#[tokio::test]
async fn images_resolved_against_seed_after_assembly() {
    let fetcher = MockFetcher::new()
        .with_page(
            P1,
            &article_page("Story", r#"<img src="a.jpg">"#, r#"<a href="/news/more/2.html">下一页</a>"#),
        )
        .with_page(
            "http://x.com/news/more/2.html",
            &article_page("", r#"<img src='/img/b.jpg'><img src="https://cdn.y.com/c.jpg">"#, ""),
        );
    let svc = collector(&fetcher, article_config(PaginationMode::NextPage));

    let record = svc.collect(P1).await;

    assert_eq!(
        record.content,
        r#"<img src="http://x.com/news/a.jpg">[page]<img src='http://x.com/img/b.jpg'><img src="https://cdn.y.com/c.jpg">"#
    );
}

#[tokio::test]
async fn independent_contexts_do_not_share_visited_urls() {
    let fetcher = three_page_chain();
    let svc = collector(&fetcher, article_config(PaginationMode::NextPage));

    let first = svc.collect(P1).await;
    let second = svc.collect(P1).await;

    assert_eq!(first.content, second.content);
    assert_eq!(fetcher.request_count(P3), 2);
}

#[tokio::test]
async fn context_rule_set_drives_rules_and_budget_together() {
    let fetcher = three_page_chain();
    let svc = collector(&fetcher, article_config(PaginationMode::NextPage));
    let narrow = ExtractionConfig {
        max_pages: 1,
        join_mode: JoinMode::Concat,
        ..article_config(PaginationMode::NextPage)
    }
    .compile()
    .unwrap();
    let mut ctx = CrawlContext::new(P1, &narrow);

    let record = svc.collect_with(&mut ctx, Utc::now()).await;

    assert_eq!(record.content, "part onepart two");
    assert_eq!(ctx.pages_fetched, 1);
    assert_eq!(ctx.current_url, P2);
}
