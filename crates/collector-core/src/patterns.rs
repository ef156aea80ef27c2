//! Compiled regex patterns shared by the link scanner and the image rewriter.

#![allow(clippy::expect_used)]

use std::sync::LazyLock;

use regex::Regex;

/// Closing anchor tag, used to put every anchor on its own line before scanning.
pub static CLOSING_ANCHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</a\s*>").expect("CLOSING_ANCHOR regex"));

/// A single-line `<a href=...>text</a>`.
///
/// The href sits in group 1, 2 or 3 depending on its quoting; the text is group 4.
/// `.` does not cross newlines, so a match never spans two anchors once each
/// `</a>` ends a line.
pub static ANCHOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)<a\b[^>]*?\shref\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>"']+))[^>]*>(.*?)</a\s*>"#,
    )
    .expect("ANCHOR regex")
});

/// Any HTML tag.
pub static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("TAG regex"));

/// The `src` attribute of an `<img>` tag.
///
/// Group 1 is everything from `<img` up to the value; the value is in group
/// 2 (double-quoted), 3 (single-quoted) or 4 (bare).
pub static IMG_SRC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(<img\b[^>]*?\ssrc\s*=\s*)(?:"([^"]*)"|'([^']*)'|([^\s>"']+))"#)
        .expect("IMG_SRC regex")
});
