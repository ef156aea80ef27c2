//! Field rules: the `PREFIX[内容]SUFFIX` mini-language and the slicer that runs it.
//!
//! A rule without the marker is a constant that is copied verbatim into the
//! record. A rule with exactly one marker slices the text between the first
//! `PREFIX` and the first `SUFFIX` that follows it. Matching is literal and
//! first-occurrence on both ends, not balanced, so a suffix that also occurs
//! inside nested markup truncates early.

use crate::error::AppError;

/// Placeholder separating the prefix and suffix of an extraction rule.
pub const CONTENT_MARKER: &str = "[内容]";

/// A compiled field rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// Used as the field value for every page; needs no fetch.
    Literal(String),
    /// Slice strictly between `prefix` and `suffix`, CR/LF already removed.
    Slice { prefix: String, suffix: String },
}

impl Rule {
    /// Compile a raw rule string for `field`.
    ///
    /// More than one `[内容]` marker is rejected: multi-slice rules have no
    /// defined meaning.
    pub fn compile(field: &str, raw: &str) -> Result<Self, AppError> {
        match raw.matches(CONTENT_MARKER).count() {
            0 => Ok(Rule::Literal(raw.to_string())),
            1 => {
                let (prefix, suffix) = raw.split_once(CONTENT_MARKER).unwrap_or((raw, ""));
                Ok(Rule::Slice {
                    prefix: strip_line_breaks(prefix),
                    suffix: strip_line_breaks(suffix),
                })
            }
            n => Err(AppError::InvalidRule {
                field: field.to_string(),
                reason: format!("found {n} '{CONTENT_MARKER}' markers, exactly one is supported"),
            }),
        }
    }

    /// Returns true if the rule reads from the fetched page.
    pub fn is_slice(&self) -> bool {
        matches!(self, Rule::Slice { .. })
    }

    /// Run the rule against a page.
    ///
    /// `None` means the prefix or suffix was not found (a rule mismatch),
    /// which is distinct from `Some("")` for a legitimately empty field.
    pub fn apply(&self, html: &str) -> Option<String> {
        match self {
            Rule::Literal(value) => Some(value.clone()),
            Rule::Slice { prefix, suffix } => cut(html, prefix, suffix),
        }
    }
}

impl Default for Rule {
    fn default() -> Self {
        Rule::Literal(String::new())
    }
}

/// Remove every CR and LF from `s`.
pub fn strip_line_breaks(s: &str) -> String {
    s.replace(['\r', '\n'], "")
}

/// Return the trimmed text between the first `prefix` and the first `suffix` after it.
///
/// CR/LF are stripped from all three inputs first. An empty `prefix` anchors at
/// the start of the page and an empty `suffix` runs to its end.
pub fn cut(html: &str, prefix: &str, suffix: &str) -> Option<String> {
    let html = strip_line_breaks(html);
    let prefix = strip_line_breaks(prefix);
    let suffix = strip_line_breaks(suffix);

    let (_, rest) = html.split_once(prefix.as_str())?;
    if suffix.is_empty() {
        return Some(rest.trim().to_string());
    }
    let (inner, _) = rest.split_once(suffix.as_str())?;
    Some(inner.trim().to_string())
}
