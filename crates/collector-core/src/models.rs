use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// Literal marker placed between page fragments in `JoinMode::PageMarkerJoin`.
pub const PAGE_MARKER: &str = "[page]";

/// One logical record assembled from a seed URL and all of its pages.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ExtractedRecord {
    /// The seed URL the record was collected from.
    pub url: String,
    pub title: String,
    pub category: String,
    pub content: String,
    pub custom_fields: BTreeMap<String, String>,
    pub fetched_at: DateTime<Utc>,
}

impl ExtractedRecord {
    /// A record with every field empty, returned when the seed page cannot be fetched.
    pub fn empty(url: &str, fetched_at: DateTime<Utc>) -> Self {
        Self {
            url: url.to_string(),
            title: String::new(),
            category: String::new(),
            content: String::new(),
            custom_fields: BTreeMap::new(),
            fetched_at,
        }
    }

    /// Returns true if no field carries a value.
    pub fn is_empty(&self) -> bool {
        self.title.is_empty()
            && self.category.is_empty()
            && self.content.is_empty()
            && self.custom_fields.values().all(String::is_empty)
    }

    /// Number of physical pages the content was assembled from, as seen
    /// through `[page]` markers.
    pub fn page_count(&self) -> usize {
        if self.content.is_empty() {
            0
        } else {
            self.content.matches(PAGE_MARKER).count() + 1
        }
    }

    /// SHA-256 over every extracted field (not `url` or `fetched_at`), for change detection.
    pub fn content_hash(&self) -> String {
        let mut canonical = String::new();
        canonical.push_str(&self.title);
        canonical.push('\u{1f}');
        canonical.push_str(&self.category);
        canonical.push('\u{1f}');
        canonical.push_str(&self.content);
        for (name, value) in &self.custom_fields {
            canonical.push('\u{1f}');
            canonical.push_str(name);
            canonical.push('=');
            canonical.push_str(value);
        }
        compute_hash(&canonical)
    }
}

/// A link found on a list page or inside a pagination region.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CandidateLink {
    pub url: String,
    pub title: String,
}

impl CandidateLink {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
        }
    }
}

/// Compute a SHA-256 hash of a string, returned as 64-char hex.
pub fn compute_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}
