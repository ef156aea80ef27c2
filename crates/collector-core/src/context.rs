use std::collections::HashSet;

use crate::config::CompiledConfig;

/// URLs already fetched within one top-level extraction call.
///
/// Grows monotonically; insertion order is kept for inspection.
#[derive(Debug, Clone, Default)]
pub struct VisitedSet {
    seen: HashSet<String>,
    order: Vec<String>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `url`; returns false if it was already present.
    pub fn insert(&mut self, url: &str) -> bool {
        if self.seen.contains(url) {
            return false;
        }
        self.seen.insert(url.to_string());
        self.order.push(url.to_string());
        true
    }

    pub fn contains(&self, url: &str) -> bool {
        self.seen.contains(url)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// URLs in the order they were first recorded.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}

/// Per-call state threaded through every pagination step.
///
/// One context belongs to exactly one seed URL; parallel extractions each
/// own their own.
#[derive(Debug)]
pub struct CrawlContext<'c> {
    pub config: &'c CompiledConfig,
    pub seed_url: String,
    /// The page currently being fetched or sliced.
    pub current_url: String,
    pub visited: VisitedSet,
    /// Pagination fetches made so far (the seed page is not counted).
    pub pages_fetched: usize,
}

impl<'c> CrawlContext<'c> {
    pub fn new(seed_url: &str, config: &'c CompiledConfig) -> Self {
        Self {
            config,
            seed_url: seed_url.to_string(),
            current_url: seed_url.to_string(),
            visited: VisitedSet::new(),
            pages_fetched: 0,
        }
    }

    /// Returns true once the pagination budget is spent.
    pub fn budget_exhausted(&self) -> bool {
        self.pages_fetched >= self.config.settings.max_pages
    }
}
