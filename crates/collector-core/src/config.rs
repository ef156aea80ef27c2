use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::filter::FilterChain;
use crate::rule::Rule;

/// Placeholder in a `Sequential` URL template replaced by the page number.
pub const PAGE_PLACEHOLDER: &str = "(*)";

/// Default anchor text that marks a "next page" link.
pub const DEFAULT_NEXT_PAGE_LABEL: &str = "下一页";

/// Default cap on pagination fetches per top-level page.
pub const DEFAULT_MAX_PAGES: usize = 100;

/// How body content spanning several physical pages is discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaginationMode {
    /// Follow anchors whose text contains `next_page_label`, page by page.
    #[default]
    NextPage,
    /// Fetch every distinct link in the pagination region of the first page.
    EnumerateAll,
}

/// How page fragments are joined into one content field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinMode {
    /// Join with a literal `[page]` marker.
    #[default]
    PageMarkerJoin,
    /// Join with no separator.
    Concat,
}

/// Where list-page URLs come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    /// `url_template` with a `(*)` page-number placeholder.
    #[default]
    Sequential,
    /// `url_template` holds one URL per line.
    ExplicitList,
    /// `url_template` is the only list page.
    Single,
    /// `url_template` is an RSS/Atom feed.
    Rss,
}

/// A user-defined extra field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomFieldRule {
    pub name: String,
    #[serde(default)]
    pub rule: String,
    #[serde(default)]
    pub filter: String,
}

/// Declarative rule set for one collection source, as stored by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub title_rule: String,
    pub title_filter: String,
    pub type_rule: String,
    pub type_filter: String,
    pub content_rule: String,
    pub content_filter: String,
    pub custom_fields: Vec<CustomFieldRule>,

    pub page_region_start: String,
    pub page_region_end: String,
    pub pagination_mode: PaginationMode,
    pub next_page_label: String,
    pub join_mode: JoinMode,
    pub max_pages: usize,

    pub source_type: SourceType,
    pub url_template: String,
    pub page_start: u32,
    pub page_end: u32,
    pub page_step: u32,
    pub source_charset: String,
    pub list_region_start: String,
    pub list_region_end: String,
    pub url_must_contain: String,
    pub url_must_not_contain: String,
    pub base_url_override: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            title_rule: String::new(),
            title_filter: String::new(),
            type_rule: String::new(),
            type_filter: String::new(),
            content_rule: String::new(),
            content_filter: String::new(),
            custom_fields: Vec::new(),
            page_region_start: String::new(),
            page_region_end: String::new(),
            pagination_mode: PaginationMode::NextPage,
            next_page_label: DEFAULT_NEXT_PAGE_LABEL.to_string(),
            join_mode: JoinMode::PageMarkerJoin,
            max_pages: DEFAULT_MAX_PAGES,
            source_type: SourceType::Sequential,
            url_template: String::new(),
            page_start: 1,
            page_end: 1,
            page_step: 1,
            source_charset: "utf-8".to_string(),
            list_region_start: String::new(),
            list_region_end: String::new(),
            url_must_contain: String::new(),
            url_must_not_contain: String::new(),
            base_url_override: String::new(),
        }
    }
}

impl ExtractionConfig {
    /// Parse a rule set from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, AppError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a rule set from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::ConfigError(format!(
                "Failed to read rule file {}: {e}",
                path.display()
            ))
        })?;
        Self::from_json_str(&raw)
    }

    /// Returns true if a pagination region is configured.
    pub fn has_pagination(&self) -> bool {
        !self.page_region_start.is_empty() || !self.page_region_end.is_empty()
    }

    /// Validate the rule set and compile every rule and filter once.
    pub fn compile(self) -> Result<CompiledConfig, AppError> {
        self.validate_settings()?;

        let title = CompiledField::compile("title", &self.title_rule, &self.title_filter)?;
        let category = CompiledField::compile("type", &self.type_rule, &self.type_filter)?;
        let content = CompiledField::compile("content", &self.content_rule, &self.content_filter)?;

        let mut custom_fields = Vec::with_capacity(self.custom_fields.len());
        for field in &self.custom_fields {
            if field.name.trim().is_empty() {
                return Err(AppError::ConfigError("custom field with empty name".into()));
            }
            if custom_fields
                .iter()
                .any(|f: &CompiledField| f.name == field.name)
            {
                return Err(AppError::ConfigError(format!(
                    "duplicate custom field '{}'",
                    field.name
                )));
            }
            custom_fields.push(CompiledField::compile(
                &field.name,
                &field.rule,
                &field.filter,
            )?);
        }

        Ok(CompiledConfig {
            settings: self,
            title,
            category,
            content,
            custom_fields,
        })
    }

    fn validate_settings(&self) -> Result<(), AppError> {
        if self.page_step == 0 {
            return Err(AppError::ConfigError("page_step must be at least 1".into()));
        }
        if self.source_type == SourceType::Sequential {
            if !self.url_template.contains(PAGE_PLACEHOLDER) {
                return Err(AppError::ConfigError(format!(
                    "sequential url_template must contain '{PAGE_PLACEHOLDER}'"
                )));
            }
            if self.page_end < self.page_start {
                return Err(AppError::ConfigError(format!(
                    "page_end {} is below page_start {}",
                    self.page_end, self.page_start
                )));
            }
        }
        if self.has_pagination()
            && self.pagination_mode == PaginationMode::NextPage
            && self.next_page_label.is_empty()
        {
            return Err(AppError::ConfigError(
                "next_page_label is required in next_page mode".into(),
            ));
        }
        if self.max_pages == 0 {
            return Err(AppError::ConfigError("max_pages must be at least 1".into()));
        }
        Ok(())
    }
}

/// A field rule with its filter chain, compiled once and reused across pages.
#[derive(Debug, Clone)]
pub struct CompiledField {
    pub name: String,
    pub rule: Rule,
    pub filter: FilterChain,
}

impl CompiledField {
    pub fn compile(name: &str, rule: &str, filter: &str) -> Result<Self, AppError> {
        Ok(Self {
            name: name.to_string(),
            rule: Rule::compile(name, rule)?,
            filter: FilterChain::compile(name, filter)?,
        })
    }

    /// Slice the field out of `html` and filter it; `None` on a rule mismatch.
    pub fn extract(&self, html: &str) -> Option<String> {
        self.rule
            .apply(html)
            .map(|value| self.filter.apply(&value))
    }
}

/// A validated rule set, ready for the engine.
#[derive(Debug, Clone)]
pub struct CompiledConfig {
    pub settings: ExtractionConfig,
    pub title: CompiledField,
    pub category: CompiledField,
    pub content: CompiledField,
    pub custom_fields: Vec<CompiledField>,
}
