//! Regex filter chains applied to extracted fields.
//!
//! A filter spec holds one `REGEX[|]REPLACEMENT` pair per line. All patterns
//! run in a single pass over the same input: at every position the leftmost
//! match among all patterns is replaced (ties go to the earlier line), so a
//! replacement is never seen by another pattern.

use regex::{Captures, Regex, RegexBuilder};

use crate::error::AppError;

/// Separator between the pattern and the replacement on a filter line.
pub const FILTER_SEPARATOR: &str = "[|]";

#[derive(Debug, Clone)]
struct Filter {
    regex: Regex,
    replacement: String,
}

/// An ordered set of case-insensitive substitutions.
#[derive(Debug, Clone, Default)]
pub struct FilterChain {
    filters: Vec<Filter>,
}

impl FilterChain {
    /// Compile a multi-line filter spec for `field`.
    ///
    /// Blank lines are ignored. A line without `[|]` or with an invalid
    /// pattern is a configuration error.
    pub fn compile(field: &str, spec: &str) -> Result<Self, AppError> {
        let mut filters = Vec::new();
        for (idx, line) in spec.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }

            let malformed = |text: String| AppError::MalformedFilter {
                field: field.to_string(),
                line: idx + 1,
                text,
            };

            let (pattern, replacement) = line
                .split_once(FILTER_SEPARATOR)
                .ok_or_else(|| malformed(format!("missing '{FILTER_SEPARATOR}' in {line:?}")))?;
            let regex = RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| malformed(format!("invalid pattern {pattern:?}: {e}")))?;

            filters.push(Filter {
                regex,
                replacement: replacement.to_string(),
            });
        }
        Ok(Self { filters })
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Apply every filter to `input` in one batched pass.
    ///
    /// Each filter's next match is kept between steps and only searched
    /// again once the scan has moved past its start, so every filter walks
    /// the input once.
    pub fn apply(&self, input: &str) -> String {
        if self.filters.is_empty() {
            return input.to_string();
        }

        let mut pending: Vec<Option<Captures<'_>>> = self
            .filters
            .iter()
            .map(|filter| filter.regex.captures_at(input, 0))
            .collect();

        let mut out = String::with_capacity(input.len());
        let mut pos = 0;
        while let Some(idx) = leftmost(&pending) {
            let Some(m) = pending[idx].as_ref().and_then(|caps| caps.get(0)) else {
                break;
            };
            out.push_str(&input[pos..m.start()]);
            if let Some(caps) = &pending[idx] {
                caps.expand(&self.filters[idx].replacement, &mut out);
            }

            if m.end() > m.start() {
                pos = m.end();
            } else {
                // Empty match: copy one char so the scan advances.
                match input[m.end()..].chars().next() {
                    Some(c) => {
                        out.push(c);
                        pos = m.end() + c.len_utf8();
                    }
                    None => {
                        pos = input.len();
                        break;
                    }
                }
            }

            for (filter, slot) in self.filters.iter().zip(pending.iter_mut()) {
                if slot.as_ref().is_some_and(|caps| match_start(caps) < pos) {
                    *slot = filter.regex.captures_at(input, pos);
                }
            }
        }
        out.push_str(&input[pos..]);
        out
    }
}

fn match_start(caps: &Captures<'_>) -> usize {
    caps.get(0).map_or(usize::MAX, |m| m.start())
}

/// Index of the pending match that starts first; ties go to the earlier filter.
fn leftmost(pending: &[Option<Captures<'_>>]) -> Option<usize> {
    pending
        .iter()
        .enumerate()
        .filter_map(|(idx, slot)| slot.as_ref().map(|caps| (idx, match_start(caps))))
        .min_by_key(|&(idx, start)| (start, idx))
        .map(|(idx, _)| idx)
}
