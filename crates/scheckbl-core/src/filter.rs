//! Regex filtering of dataset entries.

use regex::Regex;

use crate::error::Result;

/// A compiled pattern applied with search semantics: an entry is kept when
/// the pattern matches anywhere inside it.
#[derive(Debug, Clone)]
pub struct PatternFilter {
    regex: Regex,
}

impl PatternFilter {
    /// Compile `pattern`. Syntax errors are returned as `BlocklistError::Pattern`.
    pub fn new(pattern: &str) -> Result<Self> {
        Ok(Self {
            regex: Regex::new(pattern)?,
        })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    #[inline]
    pub fn is_match(&self, entry: &str) -> bool {
        self.regex.is_match(entry)
    }

    /// Keep matching entries, preserving their relative order.
    pub fn apply(&self, entries: &[String]) -> Vec<String> {
        entries
            .iter()
            .filter(|entry| self.is_match(entry))
            .cloned()
            .collect()
    }
}

/// Compile `pattern` and filter `entries` with it.
pub fn filter(entries: &[String], pattern: &str) -> Result<Vec<String>> {
    Ok(PatternFilter::new(pattern)?.apply(entries))
}
