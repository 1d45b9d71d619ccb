//! Core type definitions for SCheck blocklists
//!
//! These types are shared by the sources, the matching components and the
//! engine facade.

use std::borrow::Cow;
use std::fmt;

use crate::error::{BlocklistError, Result};

// =============================================================================
// Case Policy
// =============================================================================

/// How entries of a category are compared against user input.
///
/// The policy is fixed per category by whoever configures the source; it is
/// never chosen per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CasePolicy {
    /// Exact string equality (the default)
    #[default]
    Sensitive,
    /// Both sides are folded with Unicode lowercasing before comparison
    Insensitive,
}

impl CasePolicy {
    pub fn from_case_sensitive(case_sensitive: bool) -> Self {
        if case_sensitive {
            Self::Sensitive
        } else {
            Self::Insensitive
        }
    }

    #[inline]
    pub fn is_sensitive(self) -> bool {
        self == Self::Sensitive
    }

    /// Fold a string according to this policy. Borrowed when nothing changes.
    #[inline]
    pub fn fold<'a>(self, value: &'a str) -> Cow<'a, str> {
        match self {
            Self::Sensitive => Cow::Borrowed(value),
            Self::Insensitive => Cow::Owned(value.to_lowercase()),
        }
    }
}

// =============================================================================
// Dataset Keys
// =============================================================================

/// Which part of a dataset lookup could not be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupKind {
    Type,
    Category,
    File,
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Type => "blocklist type",
            Self::Category => "category",
            Self::File => "dataset file",
        };
        f.write_str(name)
    }
}

/// Normalized `(type, category[, filename])` triple.
///
/// Identifiers are trimmed and lowercased, so two keys compare equal whenever
/// the lookups they describe would resolve to the same dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DatasetKey {
    pub type_name: String,
    pub category: String,
    pub filename: Option<String>,
}

impl DatasetKey {
    /// Build a key, rejecting empty identifiers.
    pub fn new(type_name: &str, category: &str, filename: Option<&str>) -> Result<Self> {
        let type_name = normalize_identifier(type_name);
        if type_name.is_empty() {
            return Err(BlocklistError::InvalidArgument(
                "blocklist type must not be empty".to_string(),
            ));
        }

        let category = normalize_identifier(category);
        if category.is_empty() {
            return Err(BlocklistError::InvalidArgument(
                "category must not be empty".to_string(),
            ));
        }

        let filename = match filename.map(normalize_identifier) {
            Some(name) if name.is_empty() => {
                return Err(BlocklistError::InvalidArgument(
                    "filename must not be empty".to_string(),
                ));
            }
            other => other,
        };

        Ok(Self {
            type_name,
            category,
            filename,
        })
    }

    /// `type/category`, the form used for per-category configuration.
    pub fn category_path(&self) -> String {
        format!("{}/{}", self.type_name, self.category)
    }
}

impl fmt::Display for DatasetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.type_name, self.category)?;
        if let Some(filename) = &self.filename {
            write!(f, "/{}", filename)?;
        }
        Ok(())
    }
}

/// Trim and lowercase an identifier for lookup.
pub fn normalize_identifier(value: &str) -> String {
    value.trim().to_lowercase()
}

// =============================================================================
// Similarity Results
// =============================================================================

/// An entry paired with its normalized similarity score in `[0.0, 1.0]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityResult {
    pub entry: String,
    pub score: f64,
}

impl SimilarityResult {
    pub fn new(entry: impl Into<String>, score: f64) -> Self {
        Self {
            entry: entry.into(),
            score,
        }
    }

    pub fn as_pair(&self) -> (&str, f64) {
        (&self.entry, self.score)
    }
}
