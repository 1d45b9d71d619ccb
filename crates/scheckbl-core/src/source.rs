//! Entry sources
//!
//! An `EntrySource` turns a dataset key into a `Dataset` snapshot. Where the
//! entries physically live is up to the implementation; the engine only sees
//! this trait.

use std::collections::HashMap;
use std::sync::Arc;

use crate::dataset::Dataset;
use crate::error::{BlocklistError, Result};
use crate::types::{normalize_identifier, CasePolicy, DatasetKey, LookupKind};

/// Resolves `(type, category[, filename])` to an immutable dataset.
///
/// Implementations must distinguish an unknown type, category or file
/// (`BlocklistError::NotFound`) from a category that exists but is empty
/// (an empty `Dataset`), and must never report unreadable storage as empty.
pub trait EntrySource: Send + Sync {
    fn resolve(&self, key: &DatasetKey) -> Result<Arc<Dataset>>;

    /// Normalize the identifiers and resolve them.
    fn resolve_named(
        &self,
        type_name: &str,
        category: &str,
        filename: Option<&str>,
    ) -> Result<Arc<Dataset>> {
        self.resolve(&DatasetKey::new(type_name, category, filename)?)
    }
}

impl<T: EntrySource + ?Sized> EntrySource for Arc<T> {
    fn resolve(&self, key: &DatasetKey) -> Result<Arc<Dataset>> {
        (**self).resolve(key)
    }
}

impl<T: EntrySource + ?Sized> EntrySource for Box<T> {
    fn resolve(&self, key: &DatasetKey) -> Result<Arc<Dataset>> {
        (**self).resolve(key)
    }
}

impl<T: EntrySource + ?Sized> EntrySource for &T {
    fn resolve(&self, key: &DatasetKey) -> Result<Arc<Dataset>> {
        (**self).resolve(key)
    }
}

// =============================================================================
// In-memory Source
// =============================================================================

const DEFAULT_FILE: &str = "default";

#[derive(Debug, Default)]
struct MemoryCategory {
    policy: CasePolicy,
    files: Vec<(String, Vec<String>)>,
}

/// Entry source backed by in-process registrations.
///
/// Categories may hold several named files; resolving a category without a
/// filename concatenates its files in registration order.
#[derive(Debug, Default)]
pub struct MemorySource {
    types: HashMap<String, HashMap<String, MemoryCategory>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`MemorySource::insert`].
    pub fn with_category<I, E>(mut self, type_name: &str, category: &str, entries: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<String>,
    {
        self.insert(type_name, category, entries);
        self
    }

    /// Replace a category's entries with a single default file.
    pub fn insert<I, E>(&mut self, type_name: &str, category: &str, entries: I)
    where
        I: IntoIterator<Item = E>,
        E: Into<String>,
    {
        let slot = self.category_mut(type_name, category);
        slot.files = vec![(
            DEFAULT_FILE.to_string(),
            entries.into_iter().map(Into::into).collect(),
        )];
    }

    /// Add or replace one named file within a category.
    pub fn insert_file<I, E>(&mut self, type_name: &str, category: &str, filename: &str, entries: I)
    where
        I: IntoIterator<Item = E>,
        E: Into<String>,
    {
        let filename = normalize_identifier(filename);
        let entries: Vec<String> = entries.into_iter().map(Into::into).collect();
        let slot = self.category_mut(type_name, category);
        match slot.files.iter_mut().find(|(name, _)| *name == filename) {
            Some((_, existing)) => *existing = entries,
            None => slot.files.push((filename, entries)),
        }
    }

    /// Fix the case policy of a category.
    pub fn set_case_policy(&mut self, type_name: &str, category: &str, policy: CasePolicy) {
        self.category_mut(type_name, category).policy = policy;
    }

    fn category_mut(&mut self, type_name: &str, category: &str) -> &mut MemoryCategory {
        self.types
            .entry(normalize_identifier(type_name))
            .or_default()
            .entry(normalize_identifier(category))
            .or_default()
    }
}

impl EntrySource for MemorySource {
    fn resolve(&self, key: &DatasetKey) -> Result<Arc<Dataset>> {
        let categories = self
            .types
            .get(&key.type_name)
            .ok_or_else(|| BlocklistError::not_found(LookupKind::Type, &key.type_name))?;
        let category = categories
            .get(&key.category)
            .ok_or_else(|| BlocklistError::not_found(LookupKind::Category, &key.category))?;

        let entries = match &key.filename {
            Some(filename) => category
                .files
                .iter()
                .find(|(name, _)| name == filename)
                .map(|(_, entries)| entries.clone())
                .ok_or_else(|| BlocklistError::not_found(LookupKind::File, filename))?,
            None => category
                .files
                .iter()
                .flat_map(|(_, entries)| entries.iter().cloned())
                .collect(),
        };

        Ok(Arc::new(Dataset::new(key.clone(), entries, category.policy)))
    }
}
