//! Blocklist Engine
//!
//! Facade exposing the four operations. Each call validates its arguments,
//! resolves a fresh dataset snapshot from the injected source and then runs
//! the matching component against that snapshot.

use std::sync::Arc;

use log::debug;

use crate::dataset::Dataset;
use crate::error::Result;
use crate::filter::PatternFilter;
use crate::similarity::SimilarityRanker;
use crate::source::EntrySource;
use crate::types::{DatasetKey, SimilarityResult};

/// Threshold used by `similar` when the caller does not pick one.
pub const DEFAULT_THRESHOLD: f64 = 0.6;

/// The matching engine over an injected entry source.
pub struct Blocklist<S> {
    source: S,
}

impl<S: EntrySource> Blocklist<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Resolve a dataset snapshot directly.
    pub fn dataset(&self, type_name: &str, category: &str, filename: Option<&str>) -> Result<Arc<Dataset>> {
        let key = DatasetKey::new(type_name, category, filename)?;
        self.source.resolve(&key)
    }

    /// Whether `keyword` exactly equals an entry of the category.
    pub fn check(&self, type_name: &str, category: &str, keyword: &str) -> Result<bool> {
        let dataset = self.dataset(type_name, category, None)?;
        let found = dataset.check(keyword);
        debug!("check {}: {:?} -> {}", dataset.key(), keyword, found);
        Ok(found)
    }

    /// Whether any entry of the category occurs inside `text`.
    pub fn find(&self, type_name: &str, category: &str, text: &str) -> Result<bool> {
        let dataset = self.dataset(type_name, category, None)?;
        let found = dataset.find(text);
        debug!("find {}: {} bytes of text -> {}", dataset.key(), text.len(), found);
        Ok(found)
    }

    /// The category's entries, optionally narrowed by a regex.
    ///
    /// An invalid regex is reported before the dataset is resolved.
    pub fn get(
        &self,
        type_name: &str,
        category: &str,
        filename: Option<&str>,
        regex: Option<&str>,
    ) -> Result<Vec<String>> {
        let key = DatasetKey::new(type_name, category, filename)?;
        let filter = regex.map(PatternFilter::new).transpose()?;
        let dataset = self.source.resolve(&key)?;

        let entries = match &filter {
            Some(filter) => dataset.filter(filter),
            None => dataset.entries().to_vec(),
        };
        debug!(
            "get {}: {} of {} entries (pattern: {:?})",
            key,
            entries.len(),
            dataset.len(),
            filter.as_ref().map(PatternFilter::as_str)
        );
        Ok(entries)
    }

    /// Entries similar to `phrase`, best first.
    ///
    /// The threshold is validated before the dataset is resolved, so an
    /// out-of-range value never scores anything.
    pub fn similar(
        &self,
        type_name: &str,
        category: &str,
        phrase: &str,
        threshold: f64,
    ) -> Result<Vec<SimilarityResult>> {
        let key = DatasetKey::new(type_name, category, None)?;
        let ranker = SimilarityRanker::new(threshold)?;
        let dataset = self.source.resolve(&key)?;
        Ok(dataset.rank(&ranker, phrase))
    }
}
