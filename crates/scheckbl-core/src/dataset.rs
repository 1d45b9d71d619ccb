//! Immutable dataset snapshots.
//!
//! A `Dataset` is what an `EntrySource` hands to the engine. It has no
//! mutators: once built, its entries and case policy stay fixed for as long
//! as anyone holds it. Lookup structures are built on first use and shared by
//! every later operation on the same snapshot.

use std::collections::HashSet;
use std::sync::OnceLock;

use log::debug;

use crate::filter::PatternFilter;
use crate::matcher::{ExactMatcher, SubstringScanner};
use crate::similarity::SimilarityRanker;
use crate::types::{CasePolicy, DatasetKey, SimilarityResult};

pub struct Dataset {
    key: DatasetKey,
    entries: Vec<String>,
    policy: CasePolicy,
    exact: OnceLock<ExactMatcher>,
    scanner: OnceLock<SubstringScanner>,
}

impl Dataset {
    /// Build a snapshot from raw entries.
    ///
    /// Entries are trimmed, blank entries are dropped and exact duplicates
    /// keep only their first occurrence.
    pub fn new(key: DatasetKey, entries: Vec<String>, policy: CasePolicy) -> Self {
        let before = entries.len();
        let mut seen: HashSet<String> = HashSet::with_capacity(before);
        let mut kept = Vec::with_capacity(before);

        for entry in entries {
            let trimmed = entry.trim();
            if trimmed.is_empty() || seen.contains(trimmed) {
                continue;
            }
            seen.insert(trimmed.to_string());
            kept.push(if trimmed.len() == entry.len() {
                entry
            } else {
                trimmed.to_string()
            });
        }

        if kept.len() != before {
            debug!(
                "Dataset {}: {} -> {} entries (removed {} blank or duplicate)",
                key,
                before,
                kept.len(),
                before - kept.len()
            );
        }

        Self {
            key,
            entries: kept,
            policy,
            exact: OnceLock::new(),
            scanner: OnceLock::new(),
        }
    }

    pub fn key(&self) -> &DatasetKey {
        &self.key
    }

    /// Entries in authored order.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn case_policy(&self) -> CasePolicy {
        self.policy
    }

    /// Exact keyword membership.
    pub fn check(&self, keyword: &str) -> bool {
        self.exact
            .get_or_init(|| ExactMatcher::new(&self.entries, self.policy))
            .check(keyword)
    }

    /// Whether any entry occurs inside `text`.
    pub fn find(&self, text: &str) -> bool {
        self.scanner
            .get_or_init(|| SubstringScanner::new(&self.entries, self.policy))
            .find(text)
    }

    pub fn filter(&self, filter: &PatternFilter) -> Vec<String> {
        filter.apply(&self.entries)
    }

    pub fn rank(&self, ranker: &SimilarityRanker, phrase: &str) -> Vec<SimilarityResult> {
        ranker.rank(&self.entries, phrase, self.policy)
    }
}

impl std::fmt::Debug for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dataset")
            .field("key", &self.key)
            .field("entries", &self.entries.len())
            .field("policy", &self.policy)
            .finish()
    }
}
