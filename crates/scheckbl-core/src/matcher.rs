//! Exact and substring matching
//!
//! `check` answers exact membership of a keyword, `find` answers whether any
//! entry occurs inside a larger text. Both honour the category's case policy.

use std::collections::HashSet;

use aho_corasick::AhoCorasick;
use log::warn;

use crate::types::CasePolicy;

// =============================================================================
// Exact Matching
// =============================================================================

/// Hash index over a dataset for exact keyword lookups.
pub struct ExactMatcher {
    policy: CasePolicy,
    keys: HashSet<String>,
}

impl ExactMatcher {
    pub fn new(entries: &[String], policy: CasePolicy) -> Self {
        let keys = entries
            .iter()
            .filter(|entry| !entry.is_empty())
            .map(|entry| policy.fold(entry).into_owned())
            .collect();
        Self { policy, keys }
    }

    /// True when `keyword` equals some entry. An empty keyword never matches.
    pub fn check(&self, keyword: &str) -> bool {
        if keyword.is_empty() {
            return false;
        }
        let keyword = self.policy.fold(keyword);
        self.keys.contains(&*keyword)
    }
}

/// Linear exact lookup over an entry slice.
pub fn check(entries: &[String], keyword: &str, policy: CasePolicy) -> bool {
    if keyword.is_empty() {
        return false;
    }
    let keyword = policy.fold(keyword);
    entries.iter().any(|entry| policy.fold(entry) == keyword)
}

// =============================================================================
// Substring Scanning
// =============================================================================

enum ScanStrategy {
    Empty,
    Automaton(AhoCorasick),
    Naive(Vec<String>),
}

/// Multi-pattern scanner built once per dataset.
///
/// Scanning a text of length L costs O(L) regardless of how many entries the
/// category holds.
pub struct SubstringScanner {
    policy: CasePolicy,
    strategy: ScanStrategy,
}

impl SubstringScanner {
    pub fn new(entries: &[String], policy: CasePolicy) -> Self {
        let patterns: Vec<String> = entries
            .iter()
            .filter(|entry| !entry.is_empty())
            .map(|entry| policy.fold(entry).into_owned())
            .collect();

        let strategy = if patterns.is_empty() {
            ScanStrategy::Empty
        } else {
            match AhoCorasick::new(&patterns) {
                Ok(automaton) => ScanStrategy::Automaton(automaton),
                Err(e) => {
                    warn!(
                        "Failed to build automaton over {} entries, scanning naively: {}",
                        patterns.len(),
                        e
                    );
                    ScanStrategy::Naive(patterns)
                }
            }
        };

        Self { policy, strategy }
    }

    /// True when any entry occurs as a contiguous substring of `text`.
    pub fn find(&self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }

        let text = self.policy.fold(text);
        let text: &str = &text;
        match &self.strategy {
            ScanStrategy::Empty => false,
            ScanStrategy::Automaton(automaton) => automaton.is_match(text),
            ScanStrategy::Naive(patterns) => patterns.iter().any(|p| text.contains(p.as_str())),
        }
    }
}

/// One-shot substring scan over an entry slice.
pub fn find(entries: &[String], text: &str, policy: CasePolicy) -> bool {
    SubstringScanner::new(entries, policy).find(text)
}
