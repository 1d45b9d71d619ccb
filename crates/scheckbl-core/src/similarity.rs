//! Similarity Ranking
//!
//! Scores entries against a phrase with normalized Levenshtein similarity:
//!
//! ```text
//! score = 1 - distance(a, b) / max(len(a), len(b))
//! ```
//!
//! Lengths count Unicode scalar values. Two empty strings score `1.0`.
//!
//! This is the most expensive operation in the engine: every entry costs a
//! full edit-distance computation, so the phrase is decoded once per call, a
//! single DP row is reused across entries, and entries whose length alone rules
//! them out are skipped.

use log::debug;

use crate::error::{BlocklistError, Result};
use crate::types::{CasePolicy, SimilarityResult};

// =============================================================================
// Edit Distance
// =============================================================================

/// Levenshtein distance between two strings, counted in chars.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut row = Vec::new();
    levenshtein_chars(&a, &b, &mut row)
}

/// Rolling-row Levenshtein. `row` is scratch space sized to the shorter input.
fn levenshtein_chars(a: &[char], b: &[char], row: &mut Vec<usize>) -> usize {
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    if short.is_empty() {
        return long.len();
    }

    row.clear();
    row.extend(0..=short.len());

    for (i, long_ch) in long.iter().enumerate() {
        // row[j] holds the previous row until overwritten below
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, short_ch) in short.iter().enumerate() {
            let above = row[j + 1];
            let cost = usize::from(long_ch != short_ch);
            row[j + 1] = (above + 1).min(row[j] + 1).min(diagonal + cost);
            diagonal = above;
        }
    }

    row[short.len()]
}

#[inline]
fn score_from_distance(distance: usize, len_a: usize, len_b: usize) -> f64 {
    let longest = len_a.max(len_b);
    if longest == 0 {
        return 1.0;
    }
    1.0 - distance as f64 / longest as f64
}

/// Normalized similarity in `[0.0, 1.0]`; `1.0` iff the strings are identical.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut row = Vec::new();
    let distance = levenshtein_chars(&a, &b, &mut row);
    score_from_distance(distance, a.len(), b.len())
}

// =============================================================================
// Ranker
// =============================================================================

/// Ranks entries by similarity to a phrase, keeping scores at or above a
/// validated threshold.
#[derive(Debug, Clone, Copy)]
pub struct SimilarityRanker {
    threshold: f64,
}

impl SimilarityRanker {
    /// Fails with `InvalidArgument` unless `threshold` lies in `[0.0, 1.0]`.
    pub fn new(threshold: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(BlocklistError::InvalidArgument(format!(
                "threshold must be between 0.0 and 1.0, got {}",
                threshold
            )));
        }
        Ok(Self { threshold })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Score every entry, drop those below the threshold and sort by score
    /// descending. Equal scores keep dataset order.
    pub fn rank(&self, entries: &[String], phrase: &str, policy: CasePolicy) -> Vec<SimilarityResult> {
        let phrase: Vec<char> = policy.fold(phrase).chars().collect();
        let mut row = Vec::with_capacity(phrase.len() + 1);
        let mut entry_chars = Vec::new();
        let mut skipped = 0usize;
        let mut results = Vec::new();

        for entry in entries {
            entry_chars.clear();
            entry_chars.extend(policy.fold(entry).chars());

            // |len(a) - len(b)| is a lower bound on the distance
            let length_gap = phrase.len().abs_diff(entry_chars.len());
            if score_from_distance(length_gap, phrase.len(), entry_chars.len()) < self.threshold {
                skipped += 1;
                continue;
            }

            let distance = levenshtein_chars(&phrase, &entry_chars, &mut row);
            let score = score_from_distance(distance, phrase.len(), entry_chars.len());
            if score >= self.threshold {
                results.push(SimilarityResult::new(entry.as_str(), score));
            }
        }

        // Stable sort keeps dataset order on ties
        results.sort_by(|a, b| b.score.total_cmp(&a.score));

        debug!(
            "Ranked {} entries at threshold {}: {} kept, {} skipped by length",
            entries.len(),
            self.threshold,
            results.len(),
            skipped
        );

        results
    }
}

/// Validate `threshold` and rank `entries` case-sensitively.
pub fn rank(entries: &[String], phrase: &str, threshold: f64) -> Result<Vec<SimilarityResult>> {
    Ok(SimilarityRanker::new(threshold)?.rank(entries, phrase, CasePolicy::Sensitive))
}
