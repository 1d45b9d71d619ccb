//! SCheck Blocklist Core Library
//!
//! This crate provides the matching engine for categorized blocklists. A
//! blocklist type (`phrases`, `urls`, ...) is split into categories
//! (`vulgarisms`, `nsfw`, ...), and each category resolves to an ordered,
//! deduplicated set of entries.
//!
//! # Architecture
//!
//! The engine never locates data on its own. An [`EntrySource`] is injected
//! at construction time and resolves a `(type, category[, filename])` triple
//! into an immutable [`Dataset`] snapshot. Every operation works on its own
//! snapshot, so concurrent callers need no locking.
//!
//! # Modules
//!
//! - `types`: Dataset keys, case policy and similarity results
//! - `error`: Error taxonomy shared by every operation
//! - `dataset`: Immutable dataset snapshots with lazily built indexes
//! - `source`: The `EntrySource` trait and an in-memory source
//! - `matcher`: Exact keyword matching and substring scanning
//! - `filter`: Regex filtering of entries
//! - `similarity`: Levenshtein scoring and ranking
//! - `engine`: The `Blocklist` facade with `check`/`find`/`get`/`similar`

pub mod dataset;
pub mod engine;
pub mod error;
pub mod filter;
pub mod matcher;
pub mod similarity;
pub mod source;
pub mod types;

// Re-export commonly used types
pub use dataset::Dataset;
pub use engine::{Blocklist, DEFAULT_THRESHOLD};
pub use error::{BlocklistError, Result};
pub use filter::PatternFilter;
pub use matcher::SubstringScanner;
pub use similarity::{levenshtein, similarity, SimilarityRanker};
pub use source::{EntrySource, MemorySource};
pub use types::{CasePolicy, DatasetKey, LookupKind, SimilarityResult};
