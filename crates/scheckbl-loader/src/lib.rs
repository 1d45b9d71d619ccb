//! SCheck Blocklist Dataset Loader
//!
//! This crate reads blocklist datasets from a directory tree and serves them
//! to the core engine through `DirectorySource`.

pub mod config;
pub mod directory;
pub mod parser;

pub use config::{ConfigError, SourceConfig};
pub use directory::DirectorySource;
pub use parser::parse_dataset;
