//! Error taxonomy for blocklist operations.

use std::path::PathBuf;

use crate::types::LookupKind;

/// Error type for every blocklist operation.
///
/// No variant is retried internally; callers decide how each kind is
/// presented.
#[derive(Debug, thiserror::Error)]
pub enum BlocklistError {
    #[error("Unknown {what}: '{name}'")]
    NotFound { what: LookupKind, name: String },
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BlocklistError {
    pub fn not_found(what: LookupKind, name: impl Into<String>) -> Self {
        Self::NotFound {
            what,
            name: name.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, BlocklistError>;
