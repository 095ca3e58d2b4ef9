//! Structured error types shared by the strucdev crates.

use thiserror::Error;

/// Unified error type for all strucdev operations.
#[derive(Debug, Error)]
pub enum StrucdevError {
    /// I/O error (file not found, permission denied, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error (malformed structure record, bad atom-group text)
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid input (empty selection, unresolved atoms, bad arguments)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Two point sets of different cardinality were compared.
    #[error("point set sizes differ: {left} vs {right}")]
    ShapeMismatch { left: usize, right: usize },

    /// The requested geometry is undefined (too few or collinear points).
    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    /// Malformed file layout (unbalanced MODEL/ENDMDL) or report serialization failure
    #[error("format error: {0}")]
    Format(String),

    /// Catch-all for other errors
    #[error("{0}")]
    Other(String),

    /// An error raised while handling one named item (a member, a pair).
    #[error("{item}: {source}")]
    Item {
        item: String,
        #[source]
        source: Box<StrucdevError>,
    },
}

impl StrucdevError {
    /// Attribute this error to `item`.
    pub fn in_item(self, item: impl Into<String>) -> Self {
        StrucdevError::Item {
            item: item.into(),
            source: Box::new(self),
        }
    }
}

/// Convenience alias used throughout the strucdev crates.
pub type Result<T> = std::result::Result<T, StrucdevError>;
