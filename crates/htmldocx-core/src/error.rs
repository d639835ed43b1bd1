//! Error types for tree conversion

use thiserror::Error;

/// Errors that can occur while converting HTML into an element tree
#[derive(Error, Debug)]
pub enum TreeError {
    /// Element nesting exceeds what the converter will follow
    #[error("Element nesting exceeds {limit} levels")]
    TooDeep {
        /// Maximum supported depth
        limit: usize,
    },

    /// Other errors
    #[error("{0}")]
    Other(String),
}

/// Result type for tree conversion
pub type Result<T> = std::result::Result<T, TreeError>;
