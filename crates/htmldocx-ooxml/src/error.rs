//! Error types for OOXML operations

use thiserror::Error;

/// Errors that can occur during package assembly
#[derive(Error, Debug)]
pub enum OoxmlError {
    /// Error reading or writing the ZIP archive
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Error reading or writing files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing XML content
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// HTML could not be converted into an element tree
    #[error("Tree conversion error: {0}")]
    Tree(#[from] htmldocx_core::TreeError),

    /// The element renderer failed
    #[error("Render error: {0}")]
    Render(String),

    /// A part was written to the package twice
    #[error("Part already written: {0}")]
    DuplicatePart(String),

    /// Required file not found in archive
    #[error("Required file not found: {0}")]
    MissingFile(String),

    /// Invalid package structure (dangling relationship, uncovered part)
    #[error("Invalid package structure: {0}")]
    InvalidStructure(String),

    /// JSON options could not be parsed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML options could not be parsed
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

/// Result type for OOXML operations
pub type Result<T> = std::result::Result<T, OoxmlError>;
