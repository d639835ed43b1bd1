//! # htmldocx-ooxml
//!
//! WordprocessingML package assembly for htmldocx.
//!
//! This crate provides functionality to:
//! - Render an HTML element tree into WordprocessingML body content
//! - Assemble the parts, relationships and content types of a `.docx`
//! - Read finished packages back and check their integrity
//!
//! ## Example: Converting HTML
//!
//! ```no_run
//! use htmldocx_ooxml::{html_to_docx, RawDocumentOptions};
//!
//! let options = RawDocumentOptions {
//!     title: Some("Report".to_string()),
//!     footer: Some(true),
//!     ..Default::default()
//! };
//! let bytes = html_to_docx("<h1>Report</h1><p>Body</p>", None, Some("<p>Page 1</p>"), &options)?;
//! std::fs::write("report.docx", bytes)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod archive;
pub mod assembler;
pub mod content_types;
pub mod error;
pub mod fields;
pub mod options;
pub mod parts;
pub mod relationships;
pub mod render;
pub mod units;
pub mod xml;

#[cfg(test)]
mod test_utils;

pub use archive::OoxmlArchive;
pub use assembler::{html_to_docx, DocxAssembler};
pub use content_types::ContentTypes;
pub use error::{OoxmlError, Result};
pub use fields::{PageNumberFields, SeparatorSpelling};
pub use options::{DocumentOptions, Orientation, RawDocumentOptions};
pub use relationships::Relationships;
pub use render::{ElementRenderer, RenderContext, WordRenderer};
pub use units::{Measure, RawLength};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
