//! htmldocx CLI - Command-line interface library
//!
//! This library provides the CLI functionality for htmldocx:
//! - Convert: HTML body (plus optional header and footer) to DOCX
//! - Inspect: list the parts and relationships of a DOCX package
//!
//! # Library Usage
//!
//! ```ignore
//! use htmldocx_cli::{convert_command, ConvertArgs};
//!
//! let args = ConvertArgs {
//!     input: "report.html".into(),
//!     footer: true,
//!     ..Default::default()
//! };
//! let written = convert_command(&args)?;
//! ```
//!
//! # Binary Usage
//!
//! ```bash
//! # Convert with a paginated footer
//! htmldocx convert report.html --footer-html footer.html -o report.docx
//!
//! # Options from a file, overridden by flags
//! htmldocx convert report.html --options docx.toml --orientation landscape
//!
//! # Look inside a package
//! htmldocx inspect report.docx --format json
//! ```

pub mod app;

// Re-export main entry point and types
pub use app::{
    convert_command, inspect_command, inspect_package, resolve_options, run_cli, ConvertArgs,
    OrientationArg, OutputFormat, PackageReport,
};
