//! htmldocx-core - HTML input handling
//!
//! Converts HTML strings into the `htmldocx_ast` element tree and provides
//! lenient HTML entity decoding.
//!
//! # Example
//!
//! ```
//! use htmldocx_core::parse_fragment;
//!
//! let fragment = parse_fragment("<p>Hello <b>world</b></p>")?;
//! assert_eq!(fragment.len(), 1);
//! assert_eq!(fragment.text_content(), "Hello world");
//! # Ok::<(), htmldocx_core::TreeError>(())
//! ```

pub mod entities;
pub mod error;
pub mod parser;

pub use entities::decode_entities;
pub use error::{Result, TreeError};
pub use parser::{parse_fragment, HtmlTreeBuilder, TreeBuilder};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
