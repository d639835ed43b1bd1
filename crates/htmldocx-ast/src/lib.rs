//! htmldocx-ast - Element tree definitions
//!
//! This crate provides the generic tree (tag, attributes, children) that
//! HTML input is converted into before it is rendered to WordprocessingML.

pub mod fragment;
pub mod node;

pub use fragment::Fragment;
pub use node::{Element, Node};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
