//! HTML fragment parser
//!
//! Parses HTML with `scraper` (html5ever underneath) and copies the result
//! into an owned `htmldocx_ast::Fragment`. Comments, doctypes and
//! processing instructions are dropped.
//!
//! # Example
//!
//! ```ignore
//! use htmldocx_core::parser::{HtmlTreeBuilder, TreeBuilder};
//!
//! let fragment = HtmlTreeBuilder::new().build("<p>Page 1</p>")?;
//! assert_eq!(fragment.nodes[0].as_element().unwrap().tag, "p");
//! ```

use htmldocx_ast::{Element, Fragment, Node};
use scraper::{ElementRef, Html};
use tracing::debug;

use crate::error::{Result, TreeError};

/// Default nesting limit for the recursive copy
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Converts an HTML string into an element tree
pub trait TreeBuilder {
    /// Build a fragment from HTML source
    fn build(&self, html: &str) -> Result<Fragment>;
}

/// `TreeBuilder` backed by the html5ever fragment parser
#[derive(Debug, Clone)]
pub struct HtmlTreeBuilder {
    max_depth: usize,
}

impl Default for HtmlTreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlTreeBuilder {
    /// Create a builder with the default nesting limit
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Set the maximum element nesting depth
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    fn convert_children(&self, parent: ElementRef<'_>, depth: usize) -> Result<Vec<Node>> {
        if depth > self.max_depth {
            return Err(TreeError::TooDeep {
                limit: self.max_depth,
            });
        }

        let mut nodes = Vec::new();
        for child in parent.children() {
            if let Some(child_el) = ElementRef::wrap(child) {
                let value = child_el.value();
                let element = Element {
                    tag: value.name().to_ascii_lowercase(),
                    attributes: value
                        .attrs()
                        .map(|(k, v)| (k.to_ascii_lowercase(), v.to_string()))
                        .collect(),
                    children: self.convert_children(child_el, depth + 1)?,
                };
                nodes.push(Node::Element(element));
            } else if let Some(text) = child.value().as_text() {
                nodes.push(Node::Text(String::from(&**text)));
            }
        }
        Ok(nodes)
    }
}

impl TreeBuilder for HtmlTreeBuilder {
    fn build(&self, html: &str) -> Result<Fragment> {
        let parsed = Html::parse_fragment(html);
        // parse_fragment wraps everything in a synthetic <html> element
        let nodes = self.convert_children(parsed.root_element(), 0)?;
        debug!(nodes = nodes.len(), "parsed html fragment");
        Ok(Fragment::from_nodes(nodes))
    }
}

/// Parse an HTML fragment with the default builder
pub fn parse_fragment(html: &str) -> Result<Fragment> {
    HtmlTreeBuilder::new().build(html)
}
