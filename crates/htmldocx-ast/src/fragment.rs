//! Fragment root
//!
//! HTML bodies, headers and footers are fragments: a sequence of top-level
//! nodes with no enclosing document element.

use serde::{Deserialize, Serialize};

use crate::node::Node;

/// A parsed HTML fragment
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Fragment {
    /// Top-level nodes in document order
    pub nodes: Vec<Node>,
}

impl Fragment {
    /// Create an empty fragment
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fragment from top-level nodes
    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Add a top-level node
    pub fn push(&mut self, node: Node) {
        self.nodes.push(node);
    }

    /// Check if the fragment has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get the number of top-level nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Concatenated character data of the whole fragment
    pub fn text_content(&self) -> String {
        self.nodes.iter().map(Node::text_content).collect()
    }
}
