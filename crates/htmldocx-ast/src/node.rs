//! Element and text nodes
//!
//! Tag and attribute names are stored lower-cased; attribute order is kept
//! as it appeared in the source markup.

use serde::{Deserialize, Serialize};

/// A node in the element tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    /// An element with a tag, attributes and children
    Element(Element),
    /// A run of character data
    Text(String),
}

/// An element node
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Element {
    /// Lower-case tag name (e.g. "p", "strong")
    pub tag: String,
    /// Attributes in source order
    pub attributes: Vec<(String, String)>,
    /// Child nodes
    pub children: Vec<Node>,
}

impl Node {
    /// Create a text node
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }

    /// Create an element node with no attributes
    pub fn element(tag: impl Into<String>, children: Vec<Node>) -> Self {
        Node::Element(Element::new(tag).with_children(children))
    }

    /// Borrow the element if this node is one
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }

    /// Borrow the text if this node is a text node
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(t) => Some(t),
            Node::Element(_) => None,
        }
    }

    /// Concatenated character data of this node and its descendants
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text(t) => out.push_str(t),
            Node::Element(el) => {
                for child in &el.children {
                    child.collect_text(out);
                }
            }
        }
    }
}

impl Element {
    /// Create an empty element
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Add an attribute (builder style)
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes
            .push((name.into().to_ascii_lowercase(), value.into()));
        self
    }

    /// Replace the children (builder style)
    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    /// Append a child (builder style)
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Look up an attribute value by name (case-insensitive)
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Check the tag name
    pub fn is(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }

    /// Iterate over child elements, skipping text
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_builder() {
        let el = Element::new("A")
            .with_attr("HREF", "https://example.com")
            .with_child(Node::text("link"));

        assert_eq!(el.tag, "a");
        assert!(el.is("a"));
        assert_eq!(el.attr("href"), Some("https://example.com"));
        assert_eq!(el.children.len(), 1);
    }

    #[test]
    fn test_text_content_nested() {
        let node = Node::element(
            "p",
            vec![
                Node::text("Hello "),
                Node::element("b", vec![Node::text("bold")]),
                Node::text("!"),
            ],
        );
        assert_eq!(node.text_content(), "Hello bold!");
    }

    #[test]
    fn test_child_elements_skip_text() {
        let el = Element::new("ul").with_children(vec![
            Node::text("\n  "),
            Node::element("li", vec![Node::text("one")]),
            Node::text("\n  "),
            Node::element("li", vec![Node::text("two")]),
        ]);
        assert_eq!(el.child_elements().count(), 2);
    }

    #[test]
    fn test_serde_roundtrip() {
        let node = Node::element("p", vec![Node::text("x")]);
        let json = serde_json::to_string(&node).unwrap();
        let back: Node = serde_json::from_str(&json).unwrap();
        assert_eq!(node, back);
    }
}
