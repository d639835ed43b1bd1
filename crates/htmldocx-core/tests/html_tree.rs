//! Tree conversion tests
//!
//! These tests pin down the shape of the element tree the renderer relies
//! on: lower-case tags, ordered attributes, raw whitespace text nodes.

use htmldocx_ast::{Element, Fragment, Node};
use htmldocx_core::{decode_entities, parse_fragment};

/// Test a small document with block and inline elements
///
/// Input:
/// ```html
/// <h1>Title</h1><p>Hello <strong>world</strong>.</p>
/// ```
#[test]
fn test_parse_basic_flow() {
    let frag = parse_fragment("<h1>Title</h1><p>Hello <strong>world</strong>.</p>").unwrap();

    let expected = Fragment::from_nodes(vec![
        Node::element("h1", vec![Node::text("Title")]),
        Node::element(
            "p",
            vec![
                Node::text("Hello "),
                Node::element("strong", vec![Node::text("world")]),
                Node::text("."),
            ],
        ),
    ]);

    assert_eq!(frag, expected);
}

#[test]
fn test_attribute_order_preserved() {
    let frag = parse_fragment(r#"<img src="a.png" width="10" height="20" alt="pic">"#).unwrap();
    let img = frag.nodes[0].as_element().unwrap();
    let names: Vec<&str> = img.attributes.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(names, vec!["src", "width", "height", "alt"]);
}

#[test]
fn test_table_structure() {
    let frag = parse_fragment("<table><tr><td>a</td><td>b</td></tr></table>").unwrap();
    let table = frag.nodes[0].as_element().unwrap();
    assert!(table.is("table"));

    // html5ever inserts the implied <tbody>
    let tbody = table.child_elements().next().unwrap();
    assert!(tbody.is("tbody"));
    let row = tbody.child_elements().next().unwrap();
    assert_eq!(row.child_elements().count(), 2);
}

#[test]
fn test_whitespace_text_kept_between_blocks() {
    let frag = parse_fragment("<p>a</p>\n<p>b</p>").unwrap();
    assert_eq!(frag.len(), 3);
    assert_eq!(frag.nodes[1], Node::text("\n"));
}

#[test]
fn test_decode_then_parse() {
    // Entities decoded before parsing turn into live markup
    let decoded = decode_entities("&lt;p&gt;Page 1&lt;/p&gt;");
    let frag = parse_fragment(&decoded).unwrap();
    let expected = Element::new("p").with_child(Node::text("Page 1"));
    assert_eq!(frag.nodes, vec![Node::Element(expected)]);
}
