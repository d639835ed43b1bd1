//! Shared XML helpers
//!
//! Parts are generated by pushing strings, so every text node and attribute
//! value must pass through [`escape_xml`].

use std::borrow::Cow;

/// XML declaration written at the top of every part
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// WordprocessingML main namespace
pub const NS_W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
/// Office document relationships namespace
pub const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
/// DrawingML main namespace
pub const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
/// DrawingML picture namespace
pub const NS_PIC: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";
/// WordprocessingDrawing namespace
pub const NS_WP: &str = "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";

/// Namespace declarations for the root of document, header and footer parts
pub fn wordprocessing_namespaces() -> String {
    format!(
        r#"xmlns:w="{NS_W}" xmlns:r="{NS_R}" xmlns:a="{NS_A}" xmlns:pic="{NS_PIC}" xmlns:wp="{NS_WP}""#
    )
}

/// Escape the five XML special characters
pub fn escape_xml(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}
