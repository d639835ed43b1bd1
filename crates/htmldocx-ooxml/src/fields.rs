//! Page-number fields for footers
//!
//! A computed field in WordprocessingML is four runs:
//!
//! ```text
//! <w:r><w:fldChar w:fldCharType="begin"/></w:r>
//! <w:r><w:instrText>PAGE</w:instrText></w:r>
//! <w:r><w:fldChar w:fldCharType="separate"/></w:r>
//! <w:r><w:fldChar w:fldCharType="end"/></w:r>
//! ```
//!
//! The footer is rendered like any other HTML first. Afterwards the last
//! `Page` placeholder text element in the XML is swapped for
//! "Page {PAGE} of {NUMPAGES}" built from such fields.

use std::fmt::Write as _;

use tracing::{debug, warn};

use crate::xml::escape_xml;

/// Literal text that marks where page numbers go
pub const PLACEHOLDER_TOKEN: &str = "Page";

/// `w:fldCharType` value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldCharType {
    Begin,
    Separate,
    End,
}

/// Spelling of the separate marker
///
/// Older converters wrote `seperate`. Word tolerates it; strict
/// consumers do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeparatorSpelling {
    #[default]
    Standard,
    Legacy,
}

impl FieldCharType {
    pub fn as_str(self, spelling: SeparatorSpelling) -> &'static str {
        match (self, spelling) {
            (FieldCharType::Begin, _) => "begin",
            (FieldCharType::Separate, SeparatorSpelling::Standard) => "separate",
            (FieldCharType::Separate, SeparatorSpelling::Legacy) => "seperate",
            (FieldCharType::End, _) => "end",
        }
    }
}

/// Run properties used by the generated runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunFormat {
    pub bold: bool,
    /// Half-points
    pub size: Option<u32>,
}

impl RunFormat {
    fn write_rpr(&self, out: &mut String) {
        out.push_str("<w:rPr>");
        if self.bold {
            out.push_str("<w:b/>");
        }
        if let Some(size) = self.size {
            let _ = write!(out, r#"<w:sz w:val="{size}"/>"#);
        }
        out.push_str("</w:rPr>");
    }
}

/// A simple field such as `PAGE`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleField {
    pub instruction: String,
    pub format: RunFormat,
}

impl SimpleField {
    pub fn new(instruction: impl Into<String>, format: RunFormat) -> Self {
        Self {
            instruction: instruction.into(),
            format,
        }
    }

    /// Write the begin/instruction/separate/end runs
    pub fn write_runs(&self, out: &mut String, spelling: SeparatorSpelling) {
        write_field_char(out, FieldCharType::Begin, spelling);
        out.push_str("<w:r>");
        self.format.write_rpr(out);
        let _ = write!(
            out,
            "<w:instrText>{}</w:instrText></w:r>",
            escape_xml(&self.instruction)
        );
        write_field_char(out, FieldCharType::Separate, spelling);
        write_field_char(out, FieldCharType::End, spelling);
    }
}

fn write_field_char(out: &mut String, kind: FieldCharType, spelling: SeparatorSpelling) {
    let _ = write!(
        out,
        r#"<w:r><w:fldChar w:fldCharType="{}"/></w:r>"#,
        kind.as_str(spelling)
    );
}

fn write_text_run(out: &mut String, text: &str, format: Option<RunFormat>) {
    out.push_str("<w:r>");
    match format {
        Some(format) => format.write_rpr(out),
        None => out.push_str("<w:rPr/>"),
    }
    let _ = write!(
        out,
        r#"<w:t xml:space="preserve">{}</w:t></w:r>"#,
        escape_xml(text)
    );
}

/// "Page {PAGE} of {NUMPAGES}"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageNumberFields {
    pub spelling: SeparatorSpelling,
    /// Close the run holding the placeholder before the fields and reopen
    /// it after, so the generated runs are siblings rather than children
    pub split_enclosing_run: bool,
    label_format: RunFormat,
    field_format: RunFormat,
}

impl Default for PageNumberFields {
    fn default() -> Self {
        Self {
            spelling: SeparatorSpelling::Standard,
            split_enclosing_run: true,
            label_format: RunFormat {
                bold: false,
                size: Some(20),
            },
            field_format: RunFormat {
                bold: true,
                size: Some(20),
            },
        }
    }
}

impl PageNumberFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_spelling(mut self, spelling: SeparatorSpelling) -> Self {
        self.spelling = spelling;
        self
    }

    pub fn with_split_enclosing_run(mut self, split: bool) -> Self {
        self.split_enclosing_run = split;
        self
    }

    /// Render the replacement XML
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        if self.split_enclosing_run {
            out.push_str("</w:r>");
        }
        write_text_run(&mut out, "Page ", None);
        SimpleField::new("PAGE", self.field_format).write_runs(&mut out, self.spelling);
        write_text_run(&mut out, " of ", Some(self.label_format));
        SimpleField::new("NUMPAGES", self.field_format).write_runs(&mut out, self.spelling);
        if self.split_enclosing_run {
            out.push_str("<w:r>");
        }
        out
    }
}

const TEXT_OPEN: &str = "<w:t";
const TEXT_CLOSE: &str = "</w:t>";

/// Byte range of the last `<w:t>` element whose text holds the placeholder token
///
/// Only text content is searched, so the token inside an attribute value
/// (an image description, a bookmark anchor) never matches. The range
/// covers the element from its start tag through `</w:t>`. `None` when no
/// complete text element carries the token.
pub fn placeholder_span(xml: &str) -> Option<(usize, usize)> {
    let mut found = None;
    let mut cursor = 0;
    while let Some(offset) = xml[cursor..].find(TEXT_OPEN) {
        let start = cursor + offset;
        let name_end = start + TEXT_OPEN.len();
        cursor = name_end;
        // <w:tbl>, <w:tab/>, <w:tc> share the prefix
        if !matches!(
            xml[name_end..].chars().next(),
            Some('>' | ' ' | '\t' | '\r' | '\n')
        ) {
            continue;
        }
        let Some(tag_len) = xml[name_end..].find('>') else {
            break;
        };
        let content_start = name_end + tag_len + 1;
        if xml[..content_start].ends_with("/>") {
            continue;
        }
        let Some(content_len) = xml[content_start..].find(TEXT_CLOSE) else {
            break;
        };
        let end = content_start + content_len + TEXT_CLOSE.len();
        if xml[content_start..content_start + content_len].contains(PLACEHOLDER_TOKEN) {
            found = Some((start, end));
        }
        cursor = end;
    }
    found
}

/// Replace the placeholder element in `footer_xml` with `fragment`
///
/// Returns the footer unchanged when no placeholder is found.
pub fn inject_fields(footer_xml: &str, fragment: &str) -> String {
    match placeholder_span(footer_xml) {
        Some((start, end)) => {
            debug!(start, end, "splicing page number fields into footer");
            let mut out = String::with_capacity(footer_xml.len() + fragment.len());
            out.push_str(&footer_xml[..start]);
            out.push_str(fragment);
            out.push_str(&footer_xml[end..]);
            out
        }
        None => {
            warn!("footer has no page number placeholder, leaving it unchanged");
            footer_xml.to_string()
        }
    }
}

/// Replace the placeholder with page-number fields
pub fn inject_page_numbers(footer_xml: &str, fields: &PageNumberFields) -> String {
    inject_fields(footer_xml, &fields.to_xml())
}
