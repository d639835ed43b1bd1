//! Element rendering
//!
//! Turns an HTML element tree into WordprocessingML body content: the
//! paragraphs and tables that go inside `w:body`, `w:hdr` or `w:ftr`.
//!
//! Rendering is scoped to one part. Hyperlinks and images register their
//! relationships in [`RenderContext::relationships`], which the assembler
//! points at the relationship scope of the part being rendered. Media bytes
//! are shared across parts so image names stay unique in the package.
//!
//! # Example
//!
//! ```ignore
//! use htmldocx_core::parse_fragment;
//! use htmldocx_ooxml::render::{ElementRenderer, MediaStore, RenderContext, WordRenderer};
//!
//! let tree = parse_fragment("<p>Hello <b>world</b></p>")?;
//! let mut rels = Relationships::new();
//! let mut media = MediaStore::new();
//! let options = DocumentOptions::default();
//! let mut ctx = RenderContext::new(&mut rels, &mut media, &options);
//! let body = WordRenderer::new().render(&tree, &mut ctx)?;
//! ```

use base64::Engine;
use htmldocx_ast::{Element, Fragment, Node};
use tracing::{debug, warn};

use crate::content_types::image_content_type;
use crate::error::Result;
use crate::options::DocumentOptions;
use crate::parts::{BULLET_NUM_ID, DECIMAL_NUM_ID};
use crate::relationships::Relationships;
use crate::units::pixel_to_emu;
use crate::xml::escape_xml;

/// Image size used when `width`/`height` are missing, in pixels
pub const DEFAULT_IMAGE_SIZE_PX: f64 = 100.0;

/// Renders an element tree into body XML
pub trait ElementRenderer {
    /// Render `fragment`, registering relationships and media in `ctx`
    fn render(&self, fragment: &Fragment, ctx: &mut RenderContext<'_>) -> Result<String>;
}

/// A binary part produced while rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaPart {
    /// Package path, e.g. `word/media/image1.png`
    pub path: String,
    /// Lower-case file extension
    pub extension: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Media collected across every rendered part
#[derive(Debug)]
pub struct MediaStore {
    parts: Vec<MediaPart>,
    next_drawing_id: u32,
}

impl Default for MediaStore {
    fn default() -> Self {
        Self {
            parts: Vec::new(),
            next_drawing_id: 1,
        }
    }
}

impl MediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an image and return its path relative to `word/`
    pub fn add_image(&mut self, bytes: Vec<u8>, extension: &str, content_type: &'static str) -> String {
        let index = self.parts.len() + 1;
        let extension = extension.to_ascii_lowercase();
        let relative = format!("media/image{}.{}", index, extension);
        self.parts.push(MediaPart {
            path: format!("word/{}", relative),
            extension,
            content_type,
            bytes,
        });
        relative
    }

    /// Next unique `wp:docPr` id
    pub fn next_drawing_id(&mut self) -> u32 {
        let id = self.next_drawing_id;
        self.next_drawing_id += 1;
        id
    }

    pub fn parts(&self) -> &[MediaPart] {
        &self.parts
    }

    pub fn into_parts(self) -> Vec<MediaPart> {
        self.parts
    }
}

/// Mutable state shared with a renderer for one part
pub struct RenderContext<'a> {
    /// Relationship scope of the part being rendered
    pub relationships: &'a mut Relationships,
    pub media: &'a mut MediaStore,
    pub options: &'a DocumentOptions,
}

impl<'a> RenderContext<'a> {
    pub fn new(
        relationships: &'a mut Relationships,
        media: &'a mut MediaStore,
        options: &'a DocumentOptions,
    ) -> Self {
        Self {
            relationships,
            media,
            options,
        }
    }
}

/// Default HTML to WordprocessingML renderer
#[derive(Debug, Clone, Default)]
pub struct WordRenderer;

impl WordRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl ElementRenderer for WordRenderer {
    fn render(&self, fragment: &Fragment, ctx: &mut RenderContext<'_>) -> Result<String> {
        let mut writer = BodyWriter {
            ctx,
            output: String::new(),
        };
        writer.blocks(&fragment.nodes, &BlockProps::default());
        debug!(bytes = writer.output.len(), "rendered body");
        Ok(writer.output)
    }
}

/// Run formatting inherited down the tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct RunStyle {
    bold: bool,
    italic: bool,
    underline: bool,
    strike: bool,
    superscript: bool,
    subscript: bool,
    code: bool,
    hyperlink: bool,
}

impl RunStyle {
    fn for_tag(mut self, tag: &str) -> Self {
        match tag {
            "b" | "strong" | "th" => self.bold = true,
            "i" | "em" | "cite" | "var" | "dfn" => self.italic = true,
            "u" | "ins" => self.underline = true,
            "s" | "strike" | "del" => self.strike = true,
            "sup" => self.superscript = true,
            "sub" => self.subscript = true,
            "code" | "kbd" | "samp" | "tt" | "pre" => self.code = true,
            _ => {}
        }
        self
    }

    fn write_rpr(&self, out: &mut String) {
        if *self == RunStyle::default() {
            return;
        }
        out.push_str("<w:rPr>");
        if self.hyperlink {
            out.push_str(r#"<w:rStyle w:val="Hyperlink"/>"#);
        }
        if self.code {
            out.push_str(r#"<w:rFonts w:ascii="Courier New" w:hAnsi="Courier New" w:cs="Courier New"/>"#);
        }
        if self.bold {
            out.push_str("<w:b/><w:bCs/>");
        }
        if self.italic {
            out.push_str("<w:i/><w:iCs/>");
        }
        if self.strike {
            out.push_str("<w:strike/>");
        }
        if self.underline {
            out.push_str(r#"<w:u w:val="single"/>"#);
        }
        if self.superscript {
            out.push_str(r#"<w:vertAlign w:val="superscript"/>"#);
        } else if self.subscript {
            out.push_str(r#"<w:vertAlign w:val="subscript"/>"#);
        }
        out.push_str("</w:rPr>");
    }
}

/// Paragraph properties inherited by nested blocks
#[derive(Debug, Clone, Default)]
struct BlockProps {
    style: Option<&'static str>,
    numbering: Option<(u32, u32)>,
    list_depth: u32,
    run: RunStyle,
    preserve_whitespace: bool,
}

impl BlockProps {
    fn with_style(&self, style: &'static str) -> Self {
        Self {
            style: Some(style),
            ..self.clone()
        }
    }
}

fn is_block(tag: &str) -> bool {
    matches!(
        tag,
        "p" | "div"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "blockquote"
            | "pre"
            | "ul"
            | "ol"
            | "li"
            | "table"
            | "hr"
            | "section"
            | "article"
            | "header"
            | "footer"
            | "main"
            | "nav"
            | "aside"
            | "figure"
            | "figcaption"
            | "address"
            | "body"
            | "html"
    )
}

fn is_skipped(tag: &str) -> bool {
    matches!(
        tag,
        "script" | "style" | "head" | "title" | "meta" | "link" | "template" | "noscript"
    )
}

struct BodyWriter<'c, 'a> {
    ctx: &'c mut RenderContext<'a>,
    output: String,
}

impl BodyWriter<'_, '_> {
    /// Render a mixed list of nodes; runs of inline content become paragraphs
    fn blocks(&mut self, nodes: &[Node], props: &BlockProps) {
        let mut pending: Vec<&Node> = Vec::new();
        for node in nodes {
            match node {
                Node::Element(el) if is_skipped(&el.tag) => {}
                Node::Element(el) if is_block(&el.tag) => {
                    self.paragraph(&pending, props);
                    pending.clear();
                    self.block(el, props);
                }
                _ => pending.push(node),
            }
        }
        self.paragraph(&pending, props);
    }

    fn block(&mut self, el: &Element, props: &BlockProps) {
        match el.tag.as_str() {
            "h1" => self.blocks(&el.children, &props.with_style("Heading1")),
            "h2" => self.blocks(&el.children, &props.with_style("Heading2")),
            "h3" => self.blocks(&el.children, &props.with_style("Heading3")),
            "h4" => self.blocks(&el.children, &props.with_style("Heading4")),
            "h5" => self.blocks(&el.children, &props.with_style("Heading5")),
            "h6" => self.blocks(&el.children, &props.with_style("Heading6")),
            "blockquote" => self.blocks(&el.children, &props.with_style("Quote")),
            "pre" => {
                let props = BlockProps {
                    style: Some("Code"),
                    run: props.run.for_tag("pre"),
                    preserve_whitespace: true,
                    ..props.clone()
                };
                self.blocks(&el.children, &props);
            }
            "ul" | "ol" => self.list(el, props),
            "li" => {
                // Stray list item outside ul/ol
                let props = BlockProps {
                    numbering: Some((BULLET_NUM_ID, props.list_depth)),
                    ..props.with_style("ListParagraph")
                };
                self.blocks(&el.children, &props);
            }
            "table" => self.table(el, props),
            "hr" => {
                self.output.push_str(r#"<w:p><w:pPr><w:pBdr><w:bottom w:val="single" w:sz="6" w:space="1" w:color="auto"/></w:pBdr></w:pPr></w:p>"#);
                self.output.push('\n');
            }
            _ => self.blocks(&el.children, props),
        }
    }

    fn list(&mut self, list: &Element, props: &BlockProps) {
        let num_id = if list.is("ol") {
            DECIMAL_NUM_ID
        } else {
            BULLET_NUM_ID
        };
        let level = props.list_depth.min(8);
        let item_props = BlockProps {
            numbering: Some((num_id, level)),
            list_depth: props.list_depth + 1,
            ..props.with_style("ListParagraph")
        };

        for child in &list.children {
            match child {
                Node::Element(li) if li.is("li") => self.blocks(&li.children, &item_props),
                Node::Element(el) if el.is("ul") || el.is("ol") => self.list(el, &item_props),
                other => self.blocks(std::slice::from_ref(other), &item_props),
            }
        }
    }

    fn table(&mut self, table: &Element, props: &BlockProps) {
        let rows = collect_rows(table);
        if rows.is_empty() {
            return;
        }
        let columns = rows
            .iter()
            .map(|row| {
                row.child_elements()
                    .filter(|c| c.is("td") || c.is("th"))
                    .map(colspan)
                    .sum::<u32>()
            })
            .max()
            .unwrap_or(1)
            .max(1);

        self.output.push_str("<w:tbl>");
        self.output.push_str(r#"<w:tblPr><w:tblStyle w:val="TableGrid"/><w:tblW w:w="5000" w:type="pct"/></w:tblPr>"#);
        self.output.push_str("<w:tblGrid>");
        for _ in 0..columns {
            self.output.push_str(r#"<w:gridCol w:w="2000"/>"#);
        }
        self.output.push_str("</w:tblGrid>\n");

        let cant_split = self.ctx.options.table.row.cant_split;
        let cell_props = BlockProps {
            numbering: None,
            list_depth: 0,
            ..props.clone()
        };

        for row in rows {
            let cells: Vec<&Element> = row
                .child_elements()
                .filter(|c| c.is("td") || c.is("th"))
                .collect();
            let header_row = !cells.is_empty() && cells.iter().all(|c| c.is("th"));

            self.output.push_str("<w:tr>");
            if cant_split || header_row {
                self.output.push_str("<w:trPr>");
                if cant_split {
                    self.output.push_str("<w:cantSplit/>");
                }
                if header_row {
                    self.output.push_str("<w:tblHeader/>");
                }
                self.output.push_str("</w:trPr>");
            }

            for cell in cells {
                self.output.push_str("<w:tc><w:tcPr>");
                self.output.push_str(r#"<w:tcW w:w="0" w:type="auto"/>"#);
                let span = colspan(cell);
                if span > 1 {
                    self.output
                        .push_str(&format!(r#"<w:gridSpan w:val="{}"/>"#, span));
                }
                self.output.push_str("</w:tcPr>");

                let start = self.output.len();
                let props = BlockProps {
                    run: cell_props.run.for_tag(&cell.tag),
                    ..cell_props.clone()
                };
                self.blocks(&cell.children, &props);
                // A cell must end with a paragraph
                if !self.output[start..].trim_end().ends_with("</w:p>") {
                    self.output.push_str("<w:p/>");
                }
                self.output.push_str("</w:tc>");
            }
            self.output.push_str("</w:tr>\n");
        }

        self.output.push_str("</w:tbl>\n");
    }

    /// Write inline nodes as one paragraph, unless they are only whitespace
    fn paragraph(&mut self, inline: &[&Node], props: &BlockProps) {
        let has_content = inline.iter().any(|node| match node {
            Node::Text(text) => props.preserve_whitespace || !text.trim().is_empty(),
            Node::Element(_) => true,
        });
        if !has_content {
            return;
        }

        self.output.push_str("<w:p>");
        if props.style.is_some() || props.numbering.is_some() {
            self.output.push_str("<w:pPr>");
            if let Some(style) = props.style {
                self.output
                    .push_str(&format!(r#"<w:pStyle w:val="{}"/>"#, style));
            }
            if let Some((num_id, level)) = props.numbering {
                self.output.push_str(&format!(
                    r#"<w:numPr><w:ilvl w:val="{}"/><w:numId w:val="{}"/></w:numPr>"#,
                    level, num_id
                ));
            }
            self.output.push_str("</w:pPr>");
        }

        let mut at_start = true;
        for node in inline {
            self.inline(node, props.run, props.preserve_whitespace, &mut at_start);
        }
        self.output.push_str("</w:p>\n");
    }

    fn inline(&mut self, node: &Node, style: RunStyle, preserve: bool, at_start: &mut bool) {
        match node {
            Node::Text(text) => self.text_run(text, style, preserve, at_start),
            Node::Element(el) => match el.tag.as_str() {
                tag if is_skipped(tag) => {}
                "br" => {
                    self.output.push_str("<w:r><w:br/></w:r>");
                    *at_start = true;
                }
                "img" => {
                    self.image(el, style);
                    *at_start = false;
                }
                "a" => self.hyperlink(el, style, preserve, at_start),
                tag => {
                    let style = style.for_tag(tag);
                    for child in &el.children {
                        self.inline(child, style, preserve, at_start);
                    }
                }
            },
        }
    }

    fn text_run(&mut self, text: &str, style: RunStyle, preserve: bool, at_start: &mut bool) {
        if preserve {
            for (i, line) in text.split('\n').enumerate() {
                if i > 0 {
                    self.output.push_str("<w:r><w:br/></w:r>");
                }
                if !line.is_empty() {
                    self.write_run(line, style);
                }
            }
            *at_start = false;
            return;
        }

        let mut collapsed = collapse_whitespace(text);
        if *at_start {
            collapsed = collapsed.trim_start().to_string();
        }
        if collapsed.is_empty() {
            return;
        }
        self.write_run(&collapsed, style);
        *at_start = collapsed.ends_with(' ');
    }

    fn write_run(&mut self, text: &str, style: RunStyle) {
        self.output.push_str("<w:r>");
        style.write_rpr(&mut self.output);
        self.output.push_str(&format!(
            r#"<w:t xml:space="preserve">{}</w:t>"#,
            escape_xml(text)
        ));
        self.output.push_str("</w:r>");
    }

    fn hyperlink(&mut self, el: &Element, style: RunStyle, preserve: bool, at_start: &mut bool) {
        let href = el.attr("href").map(str::trim).unwrap_or_default();
        if href.is_empty() {
            for child in &el.children {
                self.inline(child, style, preserve, at_start);
            }
            return;
        }

        if let Some(anchor) = href.strip_prefix('#') {
            self.output.push_str(&format!(
                r#"<w:hyperlink w:anchor="{}">"#,
                escape_xml(anchor)
            ));
        } else {
            let rel_id = self
                .ctx
                .relationships
                .add_external(href, Relationships::TYPE_HYPERLINK);
            self.output
                .push_str(&format!(r#"<w:hyperlink r:id="{}">"#, rel_id));
        }

        let link_style = RunStyle {
            hyperlink: true,
            ..style
        };
        for child in &el.children {
            self.inline(child, link_style, preserve, at_start);
        }
        self.output.push_str("</w:hyperlink>");
    }

    fn image(&mut self, el: &Element, style: RunStyle) {
        let alt = el.attr("alt").unwrap_or_default();
        let src = el.attr("src").unwrap_or_default();

        let Some((bytes, extension, content_type)) = decode_data_uri(src) else {
            if src.starts_with("data:") {
                warn!("could not decode inline image, using alt text");
            } else if !src.is_empty() {
                debug!(src, "external image source not embedded, using alt text");
            }
            if !alt.is_empty() {
                self.write_run(alt, style);
            }
            return;
        };

        let target = self.ctx.media.add_image(bytes, &extension, content_type);
        let rel_id = self
            .ctx
            .relationships
            .add(target.clone(), Relationships::TYPE_IMAGE);
        let drawing_id = self.ctx.media.next_drawing_id();

        let width = pixel_to_emu(dimension_px(el.attr("width")));
        let height = pixel_to_emu(dimension_px(el.attr("height")));
        let name = format!("Picture {}", drawing_id);

        self.output.push_str("<w:r><w:drawing>");
        self.output
            .push_str(r#"<wp:inline distT="0" distB="0" distL="0" distR="0">"#);
        self.output.push_str(&format!(
            r#"<wp:extent cx="{}" cy="{}"/><wp:effectExtent l="0" t="0" r="0" b="0"/>"#,
            width, height
        ));
        self.output.push_str(&format!(
            r#"<wp:docPr id="{}" name="{}" descr="{}"/>"#,
            drawing_id,
            escape_xml(&name),
            escape_xml(alt)
        ));
        self.output.push_str(r#"<wp:cNvGraphicFramePr><a:graphicFrameLocks noChangeAspect="1"/></wp:cNvGraphicFramePr>"#);
        self.output.push_str(r#"<a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/picture"><pic:pic>"#);
        self.output.push_str(&format!(
            r#"<pic:nvPicPr><pic:cNvPr id="{}" name="{}"/><pic:cNvPicPr/></pic:nvPicPr>"#,
            drawing_id,
            escape_xml(&name)
        ));
        self.output.push_str(&format!(
            r#"<pic:blipFill><a:blip r:embed="{}"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill>"#,
            rel_id
        ));
        self.output.push_str(&format!(
            r#"<pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{}" cy="{}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></pic:spPr>"#,
            width, height
        ));
        self.output
            .push_str("</pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing></w:r>");
        debug!(part = %target, rel = %rel_id, "embedded image");
    }
}

/// Rows of a table, looking through `thead`/`tbody`/`tfoot`
fn collect_rows(table: &Element) -> Vec<&Element> {
    let mut rows = Vec::new();
    for child in table.child_elements() {
        match child.tag.as_str() {
            "tr" => rows.push(child),
            "thead" | "tbody" | "tfoot" => rows.extend(child.child_elements().filter(|r| r.is("tr"))),
            _ => {}
        }
    }
    rows
}

fn colspan(cell: &Element) -> u32 {
    cell.attr("colspan")
        .and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(1)
}

/// Pixel size from an HTML `width`/`height` attribute
fn dimension_px(value: Option<&str>) -> f64 {
    value
        .map(|v| v.trim().trim_end_matches("px").trim())
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|n| *n > 0.0)
        .unwrap_or(DEFAULT_IMAGE_SIZE_PX)
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() && c != '\u{a0}' {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

/// Decode `data:image/<type>;base64,<payload>`
///
/// Returns the bytes, file extension and content type.
fn decode_data_uri(src: &str) -> Option<(Vec<u8>, String, &'static str)> {
    let rest = src.trim().strip_prefix("data:")?;
    let (meta, payload) = rest.split_once(',')?;
    let mut meta_parts = meta.split(';');
    let mime = meta_parts.next()?.trim().to_ascii_lowercase();
    if !meta_parts.any(|p| p.trim().eq_ignore_ascii_case("base64")) {
        return None;
    }
    let subtype = mime.strip_prefix("image/")?;
    let extension = subtype.split('+').next()?.to_string();
    let content_type = image_content_type(&extension)?;

    let cleaned: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(cleaned.as_bytes())
        .ok()?;
    Some((bytes, extension, content_type))
}
