//! Package assembly
//!
//! [`DocxAssembler`] turns body, header and footer HTML into a complete
//! `.docx` package. The order of work is fixed:
//!
//! 1. Normalize the raw options and merge them over the defaults.
//! 2. Substitute `<p></p>` for an enabled header or footer without HTML.
//! 3. Decode HTML entities when `decode_unicode` is set.
//! 4. Render the body in the scope of `word/document.xml`.
//! 5. Write `_rels/.rels` and `docProps/core.xml`.
//! 6. Render and write the header, registering it with the document.
//! 7. Render the footer, splice in page-number fields, write and register it.
//! 8. Register and write the theme.
//! 9. Write `document.xml` and the fixed `word/` parts, then any media.
//! 10. Write the `.rels` file of every part that owns relationships.
//! 11. Write `[Content_Types].xml` from the parts actually written.
//!
//! The finished package is checked with [`OoxmlArchive::verify`] before it
//! is returned. Any error aborts assembly and the partial package is
//! dropped.

use std::borrow::Cow;

use htmldocx_core::{decode_entities, HtmlTreeBuilder, TreeBuilder};
use tracing::debug;

use crate::archive::OoxmlArchive;
use crate::content_types::{
    ContentTypes, CONTENT_TYPES_PATH, CT_CORE_PROPERTIES, CT_DOCUMENT, CT_FONT_TABLE, CT_FOOTER,
    CT_HEADER, CT_NUMBERING, CT_RELATIONSHIPS, CT_SETTINGS, CT_STYLES, CT_THEME,
    CT_WEB_SETTINGS, CT_XML,
};
use crate::error::Result;
use crate::fields::{inject_page_numbers, PageNumberFields, SeparatorSpelling};
use crate::options::{DocumentOptions, RawDocumentOptions, DEFAULT_HTML};
use crate::parts::{self, SectionReferences};
use crate::relationships::{rels_path_for, Relationships};
use crate::render::{ElementRenderer, MediaPart, MediaStore, RenderContext, WordRenderer};

/// Which story a header/footer part belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Story {
    Header,
    Footer,
}

impl Story {
    fn file_stem(self) -> &'static str {
        match self {
            Story::Header => "header",
            Story::Footer => "footer",
        }
    }

    fn rel_type(self) -> &'static str {
        match self {
            Story::Header => Relationships::TYPE_HEADER,
            Story::Footer => Relationships::TYPE_FOOTER,
        }
    }

    fn content_type(self) -> &'static str {
        match self {
            Story::Header => CT_HEADER,
            Story::Footer => CT_FOOTER,
        }
    }
}

/// State threaded through one assembly
struct Assembly {
    options: DocumentOptions,
    package: PackageWriter,
    /// Scope of `word/document.xml`
    document_rels: Relationships,
    /// Scopes of header and footer parts, by part path
    part_rels: Vec<(String, Relationships)>,
    media: MediaStore,
    section: SectionReferences,
    last_header_id: u32,
    last_footer_id: u32,
}

impl Assembly {
    fn new(options: DocumentOptions) -> Self {
        Self {
            options,
            package: PackageWriter::new(),
            document_rels: parts::document_relationships(),
            part_rels: Vec::new(),
            media: MediaStore::new(),
            section: SectionReferences::default(),
            last_header_id: 0,
            last_footer_id: 0,
        }
    }
}

/// Records parts and their content types, then seals the package
struct PackageWriter {
    archive: OoxmlArchive,
    content_types: ContentTypes,
}

impl PackageWriter {
    fn new() -> Self {
        let mut content_types = ContentTypes::new();
        content_types.add_default("rels", CT_RELATIONSHIPS);
        content_types.add_default("xml", CT_XML);
        Self {
            archive: OoxmlArchive::new(),
            content_types,
        }
    }

    fn put(&mut self, path: &str, content_type: &str, contents: String) -> Result<()> {
        self.archive.write_string(path, contents)?;
        self.content_types.register(path, content_type);
        Ok(())
    }

    fn put_media(&mut self, part: MediaPart) -> Result<()> {
        if !self.content_types.has_default(&part.extension) {
            self.content_types
                .add_default(&part.extension, part.content_type);
        }
        self.content_types.register(&part.path, part.content_type);
        self.archive.write_part(part.path, part.bytes)
    }

    fn finish(mut self) -> Result<OoxmlArchive> {
        self.archive
            .write_string(CONTENT_TYPES_PATH, self.content_types.to_xml())?;
        self.archive.verify()?;
        Ok(self.archive)
    }
}

/// Builds `.docx` packages from HTML
///
/// The tree builder and element renderer are pluggable; the defaults are
/// [`HtmlTreeBuilder`] and [`WordRenderer`].
#[derive(Debug, Clone, Default)]
pub struct DocxAssembler<B = HtmlTreeBuilder, R = WordRenderer> {
    tree_builder: B,
    renderer: R,
}

impl DocxAssembler {
    /// Assembler with the default tree builder and renderer
    pub fn new() -> Self {
        Self::default()
    }
}

impl<B: TreeBuilder, R: ElementRenderer> DocxAssembler<B, R> {
    /// Assembler with custom collaborators
    pub fn with_components(tree_builder: B, renderer: R) -> Self {
        Self {
            tree_builder,
            renderer,
        }
    }

    /// Normalize `raw`, merge it over the defaults and assemble
    pub fn assemble(
        &self,
        body_html: &str,
        header_html: Option<&str>,
        footer_html: Option<&str>,
        raw: &RawDocumentOptions,
    ) -> Result<OoxmlArchive> {
        let options = DocumentOptions::from_raw(raw);
        self.assemble_with_options(body_html, header_html, footer_html, options)
    }

    /// Assemble with already effective options
    pub fn assemble_with_options(
        &self,
        body_html: &str,
        header_html: Option<&str>,
        footer_html: Option<&str>,
        options: DocumentOptions,
    ) -> Result<OoxmlArchive> {
        let header_html = resolve_story_html(options.header, header_html);
        let footer_html = resolve_story_html(options.footer, footer_html);

        let (body_html, header_html, footer_html) = if options.decode_unicode {
            (
                decode_entities(body_html),
                header_html.map(decode_entities),
                footer_html.map(decode_entities),
            )
        } else {
            (
                Cow::Borrowed(body_html),
                header_html.map(Cow::Borrowed),
                footer_html.map(Cow::Borrowed),
            )
        };

        let mut asm = Assembly::new(options);

        let body_xml = self.render_body(&mut asm, &body_html)?;

        asm.package.put(
            parts::PACKAGE_RELS_PART,
            CT_RELATIONSHIPS,
            parts::package_relationships().to_xml(),
        )?;
        asm.package.put(
            parts::CORE_PROPERTIES_PART,
            CT_CORE_PROPERTIES,
            parts::core_properties_xml(&asm.options),
        )?;

        if let Some(html) = header_html.as_deref() {
            let rel_id = self.write_story(&mut asm, Story::Header, html)?;
            asm.section.header = Some(rel_id);
        }
        if let Some(html) = footer_html.as_deref() {
            let rel_id = self.write_story(&mut asm, Story::Footer, html)?;
            asm.section.footer = Some(rel_id);
        }

        asm.document_rels
            .add("theme/theme1.xml", Relationships::TYPE_THEME);
        asm.package
            .put(parts::THEME_PART, CT_THEME, parts::theme_xml(&asm.options))?;

        write_word_parts(&mut asm, &body_xml)?;

        let media = std::mem::take(&mut asm.media);
        for part in media.into_parts() {
            asm.package.put_media(part)?;
        }

        asm.package.put(
            &rels_path_for(parts::DOCUMENT_PART),
            CT_RELATIONSHIPS,
            asm.document_rels.to_xml(),
        )?;
        for (part, rels) in std::mem::take(&mut asm.part_rels) {
            asm.package
                .put(&rels_path_for(&part), CT_RELATIONSHIPS, rels.to_xml())?;
        }

        let archive = asm.package.finish()?;
        debug!(parts = archive.len(), "package assembled");
        Ok(archive)
    }

    fn render_body(&self, asm: &mut Assembly, html: &str) -> Result<String> {
        let tree = self.tree_builder.build(html)?;
        let mut ctx = RenderContext::new(&mut asm.document_rels, &mut asm.media, &asm.options);
        let body = self.renderer.render(&tree, &mut ctx)?;
        debug!(bytes = body.len(), "rendered document body");
        Ok(body)
    }

    /// Render a header or footer, write it and register it with the document
    ///
    /// Returns the relationship id in the document scope.
    fn write_story(&self, asm: &mut Assembly, story: Story, html: &str) -> Result<String> {
        let tree = self.tree_builder.build(html)?;
        let mut story_rels = Relationships::new();
        let body = {
            let mut ctx = RenderContext::new(&mut story_rels, &mut asm.media, &asm.options);
            self.renderer.render(&tree, &mut ctx)?
        };

        let id = match story {
            Story::Header => {
                asm.last_header_id += 1;
                asm.last_header_id
            }
            Story::Footer => {
                asm.last_footer_id += 1;
                asm.last_footer_id
            }
        };
        let file_name = format!("{}{}.xml", story.file_stem(), id);
        let part = format!("word/{}", file_name);
        let rel_id = asm.document_rels.add(file_name, story.rel_type());

        let xml = match story {
            Story::Header => parts::header_xml(&body),
            Story::Footer => {
                let spelling = if asm.options.legacy_field_separator {
                    SeparatorSpelling::Legacy
                } else {
                    SeparatorSpelling::Standard
                };
                let fields = PageNumberFields::new().with_spelling(spelling);
                inject_page_numbers(&parts::footer_xml(&body), &fields)
            }
        };
        asm.package.put(&part, story.content_type(), xml)?;
        debug!(part = %part, rel = %rel_id, "wrote {}", story.file_stem());

        if !story_rels.is_empty() {
            asm.part_rels.push((part, story_rels));
        }
        Ok(rel_id)
    }
}

/// HTML for an enabled header or footer; `None` when disabled
fn resolve_story_html(enabled: bool, html: Option<&str>) -> Option<&str> {
    if !enabled {
        return None;
    }
    match html {
        Some(h) if !h.trim().is_empty() => Some(h),
        _ => Some(DEFAULT_HTML),
    }
}

fn write_word_parts(asm: &mut Assembly, body_xml: &str) -> Result<()> {
    let options = &asm.options;
    let section = parts::section_properties_xml(options, &asm.section);
    let fixed = [
        (
            parts::DOCUMENT_PART,
            CT_DOCUMENT,
            parts::document_xml(body_xml, &section),
        ),
        (parts::FONT_TABLE_PART, CT_FONT_TABLE, parts::font_table_xml(options)),
        (parts::STYLES_PART, CT_STYLES, parts::styles_xml(options)),
        (parts::NUMBERING_PART, CT_NUMBERING, parts::numbering_xml()),
        (parts::SETTINGS_PART, CT_SETTINGS, parts::settings_xml()),
        (parts::WEB_SETTINGS_PART, CT_WEB_SETTINGS, parts::web_settings_xml()),
    ];
    for (path, content_type, xml) in fixed {
        asm.package.put(path, content_type, xml)?;
    }
    Ok(())
}

/// Convert HTML to `.docx` bytes with the default collaborators
///
/// # Example
///
/// ```ignore
/// use htmldocx_ooxml::{html_to_docx, RawDocumentOptions};
///
/// let options = RawDocumentOptions {
///     footer: Some(true),
///     ..Default::default()
/// };
/// let bytes = html_to_docx("<p>Hello</p>", None, Some("<p>Page 1</p>"), &options)?;
/// std::fs::write("hello.docx", bytes)?;
/// ```
pub fn html_to_docx(
    body_html: &str,
    header_html: Option<&str>,
    footer_html: Option<&str>,
    options: &RawDocumentOptions,
) -> Result<Vec<u8>> {
    DocxAssembler::new()
        .assemble(body_html, header_html, footer_html, options)?
        .to_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OoxmlError;
    use htmldocx_ast::Fragment;
    use htmldocx_core::TreeError;

    struct FailingRenderer;

    impl ElementRenderer for FailingRenderer {
        fn render(&self, _: &Fragment, _: &mut RenderContext<'_>) -> Result<String> {
            Err(OoxmlError::Render("boom".to_string()))
        }
    }

    struct FailingTreeBuilder;

    impl TreeBuilder for FailingTreeBuilder {
        fn build(&self, _: &str) -> htmldocx_core::Result<Fragment> {
            Err(TreeError::Other("bad html".to_string()))
        }
    }

    /// Fails only on the footer, after body and header succeeded
    struct FooterFailingRenderer;

    impl ElementRenderer for FooterFailingRenderer {
        fn render(&self, fragment: &Fragment, ctx: &mut RenderContext<'_>) -> Result<String> {
            if fragment.text_content().contains("FOOTER") {
                return Err(OoxmlError::Render("footer".to_string()));
            }
            WordRenderer::new().render(fragment, ctx)
        }
    }

    fn raw(header: bool, footer: bool) -> RawDocumentOptions {
        RawDocumentOptions {
            header: Some(header),
            footer: Some(footer),
            ..Default::default()
        }
    }

    #[test]
    fn test_resolve_story_html() {
        assert_eq!(resolve_story_html(false, Some("<p>x</p>")), None);
        assert_eq!(resolve_story_html(true, None), Some(DEFAULT_HTML));
        assert_eq!(resolve_story_html(true, Some("  ")), Some(DEFAULT_HTML));
        assert_eq!(resolve_story_html(true, Some("<p>x</p>")), Some("<p>x</p>"));
    }

    #[test]
    fn test_write_order() {
        let archive = DocxAssembler::new()
            .assemble("<p>Hello</p>", Some("<p>H</p>"), Some("<p>Page 1</p>"), &raw(true, true))
            .unwrap();
        let order: Vec<&str> = archive.file_list().collect();
        assert_eq!(
            order,
            vec![
                "_rels/.rels",
                "docProps/core.xml",
                "word/header1.xml",
                "word/footer1.xml",
                "word/theme/theme1.xml",
                "word/document.xml",
                "word/fontTable.xml",
                "word/styles.xml",
                "word/numbering.xml",
                "word/settings.xml",
                "word/webSettings.xml",
                "word/_rels/document.xml.rels",
                "[Content_Types].xml",
            ]
        );
    }

    #[test]
    fn test_relationship_ids_stable() {
        let archive = DocxAssembler::new()
            .assemble("<p>Hello</p>", None, None, &raw(true, true))
            .unwrap();
        let rels = archive.relationships_of("word/document.xml").unwrap().unwrap();
        assert_eq!(rels.get("rId6"), Some("header1.xml"));
        assert_eq!(rels.get("rId7"), Some("footer1.xml"));
        assert_eq!(rels.get("rId8"), Some("theme/theme1.xml"));

        let doc = archive.document_xml().unwrap();
        assert!(doc.contains(r#"<w:headerReference w:type="default" r:id="rId6"/>"#));
        assert!(doc.contains(r#"<w:footerReference w:type="default" r:id="rId7"/>"#));
    }

    #[test]
    fn test_body_links_numbered_before_header() {
        let archive = DocxAssembler::new()
            .assemble(
                r#"<p><a href="https://example.com">x</a></p>"#,
                None,
                None,
                &raw(true, false),
            )
            .unwrap();
        let rels = archive.relationships_of("word/document.xml").unwrap().unwrap();
        assert_eq!(rels.get("rId6"), Some("https://example.com"));
        assert_eq!(rels.get("rId7"), Some("header1.xml"));
        assert_eq!(rels.get("rId8"), Some("theme/theme1.xml"));
    }

    #[test]
    fn test_header_link_scoped_to_header() {
        let archive = DocxAssembler::new()
            .assemble(
                "<p>Body</p>",
                Some(r#"<p><a href="https://example.com/h">home</a></p>"#),
                None,
                &raw(true, false),
            )
            .unwrap();
        let header_rels = archive.relationships_of("word/header1.xml").unwrap().unwrap();
        assert_eq!(header_rels.get("rId1"), Some("https://example.com/h"));
        let header = archive.header_xml(1).unwrap();
        assert!(header.contains(r#"<w:hyperlink r:id="rId1">"#));
    }

    #[test]
    fn test_renderer_error_propagates() {
        let assembler = DocxAssembler::with_components(HtmlTreeBuilder::new(), FailingRenderer);
        let err = assembler
            .assemble("<p>x</p>", None, None, &RawDocumentOptions::default())
            .unwrap_err();
        assert!(matches!(err, OoxmlError::Render(msg) if msg == "boom"));
    }

    #[test]
    fn test_tree_error_propagates() {
        let assembler = DocxAssembler::with_components(FailingTreeBuilder, WordRenderer::new());
        let err = assembler
            .assemble("<p>x</p>", None, None, &RawDocumentOptions::default())
            .unwrap_err();
        assert!(matches!(err, OoxmlError::Tree(_)));
    }

    #[test]
    fn test_late_failure_aborts_whole_assembly() {
        let assembler =
            DocxAssembler::with_components(HtmlTreeBuilder::new(), FooterFailingRenderer);
        let result = assembler.assemble(
            "<p>Body</p>",
            Some("<p>Header</p>"),
            Some("<p>FOOTER</p>"),
            &raw(true, true),
        );
        assert!(matches!(result, Err(OoxmlError::Render(_))));
    }

    #[test]
    fn test_decode_unicode() {
        let opts = RawDocumentOptions {
            decode_unicode: Some(true),
            ..Default::default()
        };
        let archive = DocxAssembler::new()
            .assemble("&lt;b&gt;bold&lt;/b&gt; &amp;copy;", None, None, &opts)
            .unwrap();
        let doc = archive.document_xml().unwrap();
        // Decoded before parsing: the tags became real markup
        assert!(doc.contains("<w:b/>"));
        assert!(doc.contains("\u{a9}"));
    }

    #[test]
    fn test_without_decode_entities_stay_text() {
        let archive = DocxAssembler::new()
            .assemble("<p>&lt;b&gt;x&lt;/b&gt;</p>", None, None, &RawDocumentOptions::default())
            .unwrap();
        let doc = archive.document_xml().unwrap();
        assert!(doc.contains("&lt;b&gt;x&lt;/b&gt;"));
        assert!(!doc.contains("<w:b/>"));
    }

    #[test]
    fn test_legacy_separator_option() {
        let opts = RawDocumentOptions {
            footer: Some(true),
            legacy_field_separator: Some(true),
            ..Default::default()
        };
        let archive = DocxAssembler::new()
            .assemble("<p>x</p>", None, Some("<p>Page 1</p>"), &opts)
            .unwrap();
        let footer = archive.footer_xml(1).unwrap();
        assert_eq!(footer.matches(r#"w:fldCharType="seperate""#).count(), 2);
    }

    #[test]
    fn test_image_media_part_declared() {
        let png = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";
        let html = format!(r#"<p><img src="data:image/png;base64,{png}"></p>"#);
        let archive = DocxAssembler::new()
            .assemble(&html, None, None, &RawDocumentOptions::default())
            .unwrap();

        assert!(archive.contains("word/media/image1.png"));
        let ct = archive.content_types().unwrap();
        assert_eq!(ct.content_type_of("word/media/image1.png"), Some("image/png"));
        let rels = archive.relationships_of("word/document.xml").unwrap().unwrap();
        assert_eq!(rels.get("rId6"), Some("media/image1.png"));
    }
}
