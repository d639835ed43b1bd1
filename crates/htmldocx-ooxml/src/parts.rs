//! Fixed package parts
//!
//! Everything the package needs besides the rendered body, header and
//! footer: core properties, package relationships, styles, numbering,
//! settings, web settings, font table, theme, and the wrappers that turn a
//! rendered body into `document.xml`, `header{n}.xml` or `footer{n}.xml`.

use chrono::SecondsFormat;

use crate::options::DocumentOptions;
use crate::relationships::Relationships;
use crate::xml::{escape_xml, wordprocessing_namespaces, NS_A, NS_W, XML_DECLARATION};

pub const DOCUMENT_PART: &str = "word/document.xml";
pub const CORE_PROPERTIES_PART: &str = "docProps/core.xml";
pub const PACKAGE_RELS_PART: &str = "_rels/.rels";
pub const STYLES_PART: &str = "word/styles.xml";
pub const NUMBERING_PART: &str = "word/numbering.xml";
pub const SETTINGS_PART: &str = "word/settings.xml";
pub const WEB_SETTINGS_PART: &str = "word/webSettings.xml";
pub const FONT_TABLE_PART: &str = "word/fontTable.xml";
pub const THEME_PART: &str = "word/theme/theme1.xml";

/// Numbering instance for bulleted lists
pub const BULLET_NUM_ID: u32 = 1;
/// Numbering instance for decimal lists
pub const DECIMAL_NUM_ID: u32 = 2;

/// Header and footer references for the section properties
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionReferences {
    /// Relationship id of the header, if any
    pub header: Option<String>,
    /// Relationship id of the footer, if any
    pub footer: Option<String>,
}

/// `_rels/.rels`
pub fn package_relationships() -> Relationships {
    let mut rels = Relationships::new();
    rels.add(DOCUMENT_PART, Relationships::TYPE_OFFICE_DOCUMENT);
    rels.add(CORE_PROPERTIES_PART, Relationships::TYPE_CORE_PROPERTIES);
    rels
}

/// Relationship scope of `word/document.xml`, seeded with the fixed parts
///
/// Rendering, header, footer and theme ids follow from `rId6`.
pub fn document_relationships() -> Relationships {
    let mut rels = Relationships::new();
    rels.add("numbering.xml", Relationships::TYPE_NUMBERING);
    rels.add("styles.xml", Relationships::TYPE_STYLES);
    rels.add("settings.xml", Relationships::TYPE_SETTINGS);
    rels.add("webSettings.xml", Relationships::TYPE_WEB_SETTINGS);
    rels.add("fontTable.xml", Relationships::TYPE_FONT_TABLE);
    rels
}

/// `docProps/core.xml`
pub fn core_properties_xml(options: &DocumentOptions) -> String {
    let mut xml = String::new();
    xml.push_str(XML_DECLARATION);
    xml.push('\n');
    xml.push_str(
        r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
    );
    xml.push_str(&format!("<dc:title>{}</dc:title>", escape_xml(&options.title)));
    xml.push_str(&format!(
        "<dc:subject>{}</dc:subject>",
        escape_xml(&options.subject)
    ));
    xml.push_str(&format!(
        "<dc:creator>{}</dc:creator>",
        escape_xml(&options.creator)
    ));
    xml.push_str(&format!(
        "<cp:keywords>{}</cp:keywords>",
        escape_xml(&options.keywords.join(", "))
    ));
    xml.push_str(&format!(
        "<dc:description>{}</dc:description>",
        escape_xml(&options.description)
    ));
    xml.push_str(&format!(
        "<cp:lastModifiedBy>{}</cp:lastModifiedBy>",
        escape_xml(&options.last_modified_by)
    ));
    xml.push_str(&format!("<cp:revision>{}</cp:revision>", options.revision));
    xml.push_str(&format!(
        r#"<dcterms:created xsi:type="dcterms:W3CDTF">{}</dcterms:created>"#,
        options.created_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    ));
    xml.push_str(&format!(
        r#"<dcterms:modified xsi:type="dcterms:W3CDTF">{}</dcterms:modified>"#,
        options.modified_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    ));
    xml.push_str("</cp:coreProperties>");
    xml
}

/// `w:sectPr` closing the document body
pub fn section_properties_xml(options: &DocumentOptions, refs: &SectionReferences) -> String {
    let mut xml = String::from("<w:sectPr>");
    if let Some(id) = &refs.header {
        xml.push_str(&format!(
            r#"<w:headerReference w:type="{}" r:id="{}"/>"#,
            escape_xml(&options.header_type),
            escape_xml(id)
        ));
    }
    if let Some(id) = &refs.footer {
        xml.push_str(&format!(
            r#"<w:footerReference w:type="{}" r:id="{}"/>"#,
            escape_xml(&options.footer_type),
            escape_xml(id)
        ));
    }
    xml.push_str(&format!(
        r#"<w:pgSz w:w="{}" w:h="{}" w:orient="{}"/>"#,
        escape_xml(&options.page_width().to_string()),
        escape_xml(&options.page_height().to_string()),
        options.orientation.as_str()
    ));
    let m = &options.margins;
    xml.push_str(&format!(
        r#"<w:pgMar w:top="{}" w:right="{}" w:bottom="{}" w:left="{}" w:header="{}" w:footer="{}" w:gutter="{}"/>"#,
        escape_xml(&m.top.to_string()),
        escape_xml(&m.right.to_string()),
        escape_xml(&m.bottom.to_string()),
        escape_xml(&m.left.to_string()),
        escape_xml(&m.header.to_string()),
        escape_xml(&m.footer.to_string()),
        escape_xml(&m.gutter.to_string())
    ));
    if options.line_number {
        let ln = &options.line_number_options;
        xml.push_str(&format!(
            r#"<w:lnNumType w:countBy="{}" w:start="{}" w:restart="{}"/>"#,
            ln.count_by,
            ln.start,
            escape_xml(&ln.restart)
        ));
    }
    if options.skip_first_header_footer {
        xml.push_str("<w:titlePg/>");
    }
    xml.push_str("</w:sectPr>");
    xml
}

/// `word/document.xml` around a rendered body
pub fn document_xml(body: &str, section_properties: &str) -> String {
    let mut xml = String::new();
    xml.push_str(XML_DECLARATION);
    xml.push('\n');
    xml.push_str(&format!("<w:document {}>", wordprocessing_namespaces()));
    xml.push_str("<w:body>");
    xml.push_str(body);
    xml.push_str(section_properties);
    xml.push_str("</w:body></w:document>");
    xml
}

/// `word/header{n}.xml` around a rendered body
pub fn header_xml(body: &str) -> String {
    wrap_story("w:hdr", body)
}

/// `word/footer{n}.xml` around a rendered body
pub fn footer_xml(body: &str) -> String {
    wrap_story("w:ftr", body)
}

fn wrap_story(root: &str, body: &str) -> String {
    let mut xml = String::new();
    xml.push_str(XML_DECLARATION);
    xml.push('\n');
    xml.push_str(&format!("<{} {}>", root, wordprocessing_namespaces()));
    // Headers and footers must contain at least one block
    if body.trim().is_empty() {
        xml.push_str("<w:p/>");
    } else {
        xml.push_str(body);
    }
    xml.push_str(&format!("</{}>", root));
    xml
}

/// `word/styles.xml`
pub fn styles_xml(options: &DocumentOptions) -> String {
    let font = escape_xml(&options.font);
    let lang = escape_xml(&options.lang);

    let mut xml = String::new();
    xml.push_str(XML_DECLARATION);
    xml.push('\n');
    xml.push_str(&format!(r#"<w:styles xmlns:w="{}">"#, NS_W));

    xml.push_str("<w:docDefaults><w:rPrDefault><w:rPr>");
    xml.push_str(&format!(
        r#"<w:rFonts w:ascii="{font}" w:eastAsia="{font}" w:hAnsi="{font}" w:cs="{font}"/>"#
    ));
    if let Some(size) = &options.font_size {
        xml.push_str(&format!(
            r#"<w:sz w:val="{}"/>"#,
            escape_xml(&size.to_string())
        ));
    }
    if let Some(size) = &options.complex_script_font_size {
        xml.push_str(&format!(
            r#"<w:szCs w:val="{}"/>"#,
            escape_xml(&size.to_string())
        ));
    }
    xml.push_str(&format!(
        r#"<w:lang w:val="{lang}" w:eastAsia="{lang}" w:bidi="ar-SA"/>"#
    ));
    xml.push_str("</w:rPr></w:rPrDefault>");
    xml.push_str(r#"<w:pPrDefault><w:pPr><w:spacing w:after="120" w:line="240" w:lineRule="atLeast"/></w:pPr></w:pPrDefault>"#);
    xml.push_str("</w:docDefaults>");

    xml.push_str(r#"<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="normal"/><w:qFormat/></w:style>"#);

    // Heading sizes in half-points, level 1 first
    const HEADING_SIZES: [u32; 6] = [48, 36, 28, 24, 22, 20];
    for (i, size) in HEADING_SIZES.iter().enumerate() {
        let level = i + 1;
        xml.push_str(&format!(
            concat!(
                r#"<w:style w:type="paragraph" w:styleId="Heading{0}">"#,
                r#"<w:name w:val="heading {0}"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:uiPriority w:val="9"/><w:qFormat/>"#,
                r#"<w:pPr><w:keepNext/><w:keepLines/><w:spacing w:before="240" w:after="60"/><w:outlineLvl w:val="{1}"/></w:pPr>"#,
                r#"<w:rPr><w:b/><w:bCs/><w:sz w:val="{2}"/><w:szCs w:val="{2}"/></w:rPr>"#,
                "</w:style>"
            ),
            level,
            i,
            size
        ));
    }

    xml.push_str(r#"<w:style w:type="paragraph" w:styleId="Quote"><w:name w:val="Quote"/><w:basedOn w:val="Normal"/><w:qFormat/><w:pPr><w:ind w:left="720" w:right="720"/></w:pPr><w:rPr><w:i/></w:rPr></w:style>"#);
    xml.push_str(r#"<w:style w:type="paragraph" w:styleId="ListParagraph"><w:name w:val="List Paragraph"/><w:basedOn w:val="Normal"/><w:qFormat/><w:pPr><w:ind w:left="720"/><w:contextualSpacing/></w:pPr></w:style>"#);
    xml.push_str(r#"<w:style w:type="paragraph" w:styleId="Code"><w:name w:val="Code"/><w:basedOn w:val="Normal"/><w:pPr><w:spacing w:after="0"/></w:pPr><w:rPr><w:rFonts w:ascii="Courier New" w:hAnsi="Courier New" w:cs="Courier New"/></w:rPr></w:style>"#);
    xml.push_str(r#"<w:style w:type="character" w:styleId="Hyperlink"><w:name w:val="Hyperlink"/><w:uiPriority w:val="99"/><w:unhideWhenUsed/><w:rPr><w:color w:val="0563C1" w:themeColor="hyperlink"/><w:u w:val="single"/></w:rPr></w:style>"#);
    xml.push_str(r#"<w:style w:type="table" w:default="1" w:styleId="TableNormal"><w:name w:val="Normal Table"/><w:uiPriority w:val="99"/><w:semiHidden/><w:unhideWhenUsed/><w:tblPr><w:tblInd w:w="0" w:type="dxa"/><w:tblCellMar><w:top w:w="0" w:type="dxa"/><w:left w:w="108" w:type="dxa"/><w:bottom w:w="0" w:type="dxa"/><w:right w:w="108" w:type="dxa"/></w:tblCellMar></w:tblPr></w:style>"#);
    xml.push_str(r#"<w:style w:type="table" w:styleId="TableGrid"><w:name w:val="Table Grid"/><w:basedOn w:val="TableNormal"/><w:uiPriority w:val="59"/><w:tblPr><w:tblBorders><w:top w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:left w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:bottom w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:right w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:insideH w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:insideV w:val="single" w:sz="4" w:space="0" w:color="auto"/></w:tblBorders></w:tblPr></w:style>"#);

    xml.push_str("</w:styles>");
    xml
}

/// `word/numbering.xml` with one bullet and one decimal definition
pub fn numbering_xml() -> String {
    const BULLETS: [&str; 3] = ["\u{2022}", "o", "\u{25aa}"];

    let mut xml = String::new();
    xml.push_str(XML_DECLARATION);
    xml.push('\n');
    xml.push_str(&format!(r#"<w:numbering xmlns:w="{}">"#, NS_W));

    xml.push_str(r#"<w:abstractNum w:abstractNumId="0"><w:multiLevelType w:val="hybridMultilevel"/>"#);
    for level in 0..9u32 {
        xml.push_str(&format!(
            r#"<w:lvl w:ilvl="{}"><w:start w:val="1"/><w:numFmt w:val="bullet"/><w:lvlText w:val="{}"/><w:lvlJc w:val="left"/><w:pPr><w:ind w:left="{}" w:hanging="360"/></w:pPr></w:lvl>"#,
            level,
            BULLETS[level as usize % BULLETS.len()],
            720 * (level + 1)
        ));
    }
    xml.push_str("</w:abstractNum>");

    xml.push_str(r#"<w:abstractNum w:abstractNumId="1"><w:multiLevelType w:val="hybridMultilevel"/>"#);
    for level in 0..9u32 {
        xml.push_str(&format!(
            r#"<w:lvl w:ilvl="{0}"><w:start w:val="1"/><w:numFmt w:val="decimal"/><w:lvlText w:val="%{1}."/><w:lvlJc w:val="left"/><w:pPr><w:ind w:left="{2}" w:hanging="360"/></w:pPr></w:lvl>"#,
            level,
            level + 1,
            720 * (level + 1)
        ));
    }
    xml.push_str("</w:abstractNum>");

    xml.push_str(&format!(
        r#"<w:num w:numId="{}"><w:abstractNumId w:val="0"/></w:num>"#,
        BULLET_NUM_ID
    ));
    xml.push_str(&format!(
        r#"<w:num w:numId="{}"><w:abstractNumId w:val="1"/></w:num>"#,
        DECIMAL_NUM_ID
    ));
    xml.push_str("</w:numbering>");
    xml
}

/// `word/settings.xml`
pub fn settings_xml() -> String {
    format!(
        r#"{}
<w:settings xmlns:w="{}"><w:zoom w:percent="100"/><w:defaultTabStop w:val="720"/><w:characterSpacingControl w:val="doNotCompress"/><w:compat><w:compatSetting w:name="compatibilityMode" w:uri="http://schemas.microsoft.com/office/word" w:val="15"/></w:compat></w:settings>"#,
        XML_DECLARATION, NS_W
    )
}

/// `word/webSettings.xml`
pub fn web_settings_xml() -> String {
    format!(
        r#"{}
<w:webSettings xmlns:w="{}"><w:optimizeForBrowser/><w:allowPNG/></w:webSettings>"#,
        XML_DECLARATION, NS_W
    )
}

/// `word/fontTable.xml`
pub fn font_table_xml(options: &DocumentOptions) -> String {
    let mut xml = String::new();
    xml.push_str(XML_DECLARATION);
    xml.push('\n');
    xml.push_str(&format!(r#"<w:fonts xmlns:w="{}">"#, NS_W));

    let mut fonts = vec![options.font.as_str()];
    for builtin in ["Symbol", "Courier New"] {
        if !fonts.contains(&builtin) {
            fonts.push(builtin);
        }
    }
    for font in fonts {
        let family = match font {
            "Symbol" => "roman",
            "Courier New" => "modern",
            _ => "auto",
        };
        xml.push_str(&format!(
            r#"<w:font w:name="{}"><w:charset w:val="00"/><w:family w:val="{}"/><w:pitch w:val="variable"/></w:font>"#,
            escape_xml(font),
            family
        ));
    }

    xml.push_str("</w:fonts>");
    xml
}

/// `word/theme/theme1.xml`
pub fn theme_xml(options: &DocumentOptions) -> String {
    let font = escape_xml(&options.font);
    format!(
        r#"{decl}
<a:theme xmlns:a="{ns}" name="Office Theme">
  <a:themeElements>
    <a:clrScheme name="Office">
      <a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1>
      <a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>
      <a:dk2><a:srgbClr val="44546A"/></a:dk2>
      <a:lt2><a:srgbClr val="E7E6E6"/></a:lt2>
      <a:accent1><a:srgbClr val="4472C4"/></a:accent1>
      <a:accent2><a:srgbClr val="ED7D31"/></a:accent2>
      <a:accent3><a:srgbClr val="A5A5A5"/></a:accent3>
      <a:accent4><a:srgbClr val="FFC000"/></a:accent4>
      <a:accent5><a:srgbClr val="5B9BD5"/></a:accent5>
      <a:accent6><a:srgbClr val="70AD47"/></a:accent6>
      <a:hlink><a:srgbClr val="0563C1"/></a:hlink>
      <a:folHlink><a:srgbClr val="954F72"/></a:folHlink>
    </a:clrScheme>
    <a:fontScheme name="Office">
      <a:majorFont>
        <a:latin typeface="{font}"/>
        <a:ea typeface=""/>
        <a:cs typeface=""/>
      </a:majorFont>
      <a:minorFont>
        <a:latin typeface="{font}"/>
        <a:ea typeface=""/>
        <a:cs typeface=""/>
      </a:minorFont>
    </a:fontScheme>
    <a:fmtScheme name="Office">
      <a:fillStyleLst>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
      </a:fillStyleLst>
      <a:lnStyleLst>
        <a:ln w="6350"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>
        <a:ln w="12700"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>
        <a:ln w="19050"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>
      </a:lnStyleLst>
      <a:effectStyleLst>
        <a:effectStyle><a:effectLst/></a:effectStyle>
        <a:effectStyle><a:effectLst/></a:effectStyle>
        <a:effectStyle><a:effectLst/></a:effectStyle>
      </a:effectStyleLst>
      <a:bgFillStyleLst>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
      </a:bgFillStyleLst>
    </a:fmtScheme>
  </a:themeElements>
  <a:objectDefaults/>
  <a:extraClrSchemeLst/>
</a:theme>"#,
        decl = XML_DECLARATION,
        ns = NS_A,
        font = font
    )
}
