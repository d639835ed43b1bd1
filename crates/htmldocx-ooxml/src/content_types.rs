//! `[Content_Types].xml` generation
//!
//! Parts with a common extension (`rels`, `xml`, images) are covered by
//! `Default` entries; every WordprocessingML part gets an explicit
//! `Override`. A part is never both overridden and default-covered with a
//! different type: the override always wins and is the only entry that
//! mentions the part by name.

use std::collections::BTreeMap;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{OoxmlError, Result};
use crate::xml::{escape_xml, XML_DECLARATION};

/// Content types namespace
pub const CONTENT_TYPES_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

/// Package path of the manifest
pub const CONTENT_TYPES_PATH: &str = "[Content_Types].xml";

pub const CT_RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";
pub const CT_XML: &str = "application/xml";
pub const CT_DOCUMENT: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
pub const CT_HEADER: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.header+xml";
pub const CT_FOOTER: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml";
pub const CT_STYLES: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml";
pub const CT_NUMBERING: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml";
pub const CT_SETTINGS: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.settings+xml";
pub const CT_WEB_SETTINGS: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.webSettings+xml";
pub const CT_FONT_TABLE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.fontTable+xml";
pub const CT_THEME: &str = "application/vnd.openxmlformats-officedocument.theme+xml";
pub const CT_CORE_PROPERTIES: &str = "application/vnd.openxmlformats-package.core-properties+xml";

/// How a part's content type is declared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coverage<'a> {
    /// Covered by a `Default` entry for its extension
    Default(&'a str),
    /// Named by an `Override` entry
    Override(&'a str),
}

/// Content-type manifest under construction
#[derive(Debug, Clone, Default)]
pub struct ContentTypes {
    defaults: BTreeMap<String, String>,
    overrides: BTreeMap<String, String>,
}

impl ContentTypes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an existing `[Content_Types].xml`
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut types = Self::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    let local = e.local_name();
                    let mut key = None;
                    let mut content_type = None;
                    for attr in e.attributes().filter_map(|a| a.ok()) {
                        let value = attr.unescape_value().ok().map(|s| s.to_string());
                        match attr.key.as_ref() {
                            b"Extension" | b"PartName" => key = value,
                            b"ContentType" => content_type = value,
                            _ => {}
                        }
                    }
                    if let (Some(key), Some(ct)) = (key, content_type) {
                        match local.as_ref() {
                            b"Default" => types.add_default(&key, &ct),
                            b"Override" => types.add_override(&key, &ct),
                            _ => {}
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(OoxmlError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(types)
    }

    /// Declare a default for an extension (case-insensitive, no dot)
    pub fn add_default(&mut self, extension: &str, content_type: &str) {
        self.defaults
            .insert(extension.to_ascii_lowercase(), content_type.to_string());
    }

    /// Declare an override for a package path (no leading slash)
    pub fn add_override(&mut self, part: &str, content_type: &str) {
        self.overrides
            .insert(part.trim_start_matches('/').to_string(), content_type.to_string());
    }

    /// Record a written part
    ///
    /// Parts whose type matches their extension's default need no entry.
    pub fn register(&mut self, part: &str, content_type: &str) {
        match extension_of(part) {
            Some(ext) if self.defaults.get(&ext).map(String::as_str) == Some(content_type) => {}
            _ => self.add_override(part, content_type),
        }
    }

    /// How `part` is covered, if at all
    pub fn coverage(&self, part: &str) -> Option<Coverage<'_>> {
        let key = part.trim_start_matches('/');
        if let Some(ct) = self.overrides.get(key) {
            return Some(Coverage::Override(ct.as_str()));
        }
        extension_of(key)
            .and_then(|ext| self.defaults.get(&ext))
            .map(|ct| Coverage::Default(ct.as_str()))
    }

    /// Content type `part` resolves to
    pub fn content_type_of(&self, part: &str) -> Option<&str> {
        self.coverage(part).map(|c| match c {
            Coverage::Default(ct) | Coverage::Override(ct) => ct,
        })
    }

    pub fn has_default(&self, extension: &str) -> bool {
        self.defaults.contains_key(&extension.to_ascii_lowercase())
    }

    /// `(extension, content type)` pairs, sorted by extension
    pub fn defaults(&self) -> impl Iterator<Item = (&str, &str)> {
        self.defaults.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `(part, content type)` pairs, sorted by part
    pub fn overrides(&self) -> impl Iterator<Item = (&str, &str)> {
        self.overrides.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Serialize the manifest
    pub fn to_xml(&self) -> String {
        let mut xml = String::new();
        xml.push_str(XML_DECLARATION);
        xml.push('\n');
        xml.push_str(&format!(r#"<Types xmlns="{}">"#, CONTENT_TYPES_NS));
        for (ext, ct) in &self.defaults {
            xml.push_str(&format!(
                r#"<Default Extension="{}" ContentType="{}"/>"#,
                escape_xml(ext),
                escape_xml(ct)
            ));
        }
        for (part, ct) in &self.overrides {
            xml.push_str(&format!(
                r#"<Override PartName="/{}" ContentType="{}"/>"#,
                escape_xml(part),
                escape_xml(ct)
            ));
        }
        xml.push_str("</Types>");
        xml
    }
}

/// Lower-case extension of a part path
pub fn extension_of(part: &str) -> Option<String> {
    let name = part.rsplit('/').next()?;
    let (_, ext) = name.rsplit_once('.')?;
    if ext.is_empty() {
        None
    } else {
        Some(ext.to_ascii_lowercase())
    }
}

/// Content type for an image extension
pub fn image_content_type(extension: &str) -> Option<&'static str> {
    match extension.to_ascii_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        "svg" => Some("image/svg+xml"),
        "webp" => Some("image/webp"),
        "tif" | "tiff" => Some("image/tiff"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> ContentTypes {
        let mut ct = ContentTypes::new();
        ct.add_default("rels", CT_RELATIONSHIPS);
        ct.add_default("xml", CT_XML);
        ct
    }

    #[test]
    fn test_register_uses_default_when_matching() {
        let mut ct = base();
        ct.register("word/_rels/document.xml.rels", CT_RELATIONSHIPS);
        ct.register("word/document.xml", CT_DOCUMENT);

        assert_eq!(
            ct.coverage("word/_rels/document.xml.rels"),
            Some(Coverage::Default(CT_RELATIONSHIPS))
        );
        assert_eq!(
            ct.coverage("word/document.xml"),
            Some(Coverage::Override(CT_DOCUMENT))
        );
    }

    #[test]
    fn test_uncovered_part() {
        let ct = base();
        assert_eq!(ct.coverage("word/media/image1.png"), None);
    }

    #[test]
    fn test_to_xml() {
        let mut ct = base();
        ct.add_default("png", "image/png");
        ct.register("word/styles.xml", CT_STYLES);
        let xml = ct.to_xml();

        assert!(xml.contains(r#"<Default Extension="png" ContentType="image/png"/>"#));
        assert!(xml.contains(&format!(
            r#"<Override PartName="/word/styles.xml" ContentType="{CT_STYLES}"/>"#
        )));
        assert!(xml.ends_with("</Types>"));

        let reparsed = ContentTypes::parse(xml.as_bytes()).unwrap();
        assert_eq!(reparsed.content_type_of("/word/styles.xml"), Some(CT_STYLES));
        assert_eq!(reparsed.content_type_of("word/media/a.png"), Some("image/png"));
        assert_eq!(reparsed.overrides().count(), 1);
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("word/media/image1.PNG").as_deref(), Some("png"));
        assert_eq!(extension_of("_rels/.rels").as_deref(), Some("rels"));
        assert_eq!(extension_of("word/noext"), None);
        assert_eq!(extension_of("a.b/c"), None);
    }

    #[test]
    fn test_image_content_type() {
        assert_eq!(image_content_type("JPG"), Some("image/jpeg"));
        assert_eq!(image_content_type("exe"), None);
    }
}
