//! Relationship scopes
//!
//! Each part that references other parts owns a `.rels` file listing
//! `(Id, Type, Target)` triples. Ids are unique within that file only, so a
//! header and the main document may both use `rId1` for different targets.
//!
//! # Example
//!
//! ```ignore
//! use htmldocx_ooxml::relationships::Relationships;
//!
//! let mut rels = Relationships::new();
//! let id = rels.add("header1.xml", Relationships::TYPE_HEADER);
//! assert_eq!(id, "rId1");
//! let xml = rels.to_xml();
//! ```

use std::collections::HashMap;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{OoxmlError, Result};
use crate::xml::{escape_xml, XML_DECLARATION};

/// OOXML namespace for relationships
pub const RELATIONSHIPS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// Relationship type URIs
impl Relationships {
    pub const TYPE_OFFICE_DOCUMENT: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    pub const TYPE_CORE_PROPERTIES: &'static str =
        "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
    pub const TYPE_HEADER: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/header";
    pub const TYPE_FOOTER: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer";
    pub const TYPE_THEME: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";
    pub const TYPE_HYPERLINK: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";
    pub const TYPE_IMAGE: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
    pub const TYPE_STYLES: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
    pub const TYPE_NUMBERING: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering";
    pub const TYPE_FONT_TABLE: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/fontTable";
    pub const TYPE_SETTINGS: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/settings";
    pub const TYPE_WEB_SETTINGS: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/webSettings";
}

/// One relationship scope, in insertion order
#[derive(Debug, Clone)]
pub struct Relationships {
    order: Vec<String>,
    map: HashMap<String, Relationship>,
    next_id_counter: u32,
}

impl Default for Relationships {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            map: HashMap::new(),
            next_id_counter: 1,
        }
    }
}

/// A relationship entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Part path relative to the owning part's folder, or a URL
    pub target: String,
    /// Relationship type URI
    pub rel_type: String,
    /// `true` for `TargetMode="External"`
    pub external: bool,
}

impl Relationships {
    /// Create an empty scope
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `.rels` file
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut rels = Self::new();
        let mut max_id: u32 = 0;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    if e.local_name().as_ref() == b"Relationship" {
                        let mut id = None;
                        let mut target = None;
                        let mut rel_type = None;
                        let mut external = false;

                        for attr in e.attributes().filter_map(|a| a.ok()) {
                            let value = attr.unescape_value().ok().map(|s| s.to_string());
                            match attr.key.as_ref() {
                                b"Id" => id = value,
                                b"Target" => target = value,
                                b"Type" => rel_type = value,
                                b"TargetMode" => {
                                    external = value.as_deref() == Some("External");
                                }
                                _ => {}
                            }
                        }

                        if let (Some(id), Some(target)) = (id, target) {
                            if let Some(num) = extract_id_number(&id) {
                                max_id = max_id.max(num);
                            }
                            rels.order.push(id.clone());
                            rels.map.insert(
                                id,
                                Relationship {
                                    target,
                                    rel_type: rel_type.unwrap_or_default(),
                                    external,
                                },
                            );
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(OoxmlError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        rels.next_id_counter = max_id + 1;
        Ok(rels)
    }

    /// Add an internal relationship and return its id
    pub fn add(&mut self, target: impl Into<String>, rel_type: &str) -> String {
        self.insert(target.into(), rel_type, false)
    }

    /// Add an external relationship (`TargetMode="External"`) and return its id
    pub fn add_external(&mut self, target: impl Into<String>, rel_type: &str) -> String {
        self.insert(target.into(), rel_type, true)
    }

    fn insert(&mut self, target: String, rel_type: &str, external: bool) -> String {
        let id = format!("rId{}", self.next_id_counter);
        self.next_id_counter += 1;

        self.order.push(id.clone());
        self.map.insert(
            id.clone(),
            Relationship {
                target,
                rel_type: rel_type.to_string(),
                external,
            },
        );
        id
    }

    /// Serialize to a `.rels` part
    pub fn to_xml(&self) -> String {
        let mut xml = String::new();
        xml.push_str(XML_DECLARATION);
        xml.push('\n');
        xml.push_str(&format!(r#"<Relationships xmlns="{}">"#, RELATIONSHIPS_NS));

        for (id, rel) in self.iter() {
            xml.push_str(&format!(
                r#"<Relationship Id="{}" Type="{}" Target="{}""#,
                escape_xml(id),
                escape_xml(&rel.rel_type),
                escape_xml(&rel.target)
            ));
            if rel.external {
                xml.push_str(r#" TargetMode="External""#);
            }
            xml.push_str("/>");
        }

        xml.push_str("</Relationships>");
        xml
    }

    /// Target of a relationship id
    pub fn get(&self, id: &str) -> Option<&str> {
        self.map.get(id).map(|r| r.target.as_str())
    }

    /// Full relationship entry for an id
    pub fn get_relationship(&self, id: &str) -> Option<&Relationship> {
        self.map.get(id)
    }

    /// First relationship id of the given type
    pub fn find_by_type(&self, rel_type: &str) -> Option<&str> {
        self.iter()
            .find(|(_, rel)| rel.rel_type == rel_type)
            .map(|(id, _)| id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.map.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Relationship)> {
        self.order
            .iter()
            .filter_map(|id| self.map.get(id).map(|rel| (id.as_str(), rel)))
    }

    /// Next id that [`add`](Self::add) would return
    pub fn peek_next_id(&self) -> String {
        format!("rId{}", self.next_id_counter)
    }
}

/// Numeric part of a relationship id (`rId5` -> 5)
fn extract_id_number(id: &str) -> Option<u32> {
    id.strip_prefix("rId")
        .or_else(|| id.strip_prefix("RId"))
        .or_else(|| id.strip_prefix("rid"))
        .and_then(|num_str| num_str.parse().ok())
}

/// Resolve a relationship target against the folder of its owning part
///
/// `source` is the owning part (`word/document.xml`, or empty for the
/// package-level `_rels/.rels`). Absolute targets start at the package root.
pub fn resolve_target(source: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut segments: Vec<&str> = match source.rfind('/') {
        Some(pos) => source[..pos].split('/').collect(),
        None => Vec::new(),
    };
    for segment in target.split('/') {
        match segment {
            "." | "" => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}

/// Path of the `.rels` file owned by `part`
///
/// `word/document.xml` -> `word/_rels/document.xml.rels`
pub fn rels_path_for(part: &str) -> String {
    match part.rfind('/') {
        Some(pos) => format!("{}/_rels/{}.rels", &part[..pos], &part[pos + 1..]),
        None => format!("_rels/{part}.rels"),
    }
}

/// Owning part of a `.rels` file, the inverse of [`rels_path_for`]
///
/// Returns an empty string for the package-level `_rels/.rels`.
pub fn source_part_for(rels_path: &str) -> Option<String> {
    let (dir, file) = match rels_path.rfind('/') {
        Some(pos) => (&rels_path[..pos], &rels_path[pos + 1..]),
        None => return None,
    };
    let folder = dir.strip_suffix("_rels")?;
    let name = file.strip_suffix(".rels")?;
    Some(format!("{folder}{name}"))
}
