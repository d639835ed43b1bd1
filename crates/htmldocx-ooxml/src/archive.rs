//! Package archive
//!
//! An `OoxmlArchive` is the sink the assembler writes parts into, and the
//! reader used to inspect finished `.docx` files. Parts are kept in the
//! order they were written; the zip is emitted in that order.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

use tracing::debug;
use zip::read::ZipArchive;
use zip::write::ZipWriter;
use zip::CompressionMethod;

use crate::content_types::{ContentTypes, CONTENT_TYPES_PATH};
use crate::error::{OoxmlError, Result};
use crate::relationships::{resolve_target, source_part_for, Relationships};

/// Parts of an OOXML package, keyed by path
#[derive(Debug, Default)]
pub struct OoxmlArchive {
    files: HashMap<String, Vec<u8>>,
    order: Vec<String>,
}

impl OoxmlArchive {
    /// Create an empty package
    pub fn new() -> Self {
        Self::default()
    }

    /// Open and unpack a `.docx` file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Unpack from any reader that implements Read + Seek
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;
        let mut package = Self::new();

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let name = file.name().to_string();

            if name.ends_with('/') {
                continue;
            }

            let mut contents = Vec::new();
            file.read_to_end(&mut contents)?;
            package.write_part(name, contents)?;
        }

        Ok(package)
    }

    /// Unpack from an in-memory zip
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_reader(Cursor::new(bytes))
    }

    /// Record a part
    ///
    /// Every part is written exactly once; a second write to the same path
    /// fails with [`OoxmlError::DuplicatePart`].
    pub fn write_part(&mut self, path: impl Into<String>, contents: Vec<u8>) -> Result<()> {
        let path = path.into();
        if self.files.contains_key(&path) {
            return Err(OoxmlError::DuplicatePart(path));
        }
        debug!(part = %path, bytes = contents.len(), "writing part");
        self.order.push(path.clone());
        self.files.insert(path, contents);
        Ok(())
    }

    /// Record a text part
    pub fn write_string(&mut self, path: impl Into<String>, contents: impl Into<String>) -> Result<()> {
        self.write_part(path, contents.into().into_bytes())
    }

    /// A part's contents
    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(|v| v.as_slice())
    }

    /// A part's contents as text
    pub fn get_string(&self, path: &str) -> Option<String> {
        self.files
            .get(path)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    /// A part's contents as text, or `MissingFile`
    pub fn require_string(&self, path: &str) -> Result<String> {
        self.get_string(path)
            .ok_or_else(|| OoxmlError::MissingFile(path.to_string()))
    }

    /// `word/document.xml`
    pub fn document_xml(&self) -> Result<String> {
        self.require_string("word/document.xml")
    }

    /// `word/header{index}.xml`
    pub fn header_xml(&self, index: u32) -> Option<String> {
        self.get_string(&format!("word/header{}.xml", index))
    }

    /// `word/footer{index}.xml`
    pub fn footer_xml(&self, index: u32) -> Option<String> {
        self.get_string(&format!("word/footer{}.xml", index))
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// Part paths in write order
    pub fn file_list(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Parsed `[Content_Types].xml`
    pub fn content_types(&self) -> Result<ContentTypes> {
        let bytes = self
            .get(CONTENT_TYPES_PATH)
            .ok_or_else(|| OoxmlError::MissingFile(CONTENT_TYPES_PATH.to_string()))?;
        ContentTypes::parse(bytes)
    }

    /// Parsed relationships owned by `part`, if it has any
    pub fn relationships_of(&self, part: &str) -> Result<Option<Relationships>> {
        let path = crate::relationships::rels_path_for(part);
        match self.get(&path) {
            Some(bytes) => Ok(Some(Relationships::parse(bytes)?)),
            None => Ok(None),
        }
    }

    /// Check the package graph
    ///
    /// Every internal relationship target must be a written part, and every
    /// written part must be covered by the content-type manifest.
    pub fn verify(&self) -> Result<()> {
        let content_types = self.content_types()?;

        for path in self.file_list() {
            if path == CONTENT_TYPES_PATH {
                continue;
            }
            if content_types.coverage(path).is_none() {
                return Err(OoxmlError::InvalidStructure(format!(
                    "part '{}' has no content type",
                    path
                )));
            }

            let Some(source) = source_part_for(path) else {
                continue;
            };
            if !source.is_empty() && !self.contains(&source) {
                return Err(OoxmlError::InvalidStructure(format!(
                    "relationships '{}' belong to missing part '{}'",
                    path, source
                )));
            }

            let rels = Relationships::parse(self.get(path).unwrap_or_default())?;
            for (id, rel) in rels.iter() {
                if rel.external {
                    continue;
                }
                let target = resolve_target(&source, &rel.target);
                if !self.contains(&target) {
                    return Err(OoxmlError::InvalidStructure(format!(
                        "{} in '{}' points to missing part '{}'",
                        id, path, target
                    )));
                }
            }
        }

        Ok(())
    }

    /// Write the package to a file
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        self.write_to(file)
    }

    /// Write the package as a zip, parts in write order
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        let mut zip = ZipWriter::new(writer);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated);

        for path in &self.order {
            zip.start_file(path.as_str(), options)?;
            zip.write_all(&self.files[path])?;
        }

        zip.finish()?;
        Ok(())
    }

    /// The package as zip bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        self.write_to(&mut buffer)?;
        Ok(buffer.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content_types::{CT_DOCUMENT, CT_RELATIONSHIPS, CT_XML};
    use crate::test_utils::{extract_file, minimal_docx_bytes, minimal_package};

    #[test]
    fn test_write_and_read_part() {
        let mut archive = OoxmlArchive::new();
        archive.write_string("word/document.xml", "<w:document/>").unwrap();

        assert!(archive.contains("word/document.xml"));
        assert_eq!(
            archive.get_string("word/document.xml").as_deref(),
            Some("<w:document/>")
        );
        assert!(archive.require_string("word/styles.xml").is_err());
    }

    #[test]
    fn test_duplicate_part_rejected() {
        let mut archive = OoxmlArchive::new();
        archive.write_string("word/document.xml", "a").unwrap();
        let err = archive.write_string("word/document.xml", "b").unwrap_err();
        assert!(matches!(err, OoxmlError::DuplicatePart(p) if p == "word/document.xml"));
        assert_eq!(archive.get_string("word/document.xml").as_deref(), Some("a"));
    }

    #[test]
    fn test_write_order_preserved_through_zip() {
        let mut archive = OoxmlArchive::new();
        archive.write_string("b.xml", "<b/>").unwrap();
        archive.write_string("a.xml", "<a/>").unwrap();
        archive.write_string(CONTENT_TYPES_PATH, "<Types/>").unwrap();

        let bytes = archive.to_bytes().unwrap();
        let restored = OoxmlArchive::from_bytes(&bytes).unwrap();
        let order: Vec<&str> = restored.file_list().collect();
        assert_eq!(order, vec!["b.xml", "a.xml", CONTENT_TYPES_PATH]);
    }

    #[test]
    fn test_verify_minimal_package() {
        let archive = minimal_package();
        archive.verify().unwrap();
    }

    #[test]
    fn test_read_externally_zipped_package() {
        let archive = OoxmlArchive::from_bytes(&minimal_docx_bytes()).unwrap();
        archive.verify().unwrap();

        let expected = minimal_package();
        assert_eq!(archive.len(), expected.len());
        for path in expected.file_list() {
            assert_eq!(archive.get(path), expected.get(path), "{}", path);
        }
    }

    #[test]
    fn test_serialized_package_readable_by_path() {
        let bytes = minimal_package().to_bytes().unwrap();
        let doc = extract_file(&bytes, "word/document.xml").unwrap();
        assert!(doc.contains("<w:t>Minimal</w:t>"));
        assert!(extract_file(&bytes, "word/missing.xml").is_none());
    }

    #[test]
    fn test_verify_dangling_relationship() {
        let mut archive = OoxmlArchive::new();
        let mut ct = ContentTypes::new();
        ct.add_default("rels", CT_RELATIONSHIPS);
        ct.add_default("xml", CT_XML);
        ct.add_override("word/document.xml", CT_DOCUMENT);

        let mut rels = Relationships::new();
        rels.add("word/document.xml", Relationships::TYPE_OFFICE_DOCUMENT);
        let mut doc_rels = Relationships::new();
        doc_rels.add("header1.xml", Relationships::TYPE_HEADER);

        archive.write_string("_rels/.rels", rels.to_xml()).unwrap();
        archive.write_string("word/document.xml", "<w:document/>").unwrap();
        archive
            .write_string("word/_rels/document.xml.rels", doc_rels.to_xml())
            .unwrap();
        archive.write_string(CONTENT_TYPES_PATH, ct.to_xml()).unwrap();

        let err = archive.verify().unwrap_err();
        assert!(matches!(err, OoxmlError::InvalidStructure(msg) if msg.contains("word/header1.xml")));
    }

    #[test]
    fn test_verify_uncovered_part() {
        let mut archive = minimal_package();
        archive.write_part("word/media/image1.png", vec![0x89]).unwrap();
        let err = archive.verify().unwrap_err();
        assert!(matches!(err, OoxmlError::InvalidStructure(msg) if msg.contains("image1.png")));
    }

    #[test]
    fn test_external_targets_not_checked() {
        let mut archive = OoxmlArchive::new();
        let mut ct = ContentTypes::new();
        ct.add_default("rels", CT_RELATIONSHIPS);
        ct.add_default("xml", CT_XML);

        let mut rels = Relationships::new();
        rels.add_external("https://example.com", Relationships::TYPE_HYPERLINK);
        archive.write_string("_rels/.rels", rels.to_xml()).unwrap();
        archive.write_string(CONTENT_TYPES_PATH, ct.to_xml()).unwrap();

        archive.verify().unwrap();
    }

    #[test]
    fn test_missing_content_types() {
        let archive = OoxmlArchive::new();
        assert!(matches!(
            archive.verify(),
            Err(OoxmlError::MissingFile(p)) if p == CONTENT_TYPES_PATH
        ));
    }
}
