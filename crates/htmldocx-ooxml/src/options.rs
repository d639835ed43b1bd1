//! Document options
//!
//! Options travel through three shapes:
//!
//! 1. [`RawDocumentOptions`]: what the user supplied, every field optional,
//!    dimensions still raw (`"2cm"`, `1440`, `"12pt"`).
//! 2. [`OptionsPatch`]: the same keys after unit normalization. Composite
//!    dimensions (margins, page size) are fully resolved against the
//!    defaults here, one sub-field at a time.
//! 3. [`DocumentOptions`]: the defaults with the patch laid over them key by
//!    key. This is what the assembler consumes.
//!
//! # Example
//!
//! ```ignore
//! let raw: RawDocumentOptions = toml::from_str(r#"
//!     fontSize = "12pt"
//!     [margins]
//!     top = "1in"
//! "#)?;
//! let options = DocumentOptions::from_raw(&raw);
//! assert_eq!(options.margins.top, Measure::Value(1440));
//! assert_eq!(options.margins.left, Measure::Value(1800));
//! ```

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{OoxmlError, Result};
use crate::units::{normalize_font_size, normalize_length, Measure, RawLength};

/// HTML substituted when a header or footer is enabled without content
pub const DEFAULT_HTML: &str = "<p></p>";

/// Page orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Taller than wide
    #[default]
    Portrait,
    /// Wider than tall
    Landscape,
}

impl Orientation {
    /// Value of the `w:orient` attribute
    pub fn as_str(self) -> &'static str {
        match self {
            Orientation::Portrait => "portrait",
            Orientation::Landscape => "landscape",
        }
    }
}

/// Raw page size
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawPageSize {
    pub width: Option<RawLength>,
    pub height: Option<RawLength>,
}

/// Raw page margins
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawMargins {
    pub top: Option<RawLength>,
    pub right: Option<RawLength>,
    pub bottom: Option<RawLength>,
    pub left: Option<RawLength>,
    pub header: Option<RawLength>,
    pub footer: Option<RawLength>,
    pub gutter: Option<RawLength>,
}

/// Page size in TWIP
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSize {
    pub width: Measure,
    pub height: Measure,
}

impl Default for PageSize {
    /// A4
    fn default() -> Self {
        Self {
            width: Measure::Value(11906),
            height: Measure::Value(16838),
        }
    }
}

/// Page margins in TWIP
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Margins {
    pub top: Measure,
    pub right: Measure,
    pub bottom: Measure,
    pub left: Measure,
    /// Distance from the page edge to the header
    pub header: Measure,
    /// Distance from the page edge to the footer
    pub footer: Measure,
    pub gutter: Measure,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: Measure::Value(1440),
            right: Measure::Value(1800),
            bottom: Measure::Value(1440),
            left: Measure::Value(1800),
            header: Measure::Value(720),
            footer: Measure::Value(720),
            gutter: Measure::Value(0),
        }
    }
}

/// Table rendering options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableOptions {
    pub row: RowOptions,
}

/// Table row options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RowOptions {
    /// Keep each row on one page
    #[serde(alias = "cant_split")]
    pub cant_split: bool,
}

/// Line numbering options (`w:lnNumType`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LineNumberOptions {
    #[serde(alias = "count_by")]
    pub count_by: u32,
    pub start: u32,
    /// `continuous`, `newPage` or `newSection`
    pub restart: String,
}

impl Default for LineNumberOptions {
    fn default() -> Self {
        Self {
            count_by: 1,
            start: 0,
            restart: "continuous".to_string(),
        }
    }
}

/// Options as supplied by the caller
///
/// Keys are accepted in camelCase (`fontSize`) or snake_case (`font_size`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawDocumentOptions {
    pub orientation: Option<Orientation>,
    #[serde(alias = "page_size")]
    pub page_size: Option<RawPageSize>,
    pub margins: Option<RawMargins>,
    pub title: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub description: Option<String>,
    #[serde(alias = "last_modified_by")]
    pub last_modified_by: Option<String>,
    pub revision: Option<u32>,
    #[serde(alias = "created_at")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(alias = "modified_at")]
    pub modified_at: Option<DateTime<Utc>>,
    pub header: Option<bool>,
    #[serde(alias = "header_type")]
    pub header_type: Option<String>,
    pub footer: Option<bool>,
    #[serde(alias = "footer_type")]
    pub footer_type: Option<String>,
    pub font: Option<String>,
    /// `Some(None)` when the key is present with a `null` value
    #[serde(alias = "font_size", deserialize_with = "explicit_null")]
    pub font_size: Option<Option<RawLength>>,
    #[serde(alias = "complex_script_font_size", deserialize_with = "explicit_null")]
    pub complex_script_font_size: Option<Option<RawLength>>,
    pub table: Option<TableOptions>,
    #[serde(alias = "line_number")]
    pub line_number: Option<bool>,
    #[serde(alias = "line_number_options")]
    pub line_number_options: Option<LineNumberOptions>,
    #[serde(alias = "skip_first_header_footer")]
    pub skip_first_header_footer: Option<bool>,
    #[serde(alias = "decode_unicode")]
    pub decode_unicode: Option<bool>,
    pub lang: Option<String>,
    /// Spell the field separator `seperate` as older converters did
    #[serde(alias = "legacy_field_separator")]
    pub legacy_field_separator: Option<bool>,
}

/// Keep an explicit `null` apart from a missing key
fn explicit_null<'de, D>(deserializer: D) -> std::result::Result<Option<Option<RawLength>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<RawLength>::deserialize(deserializer).map(Some)
}

impl RawDocumentOptions {
    /// Parse options from a TOML string
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Parse options from a JSON string
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load options from a `.toml` or `.json` file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::from_json_str(&text),
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Self::from_toml_str(&text),
            _ => Err(OoxmlError::Other(format!(
                "Unsupported options file (expected .toml or .json): {}",
                path.display()
            ))),
        }
    }

    /// Normalize units, resolving composite dimensions against `defaults`
    pub fn normalize(&self, defaults: &DocumentOptions) -> OptionsPatch {
        OptionsPatch {
            orientation: self.orientation,
            page_size: self.page_size.as_ref().map(|raw| PageSize {
                width: normalize_length(raw.width.as_ref(), &defaults.page_size.width),
                height: normalize_length(raw.height.as_ref(), &defaults.page_size.height),
            }),
            margins: self.margins.as_ref().map(|raw| {
                let d = &defaults.margins;
                Margins {
                    top: normalize_length(raw.top.as_ref(), &d.top),
                    right: normalize_length(raw.right.as_ref(), &d.right),
                    bottom: normalize_length(raw.bottom.as_ref(), &d.bottom),
                    left: normalize_length(raw.left.as_ref(), &d.left),
                    header: normalize_length(raw.header.as_ref(), &d.header),
                    footer: normalize_length(raw.footer.as_ref(), &d.footer),
                    gutter: normalize_length(raw.gutter.as_ref(), &d.gutter),
                }
            }),
            title: self.title.clone(),
            subject: self.subject.clone(),
            creator: self.creator.clone(),
            keywords: self.keywords.clone(),
            description: self.description.clone(),
            last_modified_by: self.last_modified_by.clone(),
            revision: self.revision,
            created_at: self.created_at,
            modified_at: self.modified_at,
            header: self.header,
            header_type: self.header_type.clone(),
            footer: self.footer,
            footer_type: self.footer_type.clone(),
            font: self.font.clone(),
            font_size: self
                .font_size
                .as_ref()
                .map(|raw| normalize_font_size(raw.as_ref())),
            complex_script_font_size: self
                .complex_script_font_size
                .as_ref()
                .map(|raw| normalize_font_size(raw.as_ref())),
            table: self.table,
            line_number: self.line_number,
            line_number_options: self.line_number_options.clone(),
            skip_first_header_footer: self.skip_first_header_footer,
            decode_unicode: self.decode_unicode,
            lang: self.lang.clone(),
            legacy_field_separator: self.legacy_field_separator,
        }
    }
}

/// Normalized user options, ready to be laid over the defaults
///
/// `None` means "not supplied". For font sizes, `Some(None)` means the key
/// was supplied with a falsy value and the size is explicitly unset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionsPatch {
    pub orientation: Option<Orientation>,
    pub page_size: Option<PageSize>,
    pub margins: Option<Margins>,
    pub title: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub description: Option<String>,
    pub last_modified_by: Option<String>,
    pub revision: Option<u32>,
    pub created_at: Option<DateTime<Utc>>,
    pub modified_at: Option<DateTime<Utc>>,
    pub header: Option<bool>,
    pub header_type: Option<String>,
    pub footer: Option<bool>,
    pub footer_type: Option<String>,
    pub font: Option<String>,
    pub font_size: Option<Option<Measure>>,
    pub complex_script_font_size: Option<Option<Measure>>,
    pub table: Option<TableOptions>,
    pub line_number: Option<bool>,
    pub line_number_options: Option<LineNumberOptions>,
    pub skip_first_header_footer: Option<bool>,
    pub decode_unicode: Option<bool>,
    pub lang: Option<String>,
    pub legacy_field_separator: Option<bool>,
}

/// Effective options
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentOptions {
    pub orientation: Orientation,
    pub page_size: PageSize,
    pub margins: Margins,
    pub title: String,
    pub subject: String,
    pub creator: String,
    pub keywords: Vec<String>,
    pub description: String,
    pub last_modified_by: String,
    pub revision: u32,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    /// Emit a header part
    pub header: bool,
    pub header_type: String,
    /// Emit a footer part
    pub footer: bool,
    pub footer_type: String,
    pub font: String,
    /// Half-points; `None` leaves the size to the consuming application
    pub font_size: Option<Measure>,
    /// Half-points; `None` leaves the size to the consuming application
    pub complex_script_font_size: Option<Measure>,
    pub table: TableOptions,
    pub line_number: bool,
    pub line_number_options: LineNumberOptions,
    pub skip_first_header_footer: bool,
    /// Decode HTML entities before tree conversion
    pub decode_unicode: bool,
    pub lang: String,
    pub legacy_field_separator: bool,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            orientation: Orientation::Portrait,
            page_size: PageSize::default(),
            margins: Margins::default(),
            title: String::new(),
            subject: String::new(),
            creator: "html-to-docx".to_string(),
            keywords: vec!["html-to-docx".to_string()],
            description: String::new(),
            last_modified_by: "html-to-docx".to_string(),
            revision: 1,
            created_at: now,
            modified_at: now,
            header: false,
            header_type: "default".to_string(),
            footer: false,
            footer_type: "default".to_string(),
            font: "Times New Roman".to_string(),
            font_size: Some(Measure::Value(22)),
            complex_script_font_size: Some(Measure::Value(22)),
            table: TableOptions::default(),
            line_number: false,
            line_number_options: LineNumberOptions::default(),
            skip_first_header_footer: false,
            decode_unicode: false,
            lang: "en-US".to_string(),
            legacy_field_separator: false,
        }
    }
}

impl DocumentOptions {
    /// Normalize `raw` and lay it over the defaults
    pub fn from_raw(raw: &RawDocumentOptions) -> Self {
        let defaults = Self::default();
        let patch = raw.normalize(&defaults);
        defaults.merge(patch)
    }

    /// Lay a patch over these options, key by key
    pub fn merge(self, patch: OptionsPatch) -> Self {
        Self {
            orientation: patch.orientation.unwrap_or(self.orientation),
            page_size: patch.page_size.unwrap_or(self.page_size),
            margins: patch.margins.unwrap_or(self.margins),
            title: patch.title.unwrap_or(self.title),
            subject: patch.subject.unwrap_or(self.subject),
            creator: patch.creator.unwrap_or(self.creator),
            keywords: patch.keywords.unwrap_or(self.keywords),
            description: patch.description.unwrap_or(self.description),
            last_modified_by: patch.last_modified_by.unwrap_or(self.last_modified_by),
            revision: patch.revision.unwrap_or(self.revision),
            created_at: patch.created_at.unwrap_or(self.created_at),
            modified_at: patch.modified_at.unwrap_or(self.modified_at),
            header: patch.header.unwrap_or(self.header),
            header_type: patch.header_type.unwrap_or(self.header_type),
            footer: patch.footer.unwrap_or(self.footer),
            footer_type: patch.footer_type.unwrap_or(self.footer_type),
            font: patch.font.unwrap_or(self.font),
            font_size: patch.font_size.unwrap_or(self.font_size),
            complex_script_font_size: patch
                .complex_script_font_size
                .unwrap_or(self.complex_script_font_size),
            table: patch.table.unwrap_or(self.table),
            line_number: patch.line_number.unwrap_or(self.line_number),
            line_number_options: patch
                .line_number_options
                .unwrap_or(self.line_number_options),
            skip_first_header_footer: patch
                .skip_first_header_footer
                .unwrap_or(self.skip_first_header_footer),
            decode_unicode: patch.decode_unicode.unwrap_or(self.decode_unicode),
            lang: patch.lang.unwrap_or(self.lang),
            legacy_field_separator: patch
                .legacy_field_separator
                .unwrap_or(self.legacy_field_separator),
        }
    }

    /// Page width as written to `w:pgSz`, honoring orientation
    pub fn page_width(&self) -> &Measure {
        if self.is_swapped() {
            &self.page_size.height
        } else {
            &self.page_size.width
        }
    }

    /// Page height as written to `w:pgSz`, honoring orientation
    pub fn page_height(&self) -> &Measure {
        if self.is_swapped() {
            &self.page_size.width
        } else {
            &self.page_size.height
        }
    }

    fn is_swapped(&self) -> bool {
        if self.orientation != Orientation::Landscape {
            return false;
        }
        match (self.page_size.width.as_i64(), self.page_size.height.as_i64()) {
            (Some(w), Some(h)) => w < h,
            _ => false,
        }
    }
}
