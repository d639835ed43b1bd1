//! Unit normalization
//!
//! Page sizes and margins are written in TWIP (1/20 pt, 1440 per inch);
//! font sizes in half-points. User options may arrive as unit-suffixed
//! strings (`"96px"`, `"2cm"`, `"1in"`, `"12pt"`) or as bare numbers that
//! are already native. Values that look like neither are kept verbatim
//! in [`UnitValue::PassThrough`] and written out unchanged.
//!
//! The px/in/cm chains round at the same intermediate steps as the
//! html-to-docx family of converters, so `1cm` is 560 TWIP (28 pt), not 567.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// EMU per pixel at 96 dpi
pub const EMU_PER_PIXEL: f64 = 9525.0;
/// EMU per TWIP
pub const EMU_PER_TWIP: f64 = 635.0;
/// Points per inch
pub const POINTS_PER_INCH: f64 = 72.0;
/// TWIP per point
pub const TWIP_PER_POINT: f64 = 20.0;
/// Inches per centimeter
pub const INCHES_PER_CM: f64 = 0.393701;

/// A raw length as it appears in user options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawLength {
    /// A bare number, assumed native
    Number(f64),
    /// A string, possibly unit-suffixed
    Text(String),
}

impl From<&str> for RawLength {
    fn from(s: &str) -> Self {
        RawLength::Text(s.to_string())
    }
}

impl From<i64> for RawLength {
    fn from(n: i64) -> Self {
        RawLength::Number(n as f64)
    }
}

/// A length after unit detection
#[derive(Debug, Clone, PartialEq)]
pub enum UnitValue {
    /// CSS pixels (96 per inch)
    Pixel(f64),
    /// Centimeters
    Centimeter(f64),
    /// Inches
    Inch(f64),
    /// Points
    Point(f64),
    /// Already in the destination unit
    Native(i64),
    /// Unrecognized, written verbatim
    PassThrough(String),
}

/// A normalized value ready for an XML attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Measure {
    /// Integer in TWIP or half-points
    Value(i64),
    /// Unrecognized input kept as-is
    Verbatim(String),
}

impl Measure {
    /// The integer value, if this is not a pass-through
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Measure::Value(n) => Some(*n),
            Measure::Verbatim(_) => None,
        }
    }
}

impl From<i64> for Measure {
    fn from(n: i64) -> Self {
        Measure::Value(n)
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Measure::Value(n) => write!(f, "{}", n),
            Measure::Verbatim(s) => f.write_str(s),
        }
    }
}

fn unit_patterns() -> &'static [(Regex, fn(f64) -> UnitValue); 4] {
    static PATTERNS: OnceLock<[(Regex, fn(f64) -> UnitValue); 4]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            (Regex::new(r"(?i)([\d.]+)px").unwrap(), UnitValue::Pixel as fn(f64) -> UnitValue),
            (Regex::new(r"(?i)([\d.]+)cm").unwrap(), UnitValue::Centimeter),
            (Regex::new(r"(?i)([\d.]+)in").unwrap(), UnitValue::Inch),
            (Regex::new(r"(?i)([\d.]+)pt").unwrap(), UnitValue::Point),
        ]
    })
}

impl UnitValue {
    /// Detect the unit of a string value
    ///
    /// Returns `None` for falsy input (empty, or zero), which callers treat
    /// as "use the default". The unit patterns match unsigned digits, so a
    /// leading `-` is ignored and `-1in` reads as one inch.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || is_zero(trimmed) {
            return None;
        }

        for (re, make) in unit_patterns() {
            if let Some(caps) = re.captures(trimmed) {
                return Some(match caps[1].parse::<f64>() {
                    Ok(n) => make(n),
                    Err(_) => UnitValue::PassThrough(trimmed.to_string()),
                });
            }
        }

        Some(match trimmed.parse::<i64>() {
            Ok(n) => UnitValue::Native(n),
            Err(_) => UnitValue::PassThrough(trimmed.to_string()),
        })
    }

    /// Detect the unit of a raw option value
    pub fn from_raw(raw: &RawLength) -> Option<Self> {
        match raw {
            RawLength::Text(s) => Self::parse(s),
            RawLength::Number(n) if *n == 0.0 || n.is_nan() => None,
            RawLength::Number(n) if n.fract() == 0.0 => Some(UnitValue::Native(*n as i64)),
            RawLength::Number(n) => Some(UnitValue::PassThrough(n.to_string())),
        }
    }

    /// Convert to TWIP (page and margin dimensions)
    pub fn to_twip(&self) -> Measure {
        match self {
            UnitValue::Pixel(px) => Measure::Value(pixel_to_twip(*px)),
            UnitValue::Centimeter(cm) => Measure::Value(cm_to_twip(*cm)),
            UnitValue::Inch(inch) => Measure::Value(inch_to_twip(*inch)),
            UnitValue::Point(pt) => Measure::Value(point_to_twip(*pt)),
            UnitValue::Native(n) => Measure::Value(*n),
            UnitValue::PassThrough(s) => Measure::Verbatim(s.clone()),
        }
    }

    /// Convert to half-points (font sizes)
    pub fn to_half_points(&self) -> Measure {
        match self {
            UnitValue::Point(pt) => Measure::Value(point_to_hip(*pt)),
            UnitValue::Pixel(px) => Measure::Value(twip_to_hip(pixel_to_twip(*px))),
            UnitValue::Centimeter(cm) => Measure::Value(twip_to_hip(cm_to_twip(*cm))),
            UnitValue::Inch(inch) => Measure::Value(twip_to_hip(inch_to_twip(*inch))),
            UnitValue::Native(n) => Measure::Value(*n),
            UnitValue::PassThrough(s) => Measure::Verbatim(s.clone()),
        }
    }
}

fn is_zero(s: &str) -> bool {
    s.parse::<f64>().map(|n| n == 0.0).unwrap_or(false)
}

/// Normalize a page or margin dimension, falling back to `default`
pub fn normalize_length(raw: Option<&RawLength>, default: &Measure) -> Measure {
    raw.and_then(UnitValue::from_raw)
        .map(|v| v.to_twip())
        .unwrap_or_else(|| default.clone())
}

/// Normalize a font size; falsy input means "unset"
pub fn normalize_font_size(raw: Option<&RawLength>) -> Option<Measure> {
    raw.and_then(UnitValue::from_raw).map(|v| v.to_half_points())
}

/// Pixels to EMU
pub fn pixel_to_emu(px: f64) -> i64 {
    (px * EMU_PER_PIXEL).round() as i64
}

/// EMU to TWIP
pub fn emu_to_twip(emu: i64) -> i64 {
    (emu as f64 / EMU_PER_TWIP).round() as i64
}

/// Pixels to TWIP
pub fn pixel_to_twip(px: f64) -> i64 {
    emu_to_twip(pixel_to_emu(px))
}

/// Points to TWIP
pub fn point_to_twip(pt: f64) -> i64 {
    (pt * TWIP_PER_POINT).round() as i64
}

/// Inches to whole points
pub fn inch_to_point(inch: f64) -> i64 {
    (inch * POINTS_PER_INCH).round() as i64
}

/// Inches to TWIP
pub fn inch_to_twip(inch: f64) -> i64 {
    point_to_twip(inch_to_point(inch) as f64)
}

/// Centimeters to inches
pub fn cm_to_inch(cm: f64) -> f64 {
    cm * INCHES_PER_CM
}

/// Centimeters to TWIP
pub fn cm_to_twip(cm: f64) -> i64 {
    inch_to_twip(cm_to_inch(cm))
}

/// Points to half-points
pub fn point_to_hip(pt: f64) -> i64 {
    (pt * 2.0).round() as i64
}

/// TWIP to half-points
pub fn twip_to_hip(twip: i64) -> i64 {
    (twip as f64 / 10.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_units() {
        assert_eq!(UnitValue::parse("10px"), Some(UnitValue::Pixel(10.0)));
        assert_eq!(UnitValue::parse("2.5cm"), Some(UnitValue::Centimeter(2.5)));
        assert_eq!(UnitValue::parse("1in"), Some(UnitValue::Inch(1.0)));
        assert_eq!(UnitValue::parse("12pt"), Some(UnitValue::Point(12.0)));
        assert_eq!(UnitValue::parse("12PT"), Some(UnitValue::Point(12.0)));
        assert_eq!(UnitValue::parse("1440"), Some(UnitValue::Native(1440)));
    }

    #[test]
    fn test_parse_falsy() {
        assert_eq!(UnitValue::parse(""), None);
        assert_eq!(UnitValue::parse("   "), None);
        assert_eq!(UnitValue::parse("0"), None);
        assert_eq!(UnitValue::from_raw(&RawLength::Number(0.0)), None);
    }

    #[test]
    fn test_parse_drops_sign() {
        assert_eq!(UnitValue::parse("-1in"), Some(UnitValue::Inch(1.0)));
        assert_eq!(
            normalize_length(Some(&RawLength::from("-1in")), &Measure::Value(0)),
            Measure::Value(1440)
        );
    }

    #[test]
    fn test_parse_passthrough() {
        assert_eq!(
            UnitValue::parse("wide"),
            Some(UnitValue::PassThrough("wide".to_string()))
        );
        assert_eq!(
            UnitValue::parse("1.2.3px"),
            Some(UnitValue::PassThrough("1.2.3px".to_string()))
        );
        assert_eq!(
            UnitValue::from_raw(&RawLength::Number(12.5)),
            Some(UnitValue::PassThrough("12.5".to_string()))
        );
    }

    #[test]
    fn test_documented_twip_values() {
        assert_eq!(UnitValue::parse("10px").unwrap().to_twip(), Measure::Value(150));
        assert_eq!(UnitValue::parse("96px").unwrap().to_twip(), Measure::Value(1440));
        assert_eq!(UnitValue::parse("1in").unwrap().to_twip(), Measure::Value(1440));
        assert_eq!(UnitValue::parse("1cm").unwrap().to_twip(), Measure::Value(560));
        assert_eq!(UnitValue::parse("2.54cm").unwrap().to_twip(), Measure::Value(1440));
        assert_eq!(UnitValue::parse("36pt").unwrap().to_twip(), Measure::Value(720));
    }

    #[test]
    fn test_documented_half_point_values() {
        assert_eq!(
            UnitValue::parse("12pt").unwrap().to_half_points(),
            Measure::Value(24)
        );
        assert_eq!(
            UnitValue::parse("10.5pt").unwrap().to_half_points(),
            Measure::Value(21)
        );
        assert_eq!(
            UnitValue::parse("16px").unwrap().to_half_points(),
            Measure::Value(24)
        );
        assert_eq!(
            UnitValue::parse("28").unwrap().to_half_points(),
            Measure::Value(28)
        );
    }

    #[test]
    fn test_normalize_length_fallback() {
        let default = Measure::Value(1800);
        assert_eq!(normalize_length(None, &default), default);
        assert_eq!(normalize_length(Some(&"".into()), &default), default);
        assert_eq!(normalize_length(Some(&"0".into()), &default), default);
        assert_eq!(normalize_length(Some(&RawLength::Number(0.0)), &default), default);
        assert_eq!(
            normalize_length(Some(&"1in".into()), &default),
            Measure::Value(1440)
        );
    }

    #[test]
    fn test_normalize_font_size() {
        assert_eq!(normalize_font_size(None), None);
        assert_eq!(normalize_font_size(Some(&"".into())), None);
        assert_eq!(
            normalize_font_size(Some(&"12pt".into())),
            Some(Measure::Value(24))
        );
        assert_eq!(
            normalize_font_size(Some(&RawLength::Number(32.0))),
            Some(Measure::Value(32))
        );
    }

    #[test]
    fn test_measure_display() {
        assert_eq!(Measure::Value(1440).to_string(), "1440");
        assert_eq!(Measure::Verbatim("auto".to_string()).to_string(), "auto");
        assert_eq!(Measure::Verbatim("auto".to_string()).as_i64(), None);
    }

    #[test]
    fn test_conversion_chain() {
        assert_eq!(pixel_to_emu(1.0), 9525);
        assert_eq!(emu_to_twip(914400), 1440);
        assert_eq!(inch_to_point(0.5), 36);
        assert_eq!(twip_to_hip(240), 24);
    }
}
