//! Integration tests for htmldocx CLI
//!
//! These tests run the commands against real files in a temp directory
//! and read the written packages back.

use std::fs;
use std::io::{Cursor, Read};

use htmldocx_cli::{convert_command, inspect_package, ConvertArgs, OrientationArg};
use htmldocx_ooxml::OoxmlArchive;
use tempfile::TempDir;
use zip::ZipArchive;

fn read_entry(bytes: &[u8], name: &str) -> Option<String> {
    let mut zip = ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut file = zip.by_name(name).ok()?;
    let mut contents = String::new();
    file.read_to_string(&mut contents).unwrap();
    Some(contents)
}

#[test]
fn test_convert_default_output_path() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let input = temp_dir.path().join("report.html");
    fs::write(&input, "<h1>Report</h1><p>Body text</p>").unwrap();

    let args = ConvertArgs {
        input: input.clone(),
        ..Default::default()
    };
    let written = convert_command(&args).unwrap();

    assert_eq!(written, temp_dir.path().join("report.docx"));
    let bytes = fs::read(&written).unwrap();
    let doc = read_entry(&bytes, "word/document.xml").unwrap();
    assert!(doc.contains("Body text"));
    assert!(doc.contains(r#"<w:pStyle w:val="Heading1"/>"#));
    assert!(read_entry(&bytes, "word/footer1.xml").is_none());
}

#[test]
fn test_convert_with_footer_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let input = temp_dir.path().join("in.html");
    let footer = temp_dir.path().join("footer.html");
    let output = temp_dir.path().join("out.docx");
    fs::write(&input, "<p>Body</p>").unwrap();
    fs::write(&footer, "<p>Page 1</p>").unwrap();

    let args = ConvertArgs {
        input,
        output: Some(output.clone()),
        footer_html: Some(footer),
        ..Default::default()
    };
    convert_command(&args).unwrap();

    let bytes = fs::read(&output).unwrap();
    let footer_xml = read_entry(&bytes, "word/footer1.xml").unwrap();
    assert!(footer_xml.contains("<w:instrText>PAGE</w:instrText>"));
    assert!(footer_xml.contains("<w:instrText>NUMPAGES</w:instrText>"));
    assert!(!footer_xml.contains("Page 1"));
}

#[test]
fn test_options_file_with_flag_override() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let input = temp_dir.path().join("in.html");
    let options = temp_dir.path().join("docx.json");
    let output = temp_dir.path().join("out.docx");
    fs::write(&input, "<p>Body</p>").unwrap();
    fs::write(
        &options,
        r#"{ "title": "From JSON", "orientation": "portrait", "header": true }"#,
    )
    .unwrap();

    let args = ConvertArgs {
        input,
        output: Some(output.clone()),
        options: Some(options),
        orientation: Some(OrientationArg::Landscape),
        ..Default::default()
    };
    convert_command(&args).unwrap();

    let bytes = fs::read(&output).unwrap();
    let core = read_entry(&bytes, "docProps/core.xml").unwrap();
    assert!(core.contains("<dc:title>From JSON</dc:title>"));
    let doc = read_entry(&bytes, "word/document.xml").unwrap();
    assert!(doc.contains(r#"w:orient="landscape""#));
    assert!(read_entry(&bytes, "word/header1.xml").is_some());
}

#[test]
fn test_missing_input_fails() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let args = ConvertArgs {
        input: temp_dir.path().join("nope.html"),
        ..Default::default()
    };
    let err = convert_command(&args).unwrap_err();
    assert!(err.to_string().contains("Input file not found"));
}

#[test]
fn test_unsupported_options_file_fails() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let input = temp_dir.path().join("in.html");
    let options = temp_dir.path().join("docx.yaml");
    fs::write(&input, "<p>Body</p>").unwrap();
    fs::write(&options, "title: x").unwrap();

    let args = ConvertArgs {
        input,
        options: Some(options),
        ..Default::default()
    };
    let err = convert_command(&args).unwrap_err();
    assert!(format!("{:#}", err).contains("Failed to load options"));
}

#[test]
fn test_inspect_converted_package() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let input = temp_dir.path().join("in.html");
    fs::write(&input, r#"<p><a href="https://example.com">site</a></p>"#).unwrap();

    let args = ConvertArgs {
        input,
        header: true,
        ..Default::default()
    };
    let written = convert_command(&args).unwrap();

    let archive = OoxmlArchive::open(&written).unwrap();
    let report = inspect_package(&archive).unwrap();

    assert!(report.integrity_error.is_none());
    assert!(report
        .parts
        .iter()
        .all(|p| p.path == "[Content_Types].xml" || p.content_type.is_some()));

    let link = report
        .document_relationships
        .iter()
        .find(|r| r.rel_type == "hyperlink")
        .unwrap();
    assert_eq!(link.id, "rId6");
    assert!(link.external);

    let json = serde_json::to_value(&report).unwrap();
    assert!(json["parts"].as_array().unwrap().len() >= 12);
}
