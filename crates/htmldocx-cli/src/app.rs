//! CLI Application logic
//!
//! Contains the command-line interface implementation.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{debug, info};

use htmldocx_ooxml::{
    html_to_docx, OoxmlArchive, Orientation, RawDocumentOptions, RawLength, Relationships,
};

/// Output format for inspection reports
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for tool consumption
    Json,
}

/// Page orientation flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OrientationArg {
    Portrait,
    Landscape,
}

impl From<OrientationArg> for Orientation {
    fn from(arg: OrientationArg) -> Self {
        match arg {
            OrientationArg::Portrait => Orientation::Portrait,
            OrientationArg::Landscape => Orientation::Landscape,
        }
    }
}

#[derive(Parser)]
#[command(name = "htmldocx")]
#[command(author, version, about = "Convert HTML to Word documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an HTML file to DOCX
    Convert(ConvertArgs),

    /// List the parts, content types and relationships of a DOCX file
    Inspect {
        /// Input DOCX file
        input: PathBuf,

        /// Output format (text or json)
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

/// Arguments of `htmldocx convert`
#[derive(Debug, Clone, Default, Args)]
pub struct ConvertArgs {
    /// Input HTML file (document body)
    pub input: PathBuf,

    /// Output DOCX file (default: input with .docx extension)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// HTML file for the page header; implies --header
    #[arg(long)]
    pub header_html: Option<PathBuf>,

    /// HTML file for the page footer; implies --footer
    #[arg(long)]
    pub footer_html: Option<PathBuf>,

    /// Document options file (.toml or .json)
    #[arg(long)]
    pub options: Option<PathBuf>,

    /// Enable the page header
    #[arg(long)]
    pub header: bool,

    /// Enable the page footer with page numbers
    #[arg(long)]
    pub footer: bool,

    /// Decode HTML entities before parsing
    #[arg(long)]
    pub decode_unicode: bool,

    /// Page orientation
    #[arg(long, value_enum)]
    pub orientation: Option<OrientationArg>,

    /// Default font size, e.g. 12pt or 24 (half-points)
    #[arg(long)]
    pub font_size: Option<String>,
}

/// Run the CLI application
///
/// This is the main entry point for the command-line interface.
/// It parses arguments and dispatches to the appropriate command.
pub fn run_cli() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert(args) => {
            convert_command(&args)?;
        }
        Commands::Inspect { input, format } => {
            inspect_command(&input, format)?;
        }
    }

    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

/// Load the options file, if any, and apply command-line overrides
pub fn resolve_options(args: &ConvertArgs) -> Result<RawDocumentOptions> {
    let mut options = match &args.options {
        Some(path) => {
            debug!(path = %path.display(), "loading options");
            RawDocumentOptions::load(path)
                .with_context(|| format!("Failed to load options: {}", path.display()))?
        }
        None => RawDocumentOptions::default(),
    };

    if args.header || args.header_html.is_some() {
        options.header = Some(true);
    }
    if args.footer || args.footer_html.is_some() {
        options.footer = Some(true);
    }
    if args.decode_unicode {
        options.decode_unicode = Some(true);
    }
    if let Some(orientation) = args.orientation {
        options.orientation = Some(orientation.into());
    }
    if let Some(size) = &args.font_size {
        options.font_size = Some(Some(RawLength::from(size.as_str())));
    }

    Ok(options)
}

fn read_html(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .with_context(|| format!("Failed to read HTML file: {}", path.display()))
}

/// Execute the convert command
///
/// Returns the path of the written package.
pub fn convert_command(args: &ConvertArgs) -> Result<PathBuf> {
    let input = &args.input;
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    let output_path = match &args.output {
        Some(p) => p.clone(),
        None => input.with_extension("docx"),
    };

    let options = resolve_options(args)?;
    let body = read_html(input)?;
    let header = args.header_html.as_deref().map(read_html).transpose()?;
    let footer = args.footer_html.as_deref().map(read_html).transpose()?;

    info!(input = %input.display(), "converting");
    let bytes = html_to_docx(&body, header.as_deref(), footer.as_deref(), &options)
        .with_context(|| format!("Failed to convert: {}", input.display()))?;

    fs::write(&output_path, &bytes)
        .with_context(|| format!("Failed to write output file: {}", output_path.display()))?;

    println!("Converted: {}", input.display());
    println!("  Output: {}", output_path.display());
    println!("  Size: {} bytes", bytes.len());

    Ok(output_path)
}

/// One part of an inspected package
#[derive(Debug, Clone, Serialize)]
pub struct PartEntry {
    pub path: String,
    pub content_type: Option<String>,
    pub size: usize,
}

/// One relationship of `word/document.xml`
#[derive(Debug, Clone, Serialize)]
pub struct RelationshipEntry {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    pub external: bool,
}

/// Summary of a package's structure
#[derive(Debug, Clone, Serialize)]
pub struct PackageReport {
    pub parts: Vec<PartEntry>,
    pub document_relationships: Vec<RelationshipEntry>,
    /// `None` when the package passed the integrity check
    pub integrity_error: Option<String>,
}

/// Collect the structure of an opened package
pub fn inspect_package(archive: &OoxmlArchive) -> Result<PackageReport> {
    let content_types = archive
        .content_types()
        .context("Failed to read [Content_Types].xml")?;

    let parts = archive
        .file_list()
        .map(|path| PartEntry {
            path: path.to_string(),
            content_type: content_types.content_type_of(path).map(str::to_string),
            size: archive.get(path).map_or(0, |b| b.len()),
        })
        .collect();

    let document_relationships = archive
        .relationships_of("word/document.xml")
        .context("Failed to read document relationships")?
        .unwrap_or_else(Relationships::new)
        .iter()
        .map(|(id, rel)| RelationshipEntry {
            id: id.to_string(),
            rel_type: short_type(&rel.rel_type).to_string(),
            target: rel.target.clone(),
            external: rel.external,
        })
        .collect();

    Ok(PackageReport {
        parts,
        document_relationships,
        integrity_error: archive.verify().err().map(|e| e.to_string()),
    })
}

/// Last path segment of a relationship type URI
fn short_type(uri: &str) -> &str {
    uri.rsplit('/').next().unwrap_or(uri)
}

/// Execute the inspect command
pub fn inspect_command(input: &Path, format: OutputFormat) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    let archive = OoxmlArchive::open(input)
        .with_context(|| format!("Failed to open DOCX file: {}", input.display()))?;
    let report = inspect_package(&archive)?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report)
                .context("Failed to serialize report to JSON")?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            println!("{}", input.display());
            println!();
            println!("Parts:");
            for part in &report.parts {
                println!(
                    "  {:<36} {:>8}  {}",
                    part.path,
                    part.size,
                    part.content_type.as_deref().unwrap_or("(none)")
                );
            }
            println!();
            println!("Document relationships:");
            for rel in &report.document_relationships {
                let mode = if rel.external { " (external)" } else { "" };
                println!("  {:<6} {:<12} {}{}", rel.id, rel.rel_type, rel.target, mode);
            }
            println!();
            match &report.integrity_error {
                None => println!("✓ Package structure is consistent"),
                Some(err) => println!("✗ {}", err),
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_type() {
        assert_eq!(short_type(Relationships::TYPE_HEADER), "header");
        assert_eq!(short_type("plain"), "plain");
    }

    #[test]
    fn test_flags_enable_header_and_footer() {
        let args = ConvertArgs {
            footer_html: Some(PathBuf::from("footer.html")),
            header: true,
            ..Default::default()
        };
        let options = resolve_options(&args).unwrap();
        assert_eq!(options.header, Some(true));
        assert_eq!(options.footer, Some(true));
        assert_eq!(options.decode_unicode, None);
    }

    #[test]
    fn test_orientation_and_font_size_flags() {
        let args = ConvertArgs {
            orientation: Some(OrientationArg::Landscape),
            font_size: Some("12pt".to_string()),
            ..Default::default()
        };
        let options = resolve_options(&args).unwrap();
        assert_eq!(options.orientation, Some(Orientation::Landscape));
        assert_eq!(options.font_size, Some(Some(RawLength::from("12pt"))));
    }

    #[test]
    fn test_cli_parses_convert() {
        let cli = Cli::try_parse_from([
            "htmldocx",
            "convert",
            "in.html",
            "-o",
            "out.docx",
            "--footer",
            "--orientation",
            "landscape",
        ])
        .unwrap();
        match cli.command {
            Commands::Convert(args) => {
                assert_eq!(args.input, PathBuf::from("in.html"));
                assert_eq!(args.output, Some(PathBuf::from("out.docx")));
                assert!(args.footer);
                assert_eq!(args.orientation, Some(OrientationArg::Landscape));
            }
            _ => panic!("expected convert"),
        }
    }
}
