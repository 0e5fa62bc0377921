//! Extractors for zipped office formats (docx, pptx, odp)

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use once_cell::sync::Lazy;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use tracing::warn;
use zip::ZipArchive;

use crate::domain::extraction::{ExtractedContent, FormatExtractor};
use crate::domain::DomainError;

/// Text returned for presentations whose text cannot be extracted
pub const PRESENTATION_PLACEHOLDER: &str =
    "[Text extraction is not available for this presentation; see the canonical PDF]";

static SLIDE_ENTRY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ppt/slides/slide(\d+)\.xml$").unwrap());

/// Which XML elements carry text and which mark layout
struct XmlTextRules {
    /// Elements whose character data is document text
    text: &'static [&'static [u8]],
    /// Elements ending a paragraph
    paragraph: &'static [&'static [u8]],
    tab: &'static [&'static [u8]],
    line_break: &'static [&'static [u8]],
    space: &'static [&'static [u8]],
}

const WORDPROCESSING: XmlTextRules = XmlTextRules {
    text: &[b"w:t"],
    paragraph: &[b"w:p"],
    tab: &[b"w:tab"],
    line_break: &[b"w:br", b"w:cr"],
    space: &[],
};

const DRAWING: XmlTextRules = XmlTextRules {
    text: &[b"a:t"],
    paragraph: &[b"a:p"],
    tab: &[],
    line_break: &[b"a:br"],
    space: &[],
};

const OPEN_DOCUMENT: XmlTextRules = XmlTextRules {
    text: &[b"text:p", b"text:h"],
    paragraph: &[b"text:p", b"text:h"],
    tab: &[b"text:tab"],
    line_break: &[b"text:line-break"],
    space: &[b"text:s"],
};

fn xml_error(e: impl std::fmt::Display) -> DomainError {
    DomainError::extraction(format!("Malformed document XML: {}", e))
}

/// Walk an XML part and collect its text according to `rules`
fn collect_xml_text(xml: &str, rules: &XmlTextRules) -> Result<String, DomainError> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut depth = 0usize;

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) => {
                if rules.text.contains(&e.name().as_ref()) {
                    depth += 1;
                }
            }
            Event::End(e) => {
                let name = e.name();
                if rules.text.contains(&name.as_ref()) {
                    depth = depth.saturating_sub(1);
                }
                if rules.paragraph.contains(&name.as_ref()) {
                    out.push('\n');
                }
            }
            Event::Empty(e) => {
                let name = e.name();
                let name = name.as_ref();
                if rules.tab.contains(&name) {
                    out.push('\t');
                } else if rules.line_break.contains(&name) || rules.paragraph.contains(&name) {
                    out.push('\n');
                } else if rules.space.contains(&name) {
                    out.push(' ');
                }
            }
            Event::Text(e) if depth > 0 => {
                out.push_str(&e.unescape().map_err(xml_error)?);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(out.trim_end().to_string())
}

fn open_archive(path: &Path) -> Result<ZipArchive<File>, DomainError> {
    let file = File::open(path)
        .map_err(|e| DomainError::io(format!("Failed to open '{}': {}", path.display(), e)))?;

    ZipArchive::new(file)
        .map_err(|e| DomainError::extraction(format!("Not a valid office archive: {}", e)))
}

fn read_entry(archive: &mut ZipArchive<File>, name: &str) -> Result<String, DomainError> {
    let mut entry = archive
        .by_name(name)
        .map_err(|e| DomainError::extraction(format!("Missing '{}' in archive: {}", name, e)))?;

    let mut xml = String::new();
    entry
        .read_to_string(&mut xml)
        .map_err(|e| DomainError::extraction(format!("Failed to read '{}': {}", name, e)))?;
    Ok(xml)
}

/// Raw text of a .docx body
pub fn docx_text(path: &Path) -> Result<String, DomainError> {
    let mut archive = open_archive(path)?;
    let xml = read_entry(&mut archive, "word/document.xml")?;
    collect_xml_text(&xml, &WORDPROCESSING)
}

/// Text of every slide of a .pptx, in slide order
fn pptx_text(archive: &mut ZipArchive<File>) -> Result<String, DomainError> {
    let mut slides: Vec<(u32, String)> = archive
        .file_names()
        .filter_map(|name| {
            let number = SLIDE_ENTRY.captures(name)?.get(1)?.as_str().parse().ok()?;
            Some((number, name.to_string()))
        })
        .collect();
    slides.sort_unstable_by_key(|(number, _)| *number);

    let mut texts = Vec::with_capacity(slides.len());
    for (_, name) in slides {
        let xml = read_entry(archive, &name)?;
        texts.push(collect_xml_text(&xml, &DRAWING)?);
    }

    Ok(texts.join("\n\n"))
}

/// Text of a zipped presentation, either OOXML (.pptx) or OpenDocument (.odp).
///
/// The package layout decides which, not the file name.
pub fn presentation_text(path: &Path) -> Result<String, DomainError> {
    let mut archive = open_archive(path)?;

    if archive.file_names().any(|name| name == "content.xml") {
        let xml = read_entry(&mut archive, "content.xml")?;
        return collect_xml_text(&xml, &OPEN_DOCUMENT);
    }

    pptx_text(&mut archive)
}

async fn run_blocking<F>(path: &Path, f: F) -> Result<String, DomainError>
where
    F: FnOnce(&Path) -> Result<String, DomainError> + Send + 'static,
{
    let path: PathBuf = path.to_path_buf();
    tokio::task::spawn_blocking(move || f(&path))
        .await
        .map_err(|e| DomainError::internal(format!("Extraction task failed: {}", e)))?
}

/// Extractor for Word .docx files
#[derive(Debug, Clone, Default)]
pub struct DocxExtractor;

impl DocxExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FormatExtractor for DocxExtractor {
    fn supported_extensions(&self) -> &[&str] {
        &["docx"]
    }

    async fn extract(&self, path: &Path) -> Result<ExtractedContent, DomainError> {
        let text = run_blocking(path, docx_text).await?;
        Ok(ExtractedContent::text(text))
    }
}

/// Best-effort extractor for slide decks.
///
/// Legacy .ppt is not a zip package and always yields the placeholder, as does
/// any .pptx or .odp that cannot be read.
#[derive(Debug, Clone, Default)]
pub struct PresentationExtractor;

impl PresentationExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FormatExtractor for PresentationExtractor {
    fn supported_extensions(&self) -> &[&str] {
        &["ppt", "pptx", "odp"]
    }

    async fn extract(&self, path: &Path) -> Result<ExtractedContent, DomainError> {
        match run_blocking(path, presentation_text).await {
            Ok(text) => Ok(ExtractedContent::text(text)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Presentation text extraction failed, using placeholder");
                Ok(ExtractedContent::text(PRESENTATION_PLACEHOLDER))
            }
        }
    }
}
