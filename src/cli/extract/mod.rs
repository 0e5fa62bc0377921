//! Extract command - runs extraction (and optionally rendering) on a local file

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use serde::Serialize;

use crate::domain::extraction::FileFormat;
use crate::domain::{build_preview, ContentExtractor, ExtractedContent, PdfRenderer, TableRows};
use crate::infrastructure::extraction::FileContentExtractor;
use crate::infrastructure::logging::init_logging;
use crate::infrastructure::rendering::LopdfRenderer;
use crate::infrastructure::uploads::resolve_mime_type;

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// File to extract
    pub file: PathBuf,

    /// Also render the canonical PDF to this path
    #[arg(long, value_name = "OUT")]
    pub pdf: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExtractionSummary {
    file: String,
    mime_type: String,
    is_table: bool,
    preview: String,
    extracted_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    table_rows: Option<TableRows>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pdf_path: Option<String>,
}

pub async fn run(args: ExtractArgs) -> anyhow::Result<()> {
    let config = super::load_config();
    init_logging(&config.logging);

    let summary = extract(&args.file, args.pdf.as_deref()).await?;
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}

async fn extract(file: &Path, pdf: Option<&Path>) -> anyhow::Result<ExtractionSummary> {
    let file_name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("'{}' is not a file path", file.display()))?;
    let mime_type = resolve_mime_type(None, &file_name);

    tracing::debug!(format = ?FileFormat::from_file_name(&file_name), "Extracting");
    let content = FileContentExtractor::new()
        .extract(file, &mime_type, &file_name)
        .await
        .with_context(|| format!("Failed to extract '{}'", file.display()))?;

    let pdf_path = match pdf {
        Some(output) => Some(render(&content, output).await?),
        None => None,
    };

    let is_table = content.is_table();
    let ExtractedContent {
        extracted_text,
        table_rows,
    } = content;

    Ok(ExtractionSummary {
        file: file.display().to_string(),
        mime_type,
        is_table,
        preview: build_preview(&extracted_text),
        extracted_text,
        table_rows,
        pdf_path: pdf_path.map(|p| p.display().to_string()),
    })
}

async fn render(content: &ExtractedContent, output: &Path) -> anyhow::Result<PathBuf> {
    let renderer = LopdfRenderer::new();

    let path = match &content.table_rows {
        Some(rows) => renderer.render_table(rows, output).await,
        None => renderer.render_text(&content.extracted_text, output).await,
    }
    .with_context(|| format!("Failed to render '{}'", output.display()))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_extract_text_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("notes.txt");
        std::fs::write(&file, "line one\nline two").unwrap();

        let summary = extract(&file, None).await.unwrap();

        assert_eq!(summary.mime_type, "text/plain");
        assert!(!summary.is_table);
        assert_eq!(summary.extracted_text, "line one\nline two");
        assert!(summary.pdf_path.is_none());
    }

    #[tokio::test]
    async fn test_extract_csv_with_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("stock.csv");
        let pdf = dir.path().join("stock.pdf");
        std::fs::write(&file, "name,qty\napple,3\n").unwrap();

        let summary = extract(&file, Some(&pdf)).await.unwrap();

        assert!(summary.is_table);
        assert_eq!(summary.table_rows.as_ref().unwrap().len(), 2);
        assert_eq!(summary.pdf_path.as_deref(), Some(pdf.display().to_string().as_str()));
        assert!(pdf.exists());

        let json = serde_json::to_value(&summary_without_rows()).unwrap();
        assert_eq!(json["isTable"], false);
        assert!(json.get("tableRows").is_none());
    }

    fn summary_without_rows() -> ExtractionSummary {
        ExtractionSummary {
            file: "a.txt".to_string(),
            mime_type: "text/plain".to_string(),
            is_table: false,
            preview: String::new(),
            extracted_text: String::new(),
            table_rows: None,
            pdf_path: None,
        }
    }

    #[tokio::test]
    async fn test_extract_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(extract(&dir.path().join("missing.txt"), None).await.is_err());
    }
}
