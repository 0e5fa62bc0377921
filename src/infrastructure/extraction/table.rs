//! Spreadsheet and CSV table extractor

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use calamine::{open_workbook_auto, Data, Reader};
use serde::Serialize;

use super::doc::COMPOUND_FILE_MAGIC;
use crate::domain::extraction::{
    flatten_rows, CellValue, ExtractedContent, FormatExtractor, TableRows,
};
use crate::domain::DomainError;

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Rows of the first sheet plus their flattened text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableExtraction {
    pub rows: TableRows,
    pub text: String,
}

impl From<TableExtraction> for ExtractedContent {
    fn from(table: TableExtraction) -> Self {
        Self {
            extracted_text: table.text,
            table_rows: Some(table.rows),
        }
    }
}

fn data_to_cell(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Null,
        Data::String(value) => CellValue::text(value.clone()),
        Data::Int(value) => CellValue::Int(*value),
        Data::Float(value) => CellValue::number(*value),
        Data::Bool(value) => CellValue::Bool(*value),
        Data::DateTime(value) => CellValue::number(value.as_f64()),
        Data::DateTimeIso(value) | Data::DurationIso(value) => CellValue::text(value.clone()),
        Data::Error(error) => CellValue::text(error.to_string()),
    }
}

/// Rows of the first worksheet of an Excel or OpenDocument workbook
fn workbook_rows(path: &Path) -> Result<TableRows, DomainError> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| DomainError::extraction(format!("Failed to open workbook: {}", e)))?;

    let Some(first) = workbook.sheet_names().first().cloned() else {
        return Ok(Vec::new());
    };

    let range = workbook
        .worksheet_range(&first)
        .map_err(|e| DomainError::extraction(format!("Failed to read sheet '{}': {}", first, e)))?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(data_to_cell).collect())
        .collect())
}

/// Workbooks are zip packages (xlsx, ods) or OLE2 compound files (xls);
/// anything else is read as delimited text.
fn is_workbook(path: &Path) -> Result<bool, DomainError> {
    let mut file = File::open(path)
        .map_err(|e| DomainError::io(format!("Failed to open '{}': {}", path.display(), e)))?;

    let mut magic = [0u8; 8];
    let read = file.read(&mut magic)?;
    let magic = &magic[..read];

    Ok(magic.starts_with(ZIP_MAGIC) || magic.starts_with(&COMPOUND_FILE_MAGIC))
}

/// Rows of a delimited text file; numbers are inferred per cell
fn csv_rows(path: &Path) -> Result<TableRows, DomainError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| DomainError::io(format!("Failed to open '{}': {}", path.display(), e)))?;

    let mut rows = Vec::new();
    for record in reader.byte_records() {
        let record =
            record.map_err(|e| DomainError::extraction(format!("Malformed CSV: {}", e)))?;

        rows.push(
            record
                .iter()
                .map(|field| CellValue::infer(&String::from_utf8_lossy(field)))
                .collect(),
        );
    }

    Ok(rows)
}

/// Parse a spreadsheet-like file into rows and flattened text.
///
/// Only the first sheet of a workbook is read. The header row is row 0 and is
/// typed like any other row.
pub fn extract_table_and_text(path: &Path) -> Result<TableExtraction, DomainError> {
    let rows = if is_workbook(path)? {
        workbook_rows(path)?
    } else {
        csv_rows(path)?
    };
    let text = flatten_rows(&rows);

    Ok(TableExtraction { rows, text })
}

/// Extractor for CSV and Excel files
#[derive(Debug, Clone, Default)]
pub struct TableExtractor;

impl TableExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FormatExtractor for TableExtractor {
    fn supported_extensions(&self) -> &[&str] {
        &["csv", "xls", "xlsx"]
    }

    async fn extract(&self, path: &Path) -> Result<ExtractedContent, DomainError> {
        let path: PathBuf = path.to_path_buf();
        let table = tokio::task::spawn_blocking(move || extract_table_and_text(&path))
            .await
            .map_err(|e| DomainError::internal(format!("Table extraction task failed: {}", e)))??;

        Ok(table.into())
    }
}
