//! File format detection by extension

use std::path::Path;

use serde::Serialize;

/// Input formats the service knows how to handle.
///
/// Detection looks only at the file name's extension; file bytes are never
/// sniffed, so a misnamed file is handled as whatever its extension claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileFormat {
    PlainText,
    Pdf,
    Docx,
    Doc,
    Ppt,
    Pptx,
    Odp,
    Csv,
    Xls,
    Xlsx,
    Other,
}

impl FileFormat {
    /// Detect the format from a file name's extension (case-insensitive)
    pub fn from_file_name(file_name: &str) -> Self {
        match file_extension(file_name).as_deref() {
            Some("txt") => Self::PlainText,
            Some("pdf") => Self::Pdf,
            Some("docx") => Self::Docx,
            Some("doc") => Self::Doc,
            Some("ppt") => Self::Ppt,
            Some("pptx") => Self::Pptx,
            Some("odp") => Self::Odp,
            Some("csv") => Self::Csv,
            Some("xls") => Self::Xls,
            Some("xlsx") => Self::Xlsx,
            _ => Self::Other,
        }
    }

    /// Slide decks, which can be routed to a PDF conversion backend
    pub fn is_presentation(&self) -> bool {
        matches!(self, Self::Ppt | Self::Pptx | Self::Odp)
    }

    /// Spreadsheet-like inputs parsed as rows
    pub fn is_tabular(&self) -> bool {
        matches!(self, Self::Csv | Self::Xls | Self::Xlsx)
    }
}

/// Lowercased extension of a file name, without the dot
pub fn file_extension(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_known_formats() {
        assert_eq!(FileFormat::from_file_name("notes.txt"), FileFormat::PlainText);
        assert_eq!(FileFormat::from_file_name("report.PDF"), FileFormat::Pdf);
        assert_eq!(FileFormat::from_file_name("letter.docx"), FileFormat::Docx);
        assert_eq!(FileFormat::from_file_name("legacy.doc"), FileFormat::Doc);
        assert_eq!(FileFormat::from_file_name("deck.ppt"), FileFormat::Ppt);
        assert_eq!(FileFormat::from_file_name("deck.PpTx"), FileFormat::Pptx);
        assert_eq!(FileFormat::from_file_name("deck.odp"), FileFormat::Odp);
        assert_eq!(FileFormat::from_file_name("data.csv"), FileFormat::Csv);
        assert_eq!(FileFormat::from_file_name("data.xls"), FileFormat::Xls);
        assert_eq!(FileFormat::from_file_name("data.xlsx"), FileFormat::Xlsx);
    }

    #[test]
    fn test_unknown_or_missing_extension() {
        assert_eq!(FileFormat::from_file_name("README"), FileFormat::Other);
        assert_eq!(FileFormat::from_file_name("page.html"), FileFormat::Other);
        assert_eq!(FileFormat::from_file_name(".csv"), FileFormat::Other);
    }

    #[test]
    fn test_format_groups() {
        assert!(FileFormat::Pptx.is_presentation());
        assert!(FileFormat::Odp.is_presentation());
        assert!(!FileFormat::Pdf.is_presentation());
        assert!(FileFormat::Csv.is_tabular());
        assert!(FileFormat::Xlsx.is_tabular());
        assert!(!FileFormat::Docx.is_tabular());
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("a.b.TXT"), Some("txt".to_string()));
        assert_eq!(file_extension("noext"), None);
    }
}
