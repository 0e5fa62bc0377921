//! Uploaded file descriptor and canonical PDF naming

use std::path::{Path, PathBuf};

/// Suffix appended to the stored file's stem to name its canonical PDF
pub const CANONICAL_PDF_SUFFIX: &str = "-canonical.pdf";

/// A file the upload layer has already persisted to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Name supplied by the client
    pub original_file_name: String,
    /// Name the file was written under inside the uploads directory
    pub stored_file_name: String,
    pub mime_type: String,
    pub size: u64,
    /// Absolute path of the stored file
    pub path: PathBuf,
}

/// Deterministic canonical PDF location for a stored upload:
/// `<pdf_dir>/<stored stem>-canonical.pdf`
pub fn canonical_pdf_path(pdf_dir: &Path, stored_file_name: &str) -> PathBuf {
    let stem = Path::new(stored_file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(stored_file_name);

    pdf_dir.join(format!("{}{}", stem, CANONICAL_PDF_SUFFIX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_pdf_path_strips_extension() {
        let path = canonical_pdf_path(Path::new("/data/pdfs"), "1700000000000-123.pptx");
        assert_eq!(path, PathBuf::from("/data/pdfs/1700000000000-123-canonical.pdf"));
    }

    #[test]
    fn test_canonical_pdf_path_without_extension() {
        let path = canonical_pdf_path(Path::new("/data/pdfs"), "upload");
        assert_eq!(path, PathBuf::from("/data/pdfs/upload-canonical.pdf"));
    }

    #[test]
    fn test_canonical_pdf_path_keeps_inner_dots() {
        let path = canonical_pdf_path(Path::new("pdfs"), "q3.report.pdf");
        assert_eq!(path, PathBuf::from("pdfs/q3.report-canonical.pdf"));
    }
}
