//! On-disk upload storage

use std::path::{Path, PathBuf};

use chrono::Utc;
use rand::Rng;
use tracing::{debug, warn};

use crate::domain::ingestion::{canonical_pdf_path, UploadedFile};
use crate::domain::DomainError;

/// Fallback content type when neither the client nor the file name tells us
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Generate a unique stored name: `<unix millis>-<random>` plus the original
/// file's extension.
pub fn generate_stored_name(original_file_name: &str) -> String {
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
    let ext = Path::new(original_file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default();

    format!("{}-{}{}", Utc::now().timestamp_millis(), suffix, ext)
}

/// Client-declared content type, else a guess from the file name
pub fn resolve_mime_type(declared: Option<&str>, original_file_name: &str) -> String {
    declared
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| {
            mime_guess::from_path(original_file_name)
                .first_raw()
                .unwrap_or(DEFAULT_MIME_TYPE)
                .to_string()
        })
}

/// Uploads directory plus the canonical PDF directory beneath it
#[derive(Debug, Clone)]
pub struct UploadStore {
    uploads_dir: PathBuf,
    pdf_dir: PathBuf,
}

impl UploadStore {
    /// Create a store rooted at `uploads_dir`; relative paths are resolved
    /// against the working directory so recorded paths are absolute.
    pub fn new(uploads_dir: impl AsRef<Path>) -> Result<Self, DomainError> {
        let uploads_dir = std::path::absolute(uploads_dir.as_ref())?;
        let pdf_dir = uploads_dir.join("pdfs");

        Ok(Self {
            uploads_dir,
            pdf_dir,
        })
    }

    pub fn uploads_dir(&self) -> &Path {
        &self.uploads_dir
    }

    pub fn pdf_dir(&self) -> &Path {
        &self.pdf_dir
    }

    /// Create both directories if missing
    pub async fn ensure_dirs(&self) -> Result<(), DomainError> {
        tokio::fs::create_dir_all(&self.pdf_dir).await.map_err(|e| {
            DomainError::io(format!(
                "Failed to create '{}': {}",
                self.pdf_dir.display(),
                e
            ))
        })
    }

    /// Check both directories exist and accept writes
    pub async fn check_writable(&self) -> Result<(), DomainError> {
        for dir in [&self.uploads_dir, &self.pdf_dir] {
            let probe = dir.join(format!(".probe-{}", generate_stored_name("")));
            tokio::fs::write(&probe, b"").await.map_err(|e| {
                DomainError::io(format!("'{}' is not writable: {}", dir.display(), e))
            })?;
            remove_quietly(&probe).await;
        }

        Ok(())
    }

    /// Write an uploaded file's bytes under a fresh stored name
    pub async fn persist(
        &self,
        original_file_name: &str,
        declared_mime_type: Option<&str>,
        bytes: &[u8],
    ) -> Result<UploadedFile, DomainError> {
        let stored_file_name = generate_stored_name(original_file_name);
        let path = self.uploads_dir.join(&stored_file_name);

        tokio::fs::write(&path, bytes).await.map_err(|e| {
            DomainError::io(format!("Failed to store upload '{}': {}", original_file_name, e))
        })?;
        debug!(path = %path.display(), size = bytes.len(), "Stored upload");

        Ok(UploadedFile {
            original_file_name: original_file_name.to_string(),
            stored_file_name,
            mime_type: resolve_mime_type(declared_mime_type, original_file_name),
            size: bytes.len() as u64,
            path,
        })
    }

    /// Canonical PDF location for a stored upload
    pub fn canonical_pdf_path(&self, stored_file_name: &str) -> PathBuf {
        canonical_pdf_path(&self.pdf_dir, stored_file_name)
    }

}

/// Delete a file, logging instead of failing. Missing files are ignored.
pub async fn remove_quietly(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!(path = %path.display(), "Removed file"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove file"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_stored_name_keeps_extension() {
        let name = generate_stored_name("Quarterly Report.PPTX");
        let (millis, rest) = name.split_once('-').unwrap();

        assert!(millis.parse::<i64>().is_ok());
        assert!(rest.ends_with(".PPTX"));
        assert_ne!(generate_stored_name("a.txt"), generate_stored_name("a.txt"));
    }

    #[test]
    fn test_generate_stored_name_without_extension() {
        let name = generate_stored_name("README");
        assert!(!name.contains('.'));
    }

    #[test]
    fn test_resolve_mime_type() {
        assert_eq!(resolve_mime_type(Some("text/plain"), "a.csv"), "text/plain");
        assert_eq!(resolve_mime_type(None, "a.pdf"), "application/pdf");
        assert_eq!(resolve_mime_type(Some(""), "a.csv"), "text/csv");
        assert_eq!(resolve_mime_type(None, "noext"), DEFAULT_MIME_TYPE);
    }

    #[tokio::test]
    async fn test_persist_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path().join("uploads")).unwrap();
        store.ensure_dirs().await.unwrap();

        let file = store
            .persist("notes.txt", Some("text/plain"), b"hello")
            .await
            .unwrap();

        assert!(file.path.is_absolute());
        assert_eq!(file.size, 5);
        assert_eq!(file.mime_type, "text/plain");
        assert!(file.stored_file_name.ends_with(".txt"));
        assert_eq!(tokio::fs::read(&file.path).await.unwrap(), b"hello");

        let pdf = store.canonical_pdf_path(&file.stored_file_name);
        assert_eq!(pdf.parent().unwrap(), store.pdf_dir());
        assert!(pdf.to_string_lossy().ends_with("-canonical.pdf"));
    }

    #[tokio::test]
    async fn test_check_writable() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path().join("uploads")).unwrap();

        assert!(store.check_writable().await.is_err());

        store.ensure_dirs().await.unwrap();
        store.check_writable().await.unwrap();
    }

    #[tokio::test]
    async fn test_remove_quietly_ignores_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.txt");

        remove_quietly(&path).await;

        tokio::fs::write(&path, b"x").await.unwrap();
        remove_quietly(&path).await;
        assert!(!path.exists());
    }
}
