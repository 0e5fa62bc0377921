//! Validation helpers for uploads

use crate::domain::DomainError;

/// Validate the number of files in one upload request
pub fn validate_file_count(count: usize, max_files: usize) -> Result<(), DomainError> {
    if count == 0 {
        return Err(DomainError::validation("No file uploaded"));
    }

    if count > max_files {
        return Err(DomainError::validation(format!(
            "Too many files: at most {} files can be uploaded at once",
            max_files
        )));
    }

    Ok(())
}

const MAX_FILE_NAME_CHARS: usize = 255;

/// Validate a client-supplied file name
pub fn validate_file_name(name: &str) -> Result<(), DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("File name cannot be empty"));
    }

    if name.chars().count() > MAX_FILE_NAME_CHARS {
        return Err(DomainError::validation(
            "File name cannot exceed 255 characters",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_file_count() {
        assert!(validate_file_count(1, 50).is_ok());
        assert!(validate_file_count(50, 50).is_ok());
        assert!(validate_file_count(0, 50).is_err());
        assert!(validate_file_count(51, 50).is_err());
    }

    #[test]
    fn test_validate_file_name() {
        assert!(validate_file_name("report.pdf").is_ok());
        assert!(validate_file_name("").is_err());
        assert!(validate_file_name("   ").is_err());
        assert!(validate_file_name(&"a".repeat(256)).is_err());
    }

    #[test]
    fn test_validate_file_name_counts_characters() {
        // 255 characters, 510 bytes
        let name = format!("{}.pdf", "é".repeat(251));
        assert!(validate_file_name(&name).is_ok());

        let too_long = format!("{}.pdf", "é".repeat(252));
        assert!(validate_file_name(&too_long).is_err());
    }
}
