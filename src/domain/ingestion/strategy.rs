//! Ingestion strategy selection

use std::fmt;

use serde::Serialize;

use crate::domain::conversion::ConverterKind;
use crate::domain::extraction::FileFormat;
use crate::domain::DomainError;

/// How presentation formats should be treated for one upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConvertMode {
    /// Convert presentations when a backend is configured, else extract directly
    #[default]
    Auto,
    /// Presentations must go through a conversion backend
    Force,
}

/// The path a file takes from upload to canonical PDF
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "strategy", content = "backend")]
pub enum IngestionStrategy {
    /// Extract content from the original, then render the canonical PDF ourselves
    Direct,
    /// Let a conversion backend produce the PDF, then extract from that PDF
    Convert(ConverterKind),
}

impl IngestionStrategy {
    /// Pick a strategy for `format`.
    ///
    /// Only presentations are ever converted. With [`ConvertMode::Force`] a
    /// presentation and no configured backend is an error.
    pub fn select(
        format: FileFormat,
        backend: Option<ConverterKind>,
        mode: ConvertMode,
    ) -> Result<Self, DomainError> {
        if !format.is_presentation() {
            return Ok(Self::Direct);
        }

        match (backend, mode) {
            (Some(kind), _) => Ok(Self::Convert(kind)),
            (None, ConvertMode::Auto) => Ok(Self::Direct),
            (None, ConvertMode::Force) => Err(DomainError::conversion_unavailable(
                "No PDF conversion backend is configured for presentation files",
            )),
        }
    }

    /// Label used in logs and metrics
    pub fn label(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Convert(ConverterKind::Cloud) => "cloud",
            Self::Convert(ConverterKind::Local) => "local",
        }
    }
}

impl fmt::Display for IngestionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_presentations_are_direct() {
        for name in ["a.txt", "a.pdf", "a.docx", "a.doc", "a.csv", "a.xlsx", "a.bin"] {
            let format = FileFormat::from_file_name(name);
            let strategy = IngestionStrategy::select(
                format,
                Some(ConverterKind::Cloud),
                ConvertMode::Force,
            )
            .unwrap();
            assert_eq!(strategy, IngestionStrategy::Direct, "{}", name);
        }
    }

    #[test]
    fn test_presentations_use_configured_backend() {
        let format = FileFormat::from_file_name("deck.pptx");

        assert_eq!(
            IngestionStrategy::select(format, Some(ConverterKind::Local), ConvertMode::Auto)
                .unwrap(),
            IngestionStrategy::Convert(ConverterKind::Local)
        );
        assert_eq!(
            IngestionStrategy::select(format, Some(ConverterKind::Cloud), ConvertMode::Force)
                .unwrap(),
            IngestionStrategy::Convert(ConverterKind::Cloud)
        );
    }

    #[test]
    fn test_presentation_without_backend() {
        let format = FileFormat::from_file_name("deck.ppt");

        assert_eq!(
            IngestionStrategy::select(format, None, ConvertMode::Auto).unwrap(),
            IngestionStrategy::Direct
        );

        let err = IngestionStrategy::select(format, None, ConvertMode::Force).unwrap_err();
        assert!(matches!(err, DomainError::ConversionUnavailable { .. }));
    }

    #[test]
    fn test_labels() {
        assert_eq!(IngestionStrategy::Direct.label(), "direct");
        assert_eq!(IngestionStrategy::Convert(ConverterKind::Cloud).to_string(), "cloud");
        assert_eq!(IngestionStrategy::Convert(ConverterKind::Local).to_string(), "local");
    }
}
