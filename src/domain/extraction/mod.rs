//! Content extraction domain module

mod extractor;
mod format;
mod table;

pub use extractor::{ContentExtractor, ExtractedContent, FormatExtractor};
pub use format::{file_extension, FileFormat};
pub use table::{flatten_rows, CellValue, TableRows};

#[cfg(test)]
pub use extractor::mock;
