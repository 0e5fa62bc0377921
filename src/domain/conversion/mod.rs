//! PDF conversion domain module

mod converter;
mod error;

pub use converter::{ConverterKind, PdfConverter};
pub use error::ConversionError;

#[cfg(test)]
pub use converter::mock;
