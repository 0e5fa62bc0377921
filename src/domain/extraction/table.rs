//! Tabular content types

use std::fmt;

use serde::{Deserialize, Serialize};

/// Largest integer a JSON client can represent exactly
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Single spreadsheet cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Numeric cell; whole numbers are kept as integers
    pub fn number(value: f64) -> Self {
        if value.is_finite() && value.fract() == 0.0 && value.abs() <= MAX_SAFE_INTEGER {
            Self::Int(value as i64)
        } else {
            Self::Float(value)
        }
    }

    /// Infer a cell from raw delimited text.
    ///
    /// Empty strings become null; values that read back identically as
    /// numbers become numbers; everything else stays text. Leading zeros and
    /// similar formatting survive as text.
    pub fn infer(raw: &str) -> Self {
        if raw.is_empty() {
            return Self::Null;
        }

        if let Some(value) = raw.parse::<f64>().ok().filter(|v| v.is_finite()) {
            let candidate = Self::number(value);
            if candidate.to_string() == raw {
                return candidate;
            }
        }

        Self::Text(raw.to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(value) => write!(f, "{}", value),
            Self::Int(value) => write!(f, "{}", value),
            Self::Float(value) => write!(f, "{}", value),
            Self::Text(value) => f.write_str(value),
        }
    }
}

/// Rows of cells, header row first
pub type TableRows = Vec<Vec<CellValue>>;

/// Flatten rows to text: cells joined by tab, rows joined by newline
pub fn flatten_rows(rows: &[Vec<CellValue>]) -> String {
    rows.iter()
        .map(|row| {
            row.iter()
                .map(|cell| cell.to_string())
                .collect::<Vec<_>>()
                .join("\t")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
