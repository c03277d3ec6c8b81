use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Why a single snapshot row was dropped.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RowError {
    #[error("expected at least {expected} columns, found {found}")]
    TooFewColumns { expected: usize, found: usize },

    #[error("invalid {field} '{value}'")]
    InvalidNumber { field: &'static str, value: String },

    #[error("invalid price '{0}'")]
    InvalidPrice(String),

    #[error("invalid {field} date '{value}' (expected yyyy-MM-dd)")]
    InvalidDate { field: &'static str, value: String },

    #[error("discount percentage {0} outside 0..=100")]
    PercentageOutOfRange(f64),

    #[error("discount interval {from} .. {to} ends before it starts")]
    InvertedInterval { from: String, to: String },

    #[error("unreadable row: {0}")]
    Csv(String),
}

/// A non-fatal problem met while loading snapshot files.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub file: PathBuf,
    /// 1-based data row (header excluded); `None` for file-level problems.
    pub line: Option<usize>,
    pub message: String,
}

impl Diagnostic {
    pub fn file(file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self { file: file.into(), line: None, message: message.into() }
    }

    pub fn row(file: impl Into<PathBuf>, line: usize, err: &RowError) -> Self {
        Self { file: file.into(), line: Some(line), message: err.to_string() }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{}: {}", self.file.display(), line, self.message),
            None => write!(f, "{}: {}", self.file.display(), self.message),
        }
    }
}
