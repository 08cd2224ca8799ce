use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum QuoteError {
    #[error("PDF source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("pdftotext not found. Install poppler: brew install poppler (macOS) or apt install poppler-utils (Linux)")]
    PdftotextNotFound,

    #[error("pdftotext failed with exit code {code}: {stderr}")]
    PdftotextFailed { code: i32, stderr: String },

    #[error("failed to load field order from {path}: {reason}")]
    OrderSourceLoad { path: PathBuf, reason: String },

    #[error("invalid field order source: {0}")]
    OrderSourceParse(String),

    #[error("failed to load config from {path}: {reason}")]
    ConfigLoad { path: PathBuf, reason: String },

    #[error("invalid config: {0}")]
    ConfigInvalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Recoverable conditions reported next to a (partial) result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// A table lacked the description column or any quantity/price column.
    TableUnusable,
    /// A row's price text could not be turned into a number.
    RowUnparseable,
    /// A field path had fewer than two components.
    HierarchyPathMalformed,
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarningKind::TableUnusable => write!(f, "table unusable"),
            WarningKind::RowUnparseable => write!(f, "row unparseable"),
            WarningKind::HierarchyPathMalformed => write!(f, "hierarchy path malformed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub kind: WarningKind,
    /// Where the condition was found, e.g. "page 2, table 1" or a field key.
    pub location: String,
    pub reason: String,
}

impl Warning {
    pub fn new(kind: WarningKind, location: impl Into<String>, reason: impl Into<String>) -> Self {
        Warning {
            kind,
            location: location.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}: {}", self.kind, self.location, self.reason)
    }
}
