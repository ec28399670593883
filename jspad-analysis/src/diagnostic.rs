//! Diagnostic type shared by all static checks

use serde::{Deserialize, Serialize};

/// Severity of a static finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// A single static-analysis finding anchored to a character offset in the
/// source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// 0-based character index into the source text.
    pub offset: usize,
    /// Number of characters the finding covers.
    pub length: usize,
    pub message: String,
    pub severity: Severity,
}

impl Diagnostic {
    pub fn error(offset: usize, length: usize, message: impl Into<String>) -> Self {
        Self {
            offset,
            length,
            message: message.into(),
            severity: Severity::Error,
        }
    }

    pub fn warning(offset: usize, length: usize, message: impl Into<String>) -> Self {
        Self {
            offset,
            length,
            message: message.into(),
            severity: Severity::Warning,
        }
    }
}
