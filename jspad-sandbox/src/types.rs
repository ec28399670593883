//! Core types for sandboxed execution

use std::fmt;

use serde::{Deserialize, Serialize};

/// Request to execute a piece of playground source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRequest {
    /// The source text to execute
    pub source: String,
}

impl ExecutionRequest {
    /// Create a simple execution request
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

/// Severity of a captured console entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// One captured console entry, in emission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level.as_str(), self.message)
    }
}

/// Result of one sandboxed run.
///
/// Serializes to the wire shape `{"error": ..., "logs": [...]}` or
/// `{"output": ..., "logs": [...]}`. Failure is declared first: with
/// untagged deserialization, Success's optional `output` field would
/// otherwise swallow failure payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExecutionResult {
    /// The run was rejected or threw.
    Failure {
        #[serde(rename = "error")]
        message: String,
        logs: Vec<LogEntry>,
    },
    /// Normal completion.
    Success {
        /// Stringified completion value; `None` when the script completed
        /// with `undefined`.
        #[serde(rename = "output")]
        value: Option<String>,
        logs: Vec<LogEntry>,
    },
}

impl ExecutionResult {
    pub fn success(value: Option<String>, logs: Vec<LogEntry>) -> Self {
        Self::Success { value, logs }
    }

    pub fn failure(message: impl Into<String>, logs: Vec<LogEntry>) -> Self {
        Self::Failure {
            message: message.into(),
            logs,
        }
    }

    /// Check if the run completed normally
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Console output captured during the run, in order.
    pub fn logs(&self) -> &[LogEntry] {
        match self {
            Self::Success { logs, .. } | Self::Failure { logs, .. } => logs,
        }
    }
}
