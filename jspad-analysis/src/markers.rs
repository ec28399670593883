//! Offset-to-marker adaptation for editor surfaces

use serde::{Deserialize, Serialize};

use crate::diagnostic::{Diagnostic, Severity};

/// An editor marker in 1-based line/column coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
    pub message: String,
    pub severity: Severity,
}

/// 1-based line and column of a character offset, counting newlines.
fn line_column(source: &str, char_offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut column = 1;
    for ch in source.chars().take(char_offset) {
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    (line, column)
}

/// Translate offset-anchored diagnostics into editor markers.
///
/// Line and column are computed from the actual newlines in the source, so
/// a finding on line three renders on line three.
pub fn to_markers(source: &str, diagnostics: &[Diagnostic]) -> Vec<Marker> {
    diagnostics
        .iter()
        .map(|diag| {
            let (start_line, start_column) = line_column(source, diag.offset);
            let (end_line, end_column) =
                line_column(source, diag.offset + diag.length.max(1));
            Marker {
                start_line,
                start_column,
                end_line,
                end_column,
                message: diag.message.clone(),
                severity: diag.severity,
            }
        })
        .collect()
}
