//! Static pre-checks for playground JavaScript
//!
//! Everything in this crate is pure text analysis: nothing here executes
//! code. The execution host re-runs the cheap checks before every run as
//! defense in depth, and editors call [`compute_diagnostics`] on each text
//! change for live markers.

mod delimiters;
mod diagnostic;
mod globals;
mod lint;
mod loops;
mod markers;

pub use delimiters::find_unmatched_delimiters;
pub use diagnostic::{Diagnostic, Severity};
pub use globals::{scan_restricted_globals, RESTRICTED_GLOBALS};
pub use lint::lint;
pub use loops::looks_infinite;
pub use markers::{to_markers, Marker};

/// Full diagnostic pass over a source text: delimiter balance plus lint
/// findings. Recomputed wholesale on every call; there is no incremental
/// state to invalidate.
pub fn compute_diagnostics(source: &str) -> Vec<Diagnostic> {
    let mut diagnostics = find_unmatched_delimiters(source);
    diagnostics.extend(lint(source));
    diagnostics
}
