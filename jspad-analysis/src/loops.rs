//! Infinite-loop heuristic

use once_cell::sync::Lazy;
use regex::Regex;

static LOOP_PATTERNS: Lazy<[Regex; 2]> = Lazy::new(|| {
    [
        Regex::new(r"while\s*\(\s*true\s*\)").unwrap(),
        Regex::new(r"for\s*\(\s*;\s*;\s*\)").unwrap(),
    ]
});

/// Whitespace-insensitive match against `while(true)` and `for(;;)`.
///
/// A fast-reject optimization only: `while(1)`, unbounded recursion and
/// every other divergent shape pass this check, so real non-termination
/// protection lives in the execution watchdog.
pub fn looks_infinite(source: &str) -> bool {
    LOOP_PATTERNS.iter().any(|pattern| pattern.is_match(source))
}
