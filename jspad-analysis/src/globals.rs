//! Restricted-global scanning

/// Identifiers treated as access to host page or browser state.
///
/// Containment check only: the name inside a comment or string still flags,
/// and aliased or computed access (`globalThis["win" + "dow"]`) slips
/// through. This is a fast-path rejection with readable messages, not the
/// security boundary; the isolate's bare global object is what actually
/// keeps these out of reach.
pub const RESTRICTED_GLOBALS: &[&str] = &[
    "window",
    "document",
    "localStorage",
    "fetch",
    "alert",
    "navigator",
];

/// Return every restricted global that appears in the source text.
pub fn scan_restricted_globals(source: &str) -> Vec<&'static str> {
    RESTRICTED_GLOBALS
        .iter()
        .copied()
        .filter(|name| source.contains(name))
        .collect()
}
