//! Error types for the jspad sandbox

use thiserror::Error;

/// Errors surfaced by the sandbox outside of a structured
/// [`ExecutionResult`](crate::ExecutionResult).
///
/// Everything the executed code does wrong is reported through the result
/// channel as a `Failure`; these variants cover the sandbox's own edges:
/// rejected input, lifecycle misuse, and a host that stopped answering.
#[derive(Debug, Error)]
pub enum SandboxError {
    /// Source text exceeds the configured size limit.
    #[error("source exceeds maximum size of {max} bytes (got {actual})")]
    CodeTooLarge { max: usize, actual: usize },

    /// A restricted global or loop pattern was found before execution.
    #[error("static check failed: {0}")]
    StaticViolation(String),

    /// The run outlived its wall-clock budget and the host was reset.
    #[error("execution timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// The controller has been destroyed.
    #[error("controller destroyed")]
    Destroyed,

    /// The host thread is gone or its channel is closed.
    #[error("execution host unavailable: {0}")]
    HostUnavailable(String),
}
