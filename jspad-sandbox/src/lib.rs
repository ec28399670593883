//! jspad sandbox - isolated JavaScript execution
//!
//! Runs untrusted playground source in a V8 isolate on a dedicated host
//! thread and hands back a single structured result per run: completion
//! value, captured console output, or a categorized failure. The host never
//! shares realm state with the embedding process, and a hung run is
//! recoverable through [`SandboxController::reset_host`].

mod controller;
mod error;
mod host;
mod limits;
mod protocol;
mod types;

pub use controller::SandboxController;
pub use error::SandboxError;
pub use host::ExecutionHost;
pub use limits::ResourceLimits;
pub use protocol::{ExecutionId, HostRequest, HostResponse};
pub use types::{ExecutionRequest, ExecutionResult, LogEntry, LogLevel};

/// Re-export common error types
pub type Result<T> = anyhow::Result<T>;
