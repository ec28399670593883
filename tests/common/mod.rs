//! Common test utilities shared across integration and E2E tests

use std::time::Duration;

use jspad_sandbox::{ResourceLimits, SandboxController};

/// Setup logging for tests
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

/// Controller with default limits.
pub fn controller() -> SandboxController {
    SandboxController::with_defaults().expect("failed to spawn sandbox controller")
}

/// Controller with a short watchdog, for timeout tests.
pub fn short_fuse_controller(timeout: Duration) -> SandboxController {
    let limits = ResourceLimits {
        max_duration: timeout,
        ..ResourceLimits::default()
    };
    SandboxController::new(limits).expect("failed to spawn sandbox controller")
}
