//! Resource limits for sandboxed execution

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Resource limits applied to each run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLimits {
    /// Wall-clock budget for one run before the watchdog resets the host.
    #[serde(with = "humantime_serde")]
    pub max_duration: Duration,

    /// V8 heap ceiling in bytes.
    pub max_heap_bytes: usize,

    /// Largest source text the host will accept, in bytes.
    pub max_code_bytes: usize,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            max_duration: Duration::from_secs(5),
            max_heap_bytes: 100 * 1024 * 1024, // 100 MB
            max_code_bytes: 64 * 1024,         // 64 KB
        }
    }
}

impl ResourceLimits {
    /// Tight limits for untrusted pasted code.
    pub fn strict() -> Self {
        Self {
            max_duration: Duration::from_secs(1),
            max_heap_bytes: 32 * 1024 * 1024,
            max_code_bytes: 16 * 1024,
        }
    }

    /// Roomy limits for local experiments.
    pub fn permissive() -> Self {
        Self {
            max_duration: Duration::from_secs(30),
            max_heap_bytes: 500 * 1024 * 1024,
            max_code_bytes: 256 * 1024,
        }
    }
}
