//! Host / controller message protocol
//!
//! One request message type, one response message type, carried over an
//! asynchronous one-way-then-one-way channel pair. The correlation id is
//! for tracing; the controller enforces single-in-flight dispatch.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{ExecutionRequest, ExecutionResult};

/// Unique execution identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExecutionId(pub uuid::Uuid);

impl ExecutionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for ExecutionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ExecutionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One run request posted to the execution host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostRequest {
    pub id: ExecutionId,
    #[serde(flatten)]
    pub request: ExecutionRequest,
}

impl HostRequest {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            id: ExecutionId::new(),
            request: ExecutionRequest::new(source),
        }
    }
}

/// The single reply the host sends for a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostResponse {
    pub id: ExecutionId,
    #[serde(flatten)]
    pub result: ExecutionResult,
}
