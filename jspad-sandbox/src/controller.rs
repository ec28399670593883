//! Sandbox controller - lifecycle and the call/response contract
//!
//! Owns exactly one execution host. Dispatch is fire-and-forget with a
//! single registered callback: a newer `execute_code` call supersedes
//! interest in the previous one, and a stale result is handed to whichever
//! callback is currently registered. A wall-clock watchdog resets the host
//! when a run never answers, since the static loop heuristic is incomplete.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::error::SandboxError;
use crate::host::ExecutionHost;
use crate::limits::ResourceLimits;
use crate::protocol::HostRequest;
use crate::types::ExecutionResult;

type ResultCallback = Box<dyn FnOnce(ExecutionResult) + Send + 'static>;

/// Owns one execution host and relays results to callers.
///
/// Must be created inside a tokio runtime; the response relay and the
/// watchdog run as spawned tasks.
pub struct SandboxController {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    limits: ResourceLimits,
    /// Current host; `None` once destroyed.
    host: Mutex<Option<HostCell>>,
    /// The single registered callback; a newer dispatch replaces it.
    pending: Mutex<Option<ResultCallback>>,
    /// Monotonic dispatch counter; the watchdog only fires for the latest.
    dispatched: AtomicU64,
    /// Highest dispatch counter value observed at a delivery.
    delivered: AtomicU64,
}

struct HostCell {
    host: ExecutionHost,
    relay: JoinHandle<()>,
}

impl SandboxController {
    /// Create a controller with a freshly spawned host.
    pub fn new(limits: ResourceLimits) -> crate::Result<Self> {
        let inner = Arc::new(ControllerInner {
            limits,
            host: Mutex::new(None),
            pending: Mutex::new(None),
            dispatched: AtomicU64::new(0),
            delivered: AtomicU64::new(0),
        });
        ControllerInner::install_host(&inner)?;
        Ok(Self { inner })
    }

    /// Controller with [`ResourceLimits::default`].
    pub fn with_defaults() -> crate::Result<Self> {
        Self::new(ResourceLimits::default())
    }

    /// Fire-and-forget dispatch: `callback` becomes the registered callback
    /// and receives the next result delivered on the host channel.
    pub fn execute_code<F>(&self, source: &str, callback: F)
    where
        F: FnOnce(ExecutionResult) + Send + 'static,
    {
        *self.inner.pending.lock().unwrap() = Some(Box::new(callback));
        let seq = self.inner.dispatched.fetch_add(1, Ordering::SeqCst) + 1;

        let request = HostRequest::new(source);
        let id = request.id;

        let posted = {
            let host = self.inner.host.lock().unwrap();
            match host.as_ref() {
                Some(cell) => cell.host.post(request),
                None => Err(SandboxError::Destroyed),
            }
        };

        if let Err(err) = posted {
            self.inner
                .deliver(ExecutionResult::failure(format!("Fatal Error: {err}"), Vec::new()));
            return;
        }

        tracing::info!(execution_id = %id, source_len = source.len(), "dispatched run");

        // Watchdog: the loop heuristic is incomplete; wall clock is the
        // backstop for everything it misses.
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            tokio::time::sleep(inner.limits.max_duration).await;
            inner.on_watchdog(seq);
        });
    }

    /// Async convenience wrapper over the callback contract.
    pub async fn execute(&self, source: &str) -> ExecutionResult {
        let (tx, rx) = oneshot::channel();
        self.execute_code(source, move |result| {
            let _ = tx.send(result);
        });
        match rx.await {
            Ok(result) => result,
            // The callback was superseded or dropped with the controller.
            Err(_) => ExecutionResult::failure("Fatal Error: result channel closed", Vec::new()),
        }
    }

    /// Tear down the current host unconditionally, discard in-flight work,
    /// and start a fresh one.
    pub fn reset_host(&self) -> crate::Result<()> {
        tracing::info!("resetting execution host");
        ControllerInner::install_host(&self.inner)
    }

    /// Permanently release the host; the controller is unusable afterwards
    /// and later dispatches fail with a fatal result.
    pub fn destroy(&self) {
        tracing::info!("destroying sandbox controller");
        let cell = self.inner.host.lock().unwrap().take();
        if let Some(cell) = cell {
            cell.relay.abort();
            cell.host.shutdown();
        }
        self.inner.pending.lock().unwrap().take();
    }
}

impl ControllerInner {
    /// Replace (or first-install) the host and its relay task.
    fn install_host(inner: &Arc<Self>) -> crate::Result<()> {
        let (host, mut response_rx) = ExecutionHost::spawn(inner.limits.clone())?;

        let relay_inner = Arc::clone(inner);
        let relay = tokio::spawn(async move {
            while let Some(response) = response_rx.recv().await {
                tracing::debug!(execution_id = %response.id, "host response received");
                relay_inner.deliver(response.result);
            }
        });

        let old = {
            let mut slot = inner.host.lock().unwrap();
            slot.replace(HostCell { host, relay })
        };
        if let Some(old) = old {
            // Stop the old relay before terminating so a mid-termination
            // error result is never delivered as if it were current.
            old.relay.abort();
            old.host.terminate();
        }
        // Interest in any in-flight run dies with the old host.
        inner.pending.lock().unwrap().take();
        Ok(())
    }

    /// Hand a result to the currently registered callback, if any.
    fn deliver(&self, result: ExecutionResult) {
        self.delivered
            .store(self.dispatched.load(Ordering::SeqCst), Ordering::SeqCst);
        let callback = self.pending.lock().unwrap().take();
        match callback {
            Some(callback) => callback(result),
            None => tracing::debug!("result arrived with no registered callback, discarded"),
        }
    }

    fn on_watchdog(self: &Arc<Self>, seq: u64) {
        if self.delivered.load(Ordering::SeqCst) >= seq {
            return; // already answered
        }
        if self.dispatched.load(Ordering::SeqCst) != seq {
            return; // superseded by a newer dispatch
        }
        let err = SandboxError::Timeout {
            timeout_ms: self.limits.max_duration.as_millis() as u64,
        };
        tracing::warn!(%err, "watchdog fired, resetting host");
        let callback = self.pending.lock().unwrap().take();
        if let Some(callback) = callback {
            callback(ExecutionResult::failure(
                format!("Fatal Error: {err}; sandbox reset"),
                Vec::new(),
            ));
        }
        if let Err(err) = Self::install_host(self) {
            tracing::error!(%err, "failed to respawn host after watchdog reset");
        }
    }
}

impl Drop for SandboxController {
    fn drop(&mut self) {
        let cell = self.inner.host.lock().unwrap().take();
        if let Some(cell) = cell {
            cell.relay.abort();
            // ExecutionHost::drop terminates the isolate.
        }
    }
}
