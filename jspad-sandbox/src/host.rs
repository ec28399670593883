//! Long-lived V8 execution host
//!
//! One dedicated thread owns a `deno_core::JsRuntime` and serves run
//! requests from a channel, sending exactly one structured reply per
//! request. Console output is captured through an op writing to a sink held
//! in `OpState`, so no live global is ever patched and restored around a
//! run. The isolate's global object has no `window`, `document` or network
//! surface; the textual scans below are a fast path on top of that.

use std::borrow::Cow;
use std::sync::mpsc;
use std::thread;
use std::time::Instant;

use deno_core::{op2, Extension, JsRuntime, OpState, RuntimeOptions};
use tokio::sync::mpsc as tokio_mpsc;

use crate::error::SandboxError;
use crate::limits::ResourceLimits;
use crate::protocol::{HostRequest, HostResponse};
use crate::types::{ExecutionResult, LogEntry, LogLevel};

/// Captured console entries for the run in progress.
#[derive(Default)]
struct LogSink(Vec<LogEntry>);

#[op2(fast)]
fn op_console_capture(state: &mut OpState, level: u32, #[string] message: &str) {
    let level = match level {
        1 => LogLevel::Warn,
        2 => LogLevel::Error,
        _ => LogLevel::Info,
    };
    state
        .borrow_mut::<LogSink>()
        .0
        .push(LogEntry::new(level, message));
}

fn console_extension() -> Extension {
    Extension {
        name: "jspad_console",
        ops: Cow::Owned(vec![op_console_capture()]),
        ..Default::default()
    }
}

/// Console shims, reinstalled before every run. Arguments are
/// JSON-stringified and space-joined, matching what a playground output
/// pane renders.
const CONSOLE_BOOTSTRAP_JS: &str = r#"
((globalThis) => {
    const format = (args) => args.map((arg) => JSON.stringify(arg)).join(" ");
    globalThis.console = {
        log: (...args) => Deno.core.ops.op_console_capture(0, format(args)),
        warn: (...args) => Deno.core.ops.op_console_capture(1, format(args)),
        error: (...args) => Deno.core.ops.op_console_capture(2, format(args)),
    };
})(globalThis);
"#;

/// Handle to a live execution host thread.
///
/// The host is reused across runs; it processes one request, replies, and
/// goes idle on the channel. Dropping the handle closes the request channel
/// and terminates the isolate, which ends the thread.
pub struct ExecutionHost {
    request_tx: mpsc::Sender<HostRequest>,
    isolate_handle: deno_core::v8::IsolateHandle,
    thread: Option<thread::JoinHandle<()>>,
}

impl ExecutionHost {
    /// Spawn a host thread and return the handle plus its response stream.
    pub fn spawn(
        limits: ResourceLimits,
    ) -> crate::Result<(Self, tokio_mpsc::UnboundedReceiver<HostResponse>)> {
        let (request_tx, request_rx) = mpsc::channel::<HostRequest>();
        let (response_tx, response_rx) = tokio_mpsc::unbounded_channel();
        let (handle_tx, handle_rx) = mpsc::channel();

        let thread = thread::Builder::new()
            .name("jspad-host".to_string())
            .spawn(move || host_loop(limits, request_rx, response_tx, handle_tx))?;

        let isolate_handle = handle_rx
            .recv()
            .map_err(|_| anyhow::anyhow!("execution host thread died during startup"))?;

        Ok((
            Self {
                request_tx,
                isolate_handle,
                thread: Some(thread),
            },
            response_rx,
        ))
    }

    /// Post one run request. Fails when the host thread has exited.
    pub fn post(&self, request: HostRequest) -> Result<(), SandboxError> {
        self.request_tx
            .send(request)
            .map_err(|err| SandboxError::HostUnavailable(err.to_string()))
    }

    /// Interrupt whatever the isolate is doing right now. Safe to call from
    /// any thread; a running script observes it as a thrown termination.
    pub fn terminate(&self) {
        self.isolate_handle.terminate_execution();
    }

    /// Terminate and wait for the host thread to exit.
    pub fn shutdown(mut self) {
        self.terminate();
        let join = self.thread.take();
        drop(self);
        if let Some(join) = join {
            let _ = join.join();
        }
    }
}

impl Drop for ExecutionHost {
    fn drop(&mut self) {
        // The thread exits once the request channel closes; terminating
        // first unsticks a script that is still running.
        self.isolate_handle.terminate_execution();
    }
}

fn host_loop(
    limits: ResourceLimits,
    request_rx: mpsc::Receiver<HostRequest>,
    response_tx: tokio_mpsc::UnboundedSender<HostResponse>,
    handle_tx: mpsc::Sender<deno_core::v8::IsolateHandle>,
) {
    let mut runtime = build_runtime(&limits);
    let isolate_handle = runtime.v8_isolate().thread_safe_handle();
    if handle_tx.send(isolate_handle).is_err() {
        return;
    }

    while let Ok(request) = request_rx.recv() {
        let id = request.id;
        let result = run_one(&mut runtime, &limits, request);
        if response_tx.send(HostResponse { id, result }).is_err() {
            break;
        }
    }
    tracing::debug!("execution host thread exiting");
}

fn build_runtime(limits: &ResourceLimits) -> JsRuntime {
    // Initial heap at 10 MB or a tenth of the ceiling, whichever is smaller.
    let initial_heap = (limits.max_heap_bytes / 10).min(10 * 1024 * 1024);
    let mut runtime = JsRuntime::new(RuntimeOptions {
        extensions: vec![console_extension()],
        create_params: Some(
            deno_core::v8::CreateParams::default().heap_limits(initial_heap, limits.max_heap_bytes),
        ),
        ..Default::default()
    });

    runtime.op_state().borrow_mut().put(LogSink::default());
    runtime
}

fn run_one(runtime: &mut JsRuntime, limits: &ResourceLimits, request: HostRequest) -> ExecutionResult {
    let source = request.request.source;
    tracing::debug!(
        execution_id = %request.id,
        source_len = source.len(),
        "host received run request"
    );

    if source.len() > limits.max_code_bytes {
        let err = SandboxError::CodeTooLarge {
            max: limits.max_code_bytes,
            actual: source.len(),
        };
        return ExecutionResult::failure(format!("Security Error: {err}"), Vec::new());
    }

    // Defense in depth: never trust the caller to have pre-filtered.
    let mut violations: Vec<String> = jspad_analysis::scan_restricted_globals(&source)
        .into_iter()
        .map(|name| format!("restricted global `{name}` is not available in the sandbox"))
        .collect();
    if jspad_analysis::looks_infinite(&source) {
        violations.push("infinite loop pattern detected, execution blocked".to_string());
    }
    if !violations.is_empty() {
        return ExecutionResult::failure(
            format!("Security Error: {}", violations.join("; ")),
            Vec::new(),
        );
    }

    // Logs are cleared at the start of every run, and the shims are
    // reinstalled: the previous run may have reassigned `console`.
    drain_logs(runtime);
    if let Err(err) = runtime.execute_script("<jspad-console>", CONSOLE_BOOTSTRAP_JS) {
        return ExecutionResult::failure(
            format!("Fatal Error: failed to install console shims: {err}"),
            Vec::new(),
        );
    }

    let start = Instant::now();
    // The source runs through eval inside a strict anonymous function: the
    // completion value of the text is the return value, and strict eval
    // keeps its declarations out of the enclosing scope and out of later
    // runs. serde_json escaping produces a valid JS string literal.
    let literal = match serde_json::to_string(&source) {
        Ok(literal) => literal,
        Err(err) => {
            return ExecutionResult::failure(
                format!("Fatal Error: failed to encode source: {err}"),
                Vec::new(),
            );
        }
    };
    let script = format!("(function() {{ \"use strict\"; return eval({literal}); }})()");
    let result = match runtime.execute_script("<jspad>", script) {
        Ok(global) => {
            let value = {
                let scope = &mut runtime.handle_scope();
                let local = deno_core::v8::Local::new(scope, global);
                if local.is_undefined() {
                    None
                } else {
                    Some(local.to_rust_string_lossy(scope))
                }
            };
            ExecutionResult::success(value, drain_logs(runtime))
        }
        Err(err) => {
            ExecutionResult::failure(format!("Runtime Error: {err}"), drain_logs(runtime))
        }
    };

    tracing::debug!(
        execution_id = %request.id,
        duration_ms = start.elapsed().as_millis() as u64,
        success = result.is_success(),
        "run finished"
    );
    result
}

fn drain_logs(runtime: &mut JsRuntime) -> Vec<LogEntry> {
    let state = runtime.op_state();
    let mut state = state.borrow_mut();
    std::mem::take(&mut state.borrow_mut::<LogSink>().0)
}
