//! End-to-end playground flows: diagnose, execute, recover

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use jspad_analysis::compute_diagnostics;
use jspad_sandbox::ExecutionResult;

use crate::common::{controller, setup_test_logging, short_fuse_controller};

#[tokio::test(flavor = "multi_thread")]
async fn diagnose_fix_then_run() {
    setup_test_logging();

    // The editor-side pass flags the broken draft...
    let draft = "const sum = (1 + 2;\nconsole.log(sum)";
    let diagnostics = compute_diagnostics(draft);
    assert!(!diagnostics.is_empty());

    // ...and the corrected text runs clean.
    let fixed = "const sum = 1 + 2;\nconsole.log(sum);\nsum;";
    assert!(compute_diagnostics(fixed).is_empty());

    let sandbox = controller();
    let result = sandbox.execute(fixed).await;
    match result {
        ExecutionResult::Success { value, logs } => {
            assert_eq!(value.as_deref(), Some("3"));
            assert_eq!(logs.len(), 1);
            assert!(logs[0].message.contains('3'));
        }
        other => panic!("expected success, got {other:?}"),
    }
    sandbox.destroy();
}

#[tokio::test(flavor = "multi_thread")]
async fn watchdog_recovers_a_loop_the_heuristic_misses() {
    setup_test_logging();
    let sandbox = short_fuse_controller(Duration::from_millis(500));

    // `while(1)` is a documented gap in the syntactic heuristic; only the
    // wall-clock watchdog catches it.
    let result = sandbox.execute("let i = 0; while(1) { i++; }").await;
    match result {
        ExecutionResult::Failure { message, .. } => {
            assert!(message.starts_with("Fatal Error:"), "{message}");
            assert!(message.contains("timed out"), "{message}");
        }
        other => panic!("expected timeout failure, got {other:?}"),
    }

    // The replacement host is immediately usable.
    let result = sandbox.execute("1 + 1").await;
    match result {
        ExecutionResult::Success { value, .. } => assert_eq!(value.as_deref(), Some("2")),
        other => panic!("expected success after reset, got {other:?}"),
    }
    sandbox.destroy();
}

#[tokio::test(flavor = "multi_thread")]
async fn newer_dispatch_supersedes_the_registered_callback() {
    setup_test_logging();
    let sandbox = controller();

    let first_fired = Arc::new(AtomicBool::new(false));
    let first_flag = Arc::clone(&first_fired);

    // A finite but slow first run keeps the host busy while the second
    // dispatch replaces the registered callback.
    sandbox.execute_code(
        "let i = 0; while (i < 50000000) { i++; } \"first\"",
        move |_| {
            first_flag.store(true, Ordering::SeqCst);
        },
    );

    let (tx, rx) = mpsc::channel();
    sandbox.execute_code("\"second\"", move |result| {
        tx.send(result).unwrap();
    });

    // The host serializes runs, so the next result delivered belongs to the
    // first request but lands on the latest registered callback.
    let result = rx.recv_timeout(Duration::from_secs(10)).expect("callback");
    match result {
        ExecutionResult::Success { value, .. } => {
            assert_eq!(value.as_deref(), Some("first"));
        }
        other => panic!("expected success, got {other:?}"),
    }
    assert!(!first_fired.load(Ordering::SeqCst));
    sandbox.destroy();
}
