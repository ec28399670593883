//! Integration tests for the execution host and controller

use std::sync::mpsc;
use std::time::Duration;

use assert_matches::assert_matches;
use jspad_sandbox::{ExecutionResult, LogLevel, ResourceLimits, SandboxController};

use crate::common::{controller, setup_test_logging};

#[tokio::test(flavor = "multi_thread")]
async fn arithmetic_completion_value_is_returned() {
    setup_test_logging();
    let sandbox = controller();

    let result = sandbox.execute("2 + 2").await;
    match result {
        ExecutionResult::Success { value, logs } => {
            assert_eq!(value.as_deref(), Some("4"));
            assert!(logs.is_empty());
        }
        other => panic!("expected success, got {other:?}"),
    }
    sandbox.destroy();
}

#[tokio::test(flavor = "multi_thread")]
async fn console_output_is_captured_in_order() {
    setup_test_logging();
    let sandbox = controller();

    let result = sandbox.execute("console.log(\"hi\"); 1").await;
    match result {
        ExecutionResult::Success { value, logs } => {
            assert_eq!(value.as_deref(), Some("1"));
            assert_eq!(logs.len(), 1);
            assert!(logs[0].message.contains("hi"));
            assert_eq!(logs[0].level, LogLevel::Info);
        }
        other => panic!("expected success, got {other:?}"),
    }
    sandbox.destroy();
}

#[tokio::test(flavor = "multi_thread")]
async fn warn_and_error_levels_are_tagged() {
    setup_test_logging();
    let sandbox = controller();

    let result = sandbox
        .execute("console.warn(\"w\"); console.error(\"e\");")
        .await;
    let logs = result.logs();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].level, LogLevel::Warn);
    assert_eq!(logs[1].level, LogLevel::Error);
    sandbox.destroy();
}

#[tokio::test(flavor = "multi_thread")]
async fn infinite_loop_pattern_is_rejected_before_execution() {
    setup_test_logging();
    let sandbox = controller();

    // The pre-check path answers promptly; no execution is attempted.
    let result = tokio::time::timeout(Duration::from_secs(2), sandbox.execute("while(true){}"))
        .await
        .expect("pre-check reply should be prompt");
    match result {
        ExecutionResult::Failure { message, .. } => {
            assert!(message.starts_with("Security Error:"), "{message}");
            assert!(message.contains("infinite loop"), "{message}");
        }
        other => panic!("expected failure, got {other:?}"),
    }
    sandbox.destroy();
}

#[tokio::test(flavor = "multi_thread")]
async fn restricted_globals_are_enumerated_in_one_failure() {
    setup_test_logging();
    let sandbox = controller();

    let result = sandbox.execute("window.alert(document.title)").await;
    match result {
        ExecutionResult::Failure { message, .. } => {
            assert!(message.starts_with("Security Error:"), "{message}");
            for name in ["window", "alert", "document"] {
                assert!(message.contains(name), "missing {name} in {message}");
            }
        }
        other => panic!("expected failure, got {other:?}"),
    }
    sandbox.destroy();
}

#[tokio::test(flavor = "multi_thread")]
async fn thrown_errors_become_runtime_failures() {
    setup_test_logging();
    let sandbox = controller();

    let result = sandbox.execute("throw new Error(\"boom\")").await;
    match result {
        ExecutionResult::Failure { message, .. } => {
            assert!(message.starts_with("Runtime Error:"), "{message}");
            assert!(message.contains("boom"), "{message}");
        }
        other => panic!("expected failure, got {other:?}"),
    }
    sandbox.destroy();
}

#[tokio::test(flavor = "multi_thread")]
async fn logs_before_a_throw_are_preserved() {
    setup_test_logging();
    let sandbox = controller();

    let result = sandbox
        .execute("console.log(\"before\"); throw new Error(\"after\")")
        .await;
    assert!(!result.is_success());
    assert_eq!(result.logs().len(), 1);
    assert!(result.logs()[0].message.contains("before"));
    sandbox.destroy();
}

#[tokio::test(flavor = "multi_thread")]
async fn reset_then_execute_matches_a_fresh_controller() {
    setup_test_logging();
    let sandbox = controller();

    sandbox.reset_host().expect("reset should succeed");
    let result = sandbox.execute("1 + 1").await;
    match result {
        ExecutionResult::Success { value, .. } => assert_eq!(value.as_deref(), Some("2")),
        other => panic!("expected success, got {other:?}"),
    }
    sandbox.destroy();
}

#[tokio::test(flavor = "multi_thread")]
async fn host_is_reused_and_logs_do_not_leak_between_runs() {
    setup_test_logging();
    let sandbox = controller();

    let first = sandbox.execute("console.log(\"a\"); 1").await;
    assert_eq!(first.logs().len(), 1);

    let second = sandbox.execute("2").await;
    match second {
        ExecutionResult::Success { value, logs } => {
            assert_eq!(value.as_deref(), Some("2"));
            assert!(logs.is_empty(), "logs leaked: {logs:?}");
        }
        other => panic!("expected success, got {other:?}"),
    }
    sandbox.destroy();
}

#[tokio::test(flavor = "multi_thread")]
async fn isolate_global_has_no_window() {
    setup_test_logging();
    let sandbox = controller();

    // Computed access slips past the textual scan on purpose: the denylist
    // is a fast path, the bare isolate global is the actual boundary.
    let result = sandbox
        .execute("const w = \"win\" + \"dow\"; typeof globalThis[w]")
        .await;
    match result {
        ExecutionResult::Success { value, .. } => {
            assert_eq!(value.as_deref(), Some("undefined"));
        }
        other => panic!("expected success, got {other:?}"),
    }
    sandbox.destroy();
}

#[tokio::test(flavor = "multi_thread")]
async fn oversized_source_is_rejected_without_executing() {
    setup_test_logging();
    let limits = ResourceLimits {
        max_code_bytes: 64,
        ..ResourceLimits::default()
    };
    let sandbox = SandboxController::new(limits).expect("spawn");

    let big = format!("const filler = \"{}\";", "x".repeat(256));
    let result = sandbox.execute(&big).await;
    match result {
        ExecutionResult::Failure { message, .. } => {
            assert!(message.starts_with("Security Error:"), "{message}");
            assert!(message.contains("maximum size"), "{message}");
        }
        other => panic!("expected failure, got {other:?}"),
    }
    sandbox.destroy();
}

#[tokio::test(flavor = "multi_thread")]
async fn undefined_completion_has_no_value() {
    setup_test_logging();
    let sandbox = controller();

    let result = sandbox.execute("let a = 1;").await;
    assert_matches!(result, ExecutionResult::Success { value: None, .. });
    sandbox.destroy();
}

#[tokio::test(flavor = "multi_thread")]
async fn callback_contract_delivers_on_a_plain_channel() {
    setup_test_logging();
    let sandbox = controller();

    let (tx, rx) = mpsc::channel();
    sandbox.execute_code("40 + 2", move |result| {
        tx.send(result).unwrap();
    });

    let result = rx.recv_timeout(Duration::from_secs(10)).expect("callback");
    match result {
        ExecutionResult::Success { value, .. } => assert_eq!(value.as_deref(), Some("42")),
        other => panic!("expected success, got {other:?}"),
    }
    sandbox.destroy();
}

#[tokio::test(flavor = "multi_thread")]
async fn destroyed_controller_fails_fast() {
    setup_test_logging();
    let sandbox = controller();
    sandbox.destroy();

    let result = sandbox.execute("1").await;
    match result {
        ExecutionResult::Failure { message, .. } => {
            assert!(message.starts_with("Fatal Error:"), "{message}");
        }
        other => panic!("expected failure, got {other:?}"),
    }
}
