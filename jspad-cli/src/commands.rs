//! CLI command implementations

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use jspad_analysis::Severity;
use jspad_sandbox::{ExecutionResult, ResourceLimits, SandboxController};

/// On-disk configuration, all sections optional.
#[derive(Debug, Default, Deserialize)]
struct CliConfig {
    #[serde(default)]
    limits: ResourceLimits,
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn load_limits(config: Option<&Path>) -> Result<ResourceLimits> {
    match config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            let config: CliConfig = toml::from_str(&raw)
                .with_context(|| format!("failed to parse config {}", path.display()))?;
            Ok(config.limits)
        }
        None => Ok(ResourceLimits::default()),
    }
}

fn severity_tag(severity: Severity) -> &'static str {
    match severity {
        Severity::Warning => "warning",
        Severity::Error => "error",
    }
}

/// Print every diagnostic for a file; exit code 1 when any error was found.
pub fn check(file: &Path, offsets: bool, verbose: bool) -> Result<()> {
    init_logging(verbose);

    let source = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;

    let diagnostics = jspad_analysis::compute_diagnostics(&source);
    if diagnostics.is_empty() {
        println!("{}: no issues found", file.display());
        return Ok(());
    }

    if offsets {
        for diag in &diagnostics {
            println!(
                "{}: [{}] {} (offset {}, length {})",
                file.display(),
                severity_tag(diag.severity),
                diag.message,
                diag.offset,
                diag.length
            );
        }
    } else {
        for marker in jspad_analysis::to_markers(&source, &diagnostics) {
            println!(
                "{}:{}:{}: [{}] {}",
                file.display(),
                marker.start_line,
                marker.start_column,
                severity_tag(marker.severity),
                marker.message
            );
        }
    }

    let has_errors = diagnostics.iter().any(|d| d.severity == Severity::Error);
    if has_errors {
        std::process::exit(1);
    }
    Ok(())
}

/// Diagnose, then execute a file in the sandbox and print logs and output.
pub async fn run(
    file: &Path,
    timeout_secs: Option<u64>,
    config: Option<&Path>,
    verbose: bool,
) -> Result<()> {
    init_logging(verbose);

    let mut limits = load_limits(config)?;
    if let Some(secs) = timeout_secs {
        limits.max_duration = Duration::from_secs(secs);
    }
    tracing::debug!(?limits, "resolved sandbox limits");

    let source = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;

    // Live diagnostics go to stderr so piped output stays clean.
    let diagnostics = jspad_analysis::compute_diagnostics(&source);
    for marker in jspad_analysis::to_markers(&source, &diagnostics) {
        eprintln!(
            "{}:{}:{}: [{}] {}",
            file.display(),
            marker.start_line,
            marker.start_column,
            severity_tag(marker.severity),
            marker.message
        );
    }

    let controller = SandboxController::new(limits)?;
    let result = controller.execute(&source).await;
    controller.destroy();

    match result {
        ExecutionResult::Success { value, logs } => {
            for log in &logs {
                println!("{log}");
            }
            if let Some(value) = value {
                println!("=> {value}");
            }
            Ok(())
        }
        ExecutionResult::Failure { message, logs } => {
            for log in &logs {
                println!("{log}");
            }
            eprintln!("{message}");
            std::process::exit(1);
        }
    }
}
