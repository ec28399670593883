mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "jspad")]
#[command(about = "Sandboxed JavaScript playground runner")]
#[command(version = "0.1.0")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run static checks over a source file and print diagnostics
    Check {
        /// Path to the JavaScript source
        file: PathBuf,

        /// Print raw character offsets instead of line/column markers
        #[arg(long)]
        offsets: bool,

        /// Verbose logging
        #[arg(short, long)]
        verbose: bool,
    },
    /// Execute a source file in the sandbox and print its output
    Run {
        /// Path to the JavaScript source
        file: PathBuf,

        /// Wall-clock budget per run, in seconds
        #[arg(short, long)]
        timeout: Option<u64>,

        /// Optional TOML config file overriding the default limits
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Verbose logging
        #[arg(short, long)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check {
            file,
            offsets,
            verbose,
        } => commands::check(&file, offsets, verbose),
        Commands::Run {
            file,
            timeout,
            config,
            verbose,
        } => commands::run(&file, timeout, config.as_deref(), verbose).await,
    }
}
