//! Development tasks for the rotation simulator
//!
//! This binary provides development utilities using the cargo-xtask pattern.
//! Run with: `cargo xtask <command>`

mod commands;
mod dirs;
mod utils;

use anyhow::Result;
use clap::Parser;
use commands::{Check, Gcd, Replay};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Development tasks for the rotation simulator
#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Development tools for the rotation simulator", long_about = None)]
#[command(version)]
struct Cli {
    /// Also write logs to a file in the log directory
    #[arg(long, global = true)]
    log_file: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Replay a save file and print the resulting timeline
    Replay(Replay),

    /// Print speed-adjusted recast times
    Gcd(Gcd),

    /// Validate a TOML preset or a save file
    Check(Check),
}

fn main() -> Result<()> {
    // Load .env file if it exists (for RUST_LOG and ROTATION_LOG_DIR)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _guard = setup_logging(cli.log_file)?;

    match cli.command {
        Command::Replay(cmd) => cmd.execute(),
        Command::Gcd(cmd) => cmd.execute(),
        Command::Check(cmd) => cmd.execute(),
    }
}

/// Logs to stderr, and optionally to `xtask.log` in the log directory.
///
/// The returned guard flushes the file writer when dropped.
fn setup_logging(to_file: bool) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    if !to_file {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
        return Ok(None);
    }

    let log_dir = dirs::log_dir()?;
    std::fs::create_dir_all(&log_dir)?;
    let file_appender = tracing_appender::rolling::daily(&log_dir, "xtask.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    tracing::info!("Log directory: {}", log_dir.display());
    Ok(Some(guard))
}
