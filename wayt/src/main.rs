//! `wayt`: task list and day calendar on the command line.
//!
//! Reads commands from stdin (or a `--script` file) and prints results to
//! stdout. Configuration via CLI flags, environment variables, or config
//! file (`~/.config/wayt/config.toml`).
//!
//! ```bash
//! # Interactive session
//! cargo run --bin wayt
//!
//! # Replay a command file with debug logging
//! WAYT_LOG=debug cargo run --bin wayt -- --script plan.txt
//! ```

use std::fs::File;
use std::io::{self, BufReader, IsTerminal};
use std::path::Path;

use chrono::Local;
use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;

use wayt::config::{AppConfig, CliArgs};
use wayt::console::Console;

fn main() -> io::Result<()> {
    let cli = CliArgs::parse();

    let (_log_guard, config) = bootstrap(&cli);

    let mut stdout = io::stdout().lock();
    let result = if let Some(path) = cli.script.as_deref() {
        let script = BufReader::new(File::open(path)?);
        Console::new(config, Local).run(script, &mut stdout)
    } else {
        let stdin = io::stdin();
        let interactive = stdin.is_terminal();
        Console::new(config, Local)
            .with_prompt(interactive)
            .run(stdin.lock(), &mut stdout)
    };

    tracing::info!("wayt exiting");
    result
}

/// Installs logging, then resolves configuration.
///
/// Logging comes first so warnings raised while resolving the config
/// (such as an unusable display format) reach the log file.
fn bootstrap(cli: &CliArgs) -> (Option<WorkerGuard>, AppConfig) {
    // Logs go to a file so they never interleave with console output.
    let guard = init_logging(&cli.log_level, cli.log_file.as_deref());

    tracing::info!("wayt starting");

    // CLI args > env > config file > defaults.
    let config = match AppConfig::load(cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: failed to load config file: {e}");
            tracing::warn!(error = %e, "using default configuration");
            AppConfig::default()
        }
    };
    (guard, config)
}

/// Initialize file-based logging.
///
/// Returns a [`WorkerGuard`] that must be held until shutdown to ensure all
/// buffered log entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let default_path = std::env::temp_dir().join("wayt.log");
    let log_path = file_path.unwrap_or(&default_path);

    let log_dir = log_path.parent()?;
    let file_name = log_path.file_name()?.to_str()?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}
