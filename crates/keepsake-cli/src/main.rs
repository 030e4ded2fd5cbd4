use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use keepsake_core::{AppConfig, Millis};

mod commands;

#[derive(Parser)]
#[command(name = "keepsake")]
#[command(author, version, about = "A terminal birthday keepsake")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the presentation
    Run,
    /// List sections and the effects they run on entry
    Sections,
    /// Walk every section on a virtual clock and print the surface calls
    Timeline {
        /// Stop the walk at this presentation time
        #[arg(long, default_value_t = commands::timeline::DEFAULT_UNTIL_MS)]
        until_ms: Millis,
        /// Print JSON instead of one line per call
        #[arg(long)]
        json: bool,
        /// Seed for particles and message choice (overrides general.seed)
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Show the configuration file path and effective configuration
    Config {
        /// Write the default configuration file
        #[arg(long)]
        init: bool,
        /// Overwrite an existing file with --init
        #[arg(long, requires = "init")]
        force: bool,
    },
}

/// Install the global subscriber
///
/// The presentation owns the terminal, so it logs to `<data_dir>/logs`;
/// every other command logs to stderr.
fn init_logging(config: &AppConfig, to_file: bool) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    if !to_file {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
        return Ok(None);
    }

    let log_dir = config.log_dir();
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let file_appender = tracing_appender::rolling::never(&log_dir, "keepsake.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(non_blocking),
        )
        .init();
    Ok(Some(guard))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Arc::new(AppConfig::load()?);

    let command = cli.command.unwrap_or(Commands::Run);
    // Keep the guard alive so buffered log lines are flushed on exit
    let _log_guard = init_logging(&config, matches!(command, Commands::Run))?;

    match command {
        Commands::Run => commands::run::run(config),
        Commands::Sections => commands::sections::run(&config),
        Commands::Timeline {
            until_ms,
            json,
            seed,
        } => commands::timeline::run(&config, until_ms, json, seed),
        Commands::Config { init, force } => commands::config::run(&config, init, force),
    }
}
