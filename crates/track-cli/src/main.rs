use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use track_cli::commands::{clear, report, start, status, stop};
use track_cli::{Cli, Commands, Config};
use track_core::{SessionStore, StorageError, SystemClock, TrackError, TrackingEngine};
use track_db::Database;

type Tracker = TrackingEngine<Database, SystemClock>;

/// Load config, open the database and load every stored session.
fn open_tracker(config_path: Option<&Path>) -> Result<(Tracker, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = Database::open(&config.database_path)
        .map_err(|e| TrackError::from(StorageError::from(e)))
        .with_context(|| format!("failed to open {}", config.database_path.display()))?;
    let store = SessionStore::load(db).context("failed to load tracking data")?;
    Ok((TrackingEngine::new(store, SystemClock), config))
}

fn run(cli: &Cli) -> Result<()> {
    let Some(command) = &cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let (mut engine, config) = open_tracker(cli.config.as_deref())?;
    let mut stdout = std::io::stdout().lock();

    match command {
        Commands::Start(args) => start::run(&mut stdout, &mut engine, args, &config)?,
        Commands::Stop(args) => stop::run(&mut stdout, &mut engine, args)?,
        Commands::Status { watch: true } => status::watch(&mut stdout, &engine)?,
        Commands::Status { watch: false } => status::run(&mut stdout, &engine)?,
        Commands::Report(args) => report::run(&mut stdout, &engine, args)?,
        Commands::Clear(args) => {
            let mut stdin = std::io::stdin().lock();
            clear::run(&mut stdin, &mut stdout, &mut engine, args)?;
        }
    }

    stdout.flush()?;
    Ok(())
}

fn main() -> ExitCode {
    // Usage errors exit 1; code 2 belongs to rejected input.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            let code = err
                .chain()
                .find_map(|cause| cause.downcast_ref::<TrackError>())
                .map_or(1, TrackError::exit_code);
            ExitCode::from(code)
        }
    }
}
