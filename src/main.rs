//! screenplan daemon entry point
//!
//! Runs the manager over a JSON-lines backend: observed output states
//! come in on stdin (or a file), chosen arrangements go out on stdout.
//! Real windowing-system adapters implement [`screenplan::Backend`] and
//! embed the library directly.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use screenplan::{Database, DaemonError, Manager, Settings, StreamBackend};

#[derive(Parser)]
#[command(name = "screenplan")]
#[command(about = "Remembers and restores multi-display arrangements")]
struct Cli {
    /// Settings file (TOML); defaults apply when absent
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Layout database file (overrides the settings file)
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Read output states from this file instead of stdin
    #[arg(short, long)]
    events: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("Error: {}", error);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), DaemonError> {
    let settings = match &cli.config {
        Some(path) => Settings::from_file(path)?,
        None => Settings::default(),
    };

    let database_path = cli.database.unwrap_or_else(|| settings.database_path());
    info!(path = %database_path.display(), "loading layout database");
    let database = match Database::load_or_empty(database_path.clone()) {
        Ok(database) => database,
        Err(error) => {
            // A broken database should not keep displays from working; the
            // file is left in place for inspection
            error!(%error, "cannot load layout database, starting empty");
            Database::empty(database_path)
        }
    };

    let mut manager = Manager::new(database, settings.layout_config());
    match &cli.events {
        Some(path) => {
            let file = File::open(path).map_err(screenplan::BackendError::from)?;
            let mut backend = StreamBackend::new(BufReader::new(file), io::stdout());
            manager.run(&mut backend)?;
        }
        None => {
            let stdin = io::stdin();
            let mut backend = StreamBackend::new(stdin.lock(), io::stdout());
            manager.run(&mut backend)?;
        }
    }
    Ok(())
}
