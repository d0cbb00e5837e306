//! Command-line front end for the post office simulation.

use std::path::PathBuf;

use actors::{EventLog, OfficeError, run_office};
use clap::Parser;
use post_core::{ConfigError, OfficeConfig, RunReport};

/// Simulate a post office day with clients and postal workers.
#[derive(Parser, Debug)]
#[command(name = "post-office", version)]
pub struct Cli {
    /// Number of clients (NZ)
    pub clients: u32,
    /// Number of postal workers (NU), at least 1
    pub workers: u32,
    /// Longest wait before a client enters, in ms (TZ, 0-10000)
    pub client_max_wait: u64,
    /// Longest worker break, in ms (TU, 0-100)
    pub worker_max_break: u64,
    /// Longest time the office stays open, in ms (F, 0-10000)
    pub open_window: u64,

    /// Event log file
    #[arg(short, long, default_value = "proj2.out")]
    pub output: PathBuf,

    /// Seed for all random draws
    #[arg(long)]
    pub seed: Option<u64>,

    /// Increase diagnostic output on stderr (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Office configuration described by the arguments.
    pub fn config(&self) -> OfficeConfig {
        let config = OfficeConfig::new(
            self.clients,
            self.workers,
            self.client_max_wait,
            self.worker_max_break,
            self.open_window,
        );
        match self.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        }
    }

    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            _ => tracing::Level::DEBUG,
        }
    }
}

/// Errors that end the program with a failure status.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Error while opening file {path:?}: {source}")]
    Output {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Office(#[from] OfficeError),
}

/// Validate, open the log and run the day.
///
/// The log file is only created once the configuration is known to be
/// valid.
pub async fn run(cli: &Cli) -> Result<RunReport, CliError> {
    let config = cli.config();
    config.validate()?;

    let log = EventLog::create(&cli.output).map_err(|source| CliError::Output {
        path: cli.output.clone(),
        source,
    })?;

    Ok(run_office(config, log).await?)
}
