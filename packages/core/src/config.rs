//! Run parameters for the office.

use serde::{Deserialize, Serialize};

/// Upper bound for the client pre-entry wait (TZ), in milliseconds.
pub const MAX_CLIENT_WAIT_MS: u64 = 10_000;
/// Upper bound for a worker break (TU), in milliseconds.
pub const MAX_WORKER_BREAK_MS: u64 = 100;
/// Upper bound for the office-open window (F), in milliseconds.
pub const MAX_OPEN_WINDOW_MS: u64 = 10_000;
/// Default upper bound for one service, in milliseconds.
pub const SERVICE_TIME_MS: u64 = 10;

/// Configuration for one simulated office day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OfficeConfig {
    /// Number of clients (NZ).
    pub clients: u32,
    /// Number of postal workers (NU).
    pub workers: u32,
    /// Longest time a client waits before approaching the office (TZ).
    pub client_max_wait_ms: u64,
    /// Longest break a worker takes (TU).
    pub worker_max_break_ms: u64,
    /// Nominal time the office stays open (F). The actual window is drawn
    /// from `[F/2, F]`.
    pub open_window_ms: u64,
    /// Longest time serving one client takes.
    pub service_max_ms: u64,
    /// Seed for every random draw. `None` seeds from the OS.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for OfficeConfig {
    fn default() -> Self {
        Self {
            clients: 3,
            workers: 2,
            client_max_wait_ms: 100,
            worker_max_break_ms: 100,
            open_window_ms: 100,
            service_max_ms: SERVICE_TIME_MS,
            seed: None,
        }
    }
}

impl OfficeConfig {
    /// Create a configuration from the five classic parameters
    /// `NZ NU TZ TU F`.
    pub fn new(
        clients: u32,
        workers: u32,
        client_max_wait_ms: u64,
        worker_max_break_ms: u64,
        open_window_ms: u64,
    ) -> Self {
        Self {
            clients,
            workers,
            client_max_wait_ms,
            worker_max_break_ms,
            open_window_ms,
            ..Default::default()
        }
    }

    pub fn with_service_max_ms(mut self, service_max_ms: u64) -> Self {
        self.service_max_ms = service_max_ms;
        self
    }

    /// Fix the random seed for this run.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check every parameter against its allowed range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        if self.client_max_wait_ms > MAX_CLIENT_WAIT_MS {
            return Err(ConfigError::ClientWait(self.client_max_wait_ms));
        }
        if self.worker_max_break_ms > MAX_WORKER_BREAK_MS {
            return Err(ConfigError::WorkerBreak(self.worker_max_break_ms));
        }
        if self.open_window_ms > MAX_OPEN_WINDOW_MS {
            return Err(ConfigError::OpenWindow(self.open_window_ms));
        }
        Ok(())
    }

    /// Inclusive bounds of the open window in milliseconds.
    pub fn open_window_bounds(&self) -> (u64, u64) {
        (self.open_window_ms / 2, self.open_window_ms)
    }
}

/// A configuration value outside its allowed range.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Number of postal workers must be greater than 0")]
    NoWorkers,

    #[error("Maximum client wait must be within <0,10000>, got {0}")]
    ClientWait(u64),

    #[error("Maximum worker break must be within <0,100>, got {0}")]
    WorkerBreak(u64),

    #[error("Maximum opening time must be within <0,10000>, got {0}")]
    OpenWindow(u64),
}
