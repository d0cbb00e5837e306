//! Summary of a finished run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What happened during one office day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Total number of log lines written.
    pub events: u64,
    /// Number of client actors started.
    pub clients: u32,
    /// Number of worker actors started.
    pub workers: u32,
    /// Clients that joined a queue.
    pub admitted: u32,
    /// Clients that found the office closed.
    pub turned_away: u32,
    /// Clients a worker committed to serve.
    pub served: u32,
    /// Queued clients released by a closing worker without service.
    pub released_at_close: u32,
    /// When the coordinator started the actors.
    pub started_at: DateTime<Utc>,
    /// When the last actor terminated.
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    /// Wall-clock length of the run in milliseconds.
    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }

    /// Every admitted client either got served or was released.
    pub fn is_balanced(&self) -> bool {
        self.admitted == self.served + self.released_at_close
            && self.admitted + self.turned_away == self.clients
    }
}
