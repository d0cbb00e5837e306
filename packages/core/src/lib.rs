//! Core domain types for the post office simulation.
//!
//! This crate contains shared types used across all packages:
//! - ServiceKind and QueueSnapshot for the three service queues
//! - Role, ActorId, OfficeEvent and LogLine for the event log
//! - OfficeConfig for run parameters
//! - RunReport for the summary of a finished run

mod config;
mod events;
mod queue;
mod report;

pub use config::{
    ConfigError, MAX_CLIENT_WAIT_MS, MAX_OPEN_WINDOW_MS, MAX_WORKER_BREAK_MS, OfficeConfig,
    SERVICE_TIME_MS,
};
pub use events::{ActorId, LineParseError, LogLine, OfficeEvent, Role};
pub use queue::{QueueSnapshot, SERVICE_COUNT, ServiceKind};
pub use report::RunReport;
