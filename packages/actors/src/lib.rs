//! Actor system for the post office.
//!
//! This crate provides the Ractor-based clients, postal workers and the
//! coordinator that runs one office day, together with the shared state and
//! signals they synchronize through.
//!
//! # Architecture
//!
//! - `Coordinator` - Top-level actor that starts everyone, closes the office
//!   and waits for all actors to finish
//! - `WorkerActor` - Serves clients, takes breaks, goes home after closing
//! - `ClientActor` - Queues for one service or leaves if the office is closed
//! - `OfficeContext` - Store, signals and event log shared by all of them
//!
//! # Usage
//!
//! ```ignore
//! use actors::{EventLog, run_office};
//! use post_core::OfficeConfig;
//!
//! let log = EventLog::create("proj2.out")?;
//! let report = run_office(OfficeConfig::new(10, 2, 100, 50, 500), log).await?;
//! ```

mod client_actor;
mod context;
mod coordinator;
mod log;
mod messages;
mod signals;
mod store;
mod worker_actor;

pub use client_actor::{ClientActor, ClientArgs};
pub use context::OfficeContext;
pub use coordinator::{Coordinator, CoordinatorMessage, run_office};
pub use log::{EventLog, MemoryLog};
pub use messages::{ClientMessage, OfficeError, OfficeResult, WorkerMessage};
pub use signals::Signals;
pub use store::{Claim, OfficeStore, Tally, choose_nonempty};
pub use worker_actor::{WorkerActor, WorkerArgs};

/// Re-export ractor types for convenience.
pub use ractor::{Actor, ActorRef, RpcReplyPort, concurrency};
