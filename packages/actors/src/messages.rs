//! Message types for actor communication.

use post_core::{ConfigError, ServiceKind};

/// Messages for the ClientActor.
#[derive(Debug)]
pub enum ClientMessage {
    /// Wait a while, then try to join a queue.
    Approach,

    /// Wait in the queue for `service` until a worker calls.
    AwaitCall { service: ServiceKind },
}

/// Messages for the WorkerActor.
#[derive(Debug)]
pub enum WorkerMessage {
    /// Look at the queues again and act on what is there.
    NextRound,
}

/// Result type for office operations.
pub type OfficeResult<T> = Result<T, OfficeError>;

/// Error type for office operations.
#[derive(Debug, thiserror::Error)]
pub enum OfficeError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to spawn {actor}: {reason}")]
    Spawn { actor: String, reason: String },

    #[error("Failed to write event log: {0}")]
    Log(#[from] std::io::Error),

    #[error("Signal '{0}' was closed while waiting")]
    SignalClosed(&'static str),

    #[error("Run aborted: {0}")]
    Aborted(String),

    #[error("Office day already started")]
    AlreadyStarted,
}
