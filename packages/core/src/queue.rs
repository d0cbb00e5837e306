//! Service queue types.

use serde::{Deserialize, Serialize};

/// Number of service queues in the office.
pub const SERVICE_COUNT: usize = 3;

/// A service a client can queue for.
///
/// Displayed as its 1-based number, which is how the event log refers to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    /// Letters (service 1).
    Letters,
    /// Parcels (service 2).
    Parcels,
    /// Money orders (service 3).
    Money,
}

impl ServiceKind {
    /// Every service, in queue order.
    pub const ALL: [ServiceKind; SERVICE_COUNT] =
        [ServiceKind::Letters, ServiceKind::Parcels, ServiceKind::Money];

    /// Zero-based queue index.
    pub fn index(self) -> usize {
        match self {
            ServiceKind::Letters => 0,
            ServiceKind::Parcels => 1,
            ServiceKind::Money => 2,
        }
    }

    /// One-based service number used in the event log.
    pub fn number(self) -> u8 {
        self.index() as u8 + 1
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn from_number(number: u8) -> Option<Self> {
        number
            .checked_sub(1)
            .and_then(|i| Self::from_index(i as usize))
    }
}

impl std::fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Queue lengths of every service at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueSnapshot {
    /// Waiting clients per service, indexed by [`ServiceKind::index`].
    pub lengths: [u32; SERVICE_COUNT],
}

impl QueueSnapshot {
    /// Number of clients waiting for `kind`.
    pub fn waiting(&self, kind: ServiceKind) -> u32 {
        self.lengths[kind.index()]
    }

    /// Total number of waiting clients.
    pub fn total(&self) -> u32 {
        self.lengths.iter().sum()
    }

    /// True when nobody is waiting in any queue.
    pub fn is_empty(&self) -> bool {
        self.lengths.iter().all(|&n| n == 0)
    }

    /// Services that have at least one waiting client.
    pub fn nonempty(&self) -> impl Iterator<Item = ServiceKind> + '_ {
        ServiceKind::ALL
            .into_iter()
            .filter(|kind| self.waiting(*kind) > 0)
    }
}
