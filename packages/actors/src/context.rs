//! The explicit context handed to every actor.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use post_core::{ActorId, OfficeConfig, Role};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::log::EventLog;
use crate::signals::Signals;
use crate::store::OfficeStore;

/// Shared state, signals and log for one office day.
///
/// Created by the coordinator before any actor starts and passed to each of
/// them behind an `Arc`.
#[derive(Debug)]
pub struct OfficeContext {
    pub config: OfficeConfig,
    // Dropped in declaration order: signals close before the store goes.
    pub signals: Signals,
    pub store: OfficeStore,
    pub log: EventLog,
    failure: Mutex<Option<String>>,
}

impl OfficeContext {
    pub fn new(config: OfficeConfig, log: EventLog) -> Self {
        Self {
            config,
            signals: Signals::new(),
            store: OfficeStore::new(),
            log,
            failure: Mutex::new(None),
        }
    }

    /// Random source for one actor; `None` is the coordinator.
    pub fn rng_for(&self, actor: Option<ActorId>) -> StdRng {
        let Some(seed) = self.config.seed else {
            return StdRng::from_entropy();
        };
        let salt = match actor {
            None => 0,
            Some(ActorId {
                role: Role::Worker,
                number,
            }) => u64::from(number),
            Some(ActorId {
                role: Role::Client,
                number,
            }) => (1 << 32) | u64::from(number),
        };
        StdRng::seed_from_u64(seed ^ salt.wrapping_mul(0x9E37_79B9_7F4A_7C15))
    }

    /// Stop the whole run: record the first failure, close the office and
    /// close every signal so no actor stays blocked or keeps looping.
    pub fn abort(&self, reason: impl std::fmt::Display) {
        let mut failure = self.failure.lock().unwrap_or_else(PoisonError::into_inner);
        if failure.is_none() {
            tracing::error!("Aborting office run: {}", reason);
            *failure = Some(reason.to_string());
        }
        drop(failure);
        self.store.set_closed();
        self.signals.close_all();
    }

    /// The first failure recorded by [`OfficeContext::abort`], if any.
    pub fn failure(&self) -> Option<String> {
        self.failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Uniform duration in `[0, max_ms]` milliseconds.
pub fn random_delay<R: Rng + ?Sized>(rng: &mut R, max_ms: u64) -> Duration {
    Duration::from_millis(rng.gen_range(0..=max_ms))
}

/// Uniform duration in `[min_ms, max_ms]` milliseconds.
pub fn random_between<R: Rng + ?Sized>(rng: &mut R, (min_ms, max_ms): (u64, u64)) -> Duration {
    Duration::from_millis(rng.gen_range(min_ms..=max_ms))
}

/// Sleep for simulated think time or service time.
pub async fn pause(duration: Duration) {
    if duration.is_zero() {
        tokio::task::yield_now().await;
    } else {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
mod tests {
    use rand::RngCore;

    use super::*;

    #[test]
    fn delays_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            assert!(random_delay(&mut rng, 10) <= Duration::from_millis(10));
            let window = random_between(&mut rng, (50, 100));
            assert!(window >= Duration::from_millis(50) && window <= Duration::from_millis(100));
        }
        assert_eq!(random_delay(&mut rng, 0), Duration::ZERO);
    }

    #[test]
    fn seeded_context_gives_distinct_reproducible_streams() {
        let (log, _) = EventLog::in_memory();
        let ctx = OfficeContext::new(OfficeConfig::default().with_seed(11), log);

        let a = ctx.rng_for(Some(ActorId::worker(1))).next_u64();
        let b = ctx.rng_for(Some(ActorId::client(1))).next_u64();
        let again = ctx.rng_for(Some(ActorId::worker(1))).next_u64();
        assert_ne!(a, b);
        assert_eq!(a, again);
    }

    #[test]
    fn abort_keeps_first_reason_and_closes_signals() {
        let (log, _) = EventLog::in_memory();
        let ctx = OfficeContext::new(OfficeConfig::default(), log);
        assert_eq!(ctx.failure(), None);

        ctx.abort("first");
        ctx.abort("second");
        assert_eq!(ctx.failure().as_deref(), Some("first"));
        assert!(ctx.signals.all_closed());
        assert!(!ctx.store.is_open());
    }
}
