//! Counting signals for the client/worker rendezvous and the closing handshake.

use post_core::{SERVICE_COUNT, ServiceKind};
use tokio::sync::Semaphore;

use crate::messages::OfficeError;

/// Every signal the office needs, created by the coordinator before any
/// actor starts.
///
/// Each signal is a semaphore used purely as a counter: a release adds one
/// permit and a wait consumes one. A release that happens before anyone
/// waits is kept for the next waiter.
///
/// Dropping the set closes every signal, which fails all pending and future
/// waits with [`OfficeError::SignalClosed`].
#[derive(Debug)]
pub struct Signals {
    /// One rendezvous per service queue; a worker releases one client.
    queues: [Semaphore; SERVICE_COUNT],
    /// Workers acknowledge that they saw the office closed.
    may_close: Semaphore,
    /// The coordinator lets workers go home after logging `closing`.
    closed: Semaphore,
}

impl Default for Signals {
    fn default() -> Self {
        Self::new()
    }
}

impl Signals {
    pub fn new() -> Self {
        Self {
            queues: [Semaphore::new(0), Semaphore::new(0), Semaphore::new(0)],
            may_close: Semaphore::new(0),
            closed: Semaphore::new(0),
        }
    }

    /// Wake one client waiting for `service`.
    pub fn call(&self, service: ServiceKind) {
        self.call_many(service, 1);
    }

    pub fn call_many(&self, service: ServiceKind, clients: u32) {
        self.queues[service.index()].add_permits(clients as usize);
    }

    /// Wait until a worker calls a client of `service`.
    pub async fn wait_to_be_called(&self, service: ServiceKind) -> Result<(), OfficeError> {
        wait(&self.queues[service.index()], "queue").await
    }

    /// Tell the coordinator this worker has seen the office closed.
    pub fn acknowledge_close(&self) {
        self.may_close.add_permits(1);
    }

    /// Wait for one closing acknowledgement per worker.
    pub async fn await_acknowledgements(&self, workers: u32) -> Result<(), OfficeError> {
        for received in 1..=workers {
            wait(&self.may_close, "office may close").await?;
            tracing::debug!("Closing acknowledged by {}/{} workers", received, workers);
        }
        Ok(())
    }

    /// Let `workers` workers past their final wait.
    pub fn release_workers(&self, workers: u32) {
        self.closed.add_permits(workers as usize);
    }

    /// Wait until the coordinator has logged that the office is closing.
    pub async fn wait_office_closed(&self) -> Result<(), OfficeError> {
        wait(&self.closed, "office closed").await
    }

    /// Close every signal, waking all waiters with an error.
    pub fn close_all(&self) {
        for queue in &self.queues {
            queue.close();
        }
        self.may_close.close();
        self.closed.close();
    }

    /// Whether every signal in the set has been closed.
    pub fn all_closed(&self) -> bool {
        self.queues.iter().all(Semaphore::is_closed)
            && self.may_close.is_closed()
            && self.closed.is_closed()
    }
}

impl Drop for Signals {
    fn drop(&mut self) {
        self.close_all();
    }
}

async fn wait(signal: &Semaphore, name: &'static str) -> Result<(), OfficeError> {
    signal
        .acquire()
        .await
        .map(|permit| permit.forget())
        .map_err(|_| OfficeError::SignalClosed(name))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn release_before_wait_is_kept() {
        let signals = Signals::new();
        signals.call(ServiceKind::Letters);
        signals.call(ServiceKind::Letters);

        signals
            .wait_to_be_called(ServiceKind::Letters)
            .await
            .unwrap();
        signals
            .wait_to_be_called(ServiceKind::Letters)
            .await
            .unwrap();

        let third = tokio::time::timeout(
            Duration::from_millis(20),
            signals.wait_to_be_called(ServiceKind::Letters),
        )
        .await;
        assert!(third.is_err(), "only two releases were made");
    }

    #[tokio::test]
    async fn queues_are_independent() {
        let signals = Signals::new();
        signals.call(ServiceKind::Money);

        let other = tokio::time::timeout(
            Duration::from_millis(20),
            signals.wait_to_be_called(ServiceKind::Parcels),
        )
        .await;
        assert!(other.is_err());
        signals.wait_to_be_called(ServiceKind::Money).await.unwrap();
    }

    #[tokio::test]
    async fn coordinator_waits_for_every_worker() {
        let signals = Arc::new(Signals::new());
        let waiter = {
            let signals = signals.clone();
            tokio::spawn(async move { signals.await_acknowledgements(3).await })
        };

        signals.acknowledge_close();
        signals.acknowledge_close();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        signals.acknowledge_close();
        waiter.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn closing_wakes_waiters_with_error() {
        let signals = Arc::new(Signals::new());
        let waiter = {
            let signals = signals.clone();
            tokio::spawn(async move { signals.wait_office_closed().await })
        };
        tokio::task::yield_now().await;
        assert!(!signals.all_closed());

        signals.close_all();
        let result = waiter.await.unwrap();
        assert!(matches!(result, Err(OfficeError::SignalClosed("office closed"))));
        assert!(signals.all_closed());
        assert!(matches!(
            signals.wait_to_be_called(ServiceKind::Parcels).await,
            Err(OfficeError::SignalClosed("queue"))
        ));
    }
}
