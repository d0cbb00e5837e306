//! Coordinator actor that opens the office, closes it and waits for everyone.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use post_core::{ActorId, OfficeConfig, RunReport};
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort, SupervisionEvent};
use rand::rngs::StdRng;

use crate::client_actor::{ClientActor, ClientArgs};
use crate::context::{OfficeContext, pause, random_between};
use crate::log::EventLog;
use crate::messages::{OfficeError, OfficeResult};
use crate::worker_actor::{WorkerActor, WorkerArgs};

/// Messages for the Coordinator.
#[derive(Debug)]
pub enum CoordinatorMessage {
    /// Run one office day; the reply arrives once every actor has gone home.
    Run {
        reply: RpcReplyPort<OfficeResult<RunReport>>,
    },
}

/// State for the coordinator actor.
pub struct CoordinatorState {
    /// Shared office context.
    pub ctx: Arc<OfficeContext>,
    /// Linked clients and workers still running.
    remaining: usize,
    /// Where the report goes once the day is over.
    reply: Option<RpcReplyPort<OfficeResult<RunReport>>>,
    /// Result of the closing sequence, set once it has finished.
    outcome: Option<OfficeResult<()>>,
    started_at: DateTime<Utc>,
    rng: StdRng,
}

impl CoordinatorState {
    /// Create a new coordinator state.
    pub fn new(ctx: Arc<OfficeContext>) -> Self {
        let rng = ctx.rng_for(None);
        Self {
            ctx,
            remaining: 0,
            reply: None,
            outcome: None,
            started_at: Utc::now(),
            rng,
        }
    }

    fn report(&self) -> RunReport {
        let tally = self.ctx.store.tally();
        RunReport {
            events: self.ctx.log.events_emitted(),
            clients: self.ctx.config.clients,
            workers: self.ctx.config.workers,
            admitted: tally.admitted,
            turned_away: tally.turned_away,
            served: tally.served,
            released_at_close: tally.released,
            started_at: self.started_at,
            finished_at: Utc::now(),
        }
    }
}

fn spawn_error(actor: ActorId, err: impl std::fmt::Display) -> OfficeError {
    OfficeError::Spawn {
        actor: actor.to_string(),
        reason: err.to_string(),
    }
}

/// Coordinator actor that supervises every client and worker.
pub struct Coordinator;

impl Coordinator {
    async fn spawn_actors(
        &self,
        myself: &ActorRef<CoordinatorMessage>,
        state: &mut CoordinatorState,
    ) -> OfficeResult<()> {
        let (workers, clients) = (state.ctx.config.workers, state.ctx.config.clients);

        for number in 1..=workers {
            let args = WorkerArgs {
                number,
                ctx: state.ctx.clone(),
            };
            Actor::spawn_linked(None, WorkerActor, args, myself.get_cell())
                .await
                .map_err(|e| spawn_error(ActorId::worker(number), e))?;
            state.remaining += 1;
        }

        for number in 1..=clients {
            let args = ClientArgs {
                number,
                ctx: state.ctx.clone(),
            };
            Actor::spawn_linked(None, ClientActor, args, myself.get_cell())
                .await
                .map_err(|e| spawn_error(ActorId::client(number), e))?;
            state.remaining += 1;
        }

        tracing::info!("Spawned {} workers and {} clients", workers, clients);
        Ok(())
    }

    /// Keep the office open for a while, close it and hand workers the
    /// final release.
    async fn close_office(&self, state: &mut CoordinatorState) -> OfficeResult<()> {
        let window = random_between(&mut state.rng, state.ctx.config.open_window_bounds());
        tracing::debug!("Office open for {:?}", window);
        pause(window).await;

        state.ctx.store.set_closed();
        tracing::info!("Office closed to new clients");

        let workers = state.ctx.config.workers;
        state.ctx.signals.await_acknowledgements(workers).await?;
        state.ctx.log.emit_closing()?;
        state.ctx.signals.release_workers(workers);
        Ok(())
    }

    /// Reply with the report once the closing sequence is done and every
    /// linked actor has terminated.
    fn try_finish(&self, myself: &ActorRef<CoordinatorMessage>, state: &mut CoordinatorState) {
        if state.remaining > 0 || state.outcome.is_none() {
            return;
        }
        let Some(reply) = state.reply.take() else {
            return;
        };

        let outcome = state.outcome.take().unwrap_or(Ok(()));
        let result = outcome.and_then(|()| match state.ctx.failure() {
            Some(reason) => Err(OfficeError::Aborted(reason)),
            None => Ok(state.report()),
        });

        if let Ok(report) = &result {
            tracing::info!(
                "Office day over: {} events, {} served, {} turned away",
                report.events,
                report.served,
                report.turned_away
            );
        }
        let _ = reply.send(result);
        myself.stop(None);
    }
}

impl Actor for Coordinator {
    type Msg = CoordinatorMessage;
    type State = CoordinatorState;
    type Arguments = Arc<OfficeContext>;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        tracing::info!(
            "Starting office coordinator: {} workers, {} clients",
            args.config.workers,
            args.config.clients
        );
        Ok(CoordinatorState::new(args))
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            CoordinatorMessage::Run { reply } => {
                if state.reply.is_some() || state.outcome.is_some() {
                    let _ = reply.send(Err(OfficeError::AlreadyStarted));
                    return Ok(());
                }
                state.reply = Some(reply);
                state.started_at = Utc::now();

                let mut outcome = self.spawn_actors(&myself, state).await;
                if outcome.is_ok() {
                    outcome = self.close_office(state).await;
                }
                if let Err(e) = &outcome {
                    state.ctx.abort(e);
                }

                state.outcome = Some(outcome);
                self.try_finish(&myself, state);
            }
        }

        Ok(())
    }

    async fn handle_supervisor_evt(
        &self,
        myself: ActorRef<Self::Msg>,
        message: SupervisionEvent,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            SupervisionEvent::ActorTerminated(_, _, _) => {
                state.remaining = state.remaining.saturating_sub(1);
            }
            SupervisionEvent::ActorFailed(cell, err) => {
                tracing::warn!("Office actor {:?} failed: {}", cell.get_id(), err);
                state.ctx.abort(format!("actor failed: {}", err));
                state.remaining = state.remaining.saturating_sub(1);
            }
            _ => return Ok(()),
        }

        self.try_finish(&myself, state);
        Ok(())
    }
}

/// Run one office day with the given configuration, writing events to `log`.
///
/// Validates the configuration before creating any shared state, then
/// returns once every client and worker has terminated.
pub async fn run_office(config: OfficeConfig, log: EventLog) -> OfficeResult<RunReport> {
    config.validate()?;

    let ctx = Arc::new(OfficeContext::new(config, log));
    let (coordinator, handle) = Actor::spawn(None, Coordinator, ctx.clone())
        .await
        .map_err(|e| OfficeError::Spawn {
            actor: "coordinator".to_string(),
            reason: e.to_string(),
        })?;

    let (tx, rx) = ractor::concurrency::oneshot();
    if coordinator
        .send_message(CoordinatorMessage::Run { reply: tx.into() })
        .is_err()
    {
        ctx.abort("coordinator is not accepting messages");
    }

    let result = rx
        .await
        .unwrap_or_else(|_| Err(OfficeError::Aborted("coordinator stopped early".into())));
    if handle.await.is_err() {
        tracing::warn!("Coordinator task ended abnormally");
    }
    result
}
