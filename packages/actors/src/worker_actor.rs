//! Worker actor that serves clients until the office closes.

use std::sync::Arc;

use post_core::{ActorId, OfficeEvent, ServiceKind};
use ractor::{Actor, ActorProcessingErr, ActorRef};
use rand::rngs::StdRng;

use crate::context::{OfficeContext, pause, random_delay};
use crate::messages::{OfficeResult, WorkerMessage};
use crate::store::Claim;

/// State for the worker actor.
pub struct WorkerActorState {
    /// Worker identity in the log.
    pub id: ActorId,
    /// Shared office context.
    pub ctx: Arc<OfficeContext>,
    /// Whether this worker already told the coordinator it saw the office
    /// closed.
    pub acknowledged_close: bool,
    rng: StdRng,
}

impl WorkerActorState {
    /// Create a new worker actor state.
    pub fn new(number: u32, ctx: Arc<OfficeContext>) -> Self {
        let id = ActorId::worker(number);
        let rng = ctx.rng_for(Some(id));
        Self {
            id,
            ctx,
            acknowledged_close: false,
            rng,
        }
    }

    fn emit(&self, event: OfficeEvent) -> OfficeResult<u64> {
        self.ctx.log.emit(self.id, event)
    }

    /// Acknowledge closing to the coordinator, at most once.
    fn acknowledge_close(&mut self) {
        if !self.acknowledged_close {
            self.ctx.signals.acknowledge_close();
            self.acknowledged_close = true;
        }
    }
}

/// What the worker does after a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Next {
    Continue,
    Finished,
}

/// Worker actor arguments.
pub struct WorkerArgs {
    pub number: u32,
    pub ctx: Arc<OfficeContext>,
}

/// Worker actor that serves clients, rests, and goes home after closing.
pub struct WorkerActor;

impl WorkerActor {
    /// One pass of the worker loop. Decides from the current store contents
    /// only.
    async fn round(&self, state: &mut WorkerActorState) -> OfficeResult<Next> {
        let claim = state
            .ctx
            .store
            .try_claim_from_nonempty_queue(&mut state.rng);

        match claim {
            Claim::Serve(service) => {
                self.serve(state, service).await?;
                Ok(Next::Continue)
            }
            Claim::Idle { open: true } => {
                self.take_break(state).await?;
                Ok(Next::Continue)
            }
            Claim::Idle { open: false } => {
                // A client may have joined between the claim and now.
                if !state.ctx.store.read_queue_snapshot().is_empty() {
                    return Ok(Next::Continue);
                }
                self.close_out(state).await?;
                Ok(Next::Finished)
            }
        }
    }

    async fn serve(&self, state: &mut WorkerActorState, service: ServiceKind) -> OfficeResult<()> {
        state.emit(OfficeEvent::Serving { service })?;
        state.ctx.signals.call(service);

        let duration = random_delay(&mut state.rng, state.ctx.config.service_max_ms);
        pause(duration).await;

        state.emit(OfficeEvent::ServiceFinished)?;
        Ok(())
    }

    async fn take_break(&self, state: &mut WorkerActorState) -> OfficeResult<()> {
        state.emit(OfficeEvent::TakingBreak)?;

        // The coordinator may be waiting for acknowledgements already.
        if !state.ctx.store.is_open() {
            state.acknowledge_close();
        }

        let duration = random_delay(&mut state.rng, state.ctx.config.worker_max_break_ms);
        pause(duration).await;

        state.emit(OfficeEvent::BreakFinished)?;
        Ok(())
    }

    async fn close_out(&self, state: &mut WorkerActorState) -> OfficeResult<()> {
        state.acknowledge_close();

        let drained = state.ctx.store.drain();
        for service in drained.nonempty() {
            let waiting = drained.waiting(service);
            tracing::warn!(
                "{} releasing {} unserved clients of service {}",
                state.id,
                waiting,
                service
            );
            state.ctx.signals.call_many(service, waiting);
        }

        state.ctx.signals.wait_office_closed().await?;
        state.emit(OfficeEvent::GoingHome)?;
        Ok(())
    }
}

impl Actor for WorkerActor {
    type Msg = WorkerMessage;
    type State = WorkerActorState;
    type Arguments = WorkerArgs;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        let state = WorkerActorState::new(args.number, args.ctx);
        tracing::info!("Starting worker: {}", state.id);
        Ok(state)
    }

    async fn post_start(
        &self,
        myself: ActorRef<Self::Msg>,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        if let Err(e) = state.emit(OfficeEvent::Started) {
            state.ctx.abort(format!("{} could not start: {}", state.id, e));
            return Err(e.into());
        }
        myself.send_message(WorkerMessage::NextRound)?;
        Ok(())
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            WorkerMessage::NextRound => match self.round(state).await {
                Ok(Next::Continue) => {
                    myself.send_message(WorkerMessage::NextRound)?;
                }
                Ok(Next::Finished) => {
                    tracing::info!("Worker {} went home", state.id);
                    myself.stop(None);
                }
                Err(e) => {
                    state.ctx.abort(format!("{} failed: {}", state.id, e));
                    return Err(e.into());
                }
            },
        }

        Ok(())
    }
}
