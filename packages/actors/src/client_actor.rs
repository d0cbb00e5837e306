//! Client actor that visits the office once.

use std::sync::Arc;

use post_core::{ActorId, OfficeEvent, SERVICE_COUNT, ServiceKind};
use ractor::{Actor, ActorProcessingErr, ActorRef};
use rand::Rng;
use rand::rngs::StdRng;

use crate::context::{OfficeContext, pause, random_delay};
use crate::messages::{ClientMessage, OfficeResult};

/// State for the client actor.
pub struct ClientActorState {
    pub id: ActorId,
    pub ctx: Arc<OfficeContext>,
    rng: StdRng,
}

impl ClientActorState {
    pub fn new(number: u32, ctx: Arc<OfficeContext>) -> Self {
        let id = ActorId::client(number);
        let rng = ctx.rng_for(Some(id));
        Self { id, ctx, rng }
    }

    fn emit(&self, event: OfficeEvent) -> OfficeResult<u64> {
        self.ctx.log.emit(self.id, event)
    }
}

/// Client actor arguments.
pub struct ClientArgs {
    pub number: u32,
    pub ctx: Arc<OfficeContext>,
}

/// Client actor: waits, picks a service, queues or goes home, gets served.
pub struct ClientActor;

impl ClientActor {
    /// Returns the service the client queued for, or `None` when the office
    /// was already closed.
    async fn approach(&self, state: &mut ClientActorState) -> OfficeResult<Option<ServiceKind>> {
        let wait = random_delay(&mut state.rng, state.ctx.config.client_max_wait_ms);
        pause(wait).await;

        let service = ServiceKind::ALL[state.rng.gen_range(0..SERVICE_COUNT)];
        if state.ctx.store.enqueue(service) {
            state.emit(OfficeEvent::Entering { service })?;
            Ok(Some(service))
        } else {
            state.emit(OfficeEvent::GoingHome)?;
            Ok(None)
        }
    }

    async fn be_served(
        &self,
        state: &mut ClientActorState,
        service: ServiceKind,
    ) -> OfficeResult<()> {
        state.ctx.signals.wait_to_be_called(service).await?;
        state.emit(OfficeEvent::Called)?;

        let duration = random_delay(&mut state.rng, state.ctx.config.service_max_ms);
        pause(duration).await;

        state.emit(OfficeEvent::GoingHome)?;
        Ok(())
    }
}

impl Actor for ClientActor {
    type Msg = ClientMessage;
    type State = ClientActorState;
    type Arguments = ClientArgs;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        let state = ClientActorState::new(args.number, args.ctx);
        tracing::debug!("Starting client: {}", state.id);
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
        myself.send_message(ClientMessage::Approach)?;
        Ok(())
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        let outcome = match message {
            ClientMessage::Approach => match self.approach(state).await {
                Ok(Some(service)) => {
                    myself.send_message(ClientMessage::AwaitCall { service })?;
                    Ok(())
                }
                Ok(None) => {
                    tracing::debug!("Client {} found the office closed", state.id);
                    myself.stop(None);
                    Ok(())
                }
                Err(e) => Err(e),
            },

            ClientMessage::AwaitCall { service } => {
                let served = self.be_served(state, service).await;
                if served.is_ok() {
                    myself.stop(None);
                }
                served
            }
        };

        if let Err(e) = outcome {
            state.ctx.abort(format!("{} failed: {}", state.id, e));
            return Err(e.into());
        }
        Ok(())
    }
}
