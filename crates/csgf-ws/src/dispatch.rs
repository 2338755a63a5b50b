//! Dispatch table: where each decoded event goes.

use std::sync::Arc;

use tracing::{debug, trace};

use csgf_core::{ClientState, DecodedEvent, EventObserver};

/// Destination of a decoded event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Round lifecycle: registry first, then the observers' round hook.
    Registry,
    Chat,
    Transfer,
    /// Local balance in the client state.
    Balance,
    Ignore,
}

pub fn route(event: &DecodedEvent) -> Route {
    match event {
        DecodedEvent::NewRound { .. }
        | DecodedEvent::RoundEnded { .. }
        | DecodedEvent::StakePlaced { .. }
        | DecodedEvent::TimeTick { .. } => Route::Registry,
        DecodedEvent::ChatMessage(_) => Route::Chat,
        DecodedEvent::TransferNotice(_) => Route::Transfer,
        DecodedEvent::BalanceUpdate { .. } => Route::Balance,
        DecodedEvent::Unrecognized => Route::Ignore,
    }
}

/// Registered observers, invoked sequentially in registration order.
#[derive(Default)]
pub struct Dispatcher {
    observers: Vec<Arc<dyn EventObserver>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, observer: Arc<dyn EventObserver>) {
        debug!(observer = observer.name(), "observer registered");
        self.observers.push(observer);
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Deliver one event. The event is consumed here.
    pub async fn dispatch(&self, event: DecodedEvent, state: &ClientState) {
        match (route(&event), event) {
            (Route::Registry, event) => {
                // Lock released before the hooks run.
                let update = state.registry().await.apply(&event);
                let Some(update) = update else {
                    return;
                };
                trace!(round_id = %update.round.id, reason = ?update.reason, "round update");
                for observer in &self.observers {
                    observer.on_round_update(&update, state).await;
                }
            }
            (Route::Chat, DecodedEvent::ChatMessage(message)) => {
                for observer in &self.observers {
                    observer.on_chat_message(&message).await;
                }
            }
            (Route::Transfer, DecodedEvent::TransferNotice(notice)) => {
                debug!(from = %notice.from_display_name, amount = %notice.amount, "transfer received");
                for observer in &self.observers {
                    observer.on_transfer(&notice).await;
                }
            }
            (Route::Balance, DecodedEvent::BalanceUpdate { balance }) => {
                state.set_balance(balance).await;
                trace!(balance = %balance, "balance updated");
            }
            (_, event) => trace!(kind = event.kind(), "event ignored"),
        }
    }
}
