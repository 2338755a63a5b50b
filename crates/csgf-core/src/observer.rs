//! Observer hooks the stream client dispatches decoded events to.

use async_trait::async_trait;

use crate::event::{ChatMessage, TransferNotice};
use crate::registry::RoundUpdate;
use crate::state::ClientState;

/// Trait for user-provided event observers.
///
/// Every hook has an empty default, so an observer implements only what it
/// cares about. Hooks run sequentially on the read loop in arrival order;
/// a slow hook delays every later frame.
#[async_trait]
pub trait EventObserver: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// A round was created, staked on by someone else, ticked or ended.
    async fn on_round_update(&self, _update: &RoundUpdate, _state: &ClientState) {}

    async fn on_chat_message(&self, _message: &ChatMessage) {}

    /// Funds arrived on the local account.
    async fn on_transfer(&self, _notice: &TransferNotice) {}
}
