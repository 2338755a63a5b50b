//! The `VenueActions` trait: the outbound side of a session.

use async_trait::async_trait;

use crate::error::ActionError;
use crate::types::{Amount, RoundId, UserId};

/// The venue's answer to an accepted bet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BetReceipt {
    pub status: String,
    pub text: String,
}

/// Outbound actions a session can take.
///
/// # Thread Safety
/// Implementations must be `Send + Sync`; the read loop, the quiz and the
/// advert ticker share one handle as `Arc<dyn VenueActions>`.
#[async_trait]
pub trait VenueActions: Send + Sync + 'static {
    /// Stake `amount` on an open round.
    async fn place_bet(&self, round: RoundId, amount: Amount) -> Result<BetReceipt, ActionError>;

    /// Post a line to the public chat.
    async fn send_chat_message(&self, text: &str) -> Result<(), ActionError>;

    /// Transfer `amount` from the local account to `to`.
    async fn send_transfer(&self, to: UserId, amount: Amount) -> Result<(), ActionError>;
}
