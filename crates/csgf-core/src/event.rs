//! Typed events produced by the payload decoder, and the wire channel names.

use crate::room::RoomKind;
use crate::types::{Amount, RoundId, UserId};

/// Wire names of the stream channels.
pub mod channels {
    use crate::types::UserId;

    pub const TEST: &str = "test";
    pub const NEW_BET: &str = "new_bet";
    pub const NEW_GAME: &str = "new_game";
    pub const TIME_GAME: &str = "time_game";
    pub const END_GAME: &str = "end_game";
    pub const STATS: &str = "stats";
    pub const CHAT_NEW: &str = "chat_new";

    /// Per-session balance channel, `balance#<userId>`.
    pub fn balance(user: UserId) -> String {
        format!("balance#{user}")
    }

    /// Per-session notification channel, `notify#<userId>`.
    pub fn notify(user: UserId) -> String {
        format!("notify#{user}")
    }
}

/// A chat line posted by a participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub text: String,
    pub user: UserId,
    pub display_name: String,
}

/// Funds transferred to the local account by another participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferNotice {
    pub amount: Amount,
    pub from_display_name: String,
}

/// One decoded channel payload.
///
/// Created by the decoder, handed to exactly one downstream handler and
/// then dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedEvent {
    NewRound {
        id: RoundId,
        room: RoomKind,
    },
    RoundEnded {
        id: RoundId,
    },
    StakePlaced {
        id: RoundId,
        bank: Amount,
        user: UserId,
        stake: Amount,
    },
    TimeTick {
        id: RoundId,
        room: u64,
        seconds: u32,
    },
    ChatMessage(ChatMessage),
    TransferNotice(TransferNotice),
    BalanceUpdate {
        balance: Amount,
    },
    /// A channel or notification shape csgfkit does not act on.
    Unrecognized,
}

impl DecodedEvent {
    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NewRound { .. } => "new_round",
            Self::RoundEnded { .. } => "round_ended",
            Self::StakePlaced { .. } => "stake_placed",
            Self::TimeTick { .. } => "time_tick",
            Self::ChatMessage(_) => "chat_message",
            Self::TransferNotice(_) => "transfer_notice",
            Self::BalanceUpdate { .. } => "balance_update",
            Self::Unrecognized => "unrecognized",
        }
    }

    /// The round this event refers to, for round-lifecycle events.
    pub fn round_id(&self) -> Option<RoundId> {
        match self {
            Self::NewRound { id, .. }
            | Self::RoundEnded { id }
            | Self::StakePlaced { id, .. }
            | Self::TimeTick { id, .. } => Some(*id),
            _ => None,
        }
    }
}
