//! Error types for decoding, outbound actions and configuration.

use thiserror::Error;

use crate::types::{Amount, RoundId};

/// A channel payload could not be turned into a typed event.
///
/// `field` names the sub-field that was missing or malformed, using a
/// dotted path (`data.bank`, `blade.user_id`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("Malformed field {field}: {value:?}")]
    MalformedField { field: &'static str, value: String },

    #[error("Unknown room id: {room}")]
    UnknownRoom { room: u64 },
}

impl DecodeError {
    /// The field the failure refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingField { field } | Self::MalformedField { field, .. } => *field,
            Self::UnknownRoom { .. } => "data.room",
        }
    }
}

/// Errors from an outbound venue action (bet, chat message, transfer).
#[derive(Debug, Error)]
pub enum ActionError {
    /// HTTP request failed (connection refused, timeout, non-2xx status).
    #[error("HTTP error: {0}")]
    Http(String),

    /// The venue answered but refused the action.
    #[error("Rejected by venue ({status}): {text}")]
    Rejected { status: String, text: String },

    /// The local balance does not cover the requested stake.
    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: Amount, available: Amount },

    /// Bet on a round the registry does not know (ended or never seen).
    #[error("Unknown round: {round}")]
    UnknownRound { round: RoundId },

    /// Response could not be deserialized.
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl ActionError {
    /// Returns `true` if the failure is transient and the action may be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Http(_))
    }
}

/// Invalid or unreadable bot configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}
