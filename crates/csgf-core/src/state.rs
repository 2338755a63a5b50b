//! Per-session client state shared by the read loop, observers and the
//! bet primitive.

use tokio::sync::{Mutex, MutexGuard};

use crate::registry::GameRegistry;
use crate::types::{Amount, UserId};

/// Credentials and identity obtained at bootstrap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Stream connection token.
    pub token: String,
    pub user_id: UserId,
    /// Balance shown on the home page at bootstrap.
    pub balance: Amount,
}

/// Mutable state of one connected session.
///
/// Locks guard a single read-modify-write each and are never held across
/// a network call.
#[derive(Debug)]
pub struct ClientState {
    user_id: UserId,
    registry: Mutex<GameRegistry>,
    balance: Mutex<Amount>,
}

impl ClientState {
    pub fn new(session: &Session) -> Self {
        Self {
            user_id: session.user_id,
            registry: Mutex::new(GameRegistry::new(session.user_id)),
            balance: Mutex::new(session.balance),
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub async fn balance(&self) -> Amount {
        *self.balance.lock().await
    }

    pub async fn set_balance(&self, balance: Amount) {
        *self.balance.lock().await = balance;
    }

    /// Subtract a confirmed spend. Returns the new balance.
    pub async fn deduct(&self, amount: Amount) -> Amount {
        let mut balance = self.balance.lock().await;
        *balance = balance.saturating_sub(amount);
        *balance
    }

    /// Lock the round registry.
    pub async fn registry(&self) -> MutexGuard<'_, GameRegistry> {
        self.registry.lock().await
    }
}
