//! The bet primitive: validate against local state, place, then record.

use tracing::{debug, warn};

use crate::error::ActionError;
use crate::state::ClientState;
use crate::transport::{BetReceipt, VenueActions};
use crate::types::{Amount, RoundId};

/// Place a bet and, only once the venue accepts it, record the own stake
/// and deduct the local balance.
///
/// Rejected locally when `amount` exceeds the balance or the round is not
/// open. On any failure the registry and balance are left untouched.
pub async fn place_bet(
    actions: &dyn VenueActions,
    state: &ClientState,
    round: RoundId,
    amount: Amount,
) -> Result<BetReceipt, ActionError> {
    let available = state.balance().await;
    if amount > available {
        return Err(ActionError::InsufficientBalance {
            requested: amount,
            available,
        });
    }
    if state.registry().await.get(round).is_none() {
        return Err(ActionError::UnknownRound { round });
    }

    let receipt = match actions.place_bet(round, amount).await {
        Ok(receipt) => receipt,
        Err(e) => {
            warn!(round_id = %round, amount = %amount, error = %e, "bet failed");
            return Err(e);
        }
    };

    if !state.registry().await.record_own_stake(round, amount) {
        // Round ended while the request was in flight.
        debug!(round_id = %round, "bet accepted for a round that already closed");
    }
    let balance = state.deduct(amount).await;
    debug!(round_id = %round, amount = %amount, balance = %balance, "bet placed");
    Ok(receipt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room::RoomKind;
    use crate::state::Session;
    use crate::types::UserId;
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    struct MockActions {
        accept: bool,
        bets: Mutex<Vec<(RoundId, Amount)>>,
    }

    impl MockActions {
        fn new(accept: bool) -> Self {
            Self {
                accept,
                bets: Mutex::new(vec![]),
            }
        }
    }

    #[async_trait]
    impl VenueActions for MockActions {
        async fn place_bet(&self, round: RoundId, amount: Amount) -> Result<BetReceipt, ActionError> {
            self.bets.lock().await.push((round, amount));
            if self.accept {
                Ok(BetReceipt {
                    status: "success".into(),
                    text: "ok".into(),
                })
            } else {
                Err(ActionError::Rejected {
                    status: "error".into(),
                    text: "closed".into(),
                })
            }
        }

        async fn send_chat_message(&self, _text: &str) -> Result<(), ActionError> {
            Ok(())
        }

        async fn send_transfer(&self, _to: UserId, _amount: Amount) -> Result<(), ActionError> {
            Ok(())
        }
    }

    async fn state_with_round() -> ClientState {
        let state = ClientState::new(&Session {
            token: "t".into(),
            user_id: UserId(1),
            balance: Amount::from_units(10),
        });
        state.registry().await.apply_new_round(RoundId(3), RoomKind::Classic);
        state
    }

    #[tokio::test]
    async fn success_records_stake_and_balance() {
        let actions = MockActions::new(true);
        let state = state_with_round().await;
        place_bet(&actions, &state, RoundId(3), Amount::from_units(4))
            .await
            .unwrap();
        assert_eq!(state.balance().await, Amount::from_units(6));
        let reg = state.registry().await;
        let round = reg.get(RoundId(3)).unwrap();
        assert_eq!(round.own_stake, Amount::from_units(4));
        assert!(round.bank >= round.own_stake);
    }

    #[tokio::test]
    async fn rejection_leaves_state_untouched() {
        let actions = MockActions::new(false);
        let state = state_with_round().await;
        let err = place_bet(&actions, &state, RoundId(3), Amount::from_units(4))
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::Rejected { .. }));
        assert_eq!(state.balance().await, Amount::from_units(10));
        assert_eq!(
            state.registry().await.get(RoundId(3)).unwrap().own_stake,
            Amount::ZERO
        );
    }

    #[tokio::test]
    async fn local_checks_skip_the_request() {
        let actions = MockActions::new(true);
        let state = state_with_round().await;

        let err = place_bet(&actions, &state, RoundId(3), Amount::from_units(11))
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::InsufficientBalance { .. }));

        let err = place_bet(&actions, &state, RoundId(99), Amount::from_units(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::UnknownRound { round } if round == RoundId(99)));

        assert!(actions.bets.lock().await.is_empty());
    }
}
