//! Game registry: the set of currently open venue rounds.
//!
//! Rounds are created by a new-round event, mutated by stake and time
//! events, and removed by a round-end event. Updates for ids the registry
//! does not hold are ignored: the round most likely ended moments earlier.
//!
//! Self-originated stake updates are filtered here, once: the registry
//! applies the new bank but does not report the update to observers.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::event::DecodedEvent;
use crate::room::{RoomKind, RoomLimits};
use crate::types::{Amount, RoundId, UserId};

/// Float slack when flooring a computed stake to whole cents.
const CENT_EPSILON: f64 = 1e-6;

/// One open venue round.
#[derive(Debug, Clone, PartialEq)]
pub struct Round {
    pub id: RoundId,
    pub room: RoomKind,
    /// Total pooled amount.
    pub bank: Amount,
    /// Amount staked by the local session.
    pub own_stake: Amount,
    /// Seconds left on the round timer.
    pub remaining_time: u32,
}

impl Round {
    pub fn new(id: RoundId, room: RoomKind) -> Self {
        Self {
            id,
            room,
            bank: Amount::ZERO,
            own_stake: Amount::ZERO,
            remaining_time: room.limits().round_duration,
        }
    }

    pub fn limits(&self) -> RoomLimits {
        self.room.limits()
    }

    /// `own_stake / bank`, or 0 for an empty bank.
    pub fn current_stake_fraction(&self) -> f64 {
        if self.bank.is_zero() {
            return 0.0;
        }
        self.own_stake.cents() as f64 / self.bank.cents() as f64
    }

    /// Largest additional stake `x` such that
    /// `target = (own_stake + x) / (bank + x)`, floored to whole cents.
    ///
    /// Returns zero when `target` is outside `(0, 1)`, when `x` is negative,
    /// below the room's minimum bet, above its maximum bet (alone or added
    /// to the own stake), or would push the bank past the room's maximum.
    pub fn max_additional_stake_for_target_fraction(&self, target: f64) -> Amount {
        if !(target > 0.0 && target < 1.0) {
            return Amount::ZERO;
        }
        let bank = self.bank.cents() as f64;
        let own = self.own_stake.cents() as f64;
        let raw = (target * bank - own) / (1.0 - target);
        if !raw.is_finite() || raw <= 0.0 || raw >= i64::MAX as f64 {
            return Amount::ZERO;
        }

        let stake = Amount::from_cents((raw + CENT_EPSILON).floor() as i64);
        let limits = self.limits();
        if stake < limits.min_bet
            || stake > limits.max_bet
            || self.own_stake + stake > limits.max_bet
            || self.bank + stake > limits.max_bank
        {
            return Amount::ZERO;
        }
        stake
    }
}

/// Who caused a stake update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Own,
    Other,
}

/// Why observers are being notified about a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateReason {
    New,
    Stake,
    Time,
    End,
}

/// Notification produced by [`GameRegistry::apply`].
#[derive(Debug, Clone, PartialEq)]
pub struct RoundUpdate {
    pub reason: UpdateReason,
    /// Snapshot of the round after the update (before removal for `End`).
    pub round: Round,
}

/// In-memory registry of open rounds.
#[derive(Debug)]
pub struct GameRegistry {
    own_user: UserId,
    rounds: HashMap<RoundId, Round>,
}

impl GameRegistry {
    pub fn new(own_user: UserId) -> Self {
        Self {
            own_user,
            rounds: HashMap::new(),
        }
    }

    /// Create a round. Returns `false` (and leaves the live round untouched)
    /// if the id is already open.
    pub fn apply_new_round(&mut self, id: RoundId, room: RoomKind) -> bool {
        if self.rounds.contains_key(&id) {
            debug!(round_id = %id, "duplicate new-round notification ignored");
            return false;
        }
        self.rounds.insert(id, Round::new(id, room));
        true
    }

    /// Record a new bank for an open round.
    ///
    /// Returns `None` for unknown rounds. A bank lower than the one already
    /// known is not applied, but the update is still reported.
    pub fn apply_stake(&mut self, id: RoundId, new_bank: Amount, acting: UserId) -> Option<Origin> {
        let round = self.rounds.get_mut(&id)?;
        if new_bank >= round.bank {
            round.bank = new_bank.max(round.own_stake);
        } else {
            debug!(round_id = %id, bank = %round.bank, reported = %new_bank, "stale bank ignored");
        }
        Some(if acting == self.own_user {
            Origin::Own
        } else {
            Origin::Other
        })
    }

    /// Update the round timer. Returns `false` for unknown rounds.
    pub fn apply_time_tick(&mut self, id: RoundId, seconds: u32) -> bool {
        match self.rounds.get_mut(&id) {
            Some(round) => {
                round.remaining_time = seconds;
                true
            }
            None => false,
        }
    }

    /// Remove and return a round, or `None` if it is not open.
    pub fn apply_round_end(&mut self, id: RoundId) -> Option<Round> {
        self.rounds.remove(&id)
    }

    /// Add a confirmed own stake to an open round.
    pub fn record_own_stake(&mut self, id: RoundId, amount: Amount) -> bool {
        let Some(round) = self.rounds.get_mut(&id) else {
            return false;
        };
        round.own_stake += amount;
        if round.bank < round.own_stake {
            round.bank = round.own_stake;
        }
        true
    }

    /// Apply a decoded round-lifecycle event and return the notification
    /// observers should see, if any.
    pub fn apply(&mut self, event: &DecodedEvent) -> Option<RoundUpdate> {
        let (reason, id) = match *event {
            DecodedEvent::NewRound { id, room } => {
                if !self.apply_new_round(id, room) {
                    return None;
                }
                (UpdateReason::New, id)
            }
            DecodedEvent::StakePlaced { id, bank, user, .. } => match self.apply_stake(id, bank, user) {
                Some(Origin::Other) => (UpdateReason::Stake, id),
                Some(Origin::Own) => {
                    trace!(round_id = %id, "own stake echoed back");
                    return None;
                }
                None => {
                    trace!(round_id = %id, "stake for unknown round ignored");
                    return None;
                }
            },
            DecodedEvent::TimeTick { id, seconds, .. } => {
                if !self.apply_time_tick(id, seconds) {
                    trace!(round_id = %id, "time tick for unknown round ignored");
                    return None;
                }
                (UpdateReason::Time, id)
            }
            DecodedEvent::RoundEnded { id } => {
                return match self.apply_round_end(id) {
                    Some(round) => Some(RoundUpdate {
                        reason: UpdateReason::End,
                        round,
                    }),
                    None => {
                        debug!(round_id = %id, "end for unknown round ignored");
                        None
                    }
                };
            }
            _ => return None,
        };
        self.rounds.get(&id).map(|round| RoundUpdate {
            reason,
            round: round.clone(),
        })
    }

    pub fn get(&self, id: RoundId) -> Option<&Round> {
        self.rounds.get(&id)
    }

    pub fn rounds(&self) -> impl Iterator<Item = &Round> {
        self.rounds.values()
    }

    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    /// Drop every open round. Returns how many were dropped.
    pub fn clear(&mut self) -> usize {
        let n = self.rounds.len();
        self.rounds.clear();
        n
    }
}
