//! Venue room kinds and their fixed limits.

use std::fmt;

use crate::types::Amount;

/// Stake and duration limits of one room kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomLimits {
    /// Largest bank a round in this room can reach.
    pub max_bank: Amount,
    /// Smallest single stake the venue accepts.
    pub min_bet: Amount,
    /// Largest single stake the venue accepts.
    pub max_bet: Amount,
    /// Round timer length in seconds.
    pub round_duration: u32,
}

/// The rooms the venue runs rounds in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoomKind {
    Classic,
    Bich,
    Dual,
    Rich,
    King,
    Epic,
}

impl RoomKind {
    pub const ALL: [RoomKind; 6] = [
        RoomKind::Classic,
        RoomKind::Bich,
        RoomKind::Dual,
        RoomKind::Rich,
        RoomKind::King,
        RoomKind::Epic,
    ];

    /// Map the numeric room id used on the wire.
    pub fn from_id(id: u64) -> Option<Self> {
        match id {
            1 => Some(Self::Classic),
            2 => Some(Self::Bich),
            3 => Some(Self::Dual),
            4 => Some(Self::Rich),
            5 => Some(Self::King),
            6 => Some(Self::Epic),
            _ => None,
        }
    }

    pub fn id(self) -> u64 {
        match self {
            Self::Classic => 1,
            Self::Bich => 2,
            Self::Dual => 3,
            Self::Rich => 4,
            Self::King => 5,
            Self::Epic => 6,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Classic => "classic",
            Self::Bich => "bich",
            Self::Dual => "dual",
            Self::Rich => "rich",
            Self::King => "king",
            Self::Epic => "epic",
        }
    }

    pub fn limits(self) -> RoomLimits {
        let (max_bank, min_bet, max_bet, round_duration) = match self {
            Self::Classic => (500_00, 1_00, 50_00, 15),
            Self::Bich => (50_00, 10, 5_00, 10),
            Self::Dual => (100_00, 10_00, 50_00, 1),
            Self::Rich => (2_500_00, 10_00, 250_00, 20),
            Self::King => (10_000_00, 50_00, 1_000_00, 25),
            Self::Epic => (50_000_00, 250_00, 5_000_00, 30),
        };
        RoomLimits {
            max_bank: Amount::from_cents(max_bank),
            min_bet: Amount::from_cents(min_bet),
            max_bet: Amount::from_cents(max_bet),
            round_duration,
        }
    }
}

impl fmt::Display for RoomKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip() {
        for room in RoomKind::ALL {
            assert_eq!(RoomKind::from_id(room.id()), Some(room));
        }
        assert_eq!(RoomKind::from_id(0), None);
        assert_eq!(RoomKind::from_id(7), None);
    }

    #[test]
    fn limits_are_consistent() {
        for room in RoomKind::ALL {
            let l = room.limits();
            assert!(l.min_bet <= l.max_bet, "{room}");
            assert!(l.max_bet <= l.max_bank, "{room}");
        }
        assert_eq!(RoomKind::Bich.limits().min_bet.to_string(), "0.10");
    }
}
