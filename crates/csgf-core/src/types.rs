//! Identifier and money types shared by every csgfkit crate.

use std::fmt;
use std::ops::{Add, AddAssign, Sub};
use std::str::FromStr;

use thiserror::Error;

/// Venue round identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RoundId(pub u64);

impl fmt::Display for RoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Venue user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An amount of venue currency, stored as whole cents.
///
/// The venue quotes everything with two decimals, so cents are the smallest
/// unit; all rounding in csgfkit is done towards zero at this granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub const fn from_units(units: i64) -> Self {
        Self(units * 100)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Convert a JSON float (already quoted in currency units) to cents,
    /// rounding to the nearest cent. Non-finite values are rejected.
    pub fn from_f64_rounded(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let cents = (value * 100.0).round();
        if cents.abs() >= i64::MAX as f64 {
            return None;
        }
        Some(Self(cents as i64))
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn saturating_sub(self, other: Amount) -> Amount {
        Amount(self.0.saturating_sub(other.0))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0 + rhs.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Amount) {
        self.0 += rhs.0;
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Amount) -> Amount {
        Amount(self.0 - rhs.0)
    }
}

/// Error returned when a decimal amount string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid amount: {input:?}")]
pub struct ParseAmountError {
    pub input: String,
}

impl FromStr for Amount {
    type Err = ParseAmountError;

    /// Parse `digits[.digits]`. The only accepted separator is `.`; digits
    /// past the second decimal are truncated.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseAmountError { input: s.to_string() };

        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, Some(f)),
            None => (s, None),
        };
        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err());
        }
        let units: i64 = whole.parse().map_err(|_| err())?;

        let mut cents = 0i64;
        if let Some(frac) = frac {
            if frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit()) {
                return Err(err());
            }
            let mut digits = frac.bytes().take(2).map(|b| i64::from(b - b'0'));
            cents = digits.next().unwrap_or(0) * 10 + digits.next().unwrap_or(0);
        }

        units
            .checked_mul(100)
            .and_then(|u| u.checked_add(cents))
            .map(Amount)
            .ok_or_else(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_whole_and_fractional() {
        assert_eq!("100".parse::<Amount>().unwrap(), Amount::from_cents(10_000));
        assert_eq!("12.5".parse::<Amount>().unwrap(), Amount::from_cents(1_250));
        assert_eq!("0.10".parse::<Amount>().unwrap(), Amount::from_cents(10));
        assert_eq!("3.999".parse::<Amount>().unwrap(), Amount::from_cents(399));
    }

    #[test]
    fn parse_rejects_locale_separators_and_junk() {
        for bad in ["", "1,50", "1.", ".5", "-3", "+3", "1 000", "abc", "1.2.3"] {
            assert!(bad.parse::<Amount>().is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn display_two_decimals() {
        assert_eq!(Amount::from_cents(9_500).to_string(), "95.00");
        assert_eq!(Amount::from_cents(5).to_string(), "0.05");
        assert_eq!(Amount::from_cents(-150).to_string(), "-1.50");
    }

    #[test]
    fn from_float_rounds_to_cent() {
        assert_eq!(Amount::from_f64_rounded(0.29), Some(Amount::from_cents(29)));
        assert_eq!(Amount::from_f64_rounded(f64::NAN), None);
    }
}
