//! Smallest-unit amounts
//!
//! Values cross every boundary as decimal strings of smallest units
//! (satoshis). Arithmetic is checked; running totals use `u128` so sums over
//! any realistic UTXO set cannot overflow.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Smallest units per whole coin for 8-decimal chains
pub const COIN: u64 = 100_000_000;

/// Largest value a signed 64-bit transaction value field can carry
pub const MAX_WIRE_VALUE: u64 = i64::MAX as u64;

/// Amount parsing and arithmetic errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("Invalid amount {0:?}: expected a non-negative integer")]
    Invalid(String),
    #[error("Amount {0:?} has more than {1} decimal places")]
    TooPrecise(String, u32),
    #[error("Amount overflow")]
    Overflow,
}

/// A non-negative amount in smallest units
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "AmountRepr", into = "String")]
pub struct Amount(u64);

/// Accepted wire shapes: indexers send numbers, callers send decimal strings
#[derive(Deserialize)]
#[serde(untagged)]
enum AmountRepr {
    Number(u64),
    Text(String),
}

impl TryFrom<AmountRepr> for Amount {
    type Error = AmountError;

    fn try_from(repr: AmountRepr) -> Result<Self, Self::Error> {
        match repr {
            AmountRepr::Number(n) => Ok(Amount(n)),
            AmountRepr::Text(s) => s.parse(),
        }
    }
}

impl From<Amount> for String {
    fn from(amount: Amount) -> Self {
        amount.to_string()
    }
}

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub const fn from_sat(sat: u64) -> Self {
        Amount(sat)
    }

    pub fn as_sat(&self) -> u64 {
        self.0
    }

    /// Convert a display amount ("1.5") into smallest units
    ///
    /// At most `decimals` fractional digits are accepted; nothing is rounded.
    pub fn from_coins(display: &str, decimals: u32) -> Result<Self, AmountError> {
        let text = display.trim();
        let (whole, frac) = match text.split_once('.') {
            Some((w, f)) => (w, f),
            None => (text, ""),
        };

        let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
        if (whole.is_empty() && frac.is_empty()) || !all_digits(whole) || !all_digits(frac) {
            return Err(AmountError::Invalid(display.to_string()));
        }
        if frac.len() > decimals as usize {
            return Err(AmountError::TooPrecise(display.to_string(), decimals));
        }

        let scale = 10u64.checked_pow(decimals).ok_or(AmountError::Overflow)?;
        let whole_units = if whole.is_empty() {
            0
        } else {
            whole.parse::<u64>().map_err(|_| AmountError::Overflow)?
        };
        let frac_units = if frac.is_empty() {
            0
        } else {
            let padded = format!("{:0<width$}", frac, width = decimals as usize);
            padded.parse::<u64>().map_err(|_| AmountError::Overflow)?
        };

        whole_units
            .checked_mul(scale)
            .and_then(|v| v.checked_add(frac_units))
            .map(Amount)
            .ok_or(AmountError::Overflow)
    }

    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    /// Sum of many amounts without overflow
    pub fn total<'a, I>(amounts: I) -> u128
    where
        I: IntoIterator<Item = &'a Amount>,
    {
        amounts.into_iter().map(|a| a.0 as u128).sum()
    }

    /// Narrow a wide total back into an amount
    pub fn from_total(total: u128) -> Result<Self, AmountError> {
        u64::try_from(total).map(Amount).map_err(|_| AmountError::Overflow)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
            return Err(AmountError::Invalid(s.to_string()));
        }
        s.parse::<u64>().map(Amount).map_err(|_| AmountError::Overflow)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Amount {
    fn from(sat: u64) -> Self {
        Amount(sat)
    }
}
