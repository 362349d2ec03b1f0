//! Prices in integer minor currency units.
//!
//! `MinorUnits` is the only price representation used inside the catalog.
//! Display amounts (e.g. `9.99` dollars) are converted exactly once, where
//! they enter the system, and converted back only for presentation.

use core::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use catalog_core::{DomainError, DomainResult, ValueObject};

/// Number of decimal places between the display unit and the minor unit.
pub const MINOR_UNIT_SCALE: u32 = 2;

/// A non-negative price in the smallest currency unit (e.g. cents).
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MinorUnits(u64);

impl MinorUnits {
    pub const ZERO: Self = Self(0);

    pub const fn new(amount: u64) -> Self {
        Self(amount)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    /// Convert a display amount (e.g. dollars) into minor units.
    ///
    /// Rounds to the nearest minor unit, halves away from zero, so `9.995`
    /// becomes `1000`. Negative amounts are rejected.
    pub fn from_display(amount: Decimal) -> DomainResult<Self> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(DomainError::validation("price cannot be negative"));
        }

        let factor = Decimal::from(10u64.pow(MINOR_UNIT_SCALE));
        let scaled = amount
            .checked_mul(factor)
            .ok_or_else(|| DomainError::validation("price is out of range"))?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

        scaled
            .to_u64()
            .map(Self)
            .ok_or_else(|| DomainError::validation("price is out of range"))
    }

    /// Parse a display amount as typed by a user (`"9.99"`, `" 12 "`).
    pub fn parse_display(raw: &str) -> DomainResult<Self> {
        let amount = Decimal::from_str(raw.trim())
            .map_err(|e| DomainError::validation(format!("invalid price '{raw}': {e}")))?;
        Self::from_display(amount)
    }

    /// The display amount, always carrying two decimal places (`999` → `9.99`).
    pub fn to_display(self) -> Decimal {
        Decimal::from_i128_with_scale(i128::from(self.0), MINOR_UNIT_SCALE)
    }
}

impl ValueObject for MinorUnits {}

impl From<u64> for MinorUnits {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl core::fmt::Display for MinorUnits {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.to_display(), f)
    }
}
