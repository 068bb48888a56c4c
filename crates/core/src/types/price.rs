//! Prices in Algerian dinars.
//!
//! Amounts are kept as exact decimals. Rounding to whole dinars only happens
//! when an amount is displayed or handed off to the order form.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Separator between thousands groups (narrow no-break space, as fr-DZ).
const GROUP_SEPARATOR: char = '\u{202f}';

/// Errors that can occur when building a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative (got {0})")]
    Negative(Decimal),
}

/// A non-negative amount in dinars (DA).
///
/// ```
/// use zym_power_core::Price;
///
/// let price = Price::from_dinars(4500).times(3);
/// assert_eq!(price.display(), "13\u{202f}500 DA");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// A price of zero dinars.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if the amount is below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self(amount))
    }

    /// Create a price from a whole number of dinars.
    #[must_use]
    pub fn from_dinars(dinars: u32) -> Self {
        Self(Decimal::from(dinars))
    }

    /// The exact amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Multiply by a quantity.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// Round to whole dinars, half away from zero.
    #[must_use]
    pub fn rounded(self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// The price before a percentage discount was applied.
    ///
    /// Returns `None` when the discount is 100 % or more, since no finite
    /// original price exists.
    #[must_use]
    pub fn before_discount(self, percent: u8) -> Option<Self> {
        if percent >= 100 {
            return None;
        }
        let remaining = Decimal::ONE - Decimal::from(percent) / Decimal::ONE_HUNDRED;
        Some(Self(self.0 / remaining))
    }

    /// Whole-dinar amount grouped by thousands, without the currency suffix.
    #[must_use]
    pub fn grouped(&self) -> String {
        let digits = self.rounded().0.trunc().to_string();
        let len = digits.len();
        let mut out = String::with_capacity(len + len / 3 * 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (len - i) % 3 == 0 {
                out.push(GROUP_SEPARATOR);
            }
            out.push(c);
        }
        out
    }

    /// Format for display, e.g. `12 500 DA`.
    #[must_use]
    pub fn display(&self) -> String {
        format!("{} DA", self.grouped())
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}
