//! # Money Module
//!
//! Provides the `Money` type for rupee amounts at checkout.
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  THE INTEGER PAISE PROBLEM                                              │
//! │    18% tax on ₹9.99 = 179.82 paise → must round NOW                    │
//! │    The checkout recalculates on every input change; rounding each      │
//! │    intermediate step drifts the total by a paisa here and there.       │
//! │                                                                         │
//! │  OUR SOLUTION: Exact decimals, rounded only for display                │
//! │    tax = 1.7982 (kept), total = subtotal + tax − discounts (exact)     │
//! │    "₹11.79" appears only when the breakdown is shown or submitted      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bazaar_core::money::Money;
//!
//! let price = Money::from_minor(109_900); // ₹1099.00
//! let line = price * 2;                   // ₹2198.00
//! assert_eq!(line, Money::from_major(2198));
//! assert_eq!(line.to_string(), "₹2198.00");
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use crate::types::TaxRate;

/// Decimal places shown to shoppers and sent to the order API.
pub const DISPLAY_SCALE: u32 = 2;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in rupees.
///
/// ## Design Decisions
/// - **Decimal inner**: exact for every value a shopper can type or the
///   backend can send, and never rounded implicitly
/// - **Signed**: intermediate sums may go negative before the total is floored
/// - **Saturating**: arithmetic clamps at the `Decimal` range instead of panicking
/// - **Serialized as a string**: `"2074.00"` survives JavaScript number parsing
///
/// ## Where Money Flows
/// ```text
/// CartLine.unit_price ──► subtotal ──┬──► tax (18%)
///                                     ├──► coupon / discount caps
///                                     └──► free-shipping threshold
///
/// subtotal + shipping + tax − discounts ──► total ──► OrderSubmission
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(Decimal);

impl Money {
    /// Creates Money from whole rupees.
    #[inline]
    pub fn from_major(rupees: i64) -> Self {
        Money(Decimal::from(rupees))
    }

    /// Creates Money from paise (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use bazaar_core::money::Money;
    ///
    /// assert_eq!(Money::from_minor(12_550).to_string(), "₹125.50");
    /// ```
    #[inline]
    pub fn from_minor(paise: i64) -> Self {
        Money(Decimal::new(paise, DISPLAY_SCALE))
    }

    /// Wraps an exact decimal amount.
    #[inline]
    pub const fn from_decimal(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Returns the exact, unrounded amount.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Floors the value at zero.
    ///
    /// Every discount and the final total pass through here: the checkout
    /// never shows a negative line or asks the gateway for a negative amount.
    #[inline]
    pub fn non_negative(self) -> Self {
        if self.is_negative() {
            Money::zero()
        } else {
            self
        }
    }

    /// Calculates tax at `rate`, unrounded.
    ///
    /// ## Example
    /// ```rust
    /// use bazaar_core::money::Money;
    /// use bazaar_core::types::TaxRate;
    ///
    /// let tax = Money::from_major(1800).calculate_tax(TaxRate::from_bps(1800));
    /// assert_eq!(tax, Money::from_major(324));
    ///
    /// // Fractional paise are kept until display
    /// let tax = Money::from_minor(999).calculate_tax(TaxRate::from_bps(1800));
    /// assert_eq!(tax.amount(), "1.7982".parse::<rust_decimal::Decimal>().unwrap());
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        Money(self.0.saturating_mul(Decimal::from(rate.bps())) / Decimal::from(10_000u32))
    }

    /// Returns `percent`% of this amount, unrounded.
    ///
    /// Saturates instead of overflowing; callers cap the result anyway.
    pub fn percentage(&self, percent: Decimal) -> Money {
        Money(self.0.saturating_mul(percent) / Decimal::ONE_HUNDRED)
    }

    /// Multiplies money by a quantity.
    #[inline]
    pub fn multiply_quantity(&self, qty: u32) -> Self {
        Money(self.0.saturating_mul(Decimal::from(qty)))
    }

    /// Rounds to paise, half away from zero.
    ///
    /// Only used for display and for the numbers handed to the order API.
    pub fn rounded(&self) -> Money {
        let mut value = self
            .0
            .round_dp_with_strategy(DISPLAY_SCALE, RoundingStrategy::MidpointAwayFromZero);
        value.rescale(DISPLAY_SCALE);
        Money(value)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows the rounded amount with the rupee sign, e.g. `₹2074.00`.
///
/// The CLI formats with the configured currency symbol instead; this is the
/// storefront default.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.rounded().0;
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        write!(f, "{}₹{}", sign, rounded.abs())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

/// Multiplication by quantity.
impl Mul<u32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: u32) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Money(amount)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
