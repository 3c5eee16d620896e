//! # Promotional Instructions
//!
//! Custom promotional discounts carry their rule as free text written by the
//! merchandising team, e.g. `"Buy 2 Get 1 Free"` or `"Flat ₹200 off"`. The
//! text is parsed every time the checkout is priced.
//!
//! ## Recognized Patterns (first match wins)
//! ```text
//! ┌─────┬──────────────────────────┬──────────────────────────────────────┐
//! │  #  │ Pattern (any case)       │ Discount                             │
//! ├─────┼──────────────────────────┼──────────────────────────────────────┤
//! │  1  │ buy N get M free         │ cheapest M units, needs N+M in cart  │
//! │  2  │ <pct>% off               │ subtotal × pct / 100                 │
//! │  3  │ ₹<amt> off / <amt> off   │ min(amt, subtotal)                   │
//! │  -  │ anything else            │ 0                                    │
//! └─────┴──────────────────────────┴──────────────────────────────────────┘
//! ```
//!
//! ## Free Unit Selection
//! For "buy N get M free" the lines are ordered by unit price, cheapest
//! first, and the first M units are free. A line may be partly free. Lines
//! with equal prices keep their cart order.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use rust_decimal::Decimal;
use tracing::debug;

use crate::money::Money;
use crate::types::CartLine;

static BUY_GET_FREE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bbuy\s+(\d+)\s*(?:,|and)?\s*get\s+(\d+)\s+free\b").expect("Invalid regex")
});

static PERCENT_OFF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*%\s*off\b").expect("Invalid regex"));

static AMOUNT_OFF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:₹|\brs\.?|\binr)?\s*(\d[\d,]*(?:\.\d+)?)\s*off\b").expect("Invalid regex")
});

/// A parsed promotional instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromoRule {
    /// Buy `buy` units, get the cheapest `free` units at no cost.
    BuyGetFree { buy: u32, free: u32 },
    /// Percentage of the subtotal.
    PercentOff(Decimal),
    /// Flat amount, never more than the subtotal.
    AmountOff(Money),
}

impl PromoRule {
    /// Parses an instruction, returning `None` when no pattern matches.
    ///
    /// A percentage above 100 makes the instruction malformed, not a
    /// candidate for the flat-amount pattern.
    ///
    /// ## Example
    /// ```rust
    /// use bazaar_core::promo::PromoRule;
    ///
    /// assert_eq!(
    ///     PromoRule::parse("Buy 2 Get 1 Free"),
    ///     Some(PromoRule::BuyGetFree { buy: 2, free: 1 })
    /// );
    /// assert!(PromoRule::parse("Free gift wrapping").is_none());
    /// ```
    pub fn parse(instruction: &str) -> Option<PromoRule> {
        if let Some(rule) = BUY_GET_FREE_RE
            .captures(instruction)
            .and_then(|caps| Some(PromoRule::BuyGetFree {
                buy: capture(&caps, 1)?,
                free: capture(&caps, 2)?,
            }))
        {
            return Some(rule);
        }

        if let Some(caps) = PERCENT_OFF_RE.captures(instruction) {
            return match capture::<Decimal>(&caps, 1) {
                Some(pct) if pct <= Decimal::ONE_HUNDRED => Some(PromoRule::PercentOff(pct)),
                _ => {
                    debug!(instruction, "Percentage out of range in promotional instruction");
                    None
                }
            };
        }

        AMOUNT_OFF_RE
            .captures(instruction)
            .and_then(|caps| capture::<Decimal>(&caps, 1))
            .map(|amount| PromoRule::AmountOff(Money::from_decimal(amount)))
    }

    /// Computes the discount this rule grants on `lines`.
    ///
    /// The result is not capped here beyond what each rule defines; the
    /// calculator caps every promotional discount at the subtotal.
    pub fn evaluate(&self, lines: &[CartLine], subtotal: Money) -> Money {
        match *self {
            PromoRule::BuyGetFree { buy, free } => cheapest_units_free(lines, buy, free),
            PromoRule::PercentOff(pct) => subtotal.percentage(pct),
            PromoRule::AmountOff(amount) => amount.min(subtotal),
        }
    }
}

impl fmt::Display for PromoRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromoRule::BuyGetFree { buy, free } => write!(f, "buy {} get {} free", buy, free),
            PromoRule::PercentOff(pct) => write!(f, "{}% off", pct),
            PromoRule::AmountOff(amount) => write!(f, "{} off", amount),
        }
    }
}

/// Parses capture group `index`, ignoring thousands separators.
fn capture<T: FromStr>(caps: &Captures<'_>, index: usize) -> Option<T> {
    let text: String = caps.get(index)?.as_str().chars().filter(|c| *c != ',').collect();
    text.parse().ok()
}

fn cheapest_units_free(lines: &[CartLine], buy: u32, free: u32) -> Money {
    let total_quantity: u64 = lines.iter().map(|l| u64::from(l.quantity)).sum();
    let required = u64::from(buy) + u64::from(free);

    if free == 0 || total_quantity < required {
        debug!(total_quantity, required, "Not enough units for buy-get-free promotion");
        return Money::zero();
    }

    let mut by_price: Vec<&CartLine> = lines.iter().collect();
    by_price.sort_by(|a, b| a.unit_price.cmp(&b.unit_price));

    let mut remaining = free;
    let mut discount = Money::zero();
    for line in by_price {
        if remaining == 0 {
            break;
        }
        let units = line.quantity.min(remaining);
        discount += line.unit_price * units;
        remaining -= units;
    }
    discount
}

// =============================================================================
// Unit Tests
// =============================================================================
