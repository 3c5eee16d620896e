//! # Order Pricing Calculator
//!
//! Computes the checkout breakdown from a cart, a shipping choice and the
//! applied discount instruments.
//!
//! ## Calculation Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      price(&PricingInput)                               │
//! │                                                                         │
//! │  lines ──► compute_subtotal ──► subtotal                               │
//! │                                    │                                    │
//! │  selection ──► resolve_shipping_cost(subtotal vs threshold)            │
//! │                                    │                                    │
//! │  subtotal ──► compute_tax (18%, PRE-discount, unrounded)               │
//! │                                    │                                    │
//! │  coupon   ──► compute_coupon_discount(subtotal, shipping)              │
//! │  discount ──► compute_discount_discount(lines, subtotal)               │
//! │  coins    ──► server amount, passed through                            │
//! │                                    │                                    │
//! │  compute_final_total = max(0, subtotal + shipping + tax − all three)   │
//! │  compute_coins_earned(total)                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Stacking
//! The coupon and the promotional discount are computed independently from
//! the same subtotal and both subtract from the total. Coins subtract too.
//! None of them reduces the base of another.
//!
//! Every function here is pure: same input, same output, no I/O. The
//! calculator never fails; unknown instrument kinds price at zero and are
//! logged as data-integrity warnings.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::money::Money;
use crate::promo::PromoRule;
use crate::types::{
    CartLine, CoinRedemption, Coupon, CouponKind, DiscountKind, PriceBreakdown, PricingPolicy,
    PromotionalDiscount, ShippingMethod, ShippingRates, TaxRate,
};

// =============================================================================
// Calculator
// =============================================================================

/// Everything one pricing run needs besides the store policy.
#[derive(Debug, Clone, Copy)]
pub struct PricingInput<'a> {
    pub lines: &'a [CartLine],
    /// `None` lets the free-shipping threshold decide.
    pub shipping: Option<ShippingMethod>,
    pub coupon: Option<&'a Coupon>,
    pub discount: Option<&'a PromotionalDiscount>,
    /// Coins already clamped to the balance, with the server-quoted amount.
    pub coins: Option<CoinRedemption>,
}

/// Applies a [`PricingPolicy`] to checkout inputs.
#[derive(Debug, Clone, Default)]
pub struct OrderPricingCalculator {
    policy: PricingPolicy,
}

impl OrderPricingCalculator {
    pub fn new(policy: PricingPolicy) -> Self {
        OrderPricingCalculator { policy }
    }

    pub fn policy(&self) -> &PricingPolicy {
        &self.policy
    }

    /// Computes the full breakdown.
    ///
    /// ## Example
    /// ```rust
    /// use bazaar_core::money::Money;
    /// use bazaar_core::pricing::{OrderPricingCalculator, PricingInput};
    /// use bazaar_core::types::CartLine;
    ///
    /// let lines = vec![CartLine::new("saree", Money::from_major(2500), 1).unwrap()];
    /// let breakdown = OrderPricingCalculator::default().price(&PricingInput {
    ///     lines: &lines,
    ///     shipping: None,
    ///     coupon: None,
    ///     discount: None,
    ///     coins: None,
    /// });
    ///
    /// // Above the ₹2000 threshold, so shipping resolves to free
    /// assert_eq!(breakdown.shipping, Money::zero());
    /// assert_eq!(breakdown.total, Money::from_major(2950));
    /// ```
    pub fn price(&self, input: &PricingInput<'_>) -> PriceBreakdown {
        let policy = &self.policy;

        let subtotal = compute_subtotal(input.lines);
        let shipping = resolve_shipping_cost(
            input.shipping,
            &policy.shipping_rates,
            subtotal,
            policy.free_shipping_threshold,
        );
        let tax = compute_tax(subtotal, policy.tax_rate);

        let coupon_discount = input
            .coupon
            .map(|c| compute_coupon_discount(c, subtotal, shipping))
            .unwrap_or_default();
        let discount_discount = input
            .discount
            .map(|d| compute_discount_discount(d, input.lines, subtotal))
            .unwrap_or_default();
        let coin_discount = input
            .coins
            .map(|c| c.discount_amount.non_negative())
            .unwrap_or_default();

        let total = compute_final_total(
            subtotal,
            shipping,
            tax,
            coupon_discount,
            discount_discount,
            coin_discount,
        );
        let coins_earned = compute_coins_earned(
            total,
            policy.coin_earning.threshold,
            policy.coin_earning.coins,
        );

        let breakdown = PriceBreakdown {
            subtotal,
            shipping,
            tax,
            coupon_discount,
            discount_discount,
            coin_discount,
            total,
            coins_earned,
        };

        debug!(
            lines = input.lines.len(),
            subtotal = %subtotal,
            shipping = %shipping,
            tax = %tax,
            coupon = %coupon_discount,
            discount = %discount_discount,
            coins = %coin_discount,
            total = %total,
            "Checkout priced"
        );

        breakdown
    }
}

// =============================================================================
// Pricing Steps
// =============================================================================

/// Σ unit_price × quantity.
pub fn compute_subtotal(lines: &[CartLine]) -> Money {
    lines.iter().map(CartLine::line_total).sum()
}

/// Cost of the chosen shipping method.
///
/// With no selection, orders at or above `free_threshold` ship free and
/// everything else pays the standard rate.
pub fn resolve_shipping_cost(
    selection: Option<ShippingMethod>,
    rates: &ShippingRates,
    subtotal: Money,
    free_threshold: Money,
) -> Money {
    match selection {
        Some(method) => rates.cost(method),
        None if subtotal >= free_threshold => rates.cost(ShippingMethod::Free),
        None => rates.cost(ShippingMethod::Standard),
    }
}

/// Tax on the pre-discount subtotal. Not rounded.
pub fn compute_tax(subtotal: Money, rate: TaxRate) -> Money {
    subtotal.calculate_tax(rate)
}

/// Rupee value of a coupon.
///
/// ## Rules
/// ```text
/// percentage     subtotal × value / 100, ≤ max_discount, ≤ subtotal
/// fixed          value, ≤ max_discount, ≤ subtotal
/// free_shipping  exactly the shipping cost
/// unknown        0 (logged)
/// ```
/// A coupon whose `min_purchase` is no longer met (the cart shrank after the
/// code was validated) is worth nothing.
pub fn compute_coupon_discount(coupon: &Coupon, subtotal: Money, shipping: Money) -> Money {
    if let Some(min) = coupon.min_purchase {
        if subtotal < min {
            debug!(code = %coupon.code, min_purchase = %min, subtotal = %subtotal, "Coupon minimum purchase not met");
            return Money::zero();
        }
    }

    match coupon.kind {
        CouponKind::Percentage => percentage_off(subtotal, coupon.value, coupon.max_discount),
        CouponKind::Fixed => fixed_off(subtotal, coupon.value, coupon.max_discount),
        CouponKind::FreeShipping => shipping.non_negative(),
        CouponKind::Unknown => {
            warn!(code = %coupon.code, "Unknown coupon type, applying no discount");
            Money::zero()
        }
    }
}

/// Rupee value of a promotional discount.
///
/// `percentage` and `fixed` follow the coupon rules. `custom` evaluates its
/// instruction through [`PromoRule`]. The result never exceeds the subtotal.
pub fn compute_discount_discount(
    discount: &PromotionalDiscount,
    lines: &[CartLine],
    subtotal: Money,
) -> Money {
    match discount.kind {
        DiscountKind::Percentage => discount
            .value
            .map(|v| percentage_off(subtotal, v, discount.max_discount))
            .unwrap_or_default(),
        DiscountKind::Fixed => discount
            .value
            .map(|v| fixed_off(subtotal, v, discount.max_discount))
            .unwrap_or_default(),
        DiscountKind::Custom => {
            let Some(instruction) = discount.instruction.as_deref() else {
                debug!(code = %discount.code, "Custom discount without instruction");
                return Money::zero();
            };
            match PromoRule::parse(instruction) {
                Some(rule) => {
                    let amount = rule.evaluate(lines, subtotal);
                    debug!(code = %discount.code, rule = %rule, amount = %amount, "Promotional rule evaluated");
                    cap(amount, subtotal, discount.max_discount)
                }
                None => {
                    debug!(code = %discount.code, instruction, "Unrecognized promotional instruction");
                    Money::zero()
                }
            }
        }
        DiscountKind::Unknown => {
            warn!(code = %discount.code, "Unknown discount type, applying no discount");
            Money::zero()
        }
    }
}

/// `max(0, subtotal + shipping + tax − coupon − discount − coins)`.
pub fn compute_final_total(
    subtotal: Money,
    shipping: Money,
    tax: Money,
    coupon_discount: Money,
    discount_discount: Money,
    coin_discount: Money,
) -> Money {
    (subtotal + shipping + tax - coupon_discount - discount_discount - coin_discount).non_negative()
}

/// Coins the shopper will earn on this order (display only).
pub fn compute_coins_earned(total: Money, earning_threshold: Money, earning_coins: u32) -> u32 {
    if total >= earning_threshold {
        earning_coins
    } else {
        0
    }
}

fn percentage_off(subtotal: Money, percent: Decimal, max_discount: Option<Money>) -> Money {
    cap(subtotal.percentage(percent), subtotal, max_discount)
}

fn fixed_off(subtotal: Money, value: Decimal, max_discount: Option<Money>) -> Money {
    cap(Money::from_decimal(value), subtotal, max_discount)
}

/// Clamps a discount into `0..=min(subtotal, max_discount)`.
fn cap(amount: Money, subtotal: Money, max_discount: Option<Money>) -> Money {
    let amount = amount.min(subtotal);
    let amount = match max_discount {
        Some(max) => amount.min(max),
        None => amount,
    };
    amount.non_negative()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn line(id: &str, rupees: i64, qty: u32) -> CartLine {
        CartLine::new(id, Money::from_major(rupees), qty).unwrap()
    }

    fn coupon(kind: CouponKind, value: i64) -> Coupon {
        Coupon {
            code: "TEST".to_string(),
            kind,
            value: Decimal::from(value),
            max_discount: None,
            min_purchase: None,
        }
    }

    fn discount(kind: DiscountKind, value: Option<i64>, instruction: Option<&str>) -> PromotionalDiscount {
        PromotionalDiscount {
            code: "PROMO".to_string(),
            kind,
            value: value.map(Decimal::from),
            max_discount: None,
            instruction: instruction.map(str::to_string),
        }
    }

    fn input<'a>(lines: &'a [CartLine]) -> PricingInput<'a> {
        PricingInput {
            lines,
            shipping: None,
            coupon: None,
            discount: None,
            coins: None,
        }
    }

    #[test]
    fn test_subtotal() {
        let lines = vec![line("a", 250, 2), line("b", 99, 3)];
        assert_eq!(compute_subtotal(&lines), Money::from_major(797));
        assert_eq!(compute_subtotal(&[]), Money::zero());
    }

    #[test]
    fn test_shipping_resolution() {
        let rates = ShippingRates::default();
        let threshold = Money::from_major(2000);

        assert_eq!(
            resolve_shipping_cost(Some(ShippingMethod::Express), &rates, Money::from_major(5000), threshold),
            Money::from_major(200)
        );
        assert_eq!(
            resolve_shipping_cost(None, &rates, Money::from_major(2000), threshold),
            Money::zero()
        );
        assert_eq!(
            resolve_shipping_cost(None, &rates, Money::from_major(1999), threshold),
            Money::from_major(100)
        );
    }

    #[test]
    fn test_percentage_coupon_cap() {
        let mut c = coupon(CouponKind::Percentage, 10);
        c.max_discount = Some(Money::from_major(150));

        for rupees in [100, 1500, 1800, 100_000, 10_000_000] {
            let amount = compute_coupon_discount(&c, Money::from_major(rupees), Money::zero());
            assert!(amount <= Money::from_major(150));
        }
        assert_eq!(
            compute_coupon_discount(&c, Money::from_major(1000), Money::zero()),
            Money::from_major(100)
        );
    }

    #[test]
    fn test_fixed_coupon_capped_at_subtotal() {
        let c = coupon(CouponKind::Fixed, 500);
        assert_eq!(
            compute_coupon_discount(&c, Money::from_major(300), Money::from_major(100)),
            Money::from_major(300)
        );
        assert_eq!(
            compute_coupon_discount(&c, Money::from_major(900), Money::from_major(100)),
            Money::from_major(500)
        );
    }

    #[test]
    fn test_free_shipping_coupon_cancels_shipping() {
        let c = coupon(CouponKind::FreeShipping, 0);
        let lines = vec![line("a", 500, 1)];
        let breakdown = OrderPricingCalculator::default().price(&PricingInput {
            shipping: Some(ShippingMethod::Express),
            coupon: Some(&c),
            ..input(&lines)
        });

        assert_eq!(breakdown.coupon_discount, breakdown.shipping);
        assert_eq!(breakdown.total, breakdown.subtotal + breakdown.tax);
    }

    #[test]
    fn test_unknown_coupon_contributes_nothing() {
        let c = coupon(CouponKind::Unknown, 50);
        assert_eq!(
            compute_coupon_discount(&c, Money::from_major(1000), Money::from_major(100)),
            Money::zero()
        );
    }

    #[test]
    fn test_coupon_min_purchase() {
        let mut c = coupon(CouponKind::Fixed, 100);
        c.min_purchase = Some(Money::from_major(999));

        assert_eq!(compute_coupon_discount(&c, Money::from_major(998), Money::zero()), Money::zero());
        assert_eq!(
            compute_coupon_discount(&c, Money::from_major(999), Money::zero()),
            Money::from_major(100)
        );
    }

    #[test]
    fn test_negative_coupon_value_clamps_to_zero() {
        let c = coupon(CouponKind::Fixed, -100);
        assert_eq!(compute_coupon_discount(&c, Money::from_major(500), Money::zero()), Money::zero());
    }

    #[test]
    fn test_discount_percentage_and_fixed() {
        let lines = vec![line("a", 1000, 1)];
        let sub = compute_subtotal(&lines);

        let d = discount(DiscountKind::Percentage, Some(20), None);
        assert_eq!(compute_discount_discount(&d, &lines, sub), Money::from_major(200));

        let d = discount(DiscountKind::Fixed, Some(5000), None);
        assert_eq!(compute_discount_discount(&d, &lines, sub), Money::from_major(1000));

        let d = discount(DiscountKind::Percentage, None, None);
        assert_eq!(compute_discount_discount(&d, &lines, sub), Money::zero());
    }

    #[test]
    fn test_custom_discount_instructions() {
        let lines = vec![line("a", 100, 3)];
        let sub = compute_subtotal(&lines);

        let d = discount(DiscountKind::Custom, None, Some("Buy 2 Get 1 Free"));
        assert_eq!(compute_discount_discount(&d, &lines, sub), Money::from_major(100));

        let d = discount(DiscountKind::Custom, None, Some("10% off"));
        assert_eq!(compute_discount_discount(&d, &lines, sub), Money::from_major(30));

        let d = discount(DiscountKind::Custom, None, Some("₹500 off"));
        assert_eq!(compute_discount_discount(&d, &lines, sub), Money::from_major(300));

        let d = discount(DiscountKind::Custom, None, Some("Free gift"));
        assert_eq!(compute_discount_discount(&d, &lines, sub), Money::zero());

        let d = discount(DiscountKind::Custom, None, None);
        assert_eq!(compute_discount_discount(&d, &lines, sub), Money::zero());
    }

    #[test]
    fn test_unknown_discount_contributes_nothing() {
        let lines = vec![line("a", 1000, 1)];
        let d = discount(DiscountKind::Unknown, Some(50), Some("50% off"));
        assert_eq!(
            compute_discount_discount(&d, &lines, compute_subtotal(&lines)),
            Money::zero()
        );

        let breakdown = OrderPricingCalculator::default().price(&PricingInput {
            discount: Some(&d),
            ..input(&lines)
        });
        // 1000 + 100 + 180
        assert_eq!(breakdown.total, Money::from_major(1280));
    }

    #[test]
    fn test_oversized_instruction_does_not_panic() {
        let lines = vec![line("a", 1000, 3)];
        let d = discount(
            DiscountKind::Custom,
            None,
            Some("99999999999999999999999999% off"),
        );
        assert_eq!(
            compute_discount_discount(&d, &lines, compute_subtotal(&lines)),
            Money::zero()
        );

        let d = discount(DiscountKind::Percentage, Some(i64::MAX), None);
        assert_eq!(
            compute_discount_discount(&d, &lines, compute_subtotal(&lines)),
            Money::from_major(3000)
        );
    }

    #[test]
    fn test_extreme_amounts_saturate() {
        let lines = vec![CartLine {
            product_id: "vault".to_string(),
            unit_price: Money::from_decimal(Decimal::MAX),
            quantity: 999,
            size: None,
            color: None,
        }];
        let breakdown = OrderPricingCalculator::default().price(&input(&lines));

        assert_eq!(breakdown.subtotal, Money::from_decimal(Decimal::MAX));
        assert!(!breakdown.total.is_negative());
    }

    #[test]
    fn test_custom_discount_respects_max() {
        let lines = vec![line("a", 1000, 1)];
        let mut d = discount(DiscountKind::Custom, None, Some("50% off"));
        d.max_discount = Some(Money::from_major(100));
        assert_eq!(
            compute_discount_discount(&d, &lines, compute_subtotal(&lines)),
            Money::from_major(100)
        );
    }

    #[test]
    fn test_final_total_floors_at_zero() {
        let total = compute_final_total(
            Money::from_major(100),
            Money::from_major(50),
            Money::from_major(18),
            Money::from_major(100),
            Money::from_major(100),
            Money::from_major(500),
        );
        assert_eq!(total, Money::zero());
    }

    #[test]
    fn test_coins_earned() {
        let threshold = Money::from_major(500);
        assert_eq!(compute_coins_earned(Money::from_major(500), threshold, 10), 10);
        assert_eq!(compute_coins_earned(Money::from_minor(49_999), threshold, 10), 0);
    }

    #[test]
    fn test_coupon_and_discount_stack_additively() {
        let lines = vec![line("a", 1000, 2)];
        let c = coupon(CouponKind::Fixed, 100);
        let d = discount(DiscountKind::Fixed, Some(200), None);

        let breakdown = OrderPricingCalculator::default().price(&PricingInput {
            shipping: Some(ShippingMethod::Standard),
            coupon: Some(&c),
            discount: Some(&d),
            ..input(&lines)
        });

        assert_eq!(breakdown.coupon_discount, Money::from_major(100));
        assert_eq!(breakdown.discount_discount, Money::from_major(200));
        // 2000 + 100 + 360 − 100 − 200
        assert_eq!(breakdown.total, Money::from_major(2160));
    }

    #[test]
    fn test_tax_ignores_discounts() {
        let lines = vec![line("a", 1000, 1)];
        let c = coupon(CouponKind::Fixed, 1000);
        let breakdown = OrderPricingCalculator::default().price(&PricingInput {
            coupon: Some(&c),
            ..input(&lines)
        });
        assert_eq!(breakdown.tax, Money::from_major(180));
    }

    #[test]
    fn test_price_is_idempotent() {
        let lines = vec![line("a", 333, 3), line("b", 149, 1)];
        let c = coupon(CouponKind::Percentage, 7);
        let calculator = OrderPricingCalculator::default();
        let inp = PricingInput {
            coupon: Some(&c),
            ..input(&lines)
        };

        assert_eq!(calculator.price(&inp), calculator.price(&inp));
    }

    #[test]
    fn test_fractional_tax_kept_until_rounding() {
        let lines = vec![CartLine::new("a", Money::from_minor(999), 1).unwrap()];
        let breakdown = OrderPricingCalculator::default().price(&input(&lines));

        assert_eq!(breakdown.tax.amount(), Decimal::from_str("1.7982").unwrap());
        assert_eq!(breakdown.rounded().total, Money::from_minor(11_179));
    }
}
