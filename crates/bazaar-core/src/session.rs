//! # Checkout Session
//!
//! Caller-owned state for one checkout: the cart, the shipping choice and
//! whatever instruments the shopper applied.
//!
//! ## Session Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Checkout Session Operations                          │
//! │                                                                         │
//! │  Shopper Action          Session Method             State Change        │
//! │  ──────────────          ──────────────             ────────────        │
//! │                                                                         │
//! │  Open checkout ────────► load_cart() ─────────────► lines = cart       │
//! │                                                                         │
//! │  Pick shipping ────────► select_shipping() ───────► shipping = method  │
//! │                                                                         │
//! │  Enter coupon ─────────► apply_coupon_validation() ► coupon = Some     │
//! │  Remove coupon ────────► remove_coupon() ─────────► coupon = None      │
//! │                                                                         │
//! │  Enter discount ───────► apply_discount_validation()► discount = Some  │
//! │                                                                         │
//! │  Move coin slider ─────► redeemable_coins() ──────► clamp to balance   │
//! │  Coin rate quoted ─────► redeem_coins() ──────────► coins = Some       │
//! │                                                                         │
//! │  Any of the above ─────► quote() ─────────────────► (read only)        │
//! │                                                                         │
//! │  Place order ──────────► submit() ────────────────► OrderSubmission    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every change is followed by a fresh [`CheckoutSession::quote`]; nothing
//! is cached, so the breakdown always reflects the current inputs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::pricing::{OrderPricingCalculator, PricingInput};
use crate::types::{
    CartLine, CoinBalance, CoinConversion, CoinRedemption, Coupon, CouponKind, CouponValidation,
    DiscountKind, DiscountValidation, PriceBreakdown, PricingPolicy, PromotionalDiscount,
    ShippingMethod,
};
use crate::validation::{validate_code, validate_percentage};
use crate::MAX_CART_LINES;

// =============================================================================
// Order Submission
// =============================================================================

/// Payload handed to the order-creation API.
///
/// ## Idempotency
/// `id` is generated once per submission. Retrying a failed request with
/// the same payload lets the backend detect the duplicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderSubmission {
    #[ts(type = "string")]
    pub id: Uuid,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    pub lines: Vec<CartLine>,
    pub shipping: Option<ShippingMethod>,
    /// Rounded to paise.
    pub breakdown: PriceBreakdown,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_code: Option<String>,
    pub coins_redeemed: u32,
}

// =============================================================================
// Checkout Session
// =============================================================================

/// The state of one checkout.
///
/// ## Invariants
/// - At most one coupon and one promotional discount
/// - Coins to redeem never exceed the known balance
/// - At most MAX_CART_LINES (100) lines
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    calculator: OrderPricingCalculator,
    lines: Vec<CartLine>,
    shipping: Option<ShippingMethod>,
    coupon: Option<Coupon>,
    discount: Option<PromotionalDiscount>,
    coin_balance: u32,
    coins: Option<CoinRedemption>,
    created_at: DateTime<Utc>,
}

impl CheckoutSession {
    /// Creates an empty session priced under `policy`.
    pub fn new(policy: PricingPolicy) -> Self {
        CheckoutSession {
            calculator: OrderPricingCalculator::new(policy),
            lines: Vec::new(),
            shipping: None,
            coupon: None,
            discount: None,
            coin_balance: 0,
            coins: None,
            created_at: Utc::now(),
        }
    }

    // -------------------------------------------------------------------------
    // Cart
    // -------------------------------------------------------------------------

    /// Replaces the cart with already-normalized lines.
    ///
    /// Applied instruments stay; a coupon whose minimum purchase is no longer
    /// met simply prices at zero.
    pub fn load_cart(&mut self, lines: Vec<CartLine>) -> CoreResult<()> {
        if lines.len() > MAX_CART_LINES {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_LINES,
            });
        }
        debug!(lines = lines.len(), "Cart loaded");
        self.lines = lines;
        Ok(())
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    // -------------------------------------------------------------------------
    // Shipping
    // -------------------------------------------------------------------------

    /// `None` lets the free-shipping threshold decide.
    pub fn select_shipping(&mut self, method: Option<ShippingMethod>) {
        self.shipping = method;
    }

    pub fn shipping(&self) -> Option<ShippingMethod> {
        self.shipping
    }

    // -------------------------------------------------------------------------
    // Coupon
    // -------------------------------------------------------------------------

    /// Applies the result of the coupon validation endpoint.
    ///
    /// Replaces any coupon already applied. A rejected result leaves the
    /// session unchanged.
    pub fn apply_coupon_validation(&mut self, validation: CouponValidation) -> CoreResult<()> {
        let coupon = match validation {
            CouponValidation {
                valid: true,
                coupon: Some(coupon),
            } => coupon,
            CouponValidation { coupon, .. } => {
                return Err(CoreError::InvalidCode {
                    instrument: "coupon".to_string(),
                    code: coupon.map(|c| c.code).unwrap_or_default(),
                });
            }
        };

        validate_code("coupon.code", &coupon.code)?;
        if coupon.kind == CouponKind::Percentage {
            validate_percentage("coupon.value", coupon.value)?;
        }

        info!(code = %coupon.code, kind = ?coupon.kind, "Coupon applied");
        self.coupon = Some(coupon);
        Ok(())
    }

    pub fn remove_coupon(&mut self) {
        if let Some(coupon) = self.coupon.take() {
            info!(code = %coupon.code, "Coupon removed");
        }
    }

    pub fn coupon(&self) -> Option<&Coupon> {
        self.coupon.as_ref()
    }

    // -------------------------------------------------------------------------
    // Promotional Discount
    // -------------------------------------------------------------------------

    /// Applies the result of the discount validation endpoint.
    ///
    /// Independent of the coupon; both may be applied at once.
    pub fn apply_discount_validation(&mut self, validation: DiscountValidation) -> CoreResult<()> {
        let discount = match validation {
            DiscountValidation {
                valid: true,
                discount: Some(discount),
            } => discount,
            DiscountValidation { discount, .. } => {
                return Err(CoreError::InvalidCode {
                    instrument: "discount".to_string(),
                    code: discount.map(|d| d.code).unwrap_or_default(),
                });
            }
        };

        validate_code("discount.code", &discount.code)?;
        if discount.kind == DiscountKind::Percentage {
            if let Some(value) = discount.value {
                validate_percentage("discount.value", value)?;
            }
        }

        info!(code = %discount.code, kind = ?discount.kind, "Discount applied");
        self.discount = Some(discount);
        Ok(())
    }

    pub fn remove_discount(&mut self) {
        if let Some(discount) = self.discount.take() {
            info!(code = %discount.code, "Discount removed");
        }
    }

    pub fn discount(&self) -> Option<&PromotionalDiscount> {
        self.discount.as_ref()
    }

    // -------------------------------------------------------------------------
    // Loyalty Coins
    // -------------------------------------------------------------------------

    /// Records the shopper's balance.
    ///
    /// A pending redemption larger than the new balance is dropped: its
    /// quoted amount belongs to coins the shopper no longer has, so the
    /// caller must fetch a new conversion.
    pub fn set_coin_balance(&mut self, balance: CoinBalance) {
        self.coin_balance = balance.balance;
        if let Some(coins) = self.coins {
            if coins.coins_to_redeem > balance.balance {
                warn!(
                    requested = coins.coins_to_redeem,
                    balance = balance.balance,
                    "Coin redemption exceeds new balance; dropping it"
                );
                self.clear_coins();
            }
        }
    }

    pub fn coin_balance(&self) -> u32 {
        self.coin_balance
    }

    /// Clamps a slider value to the balance.
    ///
    /// Call this before asking the coin service for a conversion so the
    /// quoted amount matches the coins that will be redeemed.
    pub fn redeemable_coins(&self, requested: u32) -> u32 {
        requested.min(self.coin_balance)
    }

    /// Redeems `coins` at the amount the coin service quoted for them.
    ///
    /// Redeeming zero coins clears the redemption.
    ///
    /// ## Errors
    /// [`CoreError::CoinsExceedBalance`] when `coins` is above the balance.
    /// The conversion was quoted for coins the shopper does not have, so any
    /// pending redemption is dropped as well.
    pub fn redeem_coins(&mut self, coins: u32, conversion: CoinConversion) -> CoreResult<()> {
        if coins > self.coin_balance {
            warn!(requested = coins, balance = self.coin_balance, "Coin request exceeds balance");
            self.clear_coins();
            return Err(CoreError::CoinsExceedBalance {
                requested: coins,
                balance: self.coin_balance,
            });
        }

        if coins == 0 {
            self.clear_coins();
            return Ok(());
        }

        self.coins = Some(CoinRedemption {
            coins_to_redeem: coins,
            discount_amount: conversion.discount_amount,
        });
        Ok(())
    }

    pub fn clear_coins(&mut self) {
        self.coins = None;
    }

    pub fn coins(&self) -> Option<CoinRedemption> {
        self.coins
    }

    // -------------------------------------------------------------------------
    // Pricing & Submission
    // -------------------------------------------------------------------------

    /// Prices the current state. Unrounded.
    pub fn quote(&self) -> PriceBreakdown {
        self.calculator.price(&PricingInput {
            lines: &self.lines,
            shipping: self.shipping,
            coupon: self.coupon.as_ref(),
            discount: self.discount.as_ref(),
            coins: self.coins,
        })
    }

    /// Builds the order-creation payload.
    ///
    /// ## Errors
    /// [`CoreError::EmptyCart`] when there is nothing to order.
    pub fn submit(&self) -> CoreResult<OrderSubmission> {
        if self.lines.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        let submission = OrderSubmission {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            lines: self.lines.clone(),
            shipping: self.shipping,
            breakdown: self.quote().rounded(),
            coupon_code: self.coupon.as_ref().map(|c| c.code.clone()),
            discount_code: self.discount.as_ref().map(|d| d.code.clone()),
            coins_redeemed: self.coins.map(|c| c.coins_to_redeem).unwrap_or(0),
        };

        info!(
            id = %submission.id,
            total = %submission.breakdown.total,
            session_age_secs = (submission.created_at - self.created_at).num_seconds(),
            "Order submission built"
        );

        Ok(submission)
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn policy(&self) -> &PricingPolicy {
        self.calculator.policy()
    }
}

impl Default for CheckoutSession {
    fn default() -> Self {
        CheckoutSession::new(PricingPolicy::default())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
