//! # Domain Types
//!
//! Checkout domain types shared by the calculator, the session and the CLI.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    CartLine     │   │ ShippingMethod  │   │     Coupon      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  product_id     │   │  Free           │   │  percentage     │       │
//! │  │  unit_price     │   │  Standard       │   │  fixed          │       │
//! │  │  quantity ≥ 1   │   │  Express        │   │  free_shipping  │       │
//! │  │  size / color   │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ Promotional-    │   │ CoinRedemption  │   │ PriceBreakdown  │       │
//! │  │ Discount        │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  percentage     │   │  coins          │   │  subtotal, tax  │       │
//! │  │  fixed, custom  │   │  server amount  │   │  discounts      │       │
//! │  │  ("Buy 2 Get 1")│   └─────────────────┘   │  total          │       │
//! │  └─────────────────┘                         └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! JSON field names are camelCase to match the storefront REST backend.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::validation::{validate_price, validate_quantity};

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01%, so 1800 bps = 18% GST.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// The storefront's flat GST rate.
    pub const STANDARD: TaxRate = TaxRate(1800);

    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage, e.g. `18` or `12.5`.
    ///
    /// Returns `None` for negative or absurdly large values.
    pub fn from_percentage(pct: Decimal) -> Option<Self> {
        (pct * Decimal::ONE_HUNDRED).round().to_u32().map(TaxRate)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    pub fn percentage(&self) -> Decimal {
        Decimal::from(self.0) / Decimal::ONE_HUNDRED
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::STANDARD
    }
}

// =============================================================================
// Cart Line
// =============================================================================

/// One line of the shopper's cart, in canonical shape.
///
/// Lines come from the cart collaborator through
/// [`normalize_cart`](crate::validation::normalize_cart); the calculator
/// treats them as read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: String,
    #[ts(type = "string")]
    pub unit_price: Money,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl CartLine {
    /// Creates a validated line without variant attributes.
    ///
    /// ## Example
    /// ```rust
    /// use bazaar_core::money::Money;
    /// use bazaar_core::types::CartLine;
    ///
    /// assert!(CartLine::new("tee-01", Money::from_major(499), 2).is_ok());
    /// assert!(CartLine::new("tee-01", Money::from_major(499), 0).is_err());
    /// assert!(CartLine::new("tee-01", Money::from_major(-1), 1).is_err());
    /// ```
    pub fn new(
        product_id: impl Into<String>,
        unit_price: Money,
        quantity: u32,
    ) -> Result<Self, ValidationError> {
        validate_price("unit_price", unit_price)?;
        validate_quantity("quantity", i64::from(quantity))?;

        Ok(CartLine {
            product_id: product_id.into(),
            unit_price,
            quantity,
            size: None,
            color: None,
        })
    }

    /// Attaches size and color.
    pub fn with_variant(mut self, size: Option<String>, color: Option<String>) -> Self {
        self.size = size;
        self.color = color;
        self
    }

    /// Calculates the line total (unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price * self.quantity
    }
}

// =============================================================================
// Shipping
// =============================================================================

/// Shipping method picked on the checkout page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ShippingMethod {
    Free,
    Standard,
    Express,
}

impl std::fmt::Display for ShippingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShippingMethod::Free => write!(f, "free"),
            ShippingMethod::Standard => write!(f, "standard"),
            ShippingMethod::Express => write!(f, "express"),
        }
    }
}

impl std::str::FromStr for ShippingMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "free" => Ok(ShippingMethod::Free),
            "standard" => Ok(ShippingMethod::Standard),
            "express" => Ok(ShippingMethod::Express),
            other => Err(ValidationError::InvalidFormat {
                field: "shipping".to_string(),
                reason: format!("unknown method '{}', expected free, standard or express", other),
            }),
        }
    }
}

/// Cost of each shipping method, served by the settings endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ShippingRates {
    #[ts(type = "string")]
    pub free: Money,
    #[ts(type = "string")]
    pub standard: Money,
    #[ts(type = "string")]
    pub express: Money,
}

impl ShippingRates {
    /// Looks up the cost of `method`.
    pub fn cost(&self, method: ShippingMethod) -> Money {
        match method {
            ShippingMethod::Free => self.free,
            ShippingMethod::Standard => self.standard,
            ShippingMethod::Express => self.express,
        }
    }
}

impl Default for ShippingRates {
    /// ₹0 / ₹100 / ₹200.
    fn default() -> Self {
        ShippingRates {
            free: Money::zero(),
            standard: Money::from_major(100),
            express: Money::from_major(200),
        }
    }
}

// =============================================================================
// Discount Instruments
// =============================================================================

/// How a coupon reduces the order.
///
/// Kinds the backend adds later deserialize as `Unknown` instead of failing
/// the whole checkout; the calculator prices them at zero and logs a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CouponKind {
    Percentage,
    Fixed,
    FreeShipping,
    #[serde(other)]
    Unknown,
}

/// A validated coupon. At most one is applied at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub code: String,
    #[serde(rename = "type")]
    pub kind: CouponKind,
    /// Percent for `percentage`, rupees for `fixed`, ignored for `free_shipping`.
    #[serde(default)]
    #[ts(type = "string")]
    pub value: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(type = "string | null")]
    pub max_discount: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(type = "string | null")]
    pub min_purchase: Option<Money>,
}

/// How a promotional discount reduces the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    Percentage,
    Fixed,
    /// Driven by a free-text instruction, see [`crate::promo`].
    Custom,
    #[serde(other)]
    Unknown,
}

/// A validated promotional discount, independent of the coupon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PromotionalDiscount {
    pub code: String,
    #[serde(rename = "type")]
    pub kind: DiscountKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(type = "string | null")]
    pub value: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(type = "string | null")]
    pub max_discount: Option<Money>,
    /// e.g. "Buy 2 Get 1 Free", "15% off", "₹200 off".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instruction: Option<String>,
}

/// Loyalty coins the shopper chose to spend, with the rupee amount the coin
/// service quoted for them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CoinRedemption {
    pub coins_to_redeem: u32,
    #[ts(type = "string")]
    pub discount_amount: Money,
}

// =============================================================================
// Pricing Policy
// =============================================================================

/// Coins credited after payment when the order reaches a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CoinEarningRule {
    #[ts(type = "string")]
    pub threshold: Money,
    pub coins: u32,
}

impl Default for CoinEarningRule {
    fn default() -> Self {
        CoinEarningRule {
            threshold: Money::from_major(500),
            coins: 10,
        }
    }
}

/// Store-wide pricing settings.
///
/// Built from defaults, the settings endpoint and local configuration by the
/// host application; the calculator only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PricingPolicy {
    pub tax_rate: TaxRate,
    pub shipping_rates: ShippingRates,
    /// Orders at or above this subtotal ship free when no method is chosen.
    #[ts(type = "string")]
    pub free_shipping_threshold: Money,
    pub coin_earning: CoinEarningRule,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        PricingPolicy {
            tax_rate: TaxRate::STANDARD,
            shipping_rates: ShippingRates::default(),
            free_shipping_threshold: Money::from_major(2000),
            coin_earning: CoinEarningRule::default(),
        }
    }
}

// =============================================================================
// Collaborator DTOs
// =============================================================================

/// Response of the "validate coupon" endpoint for `(code, subtotal)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CouponValidation {
    pub valid: bool,
    #[serde(default)]
    pub coupon: Option<Coupon>,
}

/// Response of the "validate discount" endpoint for `(code, subtotal, lines)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DiscountValidation {
    pub valid: bool,
    #[serde(default)]
    pub discount: Option<PromotionalDiscount>,
}

/// The shopper's coin balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CoinBalance {
    pub balance: u32,
}

/// Rupee value the coin service assigned to `(coins, subtotal)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CoinConversion {
    #[ts(type = "string")]
    pub discount_amount: Money,
}

// =============================================================================
// Price Breakdown
// =============================================================================

/// Everything the checkout page shows below the cart.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    #[ts(type = "string")]
    pub subtotal: Money,
    #[ts(type = "string")]
    pub shipping: Money,
    #[ts(type = "string")]
    pub tax: Money,
    #[ts(type = "string")]
    pub coupon_discount: Money,
    #[ts(type = "string")]
    pub discount_discount: Money,
    #[ts(type = "string")]
    pub coin_discount: Money,
    #[ts(type = "string")]
    pub total: Money,
    /// Advisory; the backend credits coins after payment.
    pub coins_earned: u32,
}

impl PriceBreakdown {
    /// Sum of the three discount rows.
    pub fn total_discount(&self) -> Money {
        self.coupon_discount + self.discount_discount + self.coin_discount
    }

    /// Rounds every amount to paise for display or submission.
    ///
    /// Each row is rounded independently, so the rounded rows may not add
    /// up to the rounded total by a paisa; the total is authoritative.
    pub fn rounded(&self) -> PriceBreakdown {
        PriceBreakdown {
            subtotal: self.subtotal.rounded(),
            shipping: self.shipping.rounded(),
            tax: self.tax.rounded(),
            coupon_discount: self.coupon_discount.rounded(),
            discount_discount: self.discount_discount.rounded(),
            coin_discount: self.coin_discount.rounded(),
            total: self.total.rounded(),
            coins_earned: self.coins_earned,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
