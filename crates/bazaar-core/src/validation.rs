//! # Validation Module
//!
//! Cart-boundary normalization and input validation.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Storefront UI                                                │
//! │  ├── Coin slider clamped to balance                                    │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── RawCartItem → CartLine (one canonical shape)                      │
//! │  └── Scalar checks: quantity, price, percentage, codes                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Pricing calculator                                           │
//! │  └── Assumes every line is well-formed; never fails                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Normalization Modes
//! The cart API and guest-cart storage disagree on shape: the price may sit
//! on the embedded product or on the item, and numbers sometimes arrive as
//! strings. [`normalize_cart`] resolves that once, before pricing.
//!
//! - [`NormalizationMode::Strict`] (default) rejects a malformed line with a
//!   [`ValidationError`] naming it, and the caller decides what to show.
//! - [`NormalizationMode::Lenient`] keeps partially-loaded carts renderable:
//!   a missing price becomes ₹0, a missing quantity becomes 1, and each
//!   coercion is logged as a warning.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::CartLine;
use crate::{MAX_CART_LINES, MAX_CODE_LENGTH, MAX_ITEM_QUANTITY, MAX_UNIT_PRICE};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Raw Cart Shape
// =============================================================================

/// A cart item as the cart collaborator sends it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCartItem {
    #[serde(default, alias = "_id")]
    pub product_id: Option<String>,
    #[serde(default)]
    pub product: Option<RawProduct>,
    #[serde(default)]
    pub price: Option<Value>,
    #[serde(default)]
    pub quantity: Option<Value>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

/// The product embedded in a cart item by the authenticated cart API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawProduct {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub price: Option<Value>,
}

/// How [`normalize_cart`] treats malformed lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationMode {
    #[default]
    Strict,
    Lenient,
}

impl std::fmt::Display for NormalizationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NormalizationMode::Strict => write!(f, "strict"),
            NormalizationMode::Lenient => write!(f, "lenient"),
        }
    }
}

impl FromStr for NormalizationMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(NormalizationMode::Strict),
            "lenient" => Ok(NormalizationMode::Lenient),
            other => Err(ValidationError::InvalidFormat {
                field: "normalization".to_string(),
                reason: format!("unknown mode '{}', expected strict or lenient", other),
            }),
        }
    }
}

// =============================================================================
// Cart Normalization
// =============================================================================

/// Converts raw cart items into canonical [`CartLine`]s.
///
/// ## Resolution Rules
/// ```text
/// product id : productId ─► product.id
/// price      : product.price ─► price          (number or numeric string)
/// quantity   : quantity                        (integer ≥ 1)
/// ```
///
/// ## Example
/// ```rust
/// use bazaar_core::validation::{normalize_cart, NormalizationMode, RawCartItem};
///
/// let raw: Vec<RawCartItem> = serde_json::from_value(serde_json::json!([
///     { "productId": "tee", "product": { "price": 499 }, "quantity": 2 },
///     { "productId": "cap", "price": "₹250", "quantity": "1", "size": "M" }
/// ])).unwrap();
///
/// let lines = normalize_cart(&raw, NormalizationMode::Strict).unwrap();
/// assert_eq!(lines.len(), 2);
/// assert_eq!(lines[1].size.as_deref(), Some("M"));
/// ```
pub fn normalize_cart(
    items: &[RawCartItem],
    mode: NormalizationMode,
) -> ValidationResult<Vec<CartLine>> {
    if items.len() > MAX_CART_LINES {
        return Err(ValidationError::OutOfRange {
            field: "cart".to_string(),
            min: 0,
            max: MAX_CART_LINES as i64,
        });
    }

    let mut lines = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        if let Some(line) = normalize_item(index, item, mode)? {
            lines.push(line);
        }
    }
    Ok(lines)
}

/// Normalizes one item. `Ok(None)` means lenient mode dropped it.
fn normalize_item(
    index: usize,
    item: &RawCartItem,
    mode: NormalizationMode,
) -> ValidationResult<Option<CartLine>> {
    let field = |name: &str| format!("cart[{}].{}", index, name);

    let product_id = item
        .product_id
        .as_deref()
        .or_else(|| item.product.as_ref().and_then(|p| p.id.as_deref()))
        .map(str::trim)
        .filter(|id| !id.is_empty());

    let product_id = match (product_id, mode) {
        (Some(id), _) => id.to_string(),
        (None, NormalizationMode::Strict) => {
            return Err(ValidationError::Required {
                field: field("productId"),
            })
        }
        (None, NormalizationMode::Lenient) => {
            warn!(line = index, "Cart line has no product id, using placeholder");
            format!("unknown-{}", index)
        }
    };

    let unit_price = match (resolve_price(item, &field("price")), mode) {
        (Ok(price), _) => price,
        (Err(err @ ValidationError::OutOfRange { .. }), _) => return Err(err),
        (Err(err), NormalizationMode::Strict) => return Err(err),
        (Err(err), NormalizationMode::Lenient) => {
            warn!(line = index, product_id = %product_id, error = %err, "Coercing cart line price to 0");
            Money::zero()
        }
    };

    let quantity = match (resolve_quantity(item, &field("quantity")), mode) {
        (Ok(qty), _) => qty,
        (Err(err @ ValidationError::OutOfRange { .. }), _) => return Err(err),
        (Err(err), NormalizationMode::Strict) => return Err(err),
        (Err(err @ ValidationError::MustBePositive { .. }), NormalizationMode::Lenient) => {
            warn!(line = index, product_id = %product_id, error = %err, "Dropping cart line");
            return Ok(None);
        }
        (Err(err), NormalizationMode::Lenient) => {
            warn!(line = index, product_id = %product_id, error = %err, "Coercing cart line quantity to 1");
            1
        }
    };

    let line = CartLine::new(product_id, unit_price, quantity)?;
    Ok(Some(line.with_variant(item.size.clone(), item.color.clone())))
}

fn resolve_price(item: &RawCartItem, field: &str) -> ValidationResult<Money> {
    let raw = item
        .product
        .as_ref()
        .and_then(|p| p.price.as_ref())
        .filter(|v| !v.is_null())
        .or_else(|| item.price.as_ref().filter(|v| !v.is_null()))
        .ok_or_else(|| ValidationError::Required {
            field: field.to_string(),
        })?;

    let price = Money::from_decimal(parse_decimal(raw, field)?);
    validate_price(field, price)?;
    Ok(price)
}

fn resolve_quantity(item: &RawCartItem, field: &str) -> ValidationResult<u32> {
    let raw = item
        .quantity
        .as_ref()
        .filter(|v| !v.is_null())
        .ok_or_else(|| ValidationError::Required {
            field: field.to_string(),
        })?;

    let qty = parse_decimal(raw, field)?;
    if !qty.fract().is_zero() {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be a whole number".to_string(),
        });
    }

    let qty = qty.to_i64().ok_or_else(|| ValidationError::OutOfRange {
        field: field.to_string(),
        min: 1,
        max: i64::from(MAX_ITEM_QUANTITY),
    })?;
    validate_quantity(field, qty)?;

    // validate_quantity bounds qty to 1..=MAX_ITEM_QUANTITY
    u32::try_from(qty).map_err(|_| ValidationError::OutOfRange {
        field: field.to_string(),
        min: 1,
        max: i64::from(MAX_ITEM_QUANTITY),
    })
}

/// Parses a JSON number or a numeric string such as `"₹1,299.50"`.
fn parse_decimal(value: &Value, field: &str) -> ValidationResult<Decimal> {
    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: reason.to_string(),
    };

    match value {
        Value::Number(n) => {
            let text = n.to_string();
            Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .map_err(|_| invalid("number out of range"))
        }
        Value::String(s) => {
            let cleaned: String = s
                .trim()
                .trim_start_matches('₹')
                .chars()
                .filter(|c| *c != ',')
                .collect();
            let cleaned = cleaned.trim();
            if cleaned.is_empty() {
                return Err(ValidationError::Required {
                    field: field.to_string(),
                });
            }
            Decimal::from_str(cleaned).map_err(|_| invalid("not a number"))
        }
        _ => Err(invalid("expected a number")),
    }
}

// =============================================================================
// Scalar Validators
// =============================================================================

/// Validates a quantity value.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(field: &str, qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    if qty > i64::from(MAX_ITEM_QUANTITY) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 1,
            max: i64::from(MAX_ITEM_QUANTITY),
        });
    }

    Ok(())
}

/// Validates a price.
///
/// ## Rules
/// - Zero is allowed (free gifts)
/// - Must not be negative
/// - Must not exceed MAX_UNIT_PRICE (₹1 crore)
pub fn validate_price(field: &str, price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    if price > Money::from_major(MAX_UNIT_PRICE) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_UNIT_PRICE,
        });
    }

    Ok(())
}

/// Validates a percentage in `0..=100`.
pub fn validate_percentage(field: &str, percent: Decimal) -> ValidationResult<()> {
    if percent < Decimal::ZERO || percent > Decimal::ONE_HUNDRED {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: 100,
        });
    }
    Ok(())
}

/// Validates a coupon or discount code.
///
/// ## Rules
/// - Must not be empty
/// - At most MAX_CODE_LENGTH (32) characters
/// - Letters, numbers, hyphens and underscores only
///
/// ## Example
/// ```rust
/// use bazaar_core::validation::validate_code;
///
/// assert!(validate_code("coupon", "DIWALI-25").is_ok());
/// assert!(validate_code("coupon", "").is_err());
/// assert!(validate_code("coupon", "50% OFF").is_err());
/// ```
pub fn validate_code(field: &str, code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if code.chars().count() > MAX_CODE_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_CODE_LENGTH,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a tax rate in basis points (0% to 100%).
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10_000 {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: 0,
            max: 10_000,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
