//! # bazaar-core: Pure Checkout Pricing for the Bazaar Storefront
//!
//! This crate turns a cart, a shipping choice and the discount instruments a
//! shopper applied into the numbers shown on the checkout page. It contains
//! no I/O: coupon codes, promotional discounts and coin rates are validated by
//! the REST backend, and only their resolved results reach this crate.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Bazaar Checkout Architecture                       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Storefront UI (checkout pages)                 │   │
//! │  │   Cart ──► Shipping ──► Coupon / Discount / Coins ──► Pay      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ every input change                     │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ bazaar-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────────────┐  │   │
//! │  │   │validation│ │ session  │ │ pricing  │ │      promo       │  │   │
//! │  │   │ RawCart  │►│ Checkout │►│ Calcul-  │◄│ "Buy 2 Get 1     │  │   │
//! │  │   │ → Lines  │ │ Session  │ │ ator     │ │  Free", "10% off"│  │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • PURE FUNCTIONS                          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ OrderSubmission                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              Order-creation API (external collaborator)         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Cart lines, shipping, discount instruments, policy, DTOs
//! - [`money`] - Money type with exact decimal arithmetic
//! - [`error`] - Domain error types
//! - [`validation`] - Cart-boundary normalization and input checks
//! - [`promo`] - Promotional instruction parsing
//! - [`pricing`] - The order pricing calculator
//! - [`session`] - Caller-owned checkout state
//!
//! ## Example Usage
//!
//! ```rust
//! use bazaar_core::money::Money;
//! use bazaar_core::pricing::{OrderPricingCalculator, PricingInput};
//! use bazaar_core::types::{CartLine, PricingPolicy, ShippingMethod};
//!
//! let lines = vec![CartLine::new("tee-01", Money::from_major(900), 2).unwrap()];
//! let calculator = OrderPricingCalculator::new(PricingPolicy::default());
//!
//! let breakdown = calculator.price(&PricingInput {
//!     lines: &lines,
//!     shipping: Some(ShippingMethod::Standard),
//!     coupon: None,
//!     discount: None,
//!     coins: None,
//! });
//!
//! // 1800 + 100 shipping + 18% tax on 1800
//! assert_eq!(breakdown.total, Money::from_major(2224));
//! ```

pub mod error;
pub mod money;
pub mod pricing;
pub mod promo;
pub mod session;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use pricing::{OrderPricingCalculator, PricingInput};
pub use session::{CheckoutSession, OrderSubmission};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines accepted from the cart collaborator.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity of a single line.
///
/// ## Business Reason
/// Guards the free-unit expansion in "buy N get M free" promotions against
/// absurd quantities coming from guest-cart storage.
pub const MAX_ITEM_QUANTITY: u32 = 999;

/// Maximum unit price in whole rupees (₹1 crore).
///
/// Keeps every subtotal, tax and discount product well inside the range of
/// exact decimal arithmetic.
pub const MAX_UNIT_PRICE: i64 = 10_000_000;

/// Maximum length of a coupon or discount code.
pub const MAX_CODE_LENGTH: usize = 32;
