//! # Error Types
//!
//! Domain-specific error types for bazaar-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  bazaar-core errors (this file)                                        │
//! │  ├── CoreError        - Checkout session failures                      │
//! │  └── ValidationError  - Malformed cart lines and inputs                │
//! │                                                                         │
//! │  bazaar-quote errors (CLI crate)                                       │
//! │  └── AppError         - Config, file and JSON failures                 │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → AppError → stderr / exit code     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The calculator itself never fails. Problems that would break pricing are
//! caught at the cart boundary (`validation`) or by the session before the
//! calculator runs.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Checkout session errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The validation collaborator rejected a coupon or discount code.
    ///
    /// ## User Workflow
    /// ```text
    /// Enter code "SAVE10"
    ///      │
    ///      ▼
    /// POST /coupons/validate → { valid: false }
    ///      │
    ///      ▼
    /// InvalidCode { instrument: "coupon", code: "SAVE10" }
    ///      │
    ///      ▼
    /// UI shows: "Invalid coupon code"
    /// ```
    #[error("Invalid {instrument} code: {code}")]
    InvalidCode { instrument: String, code: String },

    /// An order cannot be submitted without lines.
    #[error("Cart is empty")]
    EmptyCart,

    /// More coins requested than the shopper holds.
    ///
    /// The coin service quotes an amount per coin count, so a request above
    /// the balance carries an amount for coins that cannot be spent.
    #[error("Cannot redeem {requested} coins with a balance of {balance}")]
    CoinsExceedBalance { requested: u32, balance: u32 },

    /// Cart has more lines than we accept.
    #[error("Cart cannot have more than {max} lines")]
    CartTooLarge { max: usize },

    /// A cart line, code or instrument value failed validation.
    #[error("Invalid checkout input: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Field-level checkout input failures.
///
/// Raised by the cart normalizer in strict mode and by the scalar
/// validators. `field` names the offending input, e.g. `cart[2].price`.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Missing, null or blank.
    #[error("{field} is required")]
    Required { field: String },

    /// Codes longer than MAX_CODE_LENGTH.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Quantity, percentage, tax rate or cart size outside its bounds.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Zero or negative quantity.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Invalid format (e.g., a price sent as "abc").
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Result of a checkout session operation.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
