//! # Checkout Request
//!
//! The JSON document `bazaar-quote` prices. It bundles what the storefront
//! collects from its collaborators before pricing:
//!
//! ```json
//! {
//!   "cart": [{ "productId": "kurta", "product": { "price": 900 }, "quantity": 2 }],
//!   "shipping": "standard",
//!   "coupon": { "valid": true, "coupon": { "code": "SAVE10", "type": "percentage", "value": 10 } },
//!   "discount": null,
//!   "coinBalance": 200,
//!   "coins": { "coinsToRedeem": 150, "discountAmount": "75" }
//! }
//! ```

use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use bazaar_core::validation::{normalize_cart, NormalizationMode, RawCartItem};
use bazaar_core::{
    CheckoutSession, CoinBalance, CoinConversion, CoinRedemption, CouponValidation,
    DiscountValidation, PricingPolicy, ShippingMethod,
};

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[serde(default)]
    pub cart: Vec<RawCartItem>,
    #[serde(default)]
    pub shipping: Option<ShippingMethod>,
    #[serde(default)]
    pub coupon: Option<CouponValidation>,
    #[serde(default)]
    pub discount: Option<DiscountValidation>,
    #[serde(default)]
    pub coin_balance: Option<u32>,
    /// Coins the shopper asked for, with the amount the coin service quoted.
    #[serde(default)]
    pub coins: Option<CoinRedemption>,
}

impl CheckoutRequest {
    /// Reads a request from `path`, or from stdin when `path` is `-`.
    pub fn read(path: &Path) -> AppResult<Self> {
        let contents = if path == Path::new("-") {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        } else {
            std::fs::read_to_string(path)?
        };
        Self::parse(&contents)
    }

    pub fn parse(json: &str) -> AppResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Normalizes the cart and replays every input onto a fresh session.
    ///
    /// Rejected coupon or discount validations fail the whole request, as
    /// do coins without a balance or above it.
    pub fn into_session(
        self,
        policy: PricingPolicy,
        mode: NormalizationMode,
    ) -> AppResult<CheckoutSession> {
        let lines = normalize_cart(&self.cart, mode)?;
        debug!(raw = self.cart.len(), lines = lines.len(), %mode, "Cart normalized");

        let mut session = CheckoutSession::new(policy);
        session.load_cart(lines)?;
        session.select_shipping(self.shipping);

        if let Some(coupon) = self.coupon {
            session.apply_coupon_validation(coupon)?;
        }
        if let Some(discount) = self.discount {
            session.apply_discount_validation(discount)?;
        }

        match (self.coin_balance, self.coins) {
            (None, Some(_)) => {
                return Err(AppError::InvalidRequest(
                    "coins requires coinBalance".to_string(),
                ));
            }
            (balance, coins) => {
                if let Some(balance) = balance {
                    session.set_coin_balance(CoinBalance { balance });
                }
                if let Some(coins) = coins {
                    session.redeem_coins(
                        coins.coins_to_redeem,
                        CoinConversion {
                            discount_amount: coins.discount_amount,
                        },
                    )?;
                }
            }
        }

        Ok(session)
    }
}
