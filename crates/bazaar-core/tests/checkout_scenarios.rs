//! End-to-end checkout scenarios: raw cart JSON in, breakdown out.

use bazaar_core::validation::{normalize_cart, NormalizationMode, RawCartItem};
use bazaar_core::{
    CheckoutSession, CoinBalance, CoinConversion, Coupon, CouponKind, CouponValidation,
    DiscountKind, DiscountValidation, Money, PricingPolicy, PromotionalDiscount, ShippingMethod,
};
use rust_decimal::Decimal;
use serde_json::json;

fn session_from(cart: serde_json::Value) -> CheckoutSession {
    let raw: Vec<RawCartItem> = serde_json::from_value(cart).unwrap();
    let lines = normalize_cart(&raw, NormalizationMode::Strict).unwrap();

    let mut session = CheckoutSession::new(PricingPolicy::default());
    session.load_cart(lines).unwrap();
    session
}

fn coupon_validation(value: serde_json::Value) -> CouponValidation {
    serde_json::from_value(value).unwrap()
}

#[test]
fn percentage_coupon_capped_with_standard_shipping() {
    let mut session = session_from(json!([
        { "productId": "kurta", "product": { "price": 900 }, "quantity": 2 }
    ]));
    session.select_shipping(Some(ShippingMethod::Standard));
    session
        .apply_coupon_validation(coupon_validation(json!({
            "valid": true,
            "coupon": { "code": "SAVE10", "type": "percentage", "value": 10, "maxDiscount": 150 }
        })))
        .unwrap();

    let breakdown = session.quote();
    assert_eq!(breakdown.subtotal, Money::from_major(1800));
    assert_eq!(breakdown.shipping, Money::from_major(100));
    assert_eq!(breakdown.tax, Money::from_major(324));
    assert_eq!(breakdown.coupon_discount, Money::from_major(150));
    assert_eq!(breakdown.total, Money::from_major(2074));
}

#[test]
fn free_shipping_above_threshold_when_unselected() {
    let session = session_from(json!([
        { "_id": "saree", "price": "₹2,500", "quantity": 1 }
    ]));

    let breakdown = session.quote();
    assert_eq!(breakdown.shipping, Money::zero());
    assert_eq!(breakdown.tax, Money::from_major(450));
    assert_eq!(breakdown.total, Money::from_major(2950));
    assert_eq!(breakdown.coins_earned, 10);
}

#[test]
fn coins_use_server_quoted_amount() {
    let mut session = session_from(json!([
        { "productId": "lamp", "product": { "price": 1000 }, "quantity": 1 }
    ]));
    session.set_coin_balance(CoinBalance { balance: 200 });
    let coins = session.redeemable_coins(150);
    session
        .redeem_coins(
            coins,
            serde_json::from_value::<CoinConversion>(json!({ "discountAmount": 75 })).unwrap(),
        )
        .unwrap();

    let breakdown = session.quote();
    assert_eq!(breakdown.coin_discount, Money::from_major(75));
    // 1000 + 100 + 180 - 75
    assert_eq!(breakdown.total, Money::from_major(1205));
    assert_eq!(session.submit().unwrap().coins_redeemed, 150);
}

#[test]
fn lower_balance_drops_quoted_coins() {
    let mut session = session_from(json!([
        { "productId": "lamp", "product": { "price": 1000 }, "quantity": 1 }
    ]));
    session.set_coin_balance(CoinBalance { balance: 200 });
    session
        .redeem_coins(
            150,
            CoinConversion {
                discount_amount: Money::from_major(75),
            },
        )
        .unwrap();

    session.set_coin_balance(CoinBalance { balance: 0 });
    let submission = session.submit().unwrap();
    assert_eq!(submission.coins_redeemed, 0);
    assert_eq!(submission.breakdown.coin_discount, Money::zero());
    assert_eq!(submission.breakdown.total, Money::from_major(1280));
}

#[test]
fn oversized_price_rejected_before_pricing() {
    let raw: Vec<RawCartItem> = serde_json::from_value(json!([
        { "productId": "vault", "price": "10000000000000000000000000000", "quantity": 999 }
    ]))
    .unwrap();

    assert!(normalize_cart(&raw, NormalizationMode::Strict).is_err());
    assert!(normalize_cart(&raw, NormalizationMode::Lenient).is_err());
}

#[test]
fn buy_two_get_one_free_promotion() {
    let mut session = session_from(json!([
        { "productId": "sock", "product": { "price": 100 }, "quantity": 3 }
    ]));
    session
        .apply_discount_validation(DiscountValidation {
            valid: true,
            discount: Some(PromotionalDiscount {
                code: "B2G1".to_string(),
                kind: DiscountKind::Custom,
                value: None,
                max_discount: None,
                instruction: Some("Buy 2 Get 1 Free".to_string()),
            }),
        })
        .unwrap();
    assert_eq!(session.quote().discount_discount, Money::from_major(100));

    let lines = session.lines().to_vec();
    let mut shorter = lines[0].clone();
    shorter.quantity = 2;
    session.load_cart(vec![shorter]).unwrap();
    assert_eq!(session.quote().discount_discount, Money::zero());
}

#[test]
fn coupon_and_discount_stack() {
    let mut session = session_from(json!([
        { "productId": "jacket", "product": { "price": 2000 }, "quantity": 1 }
    ]));
    session.select_shipping(Some(ShippingMethod::Standard));
    session
        .apply_coupon_validation(CouponValidation {
            valid: true,
            coupon: Some(Coupon {
                code: "FLAT200".to_string(),
                kind: CouponKind::Fixed,
                value: Decimal::from(200),
                max_discount: None,
                min_purchase: None,
            }),
        })
        .unwrap();
    session
        .apply_discount_validation(DiscountValidation {
            valid: true,
            discount: Some(PromotionalDiscount {
                code: "FEST5".to_string(),
                kind: DiscountKind::Percentage,
                value: Some(Decimal::from(5)),
                max_discount: None,
                instruction: None,
            }),
        })
        .unwrap();

    let breakdown = session.quote();
    assert_eq!(breakdown.coupon_discount, Money::from_major(200));
    assert_eq!(breakdown.discount_discount, Money::from_major(100));
    assert_eq!(breakdown.total_discount(), Money::from_major(300));
    // 2000 + 100 + 360 - 300
    assert_eq!(breakdown.total, Money::from_major(2160));
}

#[test]
fn total_never_negative() {
    let mut session = session_from(json!([
        { "productId": "pin", "product": { "price": 50 }, "quantity": 1 }
    ]));
    session.select_shipping(Some(ShippingMethod::Free));
    session
        .apply_coupon_validation(coupon_validation(json!({
            "valid": true,
            "coupon": { "code": "BIG", "type": "fixed", "value": 5000 }
        })))
        .unwrap();
    session.set_coin_balance(CoinBalance { balance: 1000 });
    session
        .redeem_coins(
            1000,
            CoinConversion {
                discount_amount: Money::from_major(500),
            },
        )
        .unwrap();

    let breakdown = session.quote();
    assert_eq!(breakdown.coupon_discount, Money::from_major(50));
    assert_eq!(breakdown.total, Money::zero());
    assert_eq!(breakdown.coins_earned, 0);
}

#[test]
fn free_shipping_coupon_matches_shipping() {
    let mut session = session_from(json!([
        { "productId": "mug", "product": { "price": 300 }, "quantity": 1 }
    ]));
    session.select_shipping(Some(ShippingMethod::Express));
    session
        .apply_coupon_validation(coupon_validation(json!({
            "valid": true,
            "coupon": { "code": "SHIPFREE", "type": "free_shipping" }
        })))
        .unwrap();

    let breakdown = session.quote();
    assert_eq!(breakdown.coupon_discount, breakdown.shipping);
    assert_eq!(breakdown.total, breakdown.subtotal + breakdown.tax);
}

#[test]
fn quoting_is_idempotent() {
    let mut session = session_from(json!([
        { "productId": "a", "price": 333.33, "quantity": 3 },
        { "productId": "b", "price": "19.99", "quantity": 1 }
    ]));
    session
        .apply_coupon_validation(coupon_validation(json!({
            "valid": true,
            "coupon": { "code": "SAVE7", "type": "percentage", "value": "7.5" }
        })))
        .unwrap();

    let first = session.quote();
    let second = session.quote();
    assert_eq!(first, second);
    assert_eq!(first.rounded(), second.rounded());
}

#[test]
fn lenient_mode_keeps_partial_cart_renderable() {
    let raw: Vec<RawCartItem> = serde_json::from_value(json!([
        { "productId": "ok", "price": 100, "quantity": 1 },
        { "productId": "no-price", "quantity": 2 },
        { "productId": "zero", "price": 50, "quantity": 0 }
    ]))
    .unwrap();

    assert!(normalize_cart(&raw, NormalizationMode::Strict).is_err());

    let lines = normalize_cart(&raw, NormalizationMode::Lenient).unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[1].unit_price, Money::zero());

    let mut session = CheckoutSession::default();
    session.load_cart(lines).unwrap();
    assert_eq!(session.quote().subtotal, Money::from_major(100));
}
