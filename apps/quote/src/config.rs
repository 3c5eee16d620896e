//! # Checkout Configuration
//!
//! Store pricing settings and display preferences for `bazaar-quote`.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     BAZAAR_TAX_RATE=18                                                 │
//! │     BAZAAR_NORMALIZATION=lenient                                       │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     --config <path>, or                                                │
//! │     ~/.config/bazaar/checkout.toml (Linux)                             │
//! │     ~/Library/Application Support/com.bazaar.bazaar/checkout.toml      │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     18% tax, ₹2000 free shipping, ₹100 / ₹200 shipping                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # checkout.toml
//! [pricing]
//! tax_rate = 18                   # percent
//! free_shipping_threshold = 2000
//!
//! [shipping]
//! standard = 100
//! express = 200
//!
//! [coins]
//! earn_threshold = 500
//! earn_coins = 10
//!
//! [cart]
//! normalization = "strict"        # strict | lenient
//!
//! [display]
//! currency_symbol = "₹"
//! currency_decimals = 2
//! ```

use std::path::{Path, PathBuf};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use bazaar_core::validation::{validate_price, validate_tax_rate_bps, NormalizationMode};
use bazaar_core::{CoinEarningRule, Money, PricingPolicy, ShippingRates, TaxRate};

use crate::error::{AppError, AppResult};

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingSettings {
    /// Tax rate as a percentage, e.g. `18` or `12.5`.
    pub tax_rate: Decimal,
    pub free_shipping_threshold: Money,
}

impl Default for PricingSettings {
    fn default() -> Self {
        let policy = PricingPolicy::default();
        PricingSettings {
            tax_rate: policy.tax_rate.percentage(),
            free_shipping_threshold: policy.free_shipping_threshold,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShippingSettings {
    pub standard: Money,
    pub express: Money,
}

impl Default for ShippingSettings {
    fn default() -> Self {
        let rates = ShippingRates::default();
        ShippingSettings {
            standard: rates.standard,
            express: rates.express,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoinSettings {
    /// Orders at or above this total earn `earn_coins`.
    pub earn_threshold: Money,
    pub earn_coins: u32,
}

impl Default for CoinSettings {
    fn default() -> Self {
        let rule = CoinEarningRule::default();
        CoinSettings {
            earn_threshold: rule.threshold,
            earn_coins: rule.coins,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CartSettings {
    pub normalization: NormalizationMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub currency_symbol: String,
    /// Decimal places shown (2 for INR).
    pub currency_decimals: u8,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        DisplaySettings {
            currency_symbol: "₹".to_string(),
            currency_decimals: 2,
        }
    }
}

// =============================================================================
// Quote Configuration
// =============================================================================

/// Complete configuration for the quote CLI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteConfig {
    pub pricing: PricingSettings,
    pub shipping: ShippingSettings,
    pub coins: CoinSettings,
    pub cart: CartSettings,
    pub display: DisplaySettings,
}

impl QuoteConfig {
    /// Loads configuration from file and environment.
    ///
    /// ## Loading Order
    /// 1. Start with defaults
    /// 2. Load from TOML file (`config_path`, else the platform config dir)
    /// 3. Override with BAZAAR_* environment variables
    /// 4. Validate
    ///
    /// An explicit `config_path` must exist; the platform default may not.
    pub fn load(config_path: Option<PathBuf>) -> AppResult<Self> {
        let mut config = match config_path {
            Some(path) => {
                if !path.exists() {
                    return Err(AppError::ConfigLoadFailed(format!(
                        "{} does not exist",
                        path.display()
                    )));
                }
                Self::from_file(&path)?
            }
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                Some(path) => {
                    debug!(?path, "Config file not found, using defaults");
                    Self::default()
                }
                None => Self::default(),
            },
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    fn from_file(path: &Path) -> AppResult<Self> {
        info!(?path, "Loading checkout config from file");
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> AppResult<()> {
        let tax_rate = self.tax_rate()?;
        validate_tax_rate_bps(tax_rate.bps())?;

        validate_price("pricing.free_shipping_threshold", self.pricing.free_shipping_threshold)?;
        validate_price("shipping.standard", self.shipping.standard)?;
        validate_price("shipping.express", self.shipping.express)?;
        validate_price("coins.earn_threshold", self.coins.earn_threshold)?;

        if self.display.currency_decimals > 4 {
            return Err(AppError::InvalidConfig(
                "display.currency_decimals must be at most 4".into(),
            ));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from `lookup`. Unparseable values are ignored with a
    /// warning.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup("BAZAAR_TAX_RATE") {
            match value.trim().parse::<Decimal>() {
                Ok(rate) => {
                    debug!(%rate, "Overriding tax rate from environment");
                    self.pricing.tax_rate = rate;
                }
                Err(_) => warn!(value = %value, "Ignoring invalid BAZAAR_TAX_RATE"),
            }
        }

        if let Some(amount) = parse_money_override(&lookup, "BAZAAR_FREE_SHIPPING_THRESHOLD") {
            self.pricing.free_shipping_threshold = amount;
        }

        if let Some(amount) = parse_money_override(&lookup, "BAZAAR_SHIPPING_STANDARD") {
            self.shipping.standard = amount;
        }

        if let Some(amount) = parse_money_override(&lookup, "BAZAAR_SHIPPING_EXPRESS") {
            self.shipping.express = amount;
        }

        if let Some(value) = lookup("BAZAAR_NORMALIZATION") {
            match value.parse::<NormalizationMode>() {
                Ok(mode) => {
                    debug!(%mode, "Overriding normalization mode from environment");
                    self.cart.normalization = mode;
                }
                Err(err) => warn!(error = %err, "Ignoring invalid BAZAAR_NORMALIZATION"),
            }
        }

        if let Some(symbol) = lookup("BAZAAR_CURRENCY_SYMBOL") {
            self.display.currency_symbol = symbol;
        }
    }

    /// `checkout.toml` in the platform config directory.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "bazaar", "bazaar")
            .map(|dirs| dirs.config_dir().join("checkout.toml"))
    }

    // =========================================================================
    // Conversions
    // =========================================================================

    fn tax_rate(&self) -> AppResult<TaxRate> {
        TaxRate::from_percentage(self.pricing.tax_rate).ok_or_else(|| {
            AppError::InvalidConfig(format!(
                "pricing.tax_rate must be between 0 and 100, got {}",
                self.pricing.tax_rate
            ))
        })
    }

    /// Builds the core pricing policy.
    pub fn to_policy(&self) -> AppResult<PricingPolicy> {
        Ok(PricingPolicy {
            tax_rate: self.tax_rate()?,
            shipping_rates: ShippingRates {
                free: Money::zero(),
                standard: self.shipping.standard,
                express: self.shipping.express,
            },
            free_shipping_threshold: self.pricing.free_shipping_threshold,
            coin_earning: CoinEarningRule {
                threshold: self.coins.earn_threshold,
                coins: self.coins.earn_coins,
            },
        })
    }

    /// Formats an amount for display, rounding half away from zero.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let config = QuoteConfig::default();
    /// assert_eq!(config.format_currency(Money::from_minor(207_400)), "₹2074.00");
    /// ```
    pub fn format_currency(&self, amount: Money) -> String {
        let decimals = u32::from(self.display.currency_decimals);
        let mut value = amount
            .amount()
            .round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
        value.rescale(decimals);

        format!(
            "{}{}{}",
            if value.is_sign_negative() && !value.is_zero() { "-" } else { "" },
            self.display.currency_symbol,
            value.abs()
        )
    }
}

fn parse_money_override(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<Money> {
    let value = lookup(key)?;
    match value.trim().parse::<Decimal>() {
        Ok(amount) => {
            debug!(key, %amount, "Overriding amount from environment");
            Some(Money::from_decimal(amount))
        }
        Err(_) => {
            warn!(key, value = %value, "Ignoring invalid amount override");
            None
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use std::str::FromStr;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_default_config() {
        let config = QuoteConfig::default();
        assert!(config.validate().is_ok());

        let policy = config.to_policy().unwrap();
        assert_eq!(policy, PricingPolicy::default());
        assert_eq!(config.cart.normalization, NormalizationMode::Strict);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[pricing]
tax_rate = 12.5
free_shipping_threshold = 1500

[shipping]
express = "250.50"

[cart]
normalization = "lenient"
"#
        )
        .unwrap();

        let config = QuoteConfig::load(Some(file.path().to_path_buf())).unwrap();
        let policy = config.to_policy().unwrap();

        assert_eq!(policy.tax_rate.bps(), 1250);
        assert_eq!(policy.free_shipping_threshold, Money::from_major(1500));
        assert_eq!(policy.shipping_rates.standard, Money::from_major(100));
        assert_eq!(policy.shipping_rates.express, Money::from_minor(25_050));
        assert_eq!(config.cart.normalization, NormalizationMode::Lenient);
        assert_eq!(config.display.currency_symbol, "₹");
    }

    #[test]
    fn test_missing_explicit_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = QuoteConfig::load(Some(dir.path().join("absent.toml")));
        assert!(matches!(result, Err(AppError::ConfigLoadFailed(_))));
    }

    #[test]
    fn test_malformed_file_fails() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[pricing\ntax_rate = ").unwrap();

        let result = QuoteConfig::load(Some(file.path().to_path_buf()));
        assert!(matches!(result, Err(AppError::ConfigLoadFailed(_))));
    }

    #[test]
    fn test_overrides() {
        let vars = env(&[
            ("BAZAAR_TAX_RATE", "5"),
            ("BAZAAR_FREE_SHIPPING_THRESHOLD", "999"),
            ("BAZAAR_SHIPPING_STANDARD", "49"),
            ("BAZAAR_SHIPPING_EXPRESS", "not-a-number"),
            ("BAZAAR_NORMALIZATION", "LENIENT"),
            ("BAZAAR_CURRENCY_SYMBOL", "Rs "),
        ]);

        let mut config = QuoteConfig::default();
        config.apply_overrides(|key| vars.get(key).cloned());

        assert_eq!(config.pricing.tax_rate, Decimal::from(5));
        assert_eq!(config.pricing.free_shipping_threshold, Money::from_major(999));
        assert_eq!(config.shipping.standard, Money::from_major(49));
        assert_eq!(config.shipping.express, Money::from_major(200));
        assert_eq!(config.cart.normalization, NormalizationMode::Lenient);
        assert_eq!(config.display.currency_symbol, "Rs ");
    }

    #[test]
    fn test_validation() {
        let mut config = QuoteConfig::default();

        config.pricing.tax_rate = Decimal::from(101);
        assert!(config.validate().is_err());

        config.pricing.tax_rate = Decimal::from(-5);
        assert!(matches!(config.validate(), Err(AppError::InvalidConfig(_))));

        config.pricing.tax_rate = Decimal::from(18);
        config.shipping.standard = Money::from_major(-1);
        assert!(matches!(config.validate(), Err(AppError::Checkout(_))));

        config.shipping.standard = Money::from_major(100);
        config.display.currency_decimals = 6;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_format_currency() {
        let config = QuoteConfig::default();
        assert_eq!(config.format_currency(Money::from_minor(207_400)), "₹2074.00");
        assert_eq!(config.format_currency(Money::from_minor(1)), "₹0.01");
        assert_eq!(config.format_currency(Money::zero()), "₹0.00");
        assert_eq!(config.format_currency(Money::from_minor(-550)), "-₹5.50");

        let tax = Money::from_decimal(Decimal::from_str("1.795").unwrap());
        assert_eq!(config.format_currency(tax), "₹1.80");
    }

    #[test]
    fn test_toml_round_trip() {
        let config = QuoteConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[pricing]"));
        assert!(toml_str.contains("[display]"));

        let parsed: QuoteConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }
}
