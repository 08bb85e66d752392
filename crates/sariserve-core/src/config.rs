//! # Commerce Configuration
//!
//! The storefront's pricing and inventory thresholds as one overridable
//! document.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     SARISERVE_FREE_DELIVERY_THRESHOLD=15000                            │
//! │     SARISERVE_BASE_DELIVERY_FEE=2500                                   │
//! │     SARISERVE_LOW_STOCK_PERCENT=25                                     │
//! │     SARISERVE_MEDIUM_STOCK_PERCENT=50                                  │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/sariserve/commerce.toml (Linux)                          │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     ₱100 free delivery, ₱20 fee, 30% / 60% stock bands                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! Money values are centavos.
//! ```toml
//! [delivery]
//! free_threshold = 10000
//! base_fee = 2000
//!
//! [stock]
//! low_percent = 30
//! medium_percent = 60
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::stock::StockThresholds;
use crate::{BASE_DELIVERY_FEE, FREE_DELIVERY_THRESHOLD};

// =============================================================================
// Delivery Pricing
// =============================================================================

/// Threshold-based delivery fee.
///
/// ```rust
/// use sariserve_core::{DeliveryPricing, Money};
///
/// let pricing = DeliveryPricing::default();
/// assert_eq!(pricing.fee_for(Money::from_major(99)), Money::from_major(20));
/// assert_eq!(pricing.fee_for(Money::from_major(100)), Money::zero());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DeliveryPricing {
    /// Subtotal at or above which delivery is free.
    #[serde(default = "default_free_threshold")]
    pub free_threshold: Money,

    /// Fee charged below the threshold.
    #[serde(default = "default_base_fee")]
    pub base_fee: Money,
}

fn default_free_threshold() -> Money {
    FREE_DELIVERY_THRESHOLD
}

fn default_base_fee() -> Money {
    BASE_DELIVERY_FEE
}

impl Default for DeliveryPricing {
    fn default() -> Self {
        DeliveryPricing {
            free_threshold: FREE_DELIVERY_THRESHOLD,
            base_fee: BASE_DELIVERY_FEE,
        }
    }
}

impl DeliveryPricing {
    /// Delivery fee for a given subtotal.
    pub fn fee_for(&self, subtotal: Money) -> Money {
        if subtotal >= self.free_threshold {
            Money::zero()
        } else {
            self.base_fee
        }
    }

    /// How much more the customer must add to reach free delivery.
    pub fn remaining_for_free(&self, subtotal: Money) -> Money {
        (self.free_threshold - subtotal).floor_at_zero()
    }

    fn validate(&self) -> CoreResult<()> {
        if self.free_threshold.is_negative() || self.base_fee.is_negative() {
            return Err(CoreError::InvalidConfig(
                "delivery amounts must not be negative".into(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Commerce Configuration
// =============================================================================

/// Complete commerce configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommerceConfig {
    #[serde(default)]
    pub delivery: DeliveryPricing,

    #[serde(default)]
    pub stock: StockThresholds,
}

impl CommerceConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`commerce.toml`), if present
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> CoreResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading commerce config from file");
                config = Self::read_file(&path)?;
            } else {
                debug!(?path, "Commerce config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns defaults if loading fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load commerce config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Parses a TOML document; missing keys take their defaults.
    pub fn from_toml_str(contents: &str) -> CoreResult<Self> {
        let config: CommerceConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn read_file(path: &Path) -> CoreResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> CoreResult<()> {
        self.delivery.validate()?;
        self.stock.validate()
    }

    /// Applies `SARISERVE_*` overrides from a key lookup.
    ///
    /// Unparseable values are ignored with a warning.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(cents) = parse_override::<i64>(&lookup, "SARISERVE_FREE_DELIVERY_THRESHOLD") {
            debug!(cents, "Overriding free delivery threshold from environment");
            self.delivery.free_threshold = Money::from_cents(cents);
        }

        if let Some(cents) = parse_override::<i64>(&lookup, "SARISERVE_BASE_DELIVERY_FEE") {
            debug!(cents, "Overriding base delivery fee from environment");
            self.delivery.base_fee = Money::from_cents(cents);
        }

        if let Some(pct) = parse_override::<u32>(&lookup, "SARISERVE_LOW_STOCK_PERCENT") {
            self.stock.low_percent = pct;
        }

        if let Some(pct) = parse_override::<u32>(&lookup, "SARISERVE_MEDIUM_STOCK_PERCENT") {
            self.stock.medium_percent = pct;
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("ph", "sariserve", "sariserve")
            .map(|dirs| dirs.config_dir().join("commerce.toml"))
    }
}

fn parse_override<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "Ignoring unparseable config override");
            None
        }
    }
}
