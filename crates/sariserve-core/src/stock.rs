//! # Stock Classification
//!
//! Maps a catalog item's stock numbers to the badge the inventory page shows.
//!
//! ## Rule (evaluated top to bottom)
//! ```text
//! stock_count < min_stock            ──► CRITICAL  (always, whatever the %)
//! stock_count / max_stock < 30%      ──► LOW
//! stock_count / max_stock < 60%      ──► MEDIUM
//! otherwise                          ──► GOOD
//! ```
//!
//! The percentage is compared by cross-multiplying
//! (`stock * 100 < low * max`) so there is no float rounding at the boundary.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::catalog::CatalogItem;
use crate::error::{CoreError, CoreResult};
use crate::{LOW_STOCK_PERCENT, MEDIUM_STOCK_PERCENT};

/// Qualitative stock health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum StockLevel {
    Critical,
    Low,
    Medium,
    Good,
}

impl StockLevel {
    /// True for the levels the dashboard raises a restock alert for.
    pub fn needs_restock(&self) -> bool {
        matches!(self, StockLevel::Critical | StockLevel::Low)
    }
}

/// Percentage cut-offs between LOW, MEDIUM and GOOD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockThresholds {
    /// Below this percentage of `max_stock` is LOW.
    #[serde(default = "default_low_percent")]
    pub low_percent: u32,

    /// Below this percentage of `max_stock` is MEDIUM.
    #[serde(default = "default_medium_percent")]
    pub medium_percent: u32,
}

fn default_low_percent() -> u32 {
    LOW_STOCK_PERCENT
}

fn default_medium_percent() -> u32 {
    MEDIUM_STOCK_PERCENT
}

impl Default for StockThresholds {
    fn default() -> Self {
        StockThresholds {
            low_percent: LOW_STOCK_PERCENT,
            medium_percent: MEDIUM_STOCK_PERCENT,
        }
    }
}

impl StockThresholds {
    /// Requires `0 < low < medium <= 100`.
    pub fn validate(&self) -> CoreResult<()> {
        if self.low_percent == 0 || self.low_percent >= self.medium_percent {
            return Err(CoreError::InvalidConfig(format!(
                "low_percent ({}) must be above 0 and below medium_percent ({})",
                self.low_percent, self.medium_percent
            )));
        }

        if self.medium_percent > 100 {
            return Err(CoreError::InvalidConfig(format!(
                "medium_percent ({}) must be at most 100",
                self.medium_percent
            )));
        }

        Ok(())
    }

    /// Classifies an item with these thresholds.
    ///
    /// ```rust
    /// use sariserve_core::{CatalogItem, Money, StockLevel, StockThresholds};
    ///
    /// // 8/50 is 16%, but 8 is under the minimum of 10.
    /// let beef = CatalogItem::new("4", "Corned Beef", Money::from_major(45), "Canned Goods", 8, 10, 50)?;
    /// assert_eq!(StockThresholds::default().classify(&beef), StockLevel::Critical);
    /// # Ok::<(), sariserve_core::CoreError>(())
    /// ```
    pub fn classify(&self, item: &CatalogItem) -> StockLevel {
        if item.stock_count() < item.min_stock() {
            return StockLevel::Critical;
        }

        let scaled_stock = u64::from(item.stock_count()) * 100;
        let max = u64::from(item.max_stock());

        if scaled_stock < u64::from(self.low_percent) * max {
            StockLevel::Low
        } else if scaled_stock < u64::from(self.medium_percent) * max {
            StockLevel::Medium
        } else {
            StockLevel::Good
        }
    }
}

/// Classifies an item with the default 30% / 60% thresholds.
pub fn classify(item: &CatalogItem) -> StockLevel {
    StockThresholds::default().classify(item)
}

/// Whole-number stock percentage of `max_stock`, for progress bars.
///
/// Not clamped: an over-delivered shelf reads above 100.
pub fn fill_percent(item: &CatalogItem) -> u32 {
    let pct = u64::from(item.stock_count()) * 100 / u64::from(item.max_stock());
    u32::try_from(pct).unwrap_or(u32::MAX)
}

// =============================================================================
// Unit Tests
// =============================================================================
