//! # Catalog
//!
//! Catalog items as the core sees them, plus the read-only queries the home
//! and inventory pages run over a catalog slice.
//!
//! ## Construction
//! ```text
//! Admin product form ──► CatalogItemDraft ──TryFrom──► CatalogItem
//!                                              │
//!                                              └─► ValidationError
//!                                                  (max_stock = 0,
//!                                                   min_stock > max_stock, ...)
//! ```
//! A `CatalogItem` that exists is valid: classification and pricing never
//! re-check its invariants.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::{Money, Percent};
use crate::stock::{StockLevel, StockThresholds};
use crate::validation::{
    validate_amount, validate_item_id, validate_item_name, validate_percent,
    validate_search_query, validate_stock_bounds,
};

// =============================================================================
// Catalog Item
// =============================================================================

/// A purchasable product.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    id: String,
    name: String,
    unit_price: Money,
    category: String,
    stock_count: u32,
    min_stock: u32,
    max_stock: u32,
    discount_percent: Option<Percent>,
}

impl CatalogItem {
    /// Creates a validated catalog item without a discount.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        unit_price: Money,
        category: impl Into<String>,
        stock_count: u32,
        min_stock: u32,
        max_stock: u32,
    ) -> CoreResult<Self> {
        let id = id.into();
        let name = name.into();

        validate_item_id(&id)?;
        validate_item_name(&name)?;
        validate_amount("unit_price", unit_price)?;
        validate_stock_bounds(min_stock, max_stock)?;

        Ok(CatalogItem {
            id,
            name,
            unit_price,
            category: category.into(),
            stock_count,
            min_stock,
            max_stock,
            discount_percent: None,
        })
    }

    /// Attaches a storefront discount (0-100%).
    pub fn with_discount(mut self, discount: Percent) -> CoreResult<Self> {
        validate_percent("discount_percent", discount)?;
        self.discount_percent = if discount.is_zero() {
            None
        } else {
            Some(discount)
        };
        Ok(self)
    }

    /// Returns a copy with a new stock count (after a restock or a sale).
    pub fn with_stock_count(&self, stock_count: u32) -> Self {
        CatalogItem {
            stock_count,
            ..self.clone()
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// List price before any storefront discount.
    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn stock_count(&self) -> u32 {
        self.stock_count
    }

    pub fn min_stock(&self) -> u32 {
        self.min_stock
    }

    pub fn max_stock(&self) -> u32 {
        self.max_stock
    }

    pub fn discount_percent(&self) -> Option<Percent> {
        self.discount_percent
    }

    /// Price a customer actually pays per unit.
    ///
    /// ```rust
    /// use sariserve_core::{CatalogItem, Money, Percent};
    ///
    /// let noodles = CatalogItem::new("1", "Pancit Canton", Money::from_major(15), "Instant Noodles", 50, 20, 100)?
    ///     .with_discount(Percent::from_whole(10))?;
    /// assert_eq!(noodles.effective_unit_price(), Money::from_major_minor(13, 50));
    /// # Ok::<(), sariserve_core::CoreError>(())
    /// ```
    pub fn effective_unit_price(&self) -> Money {
        match self.discount_percent {
            Some(pct) => self.unit_price - self.unit_price.percentage(pct),
            None => self.unit_price,
        }
    }

    /// True when stock has dropped under the restock minimum.
    pub fn is_below_minimum(&self) -> bool {
        self.stock_count < self.min_stock
    }
}

// =============================================================================
// Catalog Item Draft
// =============================================================================

/// Unvalidated catalog item as submitted by the admin product form.
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItemDraft {
    pub id: String,
    pub name: String,
    pub unit_price: Money,
    pub category: String,
    pub stock_count: u32,
    pub min_stock: u32,
    pub max_stock: u32,
    #[serde(default)]
    pub discount_percent: Option<Percent>,
}

impl TryFrom<CatalogItemDraft> for CatalogItem {
    type Error = CoreError;

    fn try_from(draft: CatalogItemDraft) -> CoreResult<Self> {
        let item = CatalogItem::new(
            draft.id,
            draft.name,
            draft.unit_price,
            draft.category,
            draft.stock_count,
            draft.min_stock,
            draft.max_stock,
        )?;

        match draft.discount_percent {
            Some(pct) => item.with_discount(pct),
            None => Ok(item),
        }
    }
}

// =============================================================================
// Catalog Queries
// =============================================================================

/// Filters items by a case-insensitive name fragment and, optionally, an
/// exact category. An empty query matches everything.
pub fn search<'a>(
    items: &'a [CatalogItem],
    query: &str,
    category: Option<&str>,
) -> CoreResult<Vec<&'a CatalogItem>> {
    let needle = validate_search_query(query)?;

    Ok(items
        .iter()
        .filter(|item| item.name.to_lowercase().contains(&needle))
        .filter(|item| category.map_or(true, |c| item.category == c))
        .collect())
}

/// Items under their restock minimum, in catalog order.
pub fn below_minimum(items: &[CatalogItem]) -> Vec<&CatalogItem> {
    items.iter().filter(|item| item.is_below_minimum()).collect()
}

/// Counts shown on the inventory page's summary cards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummary {
    pub total_products: usize,
    #[ts(type = "number")]
    pub total_units: u64,
    pub critical: usize,
    pub low: usize,
    pub medium: usize,
    pub good: usize,
}

impl InventorySummary {
    /// Tallies a catalog slice with the given thresholds.
    pub fn from_items(items: &[CatalogItem], thresholds: &StockThresholds) -> Self {
        items.iter().fold(InventorySummary::default(), |mut acc, item| {
            acc.total_products += 1;
            acc.total_units += u64::from(item.stock_count);
            match thresholds.classify(item) {
                StockLevel::Critical => acc.critical += 1,
                StockLevel::Low => acc.low += 1,
                StockLevel::Medium => acc.medium += 1,
                StockLevel::Good => acc.good += 1,
            }
            acc
        })
    }

    /// Items that need attention (critical or low).
    pub fn needing_restock(&self) -> usize {
        self.critical + self.low
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
