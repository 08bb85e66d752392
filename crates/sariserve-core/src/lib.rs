//! # sariserve-core: Commerce Rules for the SariServe Storefront
//!
//! This crate holds every business rule the storefront computes. Presentation
//! code hands it plain data (catalog items, quantities, promo codes, status
//! requests) and renders whatever comes back.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        SariServe Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Frontend (React)                             │   │
//! │  │  Home ──► Cart ──► Checkout      Inventory ── Orders ── Riders  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ plain data                             │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ sariserve-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │  ┌─────────┐ ┌─────────┐ ┌───────────┐ ┌─────────┐ ┌─────────┐ │   │
//! │  │  │ catalog │ │  cart   │ │ promotion │ │  order  │ │delivery │ │   │
//! │  │  │  stock  │ │  money  │ │           │ │         │ │         │ │   │
//! │  │  └─────────┘ └─────────┘ └───────────┘ └────┬────┘ └────┬────┘ │   │
//! │  │                                             └─fulfillment┘      │   │
//! │  │                                                                 │   │
//! │  │   NO DATABASE • NO NETWORK • NO UI TEXT • PURE FUNCTIONS        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money (integer centavos) and Percent (basis points)
//! - [`catalog`] - Catalog items and inventory queries
//! - [`stock`] - Stock-level classification
//! - [`cart`] - The cart ledger
//! - [`promotion`] - Voucher evaluation and the promotion book
//! - [`order`] - Order lifecycle
//! - [`delivery`] - Delivery lifecycle
//! - [`fulfillment`] - Keeps orders and deliveries in step
//! - [`config`] - Overridable pricing and stock thresholds
//! - [`shared`] - Lock discipline for multi-threaded hosts
//! - [`error`] / [`validation`] - Typed failures and field checks
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input = same output, no hidden clocks in rules
//! 2. **Integer Money**: all monetary values are centavos (i64)
//! 3. **Explicit Errors**: every precondition violation is a typed error
//! 4. **Closed Status Enums**: presentation maps variants to colours itself
//!
//! ## Example Usage
//!
//! ```rust
//! use sariserve_core::{Cart, CatalogItem, Money};
//!
//! let noodles = CatalogItem::new("1", "Pancit Canton", Money::from_major(15), "Instant Noodles", 50, 20, 100)?;
//!
//! let mut cart = Cart::new();
//! cart.add_or_increment(&noodles, 2)?;
//!
//! assert_eq!(cart.subtotal(), Money::from_major(30));
//! assert_eq!(cart.delivery_fee(), Money::from_major(20)); // below ₱100
//! assert_eq!(cart.total(), Money::from_major(50));
//! # Ok::<(), sariserve_core::CoreError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod config;
pub mod delivery;
pub mod error;
pub mod fulfillment;
pub mod money;
pub mod order;
pub mod promotion;
pub mod shared;
pub mod stock;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine, CartTotals};
pub use catalog::{CatalogItem, CatalogItemDraft, InventorySummary};
pub use config::{CommerceConfig, DeliveryPricing};
pub use delivery::{Delivery, DeliveryAssignment, DeliveryStatus};
pub use error::{CoreError, CoreResult, Lifecycle, ValidationError};
pub use fulfillment::{FulfillmentBook, TrackingStatus};
pub use money::{Money, Percent};
pub use order::{Order, OrderStatus};
pub use promotion::{Promotion, PromotionBook, PromotionKind, PromotionSummary};
pub use shared::{SharedCart, SharedFulfillment, SharedState};
pub use stock::{classify, StockLevel, StockThresholds};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Subtotal at or above which delivery is free (₱100.00).
pub const FREE_DELIVERY_THRESHOLD: Money = Money::from_major(100);

/// Delivery fee charged below the free-delivery threshold (₱20.00).
pub const BASE_DELIVERY_FEE: Money = Money::from_major(20);

/// Stock below this percentage of `max_stock` is LOW.
pub const LOW_STOCK_PERCENT: u32 = 30;

/// Stock below this percentage of `max_stock` is MEDIUM.
pub const MEDIUM_STOCK_PERCENT: u32 = 60;

/// Maximum distinct lines allowed in a single cart.
pub const MAX_CART_LINES: usize = 100;

/// Largest price or promotion amount accepted from admin input (₱10,000,000).
///
/// ## Business Reason
/// Keeps `MAX_ITEM_QUANTITY × MAX_CART_LINES × amount` inside `i64` centavos.
pub const MAX_MONEY_AMOUNT: Money = Money::from_major(10_000_000);

/// Maximum quantity of a single line.
///
/// ## Business Reason
/// Prevents accidental over-ordering (typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;
