//! # Error Types
//!
//! Domain-specific error types for sariserve-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  CoreError                                                              │
//! │  ├── Cart          InvalidQuantity, ItemNotFound, EmptyCart,            │
//! │  │                 CartTooLarge                                         │
//! │  ├── Promotion     BelowMinimumOrder, Expired, PromotionInactive,       │
//! │  │                 PromotionAlreadyApplied, UnknownPromotion            │
//! │  ├── Lifecycle     InvalidTransition, OrderNotFound,                    │
//! │  │                 DeliveryNotFound, DeliveryAlreadyAssigned            │
//! │  ├── Config        InvalidConfig, ConfigLoad, ConfigParse               │
//! │  └── Validation    wraps ValidationError                                │
//! │                                                                         │
//! │  Flow: core error ──► presentation ──► localized toast / dialog         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in the variant (item id, codes, statuses)
//! 3. Every failure is recoverable; nothing here aborts the process
//! 4. `Display` is for logs; presentation owns the user-facing wording

use std::fmt;

use chrono::NaiveDate;
use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Lifecycle
// =============================================================================

/// Which state machine rejected a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Order,
    Delivery,
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lifecycle::Order => write!(f, "order"),
            Lifecycle::Delivery => write!(f, "delivery"),
        }
    }
}

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Quantity outside `1..=MAX_ITEM_QUANTITY`.
    ///
    /// ## When This Occurs
    /// - `add_or_increment` with a quantity below 1
    /// - An increment or quantity change that would exceed the maximum
    ///
    /// Decrements never produce this error; they floor at 1.
    #[error("Invalid quantity {quantity}: must be between 1 and {max}")]
    InvalidQuantity { quantity: i64, max: i64 },

    /// The cart holds no line for this item.
    #[error("Item not in cart: {0}")]
    ItemNotFound(String),

    /// An order cannot be placed from an empty cart.
    #[error("Cannot place an order from an empty cart")]
    EmptyCart,

    /// Cart has reached its maximum number of distinct lines.
    #[error("Cart cannot have more than {max} lines")]
    CartTooLarge { max: usize },

    /// Subtotal does not reach the promotion's minimum order.
    #[error("Promotion {code} requires a subtotal of {minimum}, cart has {subtotal}")]
    BelowMinimumOrder {
        code: String,
        minimum: Money,
        subtotal: Money,
    },

    /// The promotion's validity date has passed.
    #[error("Promotion {code} expired on {valid_until}")]
    Expired { code: String, valid_until: NaiveDate },

    /// The promotion has been switched off by the store.
    #[error("Promotion {0} is not active")]
    PromotionInactive(String),

    /// The cart already carries a different promotion.
    #[error("Cart already has promotion {applied} applied")]
    PromotionAlreadyApplied { applied: String },

    /// No promotion matches the code.
    #[error("Unknown promotion code: {0}")]
    UnknownPromotion(String),

    /// A status change outside the lifecycle's legal edges.
    ///
    /// ## User Workflow
    /// ```text
    /// Admin picks "Processing" on a completed order
    ///      │
    ///      ▼
    /// InvalidTransition { lifecycle: Order, from: "completed", to: "processing" }
    ///      │
    ///      ▼
    /// UI keeps the old badge and shows an error notice
    /// ```
    #[error("Invalid {lifecycle} transition: {from} -> {to}")]
    InvalidTransition {
        lifecycle: Lifecycle,
        from: String,
        to: String,
    },

    /// Order not found.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Delivery not found.
    #[error("Delivery not found: {0}")]
    DeliveryNotFound(String),

    /// The order already has its (single) delivery.
    #[error("Order {0} already has a delivery assigned")]
    DeliveryAlreadyAssigned(String),

    /// Only freshly placed orders can enter the fulfillment book.
    #[error("Order {order_id} is {status}; only pending orders can be accepted")]
    OrderNotPending { order_id: String, status: String },

    /// Configuration values are inconsistent.
    #[error("Invalid commerce configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be read.
    #[error("Failed to read config: {0}")]
    ConfigLoad(#[from] std::io::Error),

    /// Configuration file is not valid TOML for this schema.
    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Builds an `InvalidTransition` from any two displayable statuses.
    pub(crate) fn invalid_transition(
        lifecycle: Lifecycle,
        from: impl fmt::Display,
        to: impl fmt::Display,
    ) -> Self {
        CoreError::InvalidTransition {
            lifecycle,
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised when constructing catalog items, promotions, and configuration
/// from raw admin input.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Duplicate value (e.g., duplicate promo code).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
