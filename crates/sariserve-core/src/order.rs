//! # Order Lifecycle
//!
//! ## State Machine
//! ```text
//!   ┌─────────┐        ┌────────────┐        ┌───────────┐
//!   │ PENDING │ ─────► │ PROCESSING │ ─────► │ COMPLETED │
//!   └────┬────┘        └─────┬──────┘        └───────────┘
//!        │                   │
//!        │   ┌───────────┐   │
//!        └─► │ CANCELLED │ ◄─┘
//!            └───────────┘
//! ```
//! These four edges are the whole table. COMPLETED and CANCELLED are
//! terminal, and staying in the same status is not a transition.
//!
//! An order's lines and totals are a snapshot of the cart at placement; no
//! later catalog or pricing change touches them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::cart::CartLine;
use crate::error::{CoreError, CoreResult, Lifecycle, ValidationError};
use crate::money::Money;

// =============================================================================
// Order Status
// =============================================================================

/// Where an order is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Placed, waiting for the store to accept it.
    #[default]
    Pending,
    /// Being prepared / out for delivery.
    Processing,
    /// Delivered to the customer.
    Completed,
    /// Cancelled before completion.
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    /// True for COMPLETED and CANCELLED.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Whether `self -> next` is a legal edge.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Processing)
                | (Processing, Completed)
                | (Pending, Cancelled)
                | (Processing, Cancelled)
        )
    }

    /// Statuses reachable in one step, for the admin dropdown.
    pub fn next_statuses(&self) -> Vec<OrderStatus> {
        Self::ALL
            .into_iter()
            .filter(|s| self.can_transition_to(*s))
            .collect()
    }

    /// Returns `next` if the edge is legal.
    pub fn transition(self, next: OrderStatus) -> CoreResult<OrderStatus> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(CoreError::invalid_transition(Lifecycle::Order, self, next))
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "pending"),
            OrderStatus::Processing => write!(f, "processing"),
            OrderStatus::Completed => write!(f, "completed"),
            OrderStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl FromStr for OrderStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "processing" => Ok(OrderStatus::Processing),
            "completed" => Ok(OrderStatus::Completed),
            "cancelled" | "canceled" => Ok(OrderStatus::Cancelled),
            _ => Err(ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: Self::ALL.iter().map(ToString::to_string).collect(),
            }
            .into()),
        }
    }
}

// =============================================================================
// Order
// =============================================================================

/// A placed order.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    id: String,
    customer_id: String,
    lines: Vec<CartLine>,
    subtotal: Money,
    delivery_fee: Money,
    discount: Money,
    total: Money,
    promotion_code: Option<String>,
    status: OrderStatus,
    #[ts(as = "String")]
    placed_at: DateTime<Utc>,
    #[ts(as = "String")]
    updated_at: DateTime<Utc>,
}

impl Order {
    pub(crate) fn place(
        customer_id: String,
        lines: Vec<CartLine>,
        subtotal: Money,
        delivery_fee: Money,
        discount: Money,
        total: Money,
        promotion_code: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Order {
            id: Uuid::new_v4().to_string(),
            customer_id,
            lines,
            subtotal,
            delivery_fee,
            discount,
            total,
            promotion_code,
            status: OrderStatus::Pending,
            placed_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn customer_id(&self) -> &str {
        &self.customer_id
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn subtotal(&self) -> Money {
        self.subtotal
    }

    pub fn delivery_fee(&self) -> Money {
        self.delivery_fee
    }

    pub fn discount(&self) -> Money {
        self.discount
    }

    /// Total charged at placement.
    pub fn total(&self) -> Money {
        self.total
    }

    pub fn promotion_code(&self) -> Option<&str> {
        self.promotion_code.as_deref()
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn placed_at(&self) -> DateTime<Utc> {
        self.placed_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Number of units across all lines.
    pub fn item_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// The order as it would be after moving to `next`.
    ///
    /// ```rust
    /// use sariserve_core::{Cart, CatalogItem, CoreError, Money, OrderStatus};
    ///
    /// let soap = CatalogItem::new("5", "Safeguard Soap", Money::from_major(35), "Personal Care", 60, 20, 100)?;
    /// let mut cart = Cart::new();
    /// cart.add_or_increment(&soap, 2)?;
    /// let order = cart.place_order("cust-1")?;
    ///
    /// let processing = order.transitioned(OrderStatus::Processing)?;
    /// let completed = processing.transitioned(OrderStatus::Completed)?;
    /// assert!(matches!(
    ///     completed.transitioned(OrderStatus::Processing),
    ///     Err(CoreError::InvalidTransition { .. })
    /// ));
    /// # Ok::<(), CoreError>(())
    /// ```
    pub fn transitioned(&self, next: OrderStatus) -> CoreResult<Order> {
        let status = self.status.transition(next)?;
        Ok(Order {
            status,
            updated_at: Utc::now(),
            ..self.clone()
        })
    }

    /// Moves to `next` in place; unchanged on error.
    pub(crate) fn transition_to(&mut self, next: OrderStatus) -> CoreResult<()> {
        self.status = self.status.transition(next)?;
        self.updated_at = Utc::now();
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
