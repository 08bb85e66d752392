//! # Fulfillment Book
//!
//! Owns placed orders and their deliveries, and keeps the two lifecycles in
//! step.
//!
//! ## Coordination
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Order ⇄ Delivery Coordination                        │
//! │                                                                         │
//! │  Operation              Order                 Delivery                  │
//! │  ─────────              ─────                 ────────                  │
//! │                                                                         │
//! │  accept()  ───────────► PENDING               (none)                    │
//! │                                                                         │
//! │  start_fulfillment() ─► PROCESSING            PREPARING (created)       │
//! │                                                                         │
//! │  advance_delivery() ──► (unchanged)           PICKED_UP / ON_THE_WAY    │
//! │                                                                         │
//! │  mark_delivered() ────► COMPLETED             DELIVERED                 │
//! │                                                                         │
//! │  cancel_order() ──────► CANCELLED             CANCELLED (if not final)  │
//! │                                                                         │
//! │  NOTE: Paired changes are validated on both machines before either     │
//! │        is mutated. A failed call leaves the book untouched.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust
//! use sariserve_core::{
//!     Cart, CatalogItem, DeliveryAssignment, DeliveryStatus, FulfillmentBook, Money,
//!     OrderStatus, TrackingStatus,
//! };
//!
//! let rice = CatalogItem::new("8", "Dinorado Rice 2kg", Money::from_major(120), "Grains", 40, 10, 80)?;
//! let mut cart = Cart::new();
//! cart.add_or_increment(&rice, 1)?;
//!
//! let mut book = FulfillmentBook::new();
//! let order_id = book.accept(cart.place_order("cust-7")?)?.id().to_string();
//!
//! let delivery_id = book
//!     .start_fulfillment(&order_id, DeliveryAssignment {
//!         rider_id: "rider-2".into(),
//!         eta_minutes: 30,
//!         distance_km: 4.2,
//!     })?
//!     .id()
//!     .to_string();
//!
//! book.advance_delivery(&delivery_id, DeliveryStatus::PickedUp)?;
//! book.advance_delivery(&delivery_id, DeliveryStatus::OnTheWay)?;
//! assert_eq!(book.tracking_status(&order_id)?, TrackingStatus::OnTheWay);
//!
//! book.mark_delivered(&delivery_id)?;
//! assert_eq!(book.order(&order_id).map(|o| o.status()), Some(OrderStatus::Completed));
//! # Ok::<(), sariserve_core::CoreError>(())
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use ts_rs::TS;

use crate::delivery::{Delivery, DeliveryAssignment, DeliveryStatus};
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::order::{Order, OrderStatus};
use crate::validation::validate_search_query;

// =============================================================================
// Tracking Status
// =============================================================================

/// Customer-facing progress, derived from both lifecycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum TrackingStatus {
    Pending,
    Preparing,
    OnTheWay,
    Delivered,
    Cancelled,
}

impl TrackingStatus {
    fn derive(order: &Order, delivery: Option<&Delivery>) -> Self {
        match order.status() {
            OrderStatus::Cancelled => TrackingStatus::Cancelled,
            OrderStatus::Completed => TrackingStatus::Delivered,
            OrderStatus::Pending => TrackingStatus::Pending,
            OrderStatus::Processing => match delivery.map(Delivery::status) {
                Some(status) if status.is_en_route() => TrackingStatus::OnTheWay,
                Some(DeliveryStatus::Delivered) => TrackingStatus::Delivered,
                _ => TrackingStatus::Preparing,
            },
        }
    }
}

// =============================================================================
// Fulfillment Book
// =============================================================================

/// Placed orders plus at most one delivery per order.
#[derive(Debug, Clone, Default)]
pub struct FulfillmentBook {
    orders: Vec<Order>,
    deliveries: Vec<Delivery>,
}

impl FulfillmentBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a freshly placed order.
    ///
    /// The order must be PENDING and its id new to the book.
    pub fn accept(&mut self, order: Order) -> CoreResult<&Order> {
        if order.status() != OrderStatus::Pending {
            return Err(CoreError::OrderNotPending {
                order_id: order.id().to_string(),
                status: order.status().to_string(),
            });
        }

        if self.order(order.id()).is_some() {
            return Err(ValidationError::Duplicate {
                field: "order_id".to_string(),
                value: order.id().to_string(),
            }
            .into());
        }

        info!(
            order_id = %order.id(),
            customer_id = %order.customer_id(),
            total = %order.total(),
            "Order accepted"
        );
        let index = self.orders.len();
        self.orders.push(order);
        Ok(&self.orders[index])
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn deliveries(&self) -> &[Delivery] {
        &self.deliveries
    }

    pub fn order(&self, order_id: &str) -> Option<&Order> {
        self.orders.iter().find(|o| o.id() == order_id)
    }

    pub fn delivery(&self, delivery_id: &str) -> Option<&Delivery> {
        self.deliveries.iter().find(|d| d.id() == delivery_id)
    }

    pub fn delivery_for_order(&self, order_id: &str) -> Option<&Delivery> {
        self.deliveries.iter().find(|d| d.order_id() == order_id)
    }

    /// Orders whose id or customer id contains `query`, ignoring case.
    ///
    /// An empty query matches everything.
    pub fn search_orders(&self, query: &str) -> CoreResult<Vec<&Order>> {
        let needle = validate_search_query(query)?;
        Ok(self
            .orders
            .iter()
            .filter(|o| {
                needle.is_empty()
                    || o.id().to_lowercase().contains(&needle)
                    || o.customer_id().to_lowercase().contains(&needle)
            })
            .collect())
    }

    pub fn orders_with_status(&self, status: OrderStatus) -> Vec<&Order> {
        self.orders.iter().filter(|o| o.status() == status).collect()
    }

    // =========================================================================
    // Coordinated Transitions
    // =========================================================================

    /// Moves a PENDING order to PROCESSING and creates its PREPARING delivery.
    pub fn start_fulfillment(
        &mut self,
        order_id: &str,
        assignment: DeliveryAssignment,
    ) -> CoreResult<&Delivery> {
        if self.delivery_for_order(order_id).is_some() {
            return Err(CoreError::DeliveryAlreadyAssigned(order_id.to_string()));
        }

        let order = self.order_index(order_id)?;
        self.orders[order].transition_to(OrderStatus::Processing)?;

        let delivery = Delivery::new(order_id.to_string(), assignment);
        info!(
            order_id,
            delivery_id = %delivery.id(),
            rider_id = %delivery.rider_id(),
            "Fulfillment started"
        );

        let index = self.deliveries.len();
        self.deliveries.push(delivery);
        Ok(&self.deliveries[index])
    }

    /// Moves a delivery one step along its chain.
    ///
    /// Requesting DELIVERED completes the order too, via [`Self::mark_delivered`].
    pub fn advance_delivery(
        &mut self,
        delivery_id: &str,
        next: DeliveryStatus,
    ) -> CoreResult<&Delivery> {
        if next == DeliveryStatus::Delivered {
            self.mark_delivered(delivery_id)?;
            let index = self.delivery_index(delivery_id)?;
            return Ok(&self.deliveries[index]);
        }

        let index = self.delivery_index(delivery_id)?;
        let delivery = &mut self.deliveries[index];
        delivery.transition_to(next).inspect_err(|e| {
            debug!(delivery_id, error = %e, "Delivery transition rejected");
        })?;

        info!(delivery_id, status = %next, "Delivery advanced");
        Ok(&self.deliveries[index])
    }

    /// Delivery to DELIVERED and its order to COMPLETED, together.
    pub fn mark_delivered(&mut self, delivery_id: &str) -> CoreResult<&Order> {
        let d = self.delivery_index(delivery_id)?;
        let o = self.order_index(self.deliveries[d].order_id())?;

        // Both edges must be legal before either side changes.
        let delivery_next = self.deliveries[d].status().transition(DeliveryStatus::Delivered);
        let order_next = self.orders[o].status().transition(OrderStatus::Completed);
        if let Err(e) = delivery_next.and(order_next) {
            debug!(delivery_id, error = %e, "Mark delivered rejected");
            return Err(e);
        }

        self.deliveries[d].transition_to(DeliveryStatus::Delivered)?;
        self.orders[o].transition_to(OrderStatus::Completed)?;

        info!(
            delivery_id,
            order_id = %self.orders[o].id(),
            "Order delivered"
        );
        Ok(&self.orders[o])
    }

    /// Order to CANCELLED; a delivery still in progress is cancelled with it.
    pub fn cancel_order(&mut self, order_id: &str) -> CoreResult<&Order> {
        let o = self.order_index(order_id)?;
        self.orders[o].transition_to(OrderStatus::Cancelled).inspect_err(|e| {
            debug!(order_id, error = %e, "Order cancellation rejected");
        })?;

        let delivery_cancelled = self
            .deliveries
            .iter_mut()
            .find(|d| d.order_id() == order_id)
            .map(Delivery::force_cancel)
            .unwrap_or(false);

        info!(order_id, delivery_cancelled, "Order cancelled");
        Ok(&self.orders[o])
    }

    /// What the customer's tracking screen shows.
    pub fn tracking_status(&self, order_id: &str) -> CoreResult<TrackingStatus> {
        let order = self
            .order(order_id)
            .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()))?;
        Ok(TrackingStatus::derive(order, self.delivery_for_order(order_id)))
    }

    fn order_index(&self, order_id: &str) -> CoreResult<usize> {
        self.orders
            .iter()
            .position(|o| o.id() == order_id)
            .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()))
    }

    fn delivery_index(&self, delivery_id: &str) -> CoreResult<usize> {
        self.deliveries
            .iter()
            .position(|d| d.id() == delivery_id)
            .ok_or_else(|| CoreError::DeliveryNotFound(delivery_id.to_string()))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
