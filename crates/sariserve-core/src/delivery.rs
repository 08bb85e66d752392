//! # Delivery Lifecycle
//!
//! ## State Machine
//! ```text
//!  PREPARING ──► PICKED_UP ──► ON_THE_WAY ──► DELIVERED
//!      │             │              │
//!      └─────────────┴──────────────┴──────► CANCELLED   (forced by order
//!                                                          cancellation only)
//! ```
//! The forward chain is strictly linear: no skipping, no going back. A rider
//! can never request CANCELLED; it is applied by
//! [`FulfillmentBook::cancel_order`](crate::fulfillment::FulfillmentBook::cancel_order).

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult, Lifecycle};

// =============================================================================
// Delivery Status
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum DeliveryStatus {
    Preparing,
    PickedUp,
    OnTheWay,
    Delivered,
    Cancelled,
}

impl DeliveryStatus {
    pub const ALL: [DeliveryStatus; 5] = [
        DeliveryStatus::Preparing,
        DeliveryStatus::PickedUp,
        DeliveryStatus::OnTheWay,
        DeliveryStatus::Delivered,
        DeliveryStatus::Cancelled,
    ];

    /// The single status a rider may move to next.
    pub fn next(&self) -> Option<DeliveryStatus> {
        match self {
            DeliveryStatus::Preparing => Some(DeliveryStatus::PickedUp),
            DeliveryStatus::PickedUp => Some(DeliveryStatus::OnTheWay),
            DeliveryStatus::OnTheWay => Some(DeliveryStatus::Delivered),
            DeliveryStatus::Delivered | DeliveryStatus::Cancelled => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, DeliveryStatus::Delivered | DeliveryStatus::Cancelled)
    }

    /// True while a rider holds the parcel.
    pub fn is_en_route(&self) -> bool {
        matches!(self, DeliveryStatus::PickedUp | DeliveryStatus::OnTheWay)
    }

    pub fn can_transition_to(&self, next: DeliveryStatus) -> bool {
        self.next() == Some(next)
    }

    /// Returns `next` if it is the immediate successor.
    pub fn transition(self, next: DeliveryStatus) -> CoreResult<DeliveryStatus> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(CoreError::invalid_transition(Lifecycle::Delivery, self, next))
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryStatus::Preparing => write!(f, "preparing"),
            DeliveryStatus::PickedUp => write!(f, "picked-up"),
            DeliveryStatus::OnTheWay => write!(f, "on-the-way"),
            DeliveryStatus::Delivered => write!(f, "delivered"),
            DeliveryStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

// =============================================================================
// Delivery
// =============================================================================

/// Rider details supplied when an order goes out for fulfillment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryAssignment {
    pub rider_id: String,
    pub eta_minutes: u32,
    pub distance_km: f64,
}

/// One rider's fulfillment of one order.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Delivery {
    id: String,
    order_id: String,
    rider_id: String,
    status: DeliveryStatus,
    eta_minutes: u32,
    distance_km: f64,
    #[ts(as = "String")]
    updated_at: DateTime<Utc>,
}

impl Delivery {
    pub(crate) fn new(order_id: String, assignment: DeliveryAssignment) -> Self {
        Delivery {
            id: Uuid::new_v4().to_string(),
            order_id,
            rider_id: assignment.rider_id,
            status: DeliveryStatus::Preparing,
            eta_minutes: assignment.eta_minutes,
            distance_km: assignment.distance_km,
            updated_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn order_id(&self) -> &str {
        &self.order_id
    }

    pub fn rider_id(&self) -> &str {
        &self.rider_id
    }

    pub fn status(&self) -> DeliveryStatus {
        self.status
    }

    pub fn eta_minutes(&self) -> u32 {
        self.eta_minutes
    }

    pub fn distance_km(&self) -> f64 {
        self.distance_km
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// The delivery as it would be after moving to `next`.
    pub fn transitioned(&self, next: DeliveryStatus) -> CoreResult<Delivery> {
        let status = self.status.transition(next)?;
        Ok(Delivery {
            status,
            updated_at: Utc::now(),
            ..self.clone()
        })
    }

    /// Rider-reported ETA refresh; ignored once terminal.
    pub fn update_eta(&mut self, eta_minutes: u32) {
        if !self.status.is_terminal() {
            self.eta_minutes = eta_minutes;
            self.updated_at = Utc::now();
        }
    }

    pub(crate) fn transition_to(&mut self, next: DeliveryStatus) -> CoreResult<()> {
        self.status = self.status.transition(next)?;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Forces a non-terminal delivery to CANCELLED. Returns whether it changed.
    pub(crate) fn force_cancel(&mut self) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = DeliveryStatus::Cancelled;
        self.updated_at = Utc::now();
        true
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use super::DeliveryStatus::*;

    fn delivery() -> Delivery {
        Delivery::new(
            "order-1".to_string(),
            DeliveryAssignment {
                rider_id: "rider-mark".to_string(),
                eta_minutes: 25,
                distance_km: 5.8,
            },
        )
    }

    #[test]
    fn test_only_linear_successor_is_legal() {
        for from in DeliveryStatus::ALL {
            for to in DeliveryStatus::ALL {
                let expected = from.next() == Some(to);
                assert_eq!(from.transition(to).is_ok(), expected, "{from} -> {to}");
            }
        }
    }

    #[test]
    fn test_no_skipping_or_reversing() {
        assert!(Preparing.transition(OnTheWay).is_err());
        assert!(Preparing.transition(Delivered).is_err());
        assert!(OnTheWay.transition(PickedUp).is_err());
        assert!(Delivered.transition(Preparing).is_err());
    }

    #[test]
    fn test_cancelled_is_never_requestable() {
        for from in DeliveryStatus::ALL {
            assert!(from.transition(Cancelled).is_err());
        }
    }

    #[test]
    fn test_walk_to_delivered() {
        let mut d = delivery();
        assert_eq!(d.status(), Preparing);
        d.transition_to(PickedUp).unwrap();
        d.transition_to(OnTheWay).unwrap();
        assert!(d.status().is_en_route());
        d.transition_to(Delivered).unwrap();
        assert!(d.status().is_terminal());
        assert!(!d.force_cancel());
        assert_eq!(d.status(), Delivered);
    }

    #[test]
    fn test_transitioned_is_pure() {
        let d = delivery();
        let picked = d.transitioned(PickedUp).unwrap();
        assert_eq!(d.status(), Preparing);
        assert_eq!(picked.status(), PickedUp);
        assert_eq!(picked.id(), d.id());
    }

    #[test]
    fn test_eta_frozen_after_terminal() {
        let mut d = delivery();
        d.update_eta(10);
        assert_eq!(d.eta_minutes(), 10);
        assert!(d.force_cancel());
        d.update_eta(3);
        assert_eq!(d.eta_minutes(), 10);
    }

    #[test]
    fn test_wire_names_match_frontend() {
        assert_eq!(serde_json::to_string(&PickedUp).unwrap(), "\"picked-up\"");
        assert_eq!(serde_json::to_string(&OnTheWay).unwrap(), "\"on-the-way\"");
        assert_eq!(OnTheWay.to_string(), "on-the-way");
    }
}
