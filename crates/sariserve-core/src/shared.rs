//! # Shared State
//!
//! Lock wrappers for hosts that drive the core from several threads (Tauri
//! commands, HTTP handlers).
//!
//! ## Thread Safety
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    One Lock per Entity                                  │
//! │                                                                         │
//! │  Host Command            Lock                 Core Operation            │
//! │  ────────────            ────                 ──────────────            │
//! │                                                                         │
//! │  add_to_cart() ────────► SharedCart ────────► Cart::add_or_increment    │
//! │                                                                         │
//! │  apply_promo() ────────► SharedCart ────────► PromotionBook::redeem     │
//! │                                                                         │
//! │  start_delivery() ─────► SharedFulfillment ─► start_fulfillment         │
//! │                                                                         │
//! │  rider_update() ───────► SharedFulfillment ─► advance_delivery          │
//! │                                                                         │
//! │  NOTE: Every operation runs to completion under the entity's lock.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A poisoned lock is recovered rather than propagated: core operations
//! validate before they mutate, so the guarded value is always consistent.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::cart::Cart;
use crate::fulfillment::FulfillmentBook;

/// Cloneable handle to a value behind a single mutex.
#[derive(Debug, Default)]
pub struct SharedState<T> {
    inner: Arc<Mutex<T>>,
}

pub type SharedCart = SharedState<Cart>;
pub type SharedFulfillment = SharedState<FulfillmentBook>;

impl<T> Clone for SharedState<T> {
    fn clone(&self) -> Self {
        SharedState {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> SharedState<T> {
    pub fn new(value: T) -> Self {
        SharedState {
            inner: Arc::new(Mutex::new(value)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, T> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` with shared access.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&*self.lock())
    }

    /// Runs `f` with exclusive access.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut *self.lock())
    }
}
