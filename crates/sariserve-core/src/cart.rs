//! # Cart Ledger
//!
//! Running totals for an order that has not been placed yet.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Frontend Action          Cart Operation           Effect               │
//! │  ───────────────          ──────────────           ──────               │
//! │  Add to cart ───────────► add_or_increment() ────► new line or qty += n │
//! │  − / + buttons ─────────► change_quantity() ─────► qty = max(1, q + d)  │
//! │  Trash icon ────────────► remove_line() ─────────► line deleted         │
//! │  Voucher field ─────────► apply_promotion() ─────► discount attached    │
//! │  Place order ───────────► place_order() ─────────► Order + empty cart   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Totals
//! ```text
//! subtotal     = Σ unit_price × quantity
//! delivery_fee = 0 if subtotal ≥ free_threshold else base_fee
//! discount     = applied promotion against the current subtotal
//! total        = max(0, subtotal + delivery_fee − discount)
//! ```
//! Every total is derived on demand; nothing is cached on the cart.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use ts_rs::TS;

use crate::catalog::CatalogItem;
use crate::config::DeliveryPricing;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::order::Order;
use crate::promotion::{evaluate, AppliedPromotion, Promotion};
use crate::{MAX_CART_LINES, MAX_ITEM_QUANTITY};

// =============================================================================
// Cart Line
// =============================================================================

/// One product in the cart.
///
/// `name` and `unit_price` are frozen when the line is created, so a later
/// catalog edit never changes what the customer was quoted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub item_id: String,
    pub name: String,
    pub unit_price: Money,
    #[ts(type = "number")]
    pub quantity: i64,
}

impl CartLine {
    fn from_item(item: &CatalogItem, quantity: i64) -> Self {
        CartLine {
            item_id: item.id().to_string(),
            name: item.name().to_string(),
            unit_price: item.effective_unit_price(),
            quantity,
        }
    }

    /// unit_price × quantity.
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

fn check_quantity(quantity: i64) -> CoreResult<()> {
    if !(1..=MAX_ITEM_QUANTITY).contains(&quantity) {
        return Err(CoreError::InvalidQuantity {
            quantity,
            max: MAX_ITEM_QUANTITY,
        });
    }
    Ok(())
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart.
///
/// ## Invariants
/// - Lines are unique by `item_id` (adding the same item increases quantity)
/// - Every quantity is in `1..=MAX_ITEM_QUANTITY`
/// - At most `MAX_CART_LINES` lines
/// - At most one promotion
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    lines: Vec<CartLine>,
    pricing: DeliveryPricing,
    promotion: Option<AppliedPromotion>,
    created_at: DateTime<Utc>,
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

impl Cart {
    /// Creates an empty cart with the default delivery pricing.
    pub fn new() -> Self {
        Self::with_pricing(DeliveryPricing::default())
    }

    /// Creates an empty cart with explicit delivery pricing.
    pub fn with_pricing(pricing: DeliveryPricing) -> Self {
        Cart {
            lines: Vec::new(),
            pricing,
            promotion: None,
            created_at: Utc::now(),
        }
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, item_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.item_id == item_id)
    }

    pub fn pricing(&self) -> DeliveryPricing {
        self.pricing
    }

    pub fn applied_promotion(&self) -> Option<&AppliedPromotion> {
        self.promotion.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    // =========================================================================
    // Line Operations
    // =========================================================================

    /// Adds `quantity` of an item, or increases the existing line.
    ///
    /// The unit price snapshot is taken from the item's effective price when
    /// the line is first created; increments keep the original snapshot.
    pub fn add_or_increment(&mut self, item: &CatalogItem, quantity: i64) -> CoreResult<()> {
        check_quantity(quantity)?;

        if let Some(line) = self.lines.iter_mut().find(|l| l.item_id == item.id()) {
            let new_qty = line.quantity.saturating_add(quantity);
            check_quantity(new_qty)?;
            line.quantity = new_qty;
            debug!(item_id = %item.id(), quantity = new_qty, "Incremented cart line");
            return Ok(());
        }

        if self.lines.len() >= MAX_CART_LINES {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_LINES,
            });
        }

        self.lines.push(CartLine::from_item(item, quantity));
        debug!(item_id = %item.id(), quantity, "Added cart line");
        Ok(())
    }

    /// Adjusts a line by `delta`, never going below 1.
    ///
    /// Returns the new quantity. Use [`Cart::remove_line`] to delete a line.
    pub fn change_quantity(&mut self, item_id: &str, delta: i64) -> CoreResult<i64> {
        let line = self
            .lines
            .iter_mut()
            .find(|l| l.item_id == item_id)
            .ok_or_else(|| CoreError::ItemNotFound(item_id.to_string()))?;

        let new_qty = line.quantity.saturating_add(delta).max(1);
        check_quantity(new_qty)?;
        line.quantity = new_qty;

        debug!(item_id, delta, quantity = new_qty, "Changed cart quantity");
        Ok(new_qty)
    }

    /// Deletes a line, returning it.
    pub fn remove_line(&mut self, item_id: &str) -> CoreResult<CartLine> {
        let idx = self
            .lines
            .iter()
            .position(|l| l.item_id == item_id)
            .ok_or_else(|| CoreError::ItemNotFound(item_id.to_string()))?;

        debug!(item_id, "Removed cart line");
        Ok(self.lines.remove(idx))
    }

    /// Empties the cart and drops any promotion.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.promotion = None;
        self.created_at = Utc::now();
    }

    /// Number of distinct lines.
    pub fn item_count(&self) -> usize {
        self.lines.len()
    }

    /// Sum of all quantities (the cart badge number).
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    // =========================================================================
    // Totals
    // =========================================================================

    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    pub fn delivery_fee(&self) -> Money {
        self.pricing.fee_for(self.subtotal())
    }

    /// Discount from the applied promotion, zero if none.
    pub fn discount(&self) -> Money {
        self.promotion
            .as_ref()
            .map_or(Money::zero(), |p| p.discount_for(self.subtotal()))
    }

    /// subtotal + delivery fee − discount, never negative.
    pub fn total(&self) -> Money {
        (self.subtotal() + self.delivery_fee() - self.discount()).floor_at_zero()
    }

    // =========================================================================
    // Promotions
    // =========================================================================

    /// Applies a promotion to this cart and counts the use.
    ///
    /// Re-applying the code already on the cart returns the current discount
    /// without counting another use. A different code is rejected while one
    /// is applied; call [`Cart::remove_promotion`] first.
    pub fn apply_promotion(&mut self, promo: &mut Promotion, today: NaiveDate) -> CoreResult<Money> {
        if let Some(applied) = &self.promotion {
            if promo.matches_code(&applied.code) {
                return Ok(self.discount());
            }
            return Err(CoreError::PromotionAlreadyApplied {
                applied: applied.code.clone(),
            });
        }

        let discount = evaluate(promo, self.subtotal(), today)?;
        self.promotion = Some(AppliedPromotion::from_promotion(promo));
        promo.record_use();

        debug!(code = %promo.code(), discount = %discount, "Applied promotion to cart");
        Ok(discount)
    }

    /// Detaches the promotion, if any.
    pub fn remove_promotion(&mut self) -> Option<AppliedPromotion> {
        self.promotion.take()
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Turns the cart into a pending order and empties it.
    ///
    /// An empty cart is rejected and left untouched.
    pub fn place_order(&mut self, customer_id: impl Into<String>) -> CoreResult<Order> {
        if self.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        let subtotal = self.subtotal();
        let delivery_fee = self.delivery_fee();
        let discount = self.discount();
        let total = self.total();
        let promotion_code = self.promotion.as_ref().map(|p| p.code.clone());

        let order = Order::place(
            customer_id.into(),
            std::mem::take(&mut self.lines),
            subtotal,
            delivery_fee,
            discount,
            total,
            promotion_code,
        );
        self.clear();

        info!(order_id = %order.id(), total = %order.total(), "Order placed");
        Ok(order)
    }
}

// =============================================================================
// Cart Totals
// =============================================================================

/// Cart totals summary for the checkout panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub item_count: usize,
    #[ts(type = "number")]
    pub total_quantity: i64,
    pub subtotal: Money,
    pub delivery_fee: Money,
    pub discount: Money,
    pub total: Money,
    pub promotion_code: Option<String>,
    /// "Add ₱X more for free delivery"; zero once delivery is free.
    pub remaining_for_free_delivery: Money,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        let subtotal = cart.subtotal();
        CartTotals {
            item_count: cart.item_count(),
            total_quantity: cart.total_quantity(),
            subtotal,
            delivery_fee: cart.delivery_fee(),
            discount: cart.discount(),
            total: cart.total(),
            promotion_code: cart.promotion.as_ref().map(|p| p.code.clone()),
            remaining_for_free_delivery: cart.pricing.remaining_for_free(subtotal),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Percent;
    use crate::order::OrderStatus;

    fn item(id: &str, pesos: i64) -> CatalogItem {
        CatalogItem::new(id, format!("Item {}", id), Money::from_major(pesos), "Snacks", 50, 10, 100)
            .unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn save15() -> Promotion {
        Promotion::percentage("SAVE15", Percent::from_whole(15), Money::from_major(200), date(2025, 11, 15))
            .unwrap()
            .with_max_discount(Money::from_major(100))
            .unwrap()
    }

    #[test]
    fn test_bindings_use_plain_numbers() {
        let line = CartLine::decl();
        assert!(line.contains("quantity: number"), "{line}");
        assert!(CartTotals::decl().contains("totalQuantity: number"));
        assert!(!CartTotals::decl().contains("bigint"));
    }

    #[test]
    fn test_add_and_increment() {
        let mut cart = Cart::new();
        let noodles = item("1", 15);

        cart.add_or_increment(&noodles, 2).unwrap();
        cart.add_or_increment(&noodles, 3).unwrap();

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.total_quantity(), 5);
        assert_eq!(cart.subtotal(), Money::from_major(75));
    }

    #[test]
    fn test_add_rejects_bad_quantity() {
        let mut cart = Cart::new();
        let noodles = item("1", 15);

        assert!(matches!(
            cart.add_or_increment(&noodles, 0),
            Err(CoreError::InvalidQuantity { quantity: 0, .. })
        ));
        assert!(cart.add_or_increment(&noodles, -3).is_err());

        cart.add_or_increment(&noodles, 990).unwrap();
        assert!(cart.add_or_increment(&noodles, 10).is_err());
        assert_eq!(cart.line("1").unwrap().quantity, 990);
    }

    #[test]
    fn test_change_quantity_floors_at_one() {
        let mut cart = Cart::new();
        cart.add_or_increment(&item("1", 15), 2).unwrap();

        assert_eq!(cart.change_quantity("1", -1000).unwrap(), 1);
        assert_eq!(cart.change_quantity("1", -1).unwrap(), 1);
        assert_eq!(cart.change_quantity("1", i64::MIN).unwrap(), 1);
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.change_quantity("1", 4).unwrap(), 5);
    }

    #[test]
    fn test_change_quantity_missing_item() {
        let mut cart = Cart::new();
        assert!(matches!(
            cart.change_quantity("nope", 1),
            Err(CoreError::ItemNotFound(_))
        ));
    }

    #[test]
    fn test_remove_line() {
        let mut cart = Cart::new();
        cart.add_or_increment(&item("1", 15), 2).unwrap();
        cart.add_or_increment(&item("2", 85), 1).unwrap();

        let removed = cart.remove_line("1").unwrap();
        assert_eq!(removed.quantity, 2);
        assert_eq!(cart.item_count(), 1);
        assert!(matches!(cart.remove_line("1"), Err(CoreError::ItemNotFound(_))));
    }

    #[test]
    fn test_line_limit() {
        let mut cart = Cart::new();
        for i in 0..MAX_CART_LINES {
            cart.add_or_increment(&item(&i.to_string(), 1), 1).unwrap();
        }
        assert!(matches!(
            cart.add_or_increment(&item("overflow", 1), 1),
            Err(CoreError::CartTooLarge { .. })
        ));
    }

    #[test]
    fn test_largest_cart_stays_in_range() {
        let oversized = CatalogItem::new(
            "gold",
            "Gold Bar",
            Money::from_cents(i64::MAX / 10),
            "Luxury",
            5,
            1,
            10,
        );
        assert!(matches!(oversized, Err(CoreError::Validation(_))));

        let mut cart = Cart::new();
        for i in 0..MAX_CART_LINES {
            let priciest = CatalogItem::new(i.to_string(), "Lechon", crate::MAX_MONEY_AMOUNT, "Meals", 5, 1, 10)
                .unwrap();
            cart.add_or_increment(&priciest, MAX_ITEM_QUANTITY).unwrap();
        }

        let expected = crate::MAX_MONEY_AMOUNT * MAX_ITEM_QUANTITY * MAX_CART_LINES as i64;
        assert_eq!(cart.subtotal(), expected);
        assert_eq!(cart.total(), expected);
    }

    #[test]
    fn test_snapshot_uses_discounted_price() {
        let mut cart = Cart::new();
        let discounted = item("1", 15).with_discount(Percent::from_whole(10)).unwrap();
        cart.add_or_increment(&discounted, 2).unwrap();
        assert_eq!(cart.subtotal(), Money::from_major(27));
    }

    #[test]
    fn test_delivery_fee_threshold() {
        let mut cart = Cart::new();
        assert_eq!(cart.subtotal(), Money::zero());
        assert_eq!(cart.delivery_fee(), Money::from_major(20));

        cart.add_or_increment(&item("1", 99), 1).unwrap();
        assert_eq!(cart.delivery_fee(), Money::from_major(20));
        assert_eq!(cart.total(), Money::from_major(119));

        cart.add_or_increment(&item("2", 1), 1).unwrap();
        assert_eq!(cart.subtotal(), Money::from_major(100));
        assert_eq!(cart.delivery_fee(), Money::zero());
        assert_eq!(cart.total(), Money::from_major(100));
    }

    #[test]
    fn test_storefront_cart_totals() {
        // 2 × ₱15 noodles, 1 × ₱85 tapsilog, 2 × ₱25 fish balls
        let mut cart = Cart::new();
        cart.add_or_increment(&item("1", 15), 2).unwrap();
        cart.add_or_increment(&item("2", 85), 1).unwrap();
        cart.add_or_increment(&item("3", 25), 2).unwrap();

        let totals = CartTotals::from(&cart);
        assert_eq!(totals.subtotal, Money::from_major(165));
        assert_eq!(totals.delivery_fee, Money::zero());
        assert_eq!(totals.total, Money::from_major(165));
        assert_eq!(totals.total_quantity, 5);
        assert_eq!(totals.remaining_for_free_delivery, Money::zero());
    }

    #[test]
    fn test_custom_pricing() {
        let pricing = DeliveryPricing {
            free_threshold: Money::from_major(500),
            base_fee: Money::from_major(35),
        };
        let mut cart = Cart::with_pricing(pricing);
        cart.add_or_increment(&item("1", 120), 1).unwrap();
        assert_eq!(cart.delivery_fee(), Money::from_major(35));
        assert_eq!(
            CartTotals::from(&cart).remaining_for_free_delivery,
            Money::from_major(380)
        );
    }

    #[test]
    fn test_apply_promotion_counts_once() {
        let mut cart = Cart::new();
        cart.add_or_increment(&item("1", 1000), 1).unwrap();
        let mut promo = save15();

        let today = date(2025, 11, 1);
        assert_eq!(cart.apply_promotion(&mut promo, today).unwrap(), Money::from_major(100));
        assert_eq!(cart.apply_promotion(&mut promo, today).unwrap(), Money::from_major(100));
        assert_eq!(promo.usage_count(), 1);
        assert_eq!(cart.total(), Money::from_major(900));
    }

    #[test]
    fn test_second_promotion_rejected() {
        let mut cart = Cart::new();
        cart.add_or_increment(&item("1", 300), 1).unwrap();
        let today = date(2025, 11, 1);

        let mut first = save15();
        let mut second =
            Promotion::fixed("WELCOME50", Money::from_major(50), Money::from_major(150), date(2025, 12, 31))
                .unwrap();

        cart.apply_promotion(&mut first, today).unwrap();
        assert!(matches!(
            cart.apply_promotion(&mut second, today),
            Err(CoreError::PromotionAlreadyApplied { .. })
        ));
        assert_eq!(second.usage_count(), 0);

        cart.remove_promotion();
        assert_eq!(cart.apply_promotion(&mut second, today).unwrap(), Money::from_major(50));
    }

    #[test]
    fn test_rejected_promotion_leaves_cart_alone() {
        let mut cart = Cart::new();
        cart.add_or_increment(&item("1", 100), 1).unwrap();
        let mut promo = save15();

        assert!(matches!(
            cart.apply_promotion(&mut promo, date(2025, 11, 1)),
            Err(CoreError::BelowMinimumOrder { .. })
        ));
        assert!(cart.applied_promotion().is_none());
        assert_eq!(promo.usage_count(), 0);
    }

    #[test]
    fn test_discount_follows_subtotal() {
        let mut cart = Cart::new();
        cart.add_or_increment(&item("1", 100), 3).unwrap();
        let mut promo = save15();
        cart.apply_promotion(&mut promo, date(2025, 11, 1)).unwrap();
        assert_eq!(cart.discount(), Money::from_major(45));

        cart.change_quantity("1", -1).unwrap();
        assert_eq!(cart.discount(), Money::from_major(30));

        // Below the ₱200 minimum the voucher stops discounting
        cart.change_quantity("1", -1).unwrap();
        assert_eq!(cart.discount(), Money::zero());
        assert_eq!(cart.total(), Money::from_major(100));
    }

    #[test]
    fn test_total_never_negative() {
        let mut cart = Cart::new();
        cart.add_or_increment(&item("1", 10), 1).unwrap();
        let mut promo = Promotion::percentage("ALL", Percent::FULL, Money::zero(), date(2030, 1, 1)).unwrap();
        cart.apply_promotion(&mut promo, date(2025, 1, 1)).unwrap();

        assert_eq!(cart.discount(), Money::from_major(10));
        assert_eq!(cart.total(), Money::from_major(20));
        assert!(!cart.total().is_negative());
    }

    #[test]
    fn test_place_order_snapshots_and_clears() {
        let mut cart = Cart::new();
        cart.add_or_increment(&item("1", 300), 1).unwrap();
        let mut promo = save15();
        cart.apply_promotion(&mut promo, date(2025, 11, 1)).unwrap();

        let order = cart.place_order("cust-1").unwrap();

        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.customer_id(), "cust-1");
        assert_eq!(order.lines().len(), 1);
        assert_eq!(order.subtotal(), Money::from_major(300));
        assert_eq!(order.discount(), Money::from_major(45));
        assert_eq!(order.total(), Money::from_major(255));
        assert_eq!(order.promotion_code(), Some("SAVE15"));

        assert!(cart.is_empty());
        assert!(cart.applied_promotion().is_none());
    }

    #[test]
    fn test_place_order_on_empty_cart() {
        let mut cart = Cart::new();
        let created = cart.created_at();

        assert!(matches!(cart.place_order("cust-1"), Err(CoreError::EmptyCart)));
        assert!(cart.is_empty());
        assert_eq!(cart.created_at(), created);
    }
}
