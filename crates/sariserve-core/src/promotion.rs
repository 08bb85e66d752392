//! # Promotions
//!
//! Voucher rules and the book that redeems codes against carts.
//!
//! ## Evaluation Order
//! ```text
//! evaluate(promo, subtotal, today)
//!      │
//!      ├── subtotal < min_order_subtotal ──► BelowMinimumOrder
//!      ├── today > valid_until ────────────► Expired
//!      ├── switched off by admin ──────────► PromotionInactive
//!      │
//!      ├── Fixed { amount }         ──► min(amount, subtotal)
//!      └── Percentage { percent,    ──► subtotal × percent,
//!                       max_discount }    capped at max_discount
//! ```
//!
//! ## Storefront Vouchers
//! | Code      | Kind       | Amount | Min order | Cap  |
//! |-----------|------------|--------|-----------|------|
//! | FREEDEL   | fixed      | ₱20    | ₱100      |      |
//! | SAVE15    | percentage | 15%    | ₱200      | ₱100 |
//! | WELCOME50 | fixed      | ₱50    | ₱150      |      |

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use ts_rs::TS;

use crate::cart::Cart;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::{Money, Percent};
use crate::validation::{validate_amount, validate_percent, validate_promo_code};

// =============================================================================
// Promotion Kind
// =============================================================================

/// How a promotion turns a subtotal into a discount.
///
/// A cap only exists on percentage promotions; the type makes a capped fixed
/// voucher unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PromotionKind {
    Percentage {
        percent: Percent,
        #[serde(rename = "maxDiscount", default)]
        max_discount: Option<Money>,
    },
    Fixed {
        amount: Money,
    },
}

impl PromotionKind {
    /// Discount for a subtotal, with no eligibility checks.
    ///
    /// Never exceeds the subtotal.
    pub fn discount_for(&self, subtotal: Money) -> Money {
        let subtotal = subtotal.floor_at_zero();
        match *self {
            PromotionKind::Fixed { amount } => amount.min(subtotal),
            PromotionKind::Percentage {
                percent,
                max_discount,
            } => {
                let raw = subtotal.percentage(percent);
                match max_discount {
                    Some(cap) => raw.min(cap),
                    None => raw,
                }
            }
        }
    }
}

// =============================================================================
// Promotion
// =============================================================================

/// A discount code with eligibility rules.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Promotion {
    code: String,
    title: String,
    kind: PromotionKind,
    min_order_subtotal: Money,
    #[ts(as = "String")]
    valid_until: NaiveDate,
    #[ts(type = "number")]
    usage_count: u64,
    active: bool,
}

impl Promotion {
    /// Creates a percentage promotion. `percent` must be in (0, 100].
    pub fn percentage(
        code: impl Into<String>,
        percent: Percent,
        min_order_subtotal: Money,
        valid_until: NaiveDate,
    ) -> CoreResult<Self> {
        validate_percent("percent", percent)?;
        if percent.is_zero() {
            return Err(ValidationError::MustBePositive {
                field: "percent".to_string(),
            }
            .into());
        }

        Self::build(
            code.into(),
            PromotionKind::Percentage {
                percent,
                max_discount: None,
            },
            min_order_subtotal,
            valid_until,
        )
    }

    /// Creates a fixed-amount promotion.
    pub fn fixed(
        code: impl Into<String>,
        amount: Money,
        min_order_subtotal: Money,
        valid_until: NaiveDate,
    ) -> CoreResult<Self> {
        validate_amount("amount", amount)?;

        Self::build(
            code.into(),
            PromotionKind::Fixed { amount },
            min_order_subtotal,
            valid_until,
        )
    }

    fn build(
        code: String,
        kind: PromotionKind,
        min_order_subtotal: Money,
        valid_until: NaiveDate,
    ) -> CoreResult<Self> {
        validate_promo_code(&code)?;
        validate_amount("min_order_subtotal", min_order_subtotal)?;

        let code = code.trim().to_string();
        Ok(Promotion {
            title: code.clone(),
            code,
            kind,
            min_order_subtotal,
            valid_until,
            usage_count: 0,
            active: true,
        })
    }

    /// Caps a percentage promotion's discount.
    pub fn with_max_discount(mut self, cap: Money) -> CoreResult<Self> {
        validate_amount("max_discount", cap)?;
        match &mut self.kind {
            PromotionKind::Percentage { max_discount, .. } => {
                *max_discount = Some(cap);
                Ok(self)
            }
            PromotionKind::Fixed { .. } => Err(ValidationError::InvalidFormat {
                field: "max_discount".to_string(),
                reason: "only percentage promotions can be capped".to_string(),
            }
            .into()),
        }
    }

    /// Sets the display title (defaults to the code).
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Starts from an existing usage count (imported vouchers).
    pub fn with_usage_count(mut self, usage_count: u64) -> Self {
        self.usage_count = usage_count;
        self
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn kind(&self) -> PromotionKind {
        self.kind
    }

    pub fn min_order_subtotal(&self) -> Money {
        self.min_order_subtotal
    }

    pub fn valid_until(&self) -> NaiveDate {
        self.valid_until
    }

    pub fn usage_count(&self) -> u64 {
        self.usage_count
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Case-insensitive code comparison.
    pub fn matches_code(&self, code: &str) -> bool {
        self.code.eq_ignore_ascii_case(code.trim())
    }

    pub(crate) fn record_use(&mut self) {
        self.usage_count += 1;
    }
}

/// Checks eligibility and computes the discount for `subtotal` on `today`.
///
/// ```rust
/// use chrono::NaiveDate;
/// use sariserve_core::{Money, Percent, Promotion};
/// use sariserve_core::promotion::evaluate;
///
/// let until = NaiveDate::from_ymd_opt(2025, 11, 15).unwrap();
/// let save15 = Promotion::percentage("SAVE15", Percent::from_whole(15), Money::from_major(200), until)?
///     .with_max_discount(Money::from_major(100))?;
///
/// let today = NaiveDate::from_ymd_opt(2025, 11, 1).unwrap();
/// assert_eq!(evaluate(&save15, Money::from_major(1000), today)?, Money::from_major(100));
/// # Ok::<(), sariserve_core::CoreError>(())
/// ```
pub fn evaluate(promo: &Promotion, subtotal: Money, today: NaiveDate) -> CoreResult<Money> {
    if subtotal < promo.min_order_subtotal {
        return Err(CoreError::BelowMinimumOrder {
            code: promo.code.clone(),
            minimum: promo.min_order_subtotal,
            subtotal,
        });
    }

    if today > promo.valid_until {
        return Err(CoreError::Expired {
            code: promo.code.clone(),
            valid_until: promo.valid_until,
        });
    }

    if !promo.active {
        return Err(CoreError::PromotionInactive(promo.code.clone()));
    }

    Ok(promo.kind.discount_for(subtotal))
}

// =============================================================================
// Applied Promotion
// =============================================================================

/// The rule a cart keeps after a successful redemption.
///
/// The discount is recomputed from the live subtotal so later quantity
/// changes are reflected; expiry and activity were checked at redemption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AppliedPromotion {
    pub code: String,
    pub kind: PromotionKind,
    pub min_order_subtotal: Money,
}

impl AppliedPromotion {
    pub(crate) fn from_promotion(promo: &Promotion) -> Self {
        AppliedPromotion {
            code: promo.code.clone(),
            kind: promo.kind,
            min_order_subtotal: promo.min_order_subtotal,
        }
    }

    /// Discount against the current subtotal; zero once the cart drops
    /// below the minimum order.
    pub fn discount_for(&self, subtotal: Money) -> Money {
        if subtotal < self.min_order_subtotal {
            Money::zero()
        } else {
            self.kind.discount_for(subtotal)
        }
    }
}

// =============================================================================
// Promotion Book
// =============================================================================

/// The store's promotions, looked up by case-insensitive code.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PromotionBook {
    promotions: Vec<Promotion>,
}

impl PromotionBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a promotion. Codes are unique ignoring case.
    pub fn insert(&mut self, promo: Promotion) -> CoreResult<()> {
        if self.find(&promo.code).is_some() {
            return Err(ValidationError::Duplicate {
                field: "code".to_string(),
                value: promo.code,
            }
            .into());
        }

        self.promotions.push(promo);
        Ok(())
    }

    pub fn find(&self, code: &str) -> Option<&Promotion> {
        self.promotions.iter().find(|p| p.matches_code(code))
    }

    pub fn find_mut(&mut self, code: &str) -> Option<&mut Promotion> {
        self.promotions.iter_mut().find(|p| p.matches_code(code))
    }

    /// Removes a promotion, returning it.
    pub fn remove(&mut self, code: &str) -> Option<Promotion> {
        let idx = self.promotions.iter().position(|p| p.matches_code(code))?;
        Some(self.promotions.remove(idx))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Promotion> {
        self.promotions.iter()
    }

    /// Promotions switched on and not yet expired on `today`.
    pub fn available_on(&self, today: NaiveDate) -> Vec<&Promotion> {
        self.promotions
            .iter()
            .filter(|p| p.active && today <= p.valid_until)
            .collect()
    }

    /// Applies the promotion with `code` to `cart`.
    pub fn redeem(&mut self, code: &str, cart: &mut Cart, today: NaiveDate) -> CoreResult<Money> {
        let promo = self
            .find_mut(code)
            .ok_or_else(|| CoreError::UnknownPromotion(code.trim().to_string()))?;

        let uses_before = promo.usage_count;
        let discount = cart.apply_promotion(promo, today)?;

        if promo.usage_count > uses_before {
            info!(code = %promo.code, discount = %discount, usage = promo.usage_count, "Promotion redeemed");
        } else {
            debug!(code = %promo.code, "Promotion already on cart");
        }
        Ok(discount)
    }
}

/// Counts shown on the promotions page's summary cards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PromotionSummary {
    pub total_promotions: usize,
    /// Switched on by the store, whether or not expired.
    pub active: usize,
    #[ts(type = "number")]
    pub total_usage: u64,
}

impl PromotionSummary {
    pub fn from_book(book: &PromotionBook) -> Self {
        book.iter().fold(PromotionSummary::default(), |mut acc, promo| {
            acc.total_promotions += 1;
            if promo.active {
                acc.active += 1;
            }
            acc.total_usage += promo.usage_count;
            acc
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn save15() -> Promotion {
        Promotion::percentage("SAVE15", Percent::from_whole(15), Money::from_major(200), date(2025, 11, 15))
            .unwrap()
            .with_max_discount(Money::from_major(100))
            .unwrap()
            .with_title("15% Off Everything")
    }

    fn welcome50() -> Promotion {
        Promotion::fixed("WELCOME50", Money::from_major(50), Money::from_major(150), date(2025, 12, 31))
            .unwrap()
    }

    #[test]
    fn test_percentage_is_capped() {
        let today = date(2025, 11, 1);
        assert_eq!(evaluate(&save15(), Money::from_major(1000), today).unwrap(), Money::from_major(100));
        assert_eq!(evaluate(&save15(), Money::from_major(400), today).unwrap(), Money::from_major(60));
    }

    #[test]
    fn test_below_minimum_order() {
        let promo = welcome50();
        let err = evaluate(&promo, Money::from_major(100), date(2025, 11, 1)).unwrap_err();
        assert!(matches!(err, CoreError::BelowMinimumOrder { .. }));
    }

    #[test]
    fn test_minimum_checked_before_expiry() {
        let err = evaluate(&save15(), Money::from_major(10), date(2026, 1, 1)).unwrap_err();
        assert!(matches!(err, CoreError::BelowMinimumOrder { .. }));
    }

    #[test]
    fn test_expired() {
        let promo = save15();
        assert!(evaluate(&promo, Money::from_major(300), date(2025, 11, 15)).is_ok());
        let err = evaluate(&promo, Money::from_major(300), date(2025, 11, 16)).unwrap_err();
        assert!(matches!(err, CoreError::Expired { .. }));
    }

    #[test]
    fn test_inactive() {
        let mut promo = welcome50();
        promo.set_active(false);
        let err = evaluate(&promo, Money::from_major(300), date(2025, 11, 1)).unwrap_err();
        assert!(matches!(err, CoreError::PromotionInactive(_)));
    }

    #[test]
    fn test_fixed_never_exceeds_subtotal() {
        let kind = PromotionKind::Fixed {
            amount: Money::from_major(50),
        };
        assert_eq!(kind.discount_for(Money::from_major(30)), Money::from_major(30));
        assert_eq!(kind.discount_for(Money::from_major(80)), Money::from_major(50));
    }

    #[test]
    fn test_constructor_validation() {
        let until = date(2025, 12, 31);
        assert!(Promotion::percentage("ZERO", Percent::from_whole(0), Money::zero(), until).is_err());
        assert!(Promotion::percentage("BIG", Percent::from_whole(101), Money::zero(), until).is_err());
        assert!(Promotion::percentage("ALL", Percent::from_whole(100), Money::zero(), until).is_ok());
        assert!(Promotion::fixed("NEG", Money::from_cents(-1), Money::zero(), until).is_err());
        assert!(Promotion::fixed("", Money::from_major(5), Money::zero(), until).is_err());
        assert!(welcome50().with_max_discount(Money::from_major(10)).is_err());
    }

    #[test]
    fn test_book_lookup_is_case_insensitive() {
        let mut book = PromotionBook::new();
        book.insert(save15()).unwrap();
        book.insert(welcome50()).unwrap();

        assert_eq!(book.find("save15").map(Promotion::code), Some("SAVE15"));
        assert_eq!(book.find(" Welcome50 ").map(Promotion::code), Some("WELCOME50"));
        assert!(book.find("NOPE").is_none());

        let dup = Promotion::fixed("Save15", Money::from_major(1), Money::zero(), date(2025, 12, 1)).unwrap();
        assert!(matches!(
            book.insert(dup),
            Err(CoreError::Validation(ValidationError::Duplicate { .. }))
        ));
    }

    #[test]
    fn test_available_on() {
        let mut book = PromotionBook::new();
        book.insert(save15()).unwrap();
        book.insert(welcome50()).unwrap();
        book.find_mut("WELCOME50").unwrap().set_active(false);

        assert_eq!(book.available_on(date(2025, 11, 1)).len(), 1);
        assert!(book.available_on(date(2025, 11, 16)).is_empty());
        assert!(book.remove("save15").is_some());
        assert_eq!(book.iter().count(), 1);
    }

    #[test]
    fn test_redeem_through_book() {
        let sisig = crate::catalog::CatalogItem::new(
            "4",
            "Sisig Rice Bowl",
            Money::from_major(120),
            "Meals",
            30,
            10,
            60,
        )
        .unwrap();
        let mut cart = Cart::new();
        cart.add_or_increment(&sisig, 2).unwrap();

        let mut book = PromotionBook::new();
        book.insert(welcome50()).unwrap();
        let today = date(2025, 11, 1);

        assert!(matches!(
            book.redeem("BOGUS", &mut cart, today),
            Err(CoreError::UnknownPromotion(_))
        ));
        assert_eq!(book.redeem("welcome50", &mut cart, today).unwrap(), Money::from_major(50));
        assert_eq!(book.find("WELCOME50").unwrap().usage_count(), 1);
        assert_eq!(cart.total(), Money::from_major(190));
    }

    #[derive(Clone, Default)]
    struct CapturedLog(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_reapplying_logs_one_redemption() {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .finish();

        let kwek = crate::catalog::CatalogItem::new(
            "6",
            "Kwek-Kwek Tray",
            Money::from_major(160),
            "Street Food",
            20,
            5,
            40,
        )
        .unwrap();
        let mut cart = Cart::new();
        cart.add_or_increment(&kwek, 1).unwrap();
        let mut book = PromotionBook::new();
        book.insert(welcome50()).unwrap();
        let today = date(2025, 11, 1);

        tracing::subscriber::with_default(subscriber, || {
            book.redeem("WELCOME50", &mut cart, today).unwrap();
            book.redeem("WELCOME50", &mut cart, today).unwrap();
        });

        let output = String::from_utf8(log.0.lock().unwrap().clone()).unwrap();
        assert_eq!(output.matches("Promotion redeemed").count(), 1, "{output}");
        assert_eq!(book.find("WELCOME50").unwrap().usage_count(), 1);
    }

    #[test]
    fn test_summary_cards() {
        let mut book = PromotionBook::new();
        assert_eq!(PromotionSummary::from_book(&book), PromotionSummary::default());

        let freedel = Promotion::fixed("FREEDEL", Money::from_major(20), Money::from_major(100), date(2025, 11, 30))
            .unwrap()
            .with_usage_count(142);
        book.insert(freedel).unwrap();
        book.insert(save15().with_usage_count(89)).unwrap();
        book.insert(welcome50().with_usage_count(234)).unwrap();
        book.find_mut("SAVE15").unwrap().set_active(false);

        let summary = PromotionSummary::from_book(&book);
        assert_eq!(summary.total_promotions, 3);
        assert_eq!(summary.active, 2);
        assert_eq!(summary.total_usage, 465);
        assert_eq!(
            serde_json::to_value(&summary).unwrap(),
            serde_json::json!({ "totalPromotions": 3, "active": 2, "totalUsage": 465 })
        );
    }

    #[test]
    fn test_kind_wire_format() {
        let json = serde_json::to_value(save15().kind()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "type": "percentage", "percent": 1500, "maxDiscount": 10000 })
        );
    }
}
