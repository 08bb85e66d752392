//! # Money Module
//!
//! `Money` for peso amounts and `Percent` for discount rates.
//!
//! ## Why Integer Centavos?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  The storefront shows ₱15 × (1 - 10/100) = ₱13.50                       │
//! │                                                                         │
//! │  In floating point, 15 * 0.9 = 13.500000000000002                       │
//! │  Summed over a cart and compared against the ₱100 free-delivery         │
//! │  threshold, that drift decides whether a customer pays ₱20.             │
//! │                                                                         │
//! │  OUR SOLUTION: i64 centavos, percentages in basis points               │
//! │    1500 centavos × 1000 bps / 10000 = 150 centavos off                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use sariserve_core::money::{Money, Percent};
//!
//! let price = Money::from_major(85);           // ₱85.00
//! let line = price * 2;                        // ₱170.00
//! let off = line.percentage(Percent::from_whole(15));
//! assert_eq!(off, Money::from_major_minor(25, 50));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use std::iter::Sum;
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in centavos.
///
/// ## Design Decisions
/// - **i64 (signed)**: intermediate results like `subtotal + fee - discount`
///   may dip below zero before flooring
/// - **Single field tuple struct**: serializes as a bare integer
///
/// ## Where Money is Used
/// ```text
/// CatalogItem.unit_price ──► CartLine.unit_price ──► CartLine.line_total
///                                                         │
///       Cart.subtotal ◄───────────────────────────────────┘
///            │
///            ├──► delivery fee (threshold) ──┐
///            ├──► promotion discount ────────┼──► Cart.total ──► Order.total
///            └───────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(#[ts(type = "number")] i64);

impl Money {
    /// Creates a Money value from centavos.
    ///
    /// ```rust
    /// use sariserve_core::money::Money;
    ///
    /// let price = Money::from_cents(1350); // ₱13.50
    /// assert_eq!(price.cents(), 1350);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole pesos.
    ///
    /// ```rust
    /// use sariserve_core::money::Money;
    ///
    /// assert_eq!(Money::from_major(100).cents(), 10_000);
    /// ```
    #[inline]
    pub const fn from_major(pesos: i64) -> Self {
        Money(pesos * 100)
    }

    /// Creates a Money value from pesos and centavos.
    ///
    /// For negative amounts only the major unit carries the sign:
    /// `from_major_minor(-5, 50)` is -₱5.50.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in centavos.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-peso portion.
    #[inline]
    pub const fn pesos(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the centavo portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Clamps negative values to zero.
    #[inline]
    pub const fn floor_at_zero(self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            self
        }
    }

    /// Returns `rate` of this amount, rounded half up to the centavo.
    ///
    /// ## Implementation
    /// `(amount * bps + 5000) / 10000` in i128, so large subtotals cannot
    /// overflow mid-calculation.
    ///
    /// ```rust
    /// use sariserve_core::money::{Money, Percent};
    ///
    /// let subtotal = Money::from_major(1000);
    /// assert_eq!(subtotal.percentage(Percent::from_whole(15)), Money::from_major(150));
    /// ```
    pub fn percentage(&self, rate: Percent) -> Money {
        let part = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money(part as i64)
    }

    /// Multiplies by a line quantity.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-oriented rendering; the frontend formats for display itself.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}₱{}.{:02}", sign, self.pesos().abs(), self.cents_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Percent
// =============================================================================

/// A percentage in basis points (1 bps = 0.01%).
///
/// ## Why Basis Points?
/// Catalog discounts and vouchers are entered as whole percentages today, but
/// a "12.5% off" voucher should not need a schema change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Percent(u32);

impl Percent {
    /// 100%.
    pub const FULL: Percent = Percent(10_000);

    /// Creates a percentage from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Percent(bps)
    }

    /// Creates a percentage from a whole number (`15` = 15%).
    #[inline]
    pub const fn from_whole(pct: u32) -> Self {
        Percent(pct * 100)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Checks if the rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 100 == 0 {
            write!(f, "{}%", self.0 / 100)
        } else {
            write!(f, "{}.{:02}%", self.0 / 100, self.0 % 100)
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        assert_eq!(Money::from_major(15).cents(), 1500);
        assert_eq!(Money::from_major_minor(245, 50).cents(), 24550);
        assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(24550).to_string(), "₱245.50");
        assert_eq!(Money::from_cents(0).to_string(), "₱0.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-₱5.50");
        assert_eq!(Percent::from_whole(15).to_string(), "15%");
        assert_eq!(Percent::from_bps(1250).to_string(), "12.50%");
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let a = Money::from_major(65);
        let b = Money::from_major(15);

        assert_eq!(a + b, Money::from_major(80));
        assert_eq!(a - b, Money::from_major(50));
        assert_eq!(b * 2, Money::from_major(30));
        assert_eq!(b.multiply_quantity(3), Money::from_major(45));

        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total, Money::from_major(95));
    }

    #[test]
    fn test_floor_at_zero() {
        assert_eq!(Money::from_cents(-1).floor_at_zero(), Money::zero());
        assert_eq!(Money::from_cents(1).floor_at_zero(), Money::from_cents(1));
    }

    #[test]
    fn test_percentage_rounds_half_up() {
        // ₱15.00 at 10% = ₱1.50
        assert_eq!(
            Money::from_major(15).percentage(Percent::from_whole(10)),
            Money::from_cents(150)
        );
        // ₱0.05 at 10% = 0.5 centavo -> 1 centavo
        assert_eq!(
            Money::from_cents(5).percentage(Percent::from_whole(10)),
            Money::from_cents(1)
        );
        assert_eq!(
            Money::from_major(40).percentage(Percent::FULL),
            Money::from_major(40)
        );
    }

    #[test]
    fn test_serializes_as_bare_integer() {
        assert_eq!(Money::inline(), "number");
        let json = serde_json::to_string(&Money::from_major(20)).unwrap();
        assert_eq!(json, "2000");
        let pct: Percent = serde_json::from_str("1500").unwrap();
        assert_eq!(pct, Percent::from_whole(15));
    }
}
