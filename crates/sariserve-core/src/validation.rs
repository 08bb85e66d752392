//! # Validation Module
//!
//! Field checks applied when raw admin input becomes a domain value.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend forms                                                │
//! │  ├── Empty / length checks for immediate feedback                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                   │
//! │  ├── Called by CatalogItem::new, Promotion constructors, config         │
//! │  └── A value that passes here can never violate a domain invariant      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use sariserve_core::validation::{validate_promo_code, validate_stock_bounds};
//!
//! assert!(validate_promo_code("SAVE15").is_ok());
//! assert!(validate_stock_bounds(10, 50).is_ok());
//! assert!(validate_stock_bounds(10, 0).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::{Money, Percent};
use crate::MAX_MONEY_AMOUNT;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum promo code length.
const MAX_PROMO_CODE_LEN: usize = 32;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a catalog item id.
pub fn validate_item_id(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    Ok(())
}

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty
/// - At most 200 characters
pub fn validate_item_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a promo code.
///
/// ## Rules
/// - Must not be empty
/// - At most 32 characters
/// - Letters and digits only (codes are typed by customers)
pub fn validate_promo_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    if code.len() > MAX_PROMO_CODE_LEN {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: MAX_PROMO_CODE_LEN,
        });
    }

    if !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must contain only letters and digits".to_string(),
        });
    }

    Ok(())
}

/// Normalizes a search box query: trimmed, lowercased, at most 100 chars.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_lowercase())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a money amount in `0..=MAX_MONEY_AMOUNT`.
pub fn validate_amount(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() || amount > MAX_MONEY_AMOUNT {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_MONEY_AMOUNT.cents(),
        });
    }

    Ok(())
}

/// Validates a percentage in `0..=100%`.
pub fn validate_percent(field: &str, pct: Percent) -> ValidationResult<()> {
    if pct > Percent::FULL {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: 100,
        });
    }

    Ok(())
}

/// Validates stock bounds.
///
/// ## Rules
/// - `max_stock` must be positive (classification divides by it)
/// - `min_stock` must not exceed `max_stock`
pub fn validate_stock_bounds(min_stock: u32, max_stock: u32) -> ValidationResult<()> {
    if max_stock == 0 {
        return Err(ValidationError::MustBePositive {
            field: "max_stock".to_string(),
        });
    }

    if min_stock > max_stock {
        return Err(ValidationError::OutOfRange {
            field: "min_stock".to_string(),
            min: 0,
            max: i64::from(max_stock),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_item_name() {
        assert!(validate_item_name("Argentina Corned Beef").is_ok());
        assert!(validate_item_name("").is_err());
        assert!(validate_item_name("   ").is_err());
        assert!(validate_item_name(&"A".repeat(201)).is_err());
    }

    #[test]
    fn test_validate_promo_code() {
        assert!(validate_promo_code("FREEDEL").is_ok());
        assert!(validate_promo_code("WELCOME50").is_ok());

        assert!(validate_promo_code("").is_err());
        assert!(validate_promo_code("SAVE 15").is_err());
        assert!(validate_promo_code(&"X".repeat(33)).is_err());
    }

    #[test]
    fn test_validate_search_query() {
        assert_eq!(validate_search_query("  Coca ").unwrap(), "coca");
        assert_eq!(validate_search_query("").unwrap(), "");
        assert!(validate_search_query(&"q".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_amount_and_percent() {
        assert!(validate_amount("price", Money::zero()).is_ok());
        assert!(validate_amount("price", Money::from_cents(-1)).is_err());
        assert!(validate_amount("price", MAX_MONEY_AMOUNT).is_ok());
        assert!(matches!(
            validate_amount("price", MAX_MONEY_AMOUNT + Money::from_cents(1)),
            Err(ValidationError::OutOfRange { max: 1_000_000_000, .. })
        ));

        assert!(validate_percent("discount", Percent::from_whole(100)).is_ok());
        assert!(validate_percent("discount", Percent::from_bps(10_001)).is_err());
    }

    #[test]
    fn test_validate_stock_bounds() {
        assert!(validate_stock_bounds(0, 1).is_ok());
        assert!(validate_stock_bounds(50, 50).is_ok());

        assert!(matches!(
            validate_stock_bounds(0, 0),
            Err(ValidationError::MustBePositive { .. })
        ));
        assert!(matches!(
            validate_stock_bounds(60, 50),
            Err(ValidationError::OutOfRange { .. })
        ));
    }
}
