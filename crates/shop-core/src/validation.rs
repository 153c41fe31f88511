//! # Validation Module
//!
//! Input validation for products entering the cart/wishlist, quantities,
//! pricing settings and checkout addresses.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Storefront UI                                                │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Store boundary (Rust)                                        │
//! │  ├── Remote payload parsing (serde)                                    │
//! │  └── THIS MODULE: Business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Remote API                                                   │
//! │  └── Server-side schema checks                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_LINE_QUANTITY, MAX_ORDER_AMOUNT, MAX_UNIT_PRICE};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Ensures a trimmed field is non-empty and at most `max` characters.
pub fn validate_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a product identifier (the collection key).
///
/// ## Rules
/// - Must not be empty
/// - At most 64 characters
/// - No whitespace (ids end up in remote API paths)
///
/// ```rust
/// use shop_core::validation::validate_product_id;
///
/// assert!(validate_product_id("64f1c2a9e1").is_ok());
/// assert!(validate_product_id("").is_err());
/// assert!(validate_product_id("has space").is_err());
/// ```
pub fn validate_product_id(id: &str) -> ValidationResult<()> {
    validate_text("product id", id, 64)?;

    if id.chars().any(|c| c.is_whitespace() || c == '/') {
        return Err(ValidationError::InvalidFormat {
            field: "product id".to_string(),
            reason: "must not contain whitespace or '/'".to_string(),
        });
    }

    Ok(())
}

/// Validates an account id: 1-128 characters, no whitespace or '/'.
///
/// The id becomes a path segment of every remote collection URL.
pub fn validate_account_id(id: &str) -> ValidationResult<()> {
    if id.trim().len() != id.len() {
        return Err(ValidationError::InvalidFormat {
            field: "account id".to_string(),
            reason: "must not have surrounding whitespace".to_string(),
        });
    }
    validate_text("account id", id, 128)?;

    if id.chars().any(|c| c.is_whitespace() || c == '/') {
        return Err(ValidationError::InvalidFormat {
            field: "account id".to_string(),
            reason: "must not contain whitespace or '/'".to_string(),
        });
    }

    Ok(())
}

/// Validates a product display name (1-200 characters).
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    validate_text("name", name, 200)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a requested line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_LINE_QUANTITY (999)
pub fn validate_quantity(qty: u32) -> ValidationResult<()> {
    if qty == 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY as i64,
        });
    }

    Ok(())
}

/// Validates a price (zero allowed for free items, never negative, at most
/// [`MAX_UNIT_PRICE`]).
///
/// ```rust
/// use shop_core::money::Money;
/// use shop_core::validation::validate_price;
///
/// assert!(validate_price(Money::from_major(10)).is_ok());
/// assert!(validate_price(Money::zero()).is_ok());
/// assert!(validate_price(Money::from_minor(-1)).is_err());
/// assert!(validate_price(Money::from_minor(i64::MAX)).is_err());
/// ```
pub fn validate_price(price: Money) -> ValidationResult<()> {
    validate_amount("price", price, MAX_UNIT_PRICE)
}

/// Validates an order-level amount such as a quoted subtotal.
pub fn validate_order_amount(amount: Money) -> ValidationResult<()> {
    validate_amount("subtotal", amount, MAX_ORDER_AMOUNT)
}

fn validate_amount(field: &str, amount: Money, max: Money) -> ValidationResult<()> {
    if amount.is_negative() || amount > max {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: max.minor_units(),
        });
    }

    Ok(())
}

/// Validates a tax rate in basis points (0% to 100%).
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10000 {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: 0,
            max: 10000,
        });
    }

    Ok(())
}

// =============================================================================
// Address Validators
// =============================================================================

/// Validates a phone number: digits with an optional leading '+', 6-20 long.
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    let phone = phone.trim();
    validate_text("phone", phone, 20)?;

    let digits = phone.strip_prefix('+').unwrap_or(phone);
    if digits.len() < 6 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must be 6-20 digits with an optional leading '+'".to_string(),
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
    fn test_validate_product_id() {
        assert!(validate_product_id("64f1c2a9e1").is_ok());
        assert!(validate_product_id("sku_01-a").is_ok());

        assert!(validate_product_id("").is_err());
        assert!(validate_product_id("   ").is_err());
        assert!(validate_product_id("a/b").is_err());
        assert!(validate_product_id(&"x".repeat(65)).is_err());
    }

    #[test]
    fn test_validate_account_id() {
        assert!(validate_account_id("u-1").is_ok());
        assert!(validate_account_id("auth0|64f1c2").is_ok());

        assert!(validate_account_id("").is_err());
        assert!(validate_account_id("  ").is_err());
        assert!(validate_account_id(" u-1").is_err());
        assert!(validate_account_id("u/1").is_err());
        assert!(validate_account_id(&"u".repeat(129)).is_err());
    }

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("Jamdani Saree").is_ok());
        assert!(validate_product_name("").is_err());
        assert!(validate_product_name(&"A".repeat(201)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_price_bounds() {
        assert!(validate_price(MAX_UNIT_PRICE).is_ok());
        assert!(validate_price(MAX_UNIT_PRICE + Money::from_minor(1)).is_err());
        assert!(validate_price(Money::from_minor(5_000_000_000_000_000_000)).is_err());
    }

    #[test]
    fn test_validate_order_amount() {
        assert!(validate_order_amount(Money::from_major(2500)).is_ok());
        assert!(validate_order_amount(MAX_ORDER_AMOUNT).is_ok());
        assert!(validate_order_amount(Money::from_minor(-1)).is_err());
        assert!(validate_order_amount(Money::from_minor(i64::MAX)).is_err());
    }

    #[test]
    fn test_validate_tax_rate_bps() {
        assert!(validate_tax_rate_bps(0).is_ok());
        assert!(validate_tax_rate_bps(800).is_ok());
        assert!(validate_tax_rate_bps(10000).is_ok());
        assert!(validate_tax_rate_bps(10001).is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("+8801712345678").is_ok());
        assert!(validate_phone("01712345678").is_ok());
        assert!(validate_phone("12ab").is_err());
        assert!(validate_phone("").is_err());
    }
}
