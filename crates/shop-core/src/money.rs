//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    2500 * 0.08 = 200.00000000000003                                     │
//! │                                                                         │
//! │  A checkout page that recomputes on every keystroke accumulates these   │
//! │  errors into totals that disagree with the order record.                │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units (poisha / cents)                     │
//! │    250000 minor * 800 bps / 10000 = 20000 minor = 200.00                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use shop_core::money::Money;
//!
//! let price = Money::from_minor(109_900); // 1099.00
//! let doubled = price * 2_u32;
//! let total = price + Money::from_major(50);
//! assert_eq!(doubled.minor_units(), 219_800);
//! assert_eq!(total.minor_units(), 114_900);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::types::TaxRate;

/// Number of minor units in one major unit.
pub const MINOR_PER_MAJOR: i64 = 100;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// ## Design Decisions
/// - **i64 (signed)**: subtraction never panics on underflow of a total
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Serialized as a bare integer**: local storage and the remote API both
///   carry minor units
/// - **Saturating arithmetic**: operators clamp at the i64 bounds instead of
///   panicking; validation keeps real amounts far below them
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Creates a Money value from whole major units.
    ///
    /// ```rust
    /// use shop_core::money::Money;
    ///
    /// assert_eq!(Money::from_major(80).minor_units(), 8000);
    /// ```
    #[inline]
    pub const fn from_major(major: i64) -> Self {
        Money(major.saturating_mul(MINOR_PER_MAJOR))
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor_units(&self) -> i64 {
        self.0
    }

    /// Returns the whole major-unit portion (truncated toward zero).
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / MINOR_PER_MAJOR
    }

    /// Returns the minor-unit portion (always 0-99).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.0 % MINOR_PER_MAJOR).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Calculates tax at a flat rate, rounding half up to the minor unit.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000`. The +5000 provides the
    /// rounding (5000/10000 = 0.5). Amounts that are whole major units and
    /// rates that are whole percents never round.
    ///
    /// ```rust
    /// use shop_core::money::Money;
    /// use shop_core::types::TaxRate;
    ///
    /// let subtotal = Money::from_major(2500);
    /// let tax = subtotal.calculate_tax(TaxRate::from_bps(800));
    /// assert_eq!(tax, Money::from_major(200));
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        // i128 keeps large carts from overflowing before the division
        let tax = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_minor(tax.clamp(i64::MIN as i128, i64::MAX as i128) as i64)
    }

    /// Multiplies a unit price by a line quantity.
    #[inline]
    pub const fn multiply_quantity(&self, qty: u32) -> Self {
        Money(self.0.saturating_mul(qty as i64))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain two-decimal rendering without a currency symbol.
///
/// The symbol is a storefront setting; see `PricingConfig::format_money`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor_part())
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Mul<u32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: u32) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

/// Parses a decimal amount in major units: `"2500"`, `"2500.5"`, `"-12.05"`.
///
/// At most two fractional digits; no exponent or grouping separators.
impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: format!("'{}' is not a decimal amount with up to 2 decimals", s),
        };

        let trimmed = s.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let (major, minor) = match digits.split_once('.') {
            Some((major, minor)) => (major, minor),
            None => (digits, ""),
        };

        let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if major.is_empty() || minor.len() > 2 || !all_digits(major) || !all_digits(minor) {
            return Err(invalid());
        }

        let major: i64 = major.parse().map_err(|_| invalid())?;
        let minor: i64 = match minor.len() {
            0 => 0,
            1 => minor.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => minor.parse().map_err(|_| invalid())?,
        };

        let total = major
            .checked_mul(MINOR_PER_MAJOR)
            .and_then(|m| m.checked_add(minor))
            .ok_or_else(invalid)?;

        Ok(Money(if negative { -total } else { total }))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_major_and_minor() {
        let money = Money::from_minor(109_950);
        assert_eq!(money.major(), 1099);
        assert_eq!(money.minor_part(), 50);
        assert_eq!(Money::from_major(25).minor_units(), 2500);
    }

    #[test]
    fn test_parse() {
        assert_eq!("2500".parse::<Money>().unwrap(), Money::from_major(2500));
        assert_eq!("2500.5".parse::<Money>().unwrap(), Money::from_minor(250_050));
        assert_eq!(" 12.05 ".parse::<Money>().unwrap(), Money::from_minor(1205));
        assert_eq!("-3.10".parse::<Money>().unwrap(), Money::from_minor(-310));
        assert!("".parse::<Money>().is_err());
        assert!("1.234".parse::<Money>().is_err());
        assert!("1e3".parse::<Money>().is_err());
        assert!(".50".parse::<Money>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_minor(109_950).to_string(), "1099.50");
        assert_eq!(Money::from_major(5).to_string(), "5.00");
        assert_eq!(Money::from_minor(-550).to_string(), "-5.50");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_major(10);
        let b = Money::from_major(5);

        assert_eq!((a + b).minor_units(), 1500);
        assert_eq!((a - b).minor_units(), 500);
        assert_eq!((a * 3u32).minor_units(), 3000);

        let mut c = a;
        c += b;
        c -= Money::from_major(1);
        assert_eq!(c, Money::from_major(14));
    }

    #[test]
    fn test_arithmetic_saturates_instead_of_overflowing() {
        let huge = Money::from_minor(5_000_000_000_000_000_000);

        assert_eq!(huge.multiply_quantity(2), Money::from_minor(i64::MAX));
        assert_eq!(huge + huge, Money::from_minor(i64::MAX));
        assert_eq!(Money::from_minor(i64::MIN) - huge, Money::from_minor(i64::MIN));

        let total: Money = [huge, huge, Money::from_major(1)].into_iter().sum();
        assert_eq!(total, Money::from_minor(i64::MAX));

        let tax = Money::from_minor(i64::MAX).calculate_tax(TaxRate::from_bps(20_000));
        assert_eq!(tax, Money::from_minor(i64::MAX));
    }

    #[test]
    fn test_sum() {
        let total: Money = [Money::from_major(1), Money::from_major(2), Money::from_minor(50)]
            .into_iter()
            .sum();
        assert_eq!(total.minor_units(), 350);
    }

    #[test]
    fn test_tax_whole_amounts_are_exact() {
        let tax = Money::from_major(2500).calculate_tax(TaxRate::from_bps(800));
        assert_eq!(tax, Money::from_major(200));
    }

    #[test]
    fn test_tax_rounds_half_up() {
        // 10.00 at 8.25% = 0.825 -> 0.83
        let tax = Money::from_major(10).calculate_tax(TaxRate::from_bps(825));
        assert_eq!(tax.minor_units(), 83);
    }

    #[test]
    fn test_zero_and_sign_checks() {
        assert!(Money::zero().is_zero());
        assert!(Money::from_minor(1).is_positive());
        assert!(Money::from_minor(-1).is_negative());
    }

    #[test]
    fn test_serializes_as_integer() {
        let json = serde_json::to_string(&Money::from_minor(8000)).unwrap();
        assert_eq!(json, "8000");
    }
}
