//! # Domain Types
//!
//! Core value types shared by pricing and the cart/wishlist collections.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    TaxRate      │   │  ShippingTier   │   │      Zone       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  bps (u32)      │   │  Standard       │   │  Local          │       │
//! │  │  800 = 8%       │   │  Express        │   │  Remote         │       │
//! │  └─────────────────┘   │  Priority       │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │ ProductSummary  │   │  OwnerContext   │                             │
//! │  │  ─────────────  │   │  ─────────────  │                             │
//! │  │  id, name       │   │  Guest          │                             │
//! │  │  price, images  │   │  Authenticated  │                             │
//! │  │  in_stock       │   │   (AccountId)   │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::validation::{validate_account_id, ValidationResult};

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01%, so 800 bps = 8%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }
}

// =============================================================================
// Shipping Tier
// =============================================================================

/// Customer-selected shipping speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ShippingTier {
    #[default]
    Standard,
    Express,
    Priority,
}

impl ShippingTier {
    pub const ALL: [ShippingTier; 3] = [
        ShippingTier::Standard,
        ShippingTier::Express,
        ShippingTier::Priority,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ShippingTier::Standard => "standard",
            ShippingTier::Express => "express",
            ShippingTier::Priority => "priority",
        }
    }
}

impl fmt::Display for ShippingTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShippingTier {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Ok(ShippingTier::Standard),
            "express" => Ok(ShippingTier::Express),
            "priority" => Ok(ShippingTier::Priority),
            _ => Err(ValidationError::NotAllowed {
                field: "shipping tier".to_string(),
                allowed: ShippingTier::ALL.iter().map(|t| t.to_string()).collect(),
            }),
        }
    }
}

// =============================================================================
// Zone
// =============================================================================

/// Shipping zone of a destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    /// The designated low-cost region.
    Local,
    /// Every other destination.
    Remote,
}

// =============================================================================
// Product Summary
// =============================================================================

/// The product payload handed to the cart and wishlist.
///
/// Cart lines and wishlist entries copy what they need from this at add
/// time, so later catalog edits do not change what the customer saw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: String,
    pub name: String,
    pub price: Money,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
}

fn default_in_stock() -> bool {
    true
}

impl ProductSummary {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: Money) -> Self {
        ProductSummary {
            id: id.into(),
            name: name.into(),
            price,
            images: Vec::new(),
            in_stock: true,
        }
    }

    pub fn with_images(mut self, images: Vec<String>) -> Self {
        self.images = images;
        self
    }

    pub fn out_of_stock(mut self) -> Self {
        self.in_stock = false;
        self
    }
}

// =============================================================================
// Owner Context
// =============================================================================

/// Opaque account identifier issued by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AccountId(String);

impl AccountId {
    /// Wraps an id without checking it. Use [`parse`](Self::parse) for
    /// untrusted input.
    pub fn new(id: impl Into<String>) -> Self {
        AccountId(id.into())
    }

    /// Trims and validates an id from the auth provider or the command line.
    pub fn parse(id: &str) -> ValidationResult<Self> {
        let id = id.trim();
        validate_account_id(id)?;
        Ok(AccountId(id.to_string()))
    }

    pub fn validate(&self) -> ValidationResult<()> {
        validate_account_id(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity boundary that decides which backend owns cart/wishlist state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", content = "accountId", rename_all = "snake_case")]
pub enum OwnerContext {
    /// Anonymous visitor; state lives in local storage.
    #[default]
    Guest,
    /// Signed-in customer; state lives behind the remote API.
    Authenticated(AccountId),
}

impl OwnerContext {
    pub fn is_guest(&self) -> bool {
        matches!(self, OwnerContext::Guest)
    }

    pub fn account(&self) -> Option<&AccountId> {
        match self {
            OwnerContext::Guest => None,
            OwnerContext::Authenticated(account) => Some(account),
        }
    }
}

impl fmt::Display for OwnerContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OwnerContext::Guest => f.write_str("guest"),
            OwnerContext::Authenticated(account) => write!(f, "account:{}", account),
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
    fn test_tax_rate_from_bps() {
        let rate = TaxRate::from_bps(800);
        assert_eq!(rate.bps(), 800);
        assert!((rate.percentage() - 8.0).abs() < 0.001);
    }

    #[test]
    fn test_shipping_tier_parsing() {
        assert_eq!("express".parse::<ShippingTier>().unwrap(), ShippingTier::Express);
        assert_eq!(" Priority ".parse::<ShippingTier>().unwrap(), ShippingTier::Priority);
        assert_eq!("STANDARD".parse::<ShippingTier>().unwrap(), ShippingTier::Standard);
        assert!("overnight".parse::<ShippingTier>().is_err());
    }

    #[test]
    fn test_shipping_tier_default_is_standard() {
        assert_eq!(ShippingTier::default(), ShippingTier::Standard);
    }

    #[test]
    fn test_owner_context_display() {
        assert_eq!(OwnerContext::Guest.to_string(), "guest");
        let owner = OwnerContext::Authenticated(AccountId::new("u-42"));
        assert_eq!(owner.to_string(), "account:u-42");
        assert_eq!(owner.account().map(AccountId::as_str), Some("u-42"));
    }

    #[test]
    fn test_account_id_parse() {
        assert_eq!(AccountId::parse(" u-1 ").unwrap().as_str(), "u-1");
        assert!(AccountId::parse("   ").is_err());
        assert!(AccountId::parse("a/b").is_err());
        assert!(AccountId::new("").validate().is_err());
    }

    #[test]
    fn test_product_summary_defaults_in_stock() {
        let json = r#"{"id":"p1","name":"Kurta","price":150000}"#;
        let product: ProductSummary = serde_json::from_str(json).unwrap();
        assert!(product.in_stock);
        assert!(product.images.is_empty());
    }
}
