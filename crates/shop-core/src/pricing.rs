//! # Pricing Engine
//!
//! Shipping, tax and total for the checkout page.
//!
//! ## Quote Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Checkout form change (city typed / tier picked / quantity edited)      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  classify(city) ──► Local | Remote                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  base_cost:  subtotal >= threshold ? 0 : rate(zone)                     │
//! │  surcharge:  standard 0 │ express E │ priority P                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  shipping = base_cost + surcharge                                       │
//! │  tax      = subtotal × tax_rate                                         │
//! │  total    = subtotal + shipping + tax                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Free shipping waives the zone base rate only. Express and priority
//! surcharges are always charged.
//!
//! ## Example
//! ```rust
//! use shop_core::money::Money;
//! use shop_core::pricing::{PricingConfig, PricingEngine};
//! use shop_core::types::ShippingTier;
//!
//! let engine = PricingEngine::new(PricingConfig::default());
//! let totals = engine.checkout(Money::from_major(2500), "Dhaka", ShippingTier::Express);
//!
//! assert_eq!(totals.shipping.total_shipping_cost, Money::from_major(130));
//! assert_eq!(totals.tax, Money::from_major(200));
//! assert_eq!(totals.total, Money::from_major(2830));
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::collection::{cart_subtotal, CartLine};
use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{ShippingTier, TaxRate, Zone};
use crate::validation::{validate_price, validate_tax_rate_bps, ValidationResult};
use crate::zone::{CityListClassifier, MarkerZoneClassifier, ZoneClassifier, ZoneClassifierKind};

// =============================================================================
// Configuration
// =============================================================================

/// Storefront pricing settings.
///
/// Money fields are in minor units, matching the `Money` wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Subtotal at or above which the zone base rate is waived.
    #[serde(default = "default_free_shipping_threshold")]
    pub free_shipping_threshold: Money,

    /// How destination cities map to zones.
    #[serde(default)]
    pub zone_classifier: ZoneClassifierKind,

    /// Token whose presence in the city text marks the local zone.
    #[serde(default = "default_local_zone_marker")]
    pub local_zone_marker: String,

    /// Exact local-zone city names, used by `zone_classifier = "city_list"`.
    #[serde(default)]
    pub local_zone_cities: Vec<String>,

    #[serde(default = "default_local_zone_base_rate")]
    pub local_zone_base_rate: Money,

    #[serde(default = "default_remote_zone_base_rate")]
    pub remote_zone_base_rate: Money,

    #[serde(default = "default_express_surcharge")]
    pub express_surcharge: Money,

    #[serde(default = "default_priority_surcharge")]
    pub priority_surcharge: Money,

    /// Flat tax rate in basis points (800 = 8%).
    #[serde(default = "default_tax_rate_bps")]
    pub tax_rate_bps: u32,

    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

fn default_free_shipping_threshold() -> Money {
    Money::from_major(3000)
}
fn default_local_zone_marker() -> String {
    "dhaka".to_string()
}
fn default_local_zone_base_rate() -> Money {
    Money::from_major(80)
}
fn default_remote_zone_base_rate() -> Money {
    Money::from_major(150)
}
fn default_express_surcharge() -> Money {
    Money::from_major(50)
}
fn default_priority_surcharge() -> Money {
    Money::from_major(100)
}
fn default_tax_rate_bps() -> u32 {
    800
}
fn default_currency_symbol() -> String {
    "৳".to_string()
}

impl Default for PricingConfig {
    fn default() -> Self {
        PricingConfig {
            free_shipping_threshold: default_free_shipping_threshold(),
            zone_classifier: ZoneClassifierKind::default(),
            local_zone_marker: default_local_zone_marker(),
            local_zone_cities: Vec::new(),
            local_zone_base_rate: default_local_zone_base_rate(),
            remote_zone_base_rate: default_remote_zone_base_rate(),
            express_surcharge: default_express_surcharge(),
            priority_surcharge: default_priority_surcharge(),
            tax_rate_bps: default_tax_rate_bps(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

impl PricingConfig {
    /// Checks the rates are usable.
    ///
    /// ## Rules
    /// - All money settings non-negative
    /// - `0 < express_surcharge < priority_surcharge`
    /// - Tax rate at most 100%
    /// - Marker non-empty, or at least one city for the city-list classifier
    pub fn validate(&self) -> ValidationResult<()> {
        validate_price(self.free_shipping_threshold)?;
        validate_price(self.local_zone_base_rate)?;
        validate_price(self.remote_zone_base_rate)?;
        validate_tax_rate_bps(self.tax_rate_bps)?;

        match self.zone_classifier {
            ZoneClassifierKind::Marker if self.local_zone_marker.trim().is_empty() => {
                return Err(ValidationError::Required {
                    field: "local_zone_marker".to_string(),
                });
            }
            ZoneClassifierKind::CityList
                if self.local_zone_cities.iter().all(|c| c.trim().is_empty()) =>
            {
                return Err(ValidationError::Required {
                    field: "local_zone_cities".to_string(),
                });
            }
            _ => {}
        }

        if !self.express_surcharge.is_positive() {
            return Err(ValidationError::MustBePositive {
                field: "express_surcharge".to_string(),
            });
        }

        if self.priority_surcharge <= self.express_surcharge {
            return Err(ValidationError::InvalidFormat {
                field: "priority_surcharge".to_string(),
                reason: "must be greater than express_surcharge".to_string(),
            });
        }

        Ok(())
    }

    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.tax_rate_bps)
    }

    /// Surcharge for a tier; strictly increasing standard < express < priority.
    pub fn surcharge(&self, tier: ShippingTier) -> Money {
        match tier {
            ShippingTier::Standard => Money::zero(),
            ShippingTier::Express => self.express_surcharge,
            ShippingTier::Priority => self.priority_surcharge,
        }
    }

    pub fn base_rate(&self, zone: Zone) -> Money {
        match zone {
            Zone::Local => self.local_zone_base_rate,
            Zone::Remote => self.remote_zone_base_rate,
        }
    }

    /// Formats an amount with the storefront currency symbol.
    ///
    /// ```rust
    /// use shop_core::money::Money;
    /// use shop_core::pricing::PricingConfig;
    ///
    /// let config = PricingConfig::default();
    /// assert_eq!(config.format_money(Money::from_minor(283050)), "৳2830.50");
    /// ```
    pub fn format_money(&self, amount: Money) -> String {
        if amount.is_negative() {
            format!("-{}{}", self.currency_symbol, Money::from_minor(-amount.minor_units()))
        } else {
            format!("{}{}", self.currency_symbol, amount)
        }
    }
}

// =============================================================================
// Quotes
// =============================================================================

/// Derived shipping cost; recomputed on every change, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ShippingQuote {
    pub base_cost: Money,
    pub tier_surcharge: Money,
    pub total_shipping_cost: Money,
    pub free_shipping_applied: bool,
}

/// Everything the checkout summary shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutTotals {
    pub subtotal: Money,
    pub zone: Zone,
    pub tier: ShippingTier,
    pub shipping: ShippingQuote,
    pub tax: Money,
    pub total: Money,
}

// =============================================================================
// Engine
// =============================================================================

/// Pure pricing functions over a fixed configuration.
pub struct PricingEngine {
    config: PricingConfig,
    classifier: Box<dyn ZoneClassifier>,
}

impl PricingEngine {
    /// Creates an engine with the zone classifier the config selects.
    pub fn new(config: PricingConfig) -> Self {
        let classifier: Box<dyn ZoneClassifier> = match config.zone_classifier {
            ZoneClassifierKind::Marker => Box::new(MarkerZoneClassifier::new(&config.local_zone_marker)),
            ZoneClassifierKind::CityList => Box::new(CityListClassifier::new(&config.local_zone_cities)),
        };
        PricingEngine { config, classifier }
    }

    /// Replaces the zone classifier.
    pub fn with_classifier(mut self, classifier: impl ZoneClassifier + 'static) -> Self {
        self.classifier = Box::new(classifier);
        self
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    pub fn zone_for(&self, destination_city: &str) -> Zone {
        self.classifier.classify(destination_city)
    }

    /// Computes the shipping cost for a subtotal, destination and tier.
    ///
    /// Total function: an unrecognisable city is simply remote-zone.
    pub fn quote(&self, subtotal: Money, destination_city: &str, tier: ShippingTier) -> ShippingQuote {
        let zone = self.zone_for(destination_city);
        self.quote_for_zone(subtotal, zone, tier)
    }

    fn quote_for_zone(&self, subtotal: Money, zone: Zone, tier: ShippingTier) -> ShippingQuote {
        let free_shipping_applied = subtotal >= self.config.free_shipping_threshold;
        let base_cost = if free_shipping_applied {
            Money::zero()
        } else {
            self.config.base_rate(zone)
        };
        let tier_surcharge = self.config.surcharge(tier);

        ShippingQuote {
            base_cost,
            tier_surcharge,
            total_shipping_cost: base_cost + tier_surcharge,
            free_shipping_applied,
        }
    }

    /// Flat tax on the subtotal.
    pub fn tax(&self, subtotal: Money) -> Money {
        subtotal.calculate_tax(self.config.tax_rate())
    }

    /// Shipping, tax and grand total for a subtotal.
    pub fn checkout(&self, subtotal: Money, destination_city: &str, tier: ShippingTier) -> CheckoutTotals {
        let zone = self.zone_for(destination_city);
        let shipping = self.quote_for_zone(subtotal, zone, tier);
        let tax = self.tax(subtotal);

        CheckoutTotals {
            subtotal,
            zone,
            tier,
            shipping,
            tax,
            total: subtotal + shipping.total_shipping_cost + tax,
        }
    }

    /// Same as [`checkout`](Self::checkout) with the subtotal taken from cart lines.
    pub fn checkout_cart(&self, lines: &[CartLine], destination_city: &str, tier: ShippingTier) -> CheckoutTotals {
        self.checkout(cart_subtotal(lines), destination_city, tier)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
