//! # Order Drafts
//!
//! The record checkout produces: frozen cart lines, where they ship, and
//! what the customer was quoted. Submitting the draft is the caller's job.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::collection::CartLine;
use crate::error::{CoreError, CoreResult};
use crate::pricing::{CheckoutTotals, PricingEngine};
use crate::types::{OwnerContext, ShippingTier};
use crate::validation::{validate_phone, validate_text, ValidationResult};

/// Delivery address entered on the checkout form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub full_name: String,
    pub phone: String,
    pub line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
}

impl ShippingAddress {
    /// Required fields non-empty, everything length-bounded.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_text("full name", &self.full_name, 100)?;
        validate_phone(&self.phone)?;
        validate_text("address line 1", &self.line1, 200)?;
        if let Some(line2) = self.line2.as_deref().filter(|l| !l.trim().is_empty()) {
            validate_text("address line 2", line2, 200)?;
        }
        validate_text("city", &self.city, 100)?;
        if let Some(postal_code) = self.postal_code.as_deref().filter(|p| !p.trim().is_empty()) {
            validate_text("postal code", postal_code, 20)?;
        }
        Ok(())
    }
}

/// An order ready to submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    #[ts(as = "String")]
    pub id: Uuid,
    pub owner: OwnerContext,
    pub lines: Vec<CartLine>,
    pub shipping_address: ShippingAddress,
    pub totals: CheckoutTotals,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl OrderDraft {
    /// Prices the cart for the address city and freezes the result.
    pub fn build(
        engine: &PricingEngine,
        owner: OwnerContext,
        lines: &[CartLine],
        shipping_address: ShippingAddress,
        tier: ShippingTier,
    ) -> CoreResult<Self> {
        if lines.is_empty() {
            return Err(CoreError::EmptyCart);
        }
        shipping_address.validate()?;

        let totals = engine.checkout_cart(lines, &shipping_address.city, tier);

        Ok(OrderDraft {
            id: Uuid::new_v4(),
            owner,
            lines: lines.to_vec(),
            shipping_address,
            totals,
            created_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::pricing::PricingConfig;
    use crate::types::{ProductSummary, Zone};

    fn address(city: &str) -> ShippingAddress {
        ShippingAddress {
            full_name: "Rahim Uddin".to_string(),
            phone: "+8801712345678".to_string(),
            line1: "House 12, Road 5".to_string(),
            line2: None,
            city: city.to_string(),
            postal_code: Some("1207".to_string()),
        }
    }

    #[test]
    fn test_build_prices_from_address_city() {
        let engine = PricingEngine::new(PricingConfig::default());
        let lines = vec![CartLine::from_product(
            &ProductSummary::new("p1", "Panjabi", Money::from_major(1250)),
            2,
        )];

        let draft = OrderDraft::build(
            &engine,
            OwnerContext::Guest,
            &lines,
            address("Dhaka"),
            ShippingTier::Express,
        )
        .unwrap();

        assert_eq!(draft.totals.zone, Zone::Local);
        assert_eq!(draft.totals.total, Money::from_major(2830));
        assert_eq!(draft.lines, lines);
    }

    #[test]
    fn test_build_rejects_empty_cart() {
        let engine = PricingEngine::new(PricingConfig::default());
        let err = OrderDraft::build(
            &engine,
            OwnerContext::Guest,
            &[],
            address("Dhaka"),
            ShippingTier::Standard,
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::EmptyCart));
    }

    #[test]
    fn test_address_validation() {
        assert!(address("Sylhet").validate().is_ok());

        let mut bad = address("");
        assert!(bad.validate().is_err());

        bad = address("Sylhet");
        bad.phone = "call me".to_string();
        assert!(bad.validate().is_err());

        let mut blank_optional = address("Sylhet");
        blank_optional.line2 = Some("  ".to_string());
        assert!(blank_optional.validate().is_ok());
    }
}
