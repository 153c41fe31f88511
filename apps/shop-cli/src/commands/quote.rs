//! # Quote Command
//!
//! Prices a bare subtotal: zone, shipping, tax and grand total, plus the
//! amounts formatted with the configured currency symbol.

use serde::Serialize;
use serde_json::Value;
use shop_core::validation::validate_order_amount;
use shop_core::{CheckoutTotals, Money, PricingEngine, ShippingTier};
use shop_store::ShopConfig;

use super::to_output;
use crate::error::ApiError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    #[serde(flatten)]
    pub totals: CheckoutTotals,
    pub display: DisplayTotals,
}

/// Totals as shown to the customer, e.g. "৳2830.00".
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayTotals {
    pub subtotal: String,
    pub shipping: String,
    pub tax: String,
    pub total: String,
}

impl DisplayTotals {
    pub fn new(engine: &PricingEngine, totals: &CheckoutTotals) -> Self {
        let config = engine.config();
        DisplayTotals {
            subtotal: config.format_money(totals.subtotal),
            shipping: config.format_money(totals.shipping.total_shipping_cost),
            tax: config.format_money(totals.tax),
            total: config.format_money(totals.total),
        }
    }
}

pub fn execute(config: &ShopConfig, subtotal: Money, city: &str, tier: ShippingTier) -> Result<Value, ApiError> {
    validate_order_amount(subtotal).map_err(|e| ApiError::validation(e.to_string()))?;

    let engine = PricingEngine::new(config.pricing.clone());
    let totals = engine.checkout(subtotal, city, tier);

    to_output(&QuoteResponse {
        display: DisplayTotals::new(&engine, &totals),
        totals,
    })
}
