//! # Checkout Commands
//!
//! `totals` prices the current cart for a destination; `checkout` freezes
//! that pricing into an order draft for the shipping address. Submitting
//! the draft (payment, stock reservation) happens elsewhere.

use serde::Serialize;
use serde_json::Value;
use shop_core::order::{OrderDraft, ShippingAddress};
use shop_core::{CheckoutTotals, ShippingTier};
use tracing::info;

use super::quote::DisplayTotals;
use super::to_output;
use crate::cli::CheckoutArgs;
use crate::context::AppContext;
use crate::error::ApiError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalsResponse {
    #[serde(flatten)]
    pub totals: CheckoutTotals,
    pub display: DisplayTotals,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub order: OrderDraft,
    pub display: DisplayTotals,
}

pub fn totals(ctx: &AppContext, city: &str, tier: ShippingTier) -> Result<Value, ApiError> {
    let totals = ctx.session.checkout_totals(city, tier);

    to_output(&TotalsResponse {
        display: DisplayTotals::new(ctx.session.pricing(), &totals),
        totals,
    })
}

impl From<CheckoutArgs> for ShippingAddress {
    fn from(args: CheckoutArgs) -> Self {
        ShippingAddress {
            full_name: args.full_name,
            phone: args.phone,
            line1: args.line1,
            line2: args.line2,
            city: args.city,
            postal_code: args.postal_code,
        }
    }
}

pub fn place_order(ctx: &AppContext, args: CheckoutArgs) -> Result<Value, ApiError> {
    let tier = args.tier;
    let order = ctx.session.place_order(ShippingAddress::from(args), tier)?;

    info!(order_id = %order.id, total = %order.totals.total, "Order draft ready");

    to_output(&OrderResponse {
        display: DisplayTotals::new(ctx.session.pricing(), &order.totals),
        order,
    })
}
