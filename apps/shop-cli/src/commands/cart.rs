//! # Cart Commands
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  shop cart add --id p-1 --name Lamp --price 1250 -q 2                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  session.cart_mut().add_item(product, 2)                                │
//! │       │                                                                 │
//! │       ├── guest:   memory, then guest.cart in SQLite                   │
//! │       └── account: POST /api/cart/{account}, then memory               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  { "outcome": "persisted", "items": [...], "totals": {...} }           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use serde_json::Value;
use shop_core::collection::CartTotals;
use shop_core::{CartLine, ProductSummary};
use shop_store::WriteOutcome;
use tracing::debug;

use super::to_output;
use crate::cli::{CartCommands, ProductArgs};
use crate::context::AppContext;
use crate::error::ApiError;

/// Cart contents with totals.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<WriteOutcome>,
    pub items: Vec<CartLine>,
    pub totals: CartTotals,
}

impl CartResponse {
    fn from_ctx(ctx: &AppContext, outcome: Option<WriteOutcome>) -> Self {
        let cart = ctx.session.cart();
        CartResponse {
            outcome,
            items: cart.items().items().to_vec(),
            totals: cart.totals(),
        }
    }
}

impl From<ProductArgs> for ProductSummary {
    fn from(args: ProductArgs) -> Self {
        ProductSummary::new(args.id, args.name, args.price).with_images(args.images)
    }
}

pub async fn execute(ctx: &mut AppContext, action: CartCommands) -> Result<Value, ApiError> {
    debug!(?action, "cart command");

    let outcome = match action {
        CartCommands::List => None,
        CartCommands::Add { product, quantity } => {
            let product = ProductSummary::from(product);
            Some(ctx.session.cart_mut().add_item(&product, quantity).await?)
        }
        CartCommands::Remove { id } => Some(ctx.session.cart_mut().remove_item(&id).await?),
        CartCommands::SetQty { id, quantity } => {
            Some(ctx.session.cart_mut().update_quantity(&id, quantity).await?)
        }
        CartCommands::Clear => Some(ctx.session.cart_mut().clear().await?),
    };

    to_output(&CartResponse::from_ctx(ctx, outcome))
}
