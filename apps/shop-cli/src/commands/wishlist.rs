//! # Wishlist Commands

use serde::Serialize;
use serde_json::Value;
use shop_core::{ProductSummary, WishlistEntry};
use shop_store::WriteOutcome;
use tracing::debug;

use super::to_output;
use crate::cli::WishlistCommands;
use crate::context::AppContext;
use crate::error::ApiError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<WriteOutcome>,
    pub items: Vec<WishlistEntry>,
    /// Cart line count, included after `move-to-cart`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cart_lines: Option<usize>,
}

pub async fn execute(ctx: &mut AppContext, action: WishlistCommands) -> Result<Value, ApiError> {
    debug!(?action, "wishlist command");

    let mut cart_lines = None;
    let outcome = match action {
        WishlistCommands::List => None,
        WishlistCommands::Add { product } => {
            let product = ProductSummary::from(product);
            Some(ctx.session.wishlist_mut().add_item(&product, 1).await?)
        }
        WishlistCommands::Remove { id } => Some(ctx.session.wishlist_mut().remove_item(&id).await?),
        WishlistCommands::MoveToCart { id } => {
            let outcome = ctx.session.move_to_cart(&id).await?;
            cart_lines = Some(ctx.session.cart().items().len());
            Some(outcome)
        }
        WishlistCommands::Clear => Some(ctx.session.wishlist_mut().clear().await?),
    };

    to_output(&WishlistResponse {
        outcome,
        items: ctx.session.wishlist().items().items().to_vec(),
        cart_lines,
    })
}
