//! # Account Commands
//!
//! `sign-in` reports what the startup owner switch did. The merge itself
//! runs in [`AppContext::open`] whenever `--account` is given, so every
//! signed-in command picks up leftover guest items first.

use serde::Serialize;
use serde_json::Value;
use shop_store::{OwnerChange, ShopConfig};

use super::to_output;
use crate::context::AppContext;
use crate::error::{ApiError, ErrorCode};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponse {
    pub owner: String,
    #[serde(flatten)]
    pub change: OwnerChange,
    pub cart_lines: usize,
    pub wishlist_entries: usize,
}

pub fn sign_in(ctx: &AppContext) -> Result<Value, ApiError> {
    let change = ctx
        .owner_change
        .clone()
        .ok_or_else(|| ApiError::new(ErrorCode::NotAuthenticated, "Pass --account to sign in"))?;

    to_output(&SignInResponse {
        owner: ctx.session.owner().to_string(),
        change,
        cart_lines: ctx.session.cart().items().len(),
        wishlist_entries: ctx.session.wishlist().items().len(),
    })
}

/// Effective configuration with the API token masked.
pub fn show_config(config: &ShopConfig) -> Result<Value, ApiError> {
    let mut shown = config.clone();
    if shown.remote.api_token.is_some() {
        shown.remote.api_token = Some("********".to_string());
    }

    let mut output = to_output(&shown)?;
    if let Value::Object(ref mut map) = output {
        map.insert(
            "resolvedDatabasePath".to_string(),
            Value::String(config.database_path().display().to_string()),
        );
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::cli;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_sign_in_without_account_is_rejected() {
        let dir = TempDir::new().unwrap();

        let err = crate::run(cli(&dir, &["sign-in"])).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotAuthenticated);
    }

    #[tokio::test]
    async fn test_account_without_remote_is_config_error() {
        if std::env::var("SHOP_REMOTE_URL").is_ok() {
            return;
        }
        let dir = TempDir::new().unwrap();

        let err = crate::run(cli(&dir, &["--account", "u-1", "sign-in"])).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigError);
    }

    #[tokio::test]
    async fn test_blank_account_is_validation_error() {
        let dir = TempDir::new().unwrap();

        let err = crate::run(cli(&dir, &["--account", "  ", "sign-in"])).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_show_config_masks_token() {
        let mut config = ShopConfig::default();
        config.remote.api_token = Some("secret".to_string());

        let output = show_config(&config).unwrap();
        assert_eq!(output["remote"]["api_token"], "********");
        assert_eq!(output["pricing"]["tax_rate_bps"], 800);
        assert!(output["resolvedDatabasePath"].is_string());
    }
}
