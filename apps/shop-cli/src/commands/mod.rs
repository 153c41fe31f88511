//! # Commands Module
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs      ◄─── You are here (dispatch)
//! ├── quote.rs    ◄─── Pricing only, no storage
//! ├── cart.rs     ◄─── Cart manipulation
//! ├── wishlist.rs ◄─── Wishlist manipulation
//! ├── checkout.rs ◄─── Totals and order drafts
//! └── account.rs  ◄─── Sign-in, config display
//! ```
//!
//! Commands that need the cart or wishlist open an [`AppContext`] first;
//! `quote` and `config` only load configuration.

pub mod account;
pub mod cart;
pub mod checkout;
pub mod quote;
pub mod wishlist;

use serde::Serialize;
use serde_json::Value;

use crate::cli::{Cli, Commands};
use crate::context::{load_config, AppContext};
use crate::error::ApiError;

pub(crate) fn to_output<T: Serialize>(value: &T) -> Result<Value, ApiError> {
    Ok(serde_json::to_value(value)?)
}

/// Executes the parsed command.
pub async fn execute(cli: Cli) -> Result<Value, ApiError> {
    match cli.command.clone() {
        Commands::Quote { subtotal, city, tier } => {
            let config = load_config(&cli)?;
            quote::execute(&config, subtotal, &city, tier)
        }
        Commands::Config => {
            let config = load_config(&cli)?;
            account::show_config(&config)
        }
        command => {
            let mut ctx = AppContext::open(&cli).await?;
            let result = execute_with_session(&mut ctx, command).await;
            ctx.close().await;
            result
        }
    }
}

async fn execute_with_session(ctx: &mut AppContext, command: Commands) -> Result<Value, ApiError> {
    match command {
        Commands::Cart { action } => cart::execute(ctx, action).await,
        Commands::Wishlist { action } => wishlist::execute(ctx, action).await,
        Commands::Totals { city, tier } => checkout::totals(ctx, &city, tier),
        Commands::Checkout(args) => checkout::place_order(ctx, args),
        Commands::SignIn => account::sign_in(ctx),
        other => Err(ApiError::internal(format!("{:?} does not run in a session", other))),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::cli::Cli;
    use clap::Parser;
    use tempfile::TempDir;

    /// Parses `args` against a throwaway database and a missing config file.
    pub fn cli(dir: &TempDir, args: &[&str]) -> Cli {
        let db = dir.path().join("shop.db");
        let config = dir.path().join("missing.toml");
        let mut argv = vec![
            "shop",
            "--db",
            db.to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
        ];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }
}
