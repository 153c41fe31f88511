//! # Storefront CLI Library
//!
//! Everything behind the `shop` binary. `main.rs` only parses arguments
//! and prints what [`run`] returns.
//!
//! ## Module Organization
//! ```text
//! shop_cli/
//! ├── lib.rs          ◄─── You are here (run, tracing setup)
//! ├── cli.rs          ◄─── clap argument definitions
//! ├── context.rs      ◄─── Config, local storage, remote API, session
//! ├── commands/
//! │   ├── mod.rs      ◄─── Dispatch
//! │   ├── quote.rs    ◄─── Shipping/tax quote for a subtotal
//! │   ├── cart.rs     ◄─── Cart list/add/remove/set-qty/clear
//! │   ├── wishlist.rs ◄─── Wishlist list/add/remove/move-to-cart/clear
//! │   ├── checkout.rs ◄─── Cart totals and order drafts
//! │   └── account.rs  ◄─── Sign-in merge, effective config
//! └── error.rs        ◄─── API error printed on failure
//! ```
//!
//! ## Output
//! Every command prints one JSON document to stdout. Logs go to stderr.

pub mod cli;
pub mod commands;
pub mod context;
pub mod error;

use serde_json::Value;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use cli::Cli;
use error::ApiError;

/// Runs one command and returns its JSON output.
pub async fn run(cli: Cli) -> Result<Value, ApiError> {
    debug!(command = ?cli.command, account = ?cli.account, "Running command");
    let output = commands::execute(cli).await?;
    info!("Command completed");
    Ok(output)
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=shop_store=trace` - Show trace for the store crate only
/// - Default: warnings, plus info from the shop crates
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,shop=info,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
