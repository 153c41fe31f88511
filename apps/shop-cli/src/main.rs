//! # Storefront CLI Entry Point
//!
//! ```bash
//! # Price an order without a cart
//! shop quote --subtotal 2500 --city Dhaka --tier express
//!
//! # Guest cart (stored in local SQLite)
//! shop cart add --id p-1 --name "Desk Lamp" --price 1250 -q 2
//! shop cart list
//!
//! # Sign in: guest cart and wishlist merge into the account
//! SHOP_REMOTE_URL=https://shop.example.com shop --account u-1 sign-in
//!
//! # Order draft for the signed-in cart
//! shop --account u-1 checkout --full-name "Nadia Islam" --phone 01712345678 \
//!     --line1 "Road 3" --city Dhaka --tier express
//! ```

use clap::Parser;
use shop_cli::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    shop_cli::init_tracing();

    match shop_cli::run(cli).await {
        Ok(output) => match serde_json::to_string_pretty(&output) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                tracing::error!("Could not encode output: {}", e);
                std::process::exit(1);
            }
        },
        Err(err) => {
            tracing::error!(code = ?err.code, "Command failed: {}", err.message);
            match serde_json::to_string_pretty(&err) {
                Ok(json) => println!("{}", json),
                Err(_) => println!("{}", err),
            }
            std::process::exit(1);
        }
    }
}
