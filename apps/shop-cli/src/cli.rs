use clap::{Args, Parser, Subcommand};
use shop_core::{Money, ShippingTier};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "shop", version, about = "Storefront cart, wishlist and checkout")]
pub struct Cli {
    /// Configuration file path (defaults to the platform config directory)
    #[arg(short, long, global = true, env = "SHOP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Signed-in account id; omit to act as a guest
    #[arg(short, long, global = true, env = "SHOP_ACCOUNT")]
    pub account: Option<String>,

    /// Local storage database path (overrides the config file)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Price a subtotal without touching the cart
    Quote {
        /// Order subtotal, e.g. 2500 or 2500.50
        #[arg(long)]
        subtotal: Money,

        /// Destination city
        #[arg(long)]
        city: String,

        #[arg(long, default_value_t = ShippingTier::Standard)]
        tier: ShippingTier,
    },

    /// Cart operations
    Cart {
        #[command(subcommand)]
        action: CartCommands,
    },

    /// Wishlist operations
    Wishlist {
        #[command(subcommand)]
        action: WishlistCommands,
    },

    /// Price the current cart for a destination
    Totals {
        #[arg(long)]
        city: String,

        #[arg(long, default_value_t = ShippingTier::Standard)]
        tier: ShippingTier,
    },

    /// Build an order draft from the cart
    Checkout(CheckoutArgs),

    /// Merge guest collections into `--account`
    SignIn,

    /// Show the effective configuration
    Config,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CartCommands {
    /// List lines and totals
    List,

    /// Add a product (existing lines gain the quantity)
    Add {
        #[command(flatten)]
        product: ProductArgs,

        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },

    /// Remove a line
    Remove {
        #[arg(long)]
        id: String,
    },

    /// Set a line's quantity; 0 removes it
    SetQty {
        #[arg(long)]
        id: String,

        #[arg(short, long)]
        quantity: u32,
    },

    /// Remove every line
    Clear,
}

#[derive(Subcommand, Debug, Clone)]
pub enum WishlistCommands {
    List,

    Add {
        #[command(flatten)]
        product: ProductArgs,
    },

    Remove {
        #[arg(long)]
        id: String,
    },

    /// Move an entry into the cart with quantity 1
    MoveToCart {
        #[arg(long)]
        id: String,
    },

    Clear,
}

#[derive(Args, Debug, Clone)]
pub struct ProductArgs {
    /// Product id
    #[arg(long)]
    pub id: String,

    #[arg(long)]
    pub name: String,

    /// Unit price, e.g. 1250 or 1250.50
    #[arg(long)]
    pub price: Money,

    /// Image URL; repeat for more
    #[arg(long = "image")]
    pub images: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct CheckoutArgs {
    #[arg(long)]
    pub full_name: String,

    #[arg(long)]
    pub phone: String,

    #[arg(long)]
    pub line1: String,

    #[arg(long)]
    pub line2: Option<String>,

    /// Destination city; also selects the shipping zone
    #[arg(long)]
    pub city: String,

    #[arg(long)]
    pub postal_code: Option<String>,

    #[arg(long, default_value_t = ShippingTier::Standard)]
    pub tier: ShippingTier,
}
