//! # shop-core: Pure Business Logic for the Storefront
//!
//! Pricing rules and cart/wishlist state transitions as pure functions.
//! Nothing in this crate touches storage or the network.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Storefront Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Front end (shop CLI / storefront UI)            │   │
//! │  │    quote ──► cart ──► wishlist ──► checkout                     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 shop-store (session + backends)                 │   │
//! │  │    ShopSession, CollectionStore, remote API, local storage      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ shop-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌────────────┐  ┌───────────┐  │   │
//! │  │   │  pricing  │  │   money   │  │ collection │  │ validation│  │   │
//! │  │   │  Engine   │  │   Money   │  │  CartLine  │  │   rules   │  │   │
//! │  │   │  zones    │  │  TaxRate  │  │  Wishlist  │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └────────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (ShippingTier, Zone, ProductSummary, OwnerContext)
//! - [`money`] - Money type with integer arithmetic
//! - [`pricing`] - Shipping, tax and checkout totals
//! - [`zone`] - Destination city to shipping zone
//! - [`collection`] - Cart and wishlist state transitions
//! - [`order`] - Order drafts produced at checkout
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use shop_core::collection::{CartLine, Collection};
//! use shop_core::pricing::{PricingConfig, PricingEngine};
//! use shop_core::{Money, ProductSummary, ShippingTier};
//!
//! let kurta = ProductSummary::new("p-1", "Kurta", Money::from_major(1250));
//! let cart = Collection::<CartLine>::new().add(&kurta, 2).unwrap().next;
//!
//! let engine = PricingEngine::new(PricingConfig::default());
//! let totals = engine.checkout_cart(cart.items(), "Dhaka", ShippingTier::Express);
//! assert_eq!(totals.total, Money::from_major(2830));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod collection;
pub mod error;
pub mod money;
pub mod order;
pub mod pricing;
pub mod types;
pub mod validation;
pub mod zone;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use collection::{CartLine, Collection, CollectionItem, CollectionKind, WishlistEntry};
pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use pricing::{CheckoutTotals, PricingConfig, PricingEngine, ShippingQuote};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines in a single cart.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity of a single cart line.
///
/// ## Business Reason
/// Catches typos like 1000 for 10 before they reach checkout.
pub const MAX_LINE_QUANTITY: u32 = 999;

/// Largest unit price accepted from a product payload (10,000,000.00).
///
/// Keeps `MAX_CART_LINES × MAX_LINE_QUANTITY × MAX_UNIT_PRICE` far inside i64.
pub const MAX_UNIT_PRICE: Money = Money::from_major(10_000_000);

/// Largest order-level amount (subtotal) the pricing engine is asked to price.
pub const MAX_ORDER_AMOUNT: Money = Money::from_major(1_000_000_000_000);
