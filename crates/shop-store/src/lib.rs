//! # shop-store: Cart & Wishlist Persistence
//!
//! Keeps a customer's cart and wishlist in memory and decides where each
//! write is persisted, depending on who the customer is.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Persistence by Owner                           │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                         ShopSession                              │  │
//! │  │                                                                  │  │
//! │  │   cart: CollectionStore<CartLine>                                │  │
//! │  │   wishlist: CollectionStore<WishlistEntry>                       │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │         ┌─────────────────────┴─────────────────────┐                  │
//! │         ▼                                           ▼                   │
//! │  ┌────────────────────────┐            ┌────────────────────────┐      │
//! │  │ OptimisticBackend      │            │ ConfirmedBackend       │      │
//! │  │ (Guest)                │            │ (Authenticated)        │      │
//! │  │                        │            │                        │      │
//! │  │ Memory first, then the │            │ Remote API first,      │      │
//! │  │ whole JSON bucket into │            │ memory only on success │      │
//! │  │ KeyValueStore          │            │                        │      │
//! │  └───────────┬────────────┘            └───────────┬────────────┘      │
//! │              ▼                                     ▼                    │
//! │   MemoryKvStore / SQLite (shop-db)     HttpRemoteApi / InMemoryRemoteApi│
//! │                                                                         │
//! │  Guest → Authenticated: guest buckets merge into the account once       │
//! │  (remote wins on the same product), then the buckets are cleared.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`config`] - Pricing, remote API and storage settings (TOML + env)
//! - [`error`] - Store, remote and local storage errors
//! - [`local`] - `KeyValueStore` for guest buckets
//! - [`remote`] - `RemoteApi` for signed-in collections
//! - [`backend`] - Optimistic and confirmed write strategies
//! - [`store`] - `CollectionStore` state machine
//! - [`session`] - Owner switching, sign-in merge, checkout
//! - [`watcher`] - Applies owner changes from a watch channel
//!
//! ## Usage
//!
//! ```rust,ignore
//! use shop_store::{HttpRemoteApi, ShopConfig, ShopSession};
//!
//! let config = ShopConfig::load_or_default(None);
//! let db = Database::new(DbConfig::new(config.database_path())).await?;
//! let remote = HttpRemoteApi::from_settings(&config.remote)?;
//!
//! let mut session = ShopSession::new(
//!     Arc::new(db.local_storage()),
//!     Arc::new(remote),
//!     Arc::new(PricingEngine::new(config.pricing.clone())),
//! );
//! session.load().await;
//! session.cart_mut().add_item(&product, 2).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod backend;
pub mod config;
pub mod error;
pub mod local;
pub mod remote;
pub mod session;
pub mod store;
pub mod watcher;

// =============================================================================
// Re-exports
// =============================================================================

pub use backend::{ConfirmedBackend, OptimisticBackend, WriteBackend, WriteStrategy};
pub use config::{RemoteSettings, ShopConfig, StorageSettings};
pub use error::{LocalError, RemoteError, StoreError, StoreResult};
pub use local::{guest_key, KeyValueStore, MemoryKvStore};
pub use remote::{HttpRemoteApi, InMemoryRemoteApi, RemoteApi};
pub use session::{MergeReport, OwnerChange, ShopSession};
pub use store::{CollectionStore, LoadStatus, StoreState, WriteOutcome};
pub use watcher::SessionWatcher;
