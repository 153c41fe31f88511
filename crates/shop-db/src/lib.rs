//! # shop-db: Local Storage Database for the Storefront
//!
//! SQLite-backed key-value storage for guest carts and wishlists, accessed
//! asynchronously through sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  shop-store (OptimisticBackend)                                        │
//! │       │                                                                 │
//! │       │  KeyValueStore::set("guest.cart", json)                        │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               ★ shop-db (THIS CRATE) ★                          │   │
//! │  │                                                                 │   │
//! │  │   Database ──► LocalStorageRepository ──► local_storage table   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  shop.db (WAL)                                                         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use shop_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/shop.db")).await?;
//! db.local_storage().set("guest.cart", "[]").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::local_storage::LocalStorageRepository;
