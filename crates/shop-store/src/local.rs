//! # Local Key-Value Storage
//!
//! Guest carts and wishlists are stored as whole JSON arrays under one fixed
//! key per collection:
//!
//! ```text
//! guest.cart      → [CartLine, ...]
//! guest.wishlist  → [WishlistEntry, ...]
//! ```
//!
//! [`MemoryKvStore`] is process-local (tests, throwaway sessions);
//! [`LocalStorageRepository`] from shop-db persists to SQLite.

use async_trait::async_trait;
use shop_core::CollectionKind;
use shop_db::LocalStorageRepository;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::error::LocalError;

/// Storage key for a guest collection.
pub fn guest_key(kind: CollectionKind) -> String {
    format!("guest.{}", kind)
}

/// String key-value storage with whole-value writes.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, LocalError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), LocalError>;

    async fn remove(&self, key: &str) -> Result<(), LocalError>;
}

// =============================================================================
// In-Memory Store
// =============================================================================

#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `set`/`remove` fail (quota exceeded, private mode).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), LocalError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(LocalError::Unavailable("writes disabled".to_string()));
        }
        Ok(())
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, LocalError> {
        self.entries
            .lock()
            .map_err(|_| LocalError::Unavailable("store lock poisoned".to_string()))
    }
}

#[async_trait]
impl KeyValueStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, LocalError> {
        Ok(self.entries()?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), LocalError> {
        self.check_writable()?;
        self.entries()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), LocalError> {
        self.check_writable()?;
        self.entries()?.remove(key);
        Ok(())
    }
}

// =============================================================================
// SQLite Store
// =============================================================================

#[async_trait]
impl KeyValueStore for LocalStorageRepository {
    async fn get(&self, key: &str) -> Result<Option<String>, LocalError> {
        Ok(LocalStorageRepository::get(self, key).await?)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), LocalError> {
        Ok(LocalStorageRepository::set(self, key, value).await?)
    }

    async fn remove(&self, key: &str) -> Result<(), LocalError> {
        LocalStorageRepository::remove(self, key).await?;
        Ok(())
    }
}
