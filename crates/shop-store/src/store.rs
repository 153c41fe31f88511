//! # Collection Store
//!
//! The in-memory cart or wishlist for one owner, kept consistent with its
//! backend.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Uninitialized ──load()──► Loading ──ok──► Ready ◄──┐                 │
//! │                                │                │     │ add / remove /  │
//! │                                │                └─────┘ update / clear  │
//! │                                └──err──► Ready(empty)                   │
//! │                                                                         │
//! │   Mutations before Ready fail with NotReady.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use shop_core::collection::{CartTotals, Change, Collection, CollectionItem, Transition};
use shop_core::{CartLine, OwnerContext, ProductSummary};
use tracing::{debug, error, info, warn};

use crate::backend::{WriteBackend, WriteStrategy};
use crate::error::{StoreError, StoreResult};

/// Lifecycle of a store instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    Uninitialized,
    Loading,
    Ready,
}

/// What happened to a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteOutcome {
    /// Memory and backend agree.
    Persisted,
    /// Memory changed but the local write failed; the change lasts only for
    /// this session.
    Volatile,
    /// The operation was a no-op (already wishlisted, absent id, same quantity).
    Unchanged,
}

/// Result of the initial load.
#[derive(Debug)]
pub enum LoadStatus {
    Loaded(usize),
    /// Load failed; the store is Ready with an empty collection.
    FailedOpen(StoreError),
}

pub struct CollectionStore<T: CollectionItem> {
    owner: OwnerContext,
    backend: Box<dyn WriteBackend<T>>,
    state: StoreState,
    items: Collection<T>,
    degraded: bool,
}

impl<T: CollectionItem> CollectionStore<T> {
    pub fn new(owner: OwnerContext, backend: Box<dyn WriteBackend<T>>) -> Self {
        CollectionStore {
            owner,
            backend,
            state: StoreState::Uninitialized,
            items: Collection::new(),
            degraded: false,
        }
    }

    pub fn owner(&self) -> &OwnerContext {
        &self.owner
    }

    pub fn state(&self) -> StoreState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == StoreState::Ready
    }

    pub fn items(&self) -> &Collection<T> {
        &self.items
    }

    pub fn strategy(&self) -> WriteStrategy {
        self.backend.strategy()
    }

    /// True once an optimistic write has failed in this session.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Reads the backend. Never leaves the store blocked: a failed load
    /// ends Ready with an empty collection.
    pub async fn load(&mut self) -> LoadStatus {
        self.state = StoreState::Loading;

        match self.backend.load().await {
            Ok(items) => {
                let count = items.len();
                self.items = items;
                self.state = StoreState::Ready;
                info!(kind = %T::KIND, owner = %self.owner, count, "Collection loaded");
                LoadStatus::Loaded(count)
            }
            Err(e) => {
                warn!(kind = %T::KIND, owner = %self.owner, error = %e, "Collection load failed, starting empty");
                self.items = Collection::new();
                self.state = StoreState::Ready;
                LoadStatus::FailedOpen(e)
            }
        }
    }

    fn ensure_ready(&self) -> StoreResult<()> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(StoreError::NotReady { kind: T::KIND })
        }
    }

    /// Commits a planned transition using the backend's strategy.
    async fn write(&mut self, transition: Transition<T>) -> StoreResult<WriteOutcome> {
        let Transition { next, change } = transition;

        if let Change::None = change {
            return Ok(WriteOutcome::Unchanged);
        }

        match self.backend.strategy() {
            WriteStrategy::Confirmed => {
                if let Err(e) = self.backend.commit(&change, &next).await {
                    error!(kind = %T::KIND, owner = %self.owner, error = %e, "Remote write failed");
                    return Err(e);
                }
                self.items = next;
                Ok(WriteOutcome::Persisted)
            }
            WriteStrategy::Optimistic => {
                self.items = next;
                match self.backend.commit(&change, &self.items).await {
                    Ok(()) => Ok(WriteOutcome::Persisted),
                    Err(e) => {
                        warn!(kind = %T::KIND, error = %e, "Local write failed, change kept in memory only");
                        self.degraded = true;
                        Ok(WriteOutcome::Volatile)
                    }
                }
            }
        }
    }

    /// Adds a product. Cart: existing lines gain `quantity`. Wishlist:
    /// already present is a successful no-op.
    pub async fn add_item(&mut self, product: &ProductSummary, quantity: u32) -> StoreResult<WriteOutcome> {
        self.ensure_ready()?;
        debug!(kind = %T::KIND, product_id = %product.id, quantity, "Adding item");

        let transition = self.items.add(product, quantity)?;
        self.write(transition).await
    }

    pub async fn remove_item(&mut self, product_id: &str) -> StoreResult<WriteOutcome> {
        self.ensure_ready()?;
        debug!(kind = %T::KIND, product_id = %product_id, "Removing item");

        let transition = self.items.remove(product_id);
        self.write(transition).await
    }

    pub async fn clear(&mut self) -> StoreResult<WriteOutcome> {
        self.ensure_ready()?;
        debug!(kind = %T::KIND, "Clearing collection");

        let transition = self.items.clear();
        self.write(transition).await
    }
}

impl CollectionStore<CartLine> {
    /// Sets a line's quantity; below 1 removes the line.
    pub async fn update_quantity(&mut self, product_id: &str, quantity: u32) -> StoreResult<WriteOutcome> {
        self.ensure_ready()?;
        debug!(product_id = %product_id, quantity, "Updating cart quantity");

        let transition = self.items.set_quantity(product_id, quantity)?;
        self.write(transition).await
    }

    pub fn totals(&self) -> CartTotals {
        self.items.totals()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{ConfirmedBackend, OptimisticBackend};
    use crate::local::{KeyValueStore, MemoryKvStore};
    use crate::remote::InMemoryRemoteApi;
    use shop_core::{AccountId, CollectionKind, CoreError, Money, WishlistEntry};
    use std::sync::Arc;

    fn product(id: &str, price: i64) -> ProductSummary {
        ProductSummary::new(id, format!("Item {}", id), Money::from_major(price))
    }

    async fn guest_cart(kv: Arc<MemoryKvStore>) -> CollectionStore<CartLine> {
        let mut store = CollectionStore::new(
            OwnerContext::Guest,
            Box::new(OptimisticBackend::<CartLine>::new(kv)),
        );
        store.load().await;
        store
    }

    async fn account_cart(api: Arc<InMemoryRemoteApi>) -> CollectionStore<CartLine> {
        let account = AccountId::new("u-1");
        let owner = OwnerContext::Authenticated(account.clone());
        let mut store = CollectionStore::new(owner, Box::new(ConfirmedBackend::<CartLine>::new(api, account)));
        store.load().await;
        store
    }

    #[tokio::test]
    async fn test_not_ready_before_load() {
        let kv = Arc::new(MemoryKvStore::new());
        let mut store: CollectionStore<CartLine> =
            CollectionStore::new(OwnerContext::Guest, Box::new(OptimisticBackend::<CartLine>::new(kv)));

        assert_eq!(store.state(), StoreState::Uninitialized);
        let err = store.add_item(&product("a", 1), 1).await.unwrap_err();
        assert!(matches!(err, StoreError::NotReady { kind: CollectionKind::Cart }));
    }

    #[tokio::test]
    async fn test_guest_round_trip() {
        let kv = Arc::new(MemoryKvStore::new());
        let mut store = guest_cart(kv.clone()).await;

        store.add_item(&product("a", 100), 2).await.unwrap();
        store.add_item(&product("b", 50), 1).await.unwrap();
        store.update_quantity("b", 4).await.unwrap();

        let reloaded = guest_cart(kv).await;
        assert_eq!(reloaded.items(), store.items());
        assert_eq!(reloaded.totals().subtotal, Money::from_major(400));
    }

    #[tokio::test]
    async fn test_guest_write_failure_is_volatile() {
        let kv = Arc::new(MemoryKvStore::new());
        let mut store = guest_cart(kv.clone()).await;

        kv.set_fail_writes(true);
        let outcome = store.add_item(&product("a", 100), 1).await.unwrap();

        assert_eq!(outcome, WriteOutcome::Volatile);
        assert!(store.is_degraded());
        assert_eq!(store.items().len(), 1);
        assert_eq!(kv.get("guest.cart").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_remote_failure_leaves_memory_untouched() {
        let api = Arc::new(InMemoryRemoteApi::new());
        let mut store = account_cart(api.clone()).await;
        store.add_item(&product("a", 100), 1).await.unwrap();
        let before = store.items().clone();

        api.set_offline(true);
        let err = store.add_item(&product("a", 100), 1).await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(store.items(), &before);

        let err = store.remove_item("a").await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(store.items(), &before);
    }

    #[tokio::test]
    async fn test_remote_load_failure_fails_open() {
        let api = Arc::new(InMemoryRemoteApi::new());
        api.set_offline(true);
        let store = account_cart(api).await;

        assert!(store.is_ready());
        assert!(store.items().is_empty());
    }

    #[tokio::test]
    async fn test_update_quantity_below_one_removes() {
        let api = Arc::new(InMemoryRemoteApi::new());
        let mut store = account_cart(api.clone()).await;
        store.add_item(&product("a", 100), 3).await.unwrap();

        assert_eq!(store.update_quantity("a", 0).await.unwrap(), WriteOutcome::Persisted);
        assert!(store.items().is_empty());
        assert!(api.snapshot(CollectionKind::Cart, &AccountId::new("u-1")).is_empty());
    }

    #[tokio::test]
    async fn test_wishlist_add_twice_is_unchanged() {
        let api = Arc::new(InMemoryRemoteApi::new());
        let account = AccountId::new("u-1");
        let mut store: CollectionStore<WishlistEntry> = CollectionStore::new(
            OwnerContext::Authenticated(account.clone()),
            Box::new(ConfirmedBackend::<WishlistEntry>::new(api.clone(), account)),
        );
        store.load().await;

        let p = product("a", 10);
        assert_eq!(store.add_item(&p, 1).await.unwrap(), WriteOutcome::Persisted);
        assert_eq!(store.add_item(&p, 1).await.unwrap(), WriteOutcome::Unchanged);
        assert_eq!(store.items().len(), 1);
        assert_eq!(api.write_count(), 1);
    }

    #[tokio::test]
    async fn test_clear_persists_empty_collection() {
        let kv = Arc::new(MemoryKvStore::new());
        let mut store = guest_cart(kv.clone()).await;
        store.add_item(&product("a", 100), 1).await.unwrap();

        store.clear().await.unwrap();
        assert_eq!(kv.get("guest.cart").await.unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_quantity_limit_is_enforced() {
        let kv = Arc::new(MemoryKvStore::new());
        let mut store = guest_cart(kv).await;
        store.add_item(&product("a", 1), 999).await.unwrap();

        let err = store.add_item(&product("a", 1), 1).await.unwrap_err();
        assert!(matches!(err, StoreError::Core(CoreError::QuantityTooLarge { .. })));
    }
}
