//! # Shop Session
//!
//! One customer's cart and wishlist, bound to the current [`OwnerContext`].
//!
//! ## Owner Transitions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Guest ──sign in──► merge guest buckets into the account               │
//! │                     (remote wins on the same product id)               │
//! │                     clear guest buckets                                │
//! │                     reload both collections from the remote API        │
//! │                                                                         │
//! │  Account ──sign out──► reload the guest buckets                        │
//! │                                                                         │
//! │  Account A ──► Account B: reload for B, no merge                       │
//! │                                                                         │
//! │  Same owner again: ignored (a merge only ever runs once per sign-in)   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Interrupted Merge
//! If a remote add fails partway, the guest bucket is rewritten to hold
//! only the items not yet pushed and the session stays Guest. Signing in
//! again resumes without duplicating or losing anything.

use serde::Serialize;
use shop_core::collection::{Change, Collection, CollectionItem};
use shop_core::order::{OrderDraft, ShippingAddress};
use shop_core::{
    AccountId, CartLine, CheckoutTotals, CollectionKind, CoreError, OwnerContext, PricingEngine,
    ShippingTier, WishlistEntry,
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::backend::{ConfirmedBackend, OptimisticBackend, WriteBackend};
use crate::error::{StoreError, StoreResult};
use crate::local::KeyValueStore;
use crate::remote::RemoteApi;
use crate::store::{CollectionStore, LoadStatus, WriteOutcome};

// =============================================================================
// Merge Report
// =============================================================================

/// What a sign-in merge did for one collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeReport {
    pub kind: CollectionKind,
    /// Guest items added to the account.
    pub pushed: Vec<String>,
    /// Guest items dropped because the account already had them.
    pub discarded: Vec<String>,
}

/// Result of applying an identity change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "transition", rename_all = "snake_case")]
pub enum OwnerChange {
    /// The owner did not change.
    Ignored,
    SignedIn { cart: MergeReport, wishlist: MergeReport },
    SignedOut,
    /// One account replaced another.
    Switched,
}

// =============================================================================
// Session
// =============================================================================

pub struct ShopSession {
    owner: OwnerContext,
    local: Arc<dyn KeyValueStore>,
    remote: Arc<dyn RemoteApi>,
    pricing: Arc<PricingEngine>,
    cart: CollectionStore<CartLine>,
    wishlist: CollectionStore<WishlistEntry>,
}

fn backend_for<T: CollectionItem>(
    owner: &OwnerContext,
    local: &Arc<dyn KeyValueStore>,
    remote: &Arc<dyn RemoteApi>,
) -> Box<dyn WriteBackend<T>> {
    match owner {
        OwnerContext::Guest => Box::new(OptimisticBackend::<T>::new(local.clone())),
        OwnerContext::Authenticated(account) => {
            Box::new(ConfirmedBackend::<T>::new(remote.clone(), account.clone()))
        }
    }
}

impl ShopSession {
    /// Creates a guest session. Call [`load`](Self::load) before mutating.
    pub fn new(local: Arc<dyn KeyValueStore>, remote: Arc<dyn RemoteApi>, pricing: Arc<PricingEngine>) -> Self {
        let owner = OwnerContext::Guest;
        let cart = CollectionStore::new(owner.clone(), backend_for(&owner, &local, &remote));
        let wishlist = CollectionStore::new(owner.clone(), backend_for(&owner, &local, &remote));

        ShopSession {
            owner,
            local,
            remote,
            pricing,
            cart,
            wishlist,
        }
    }

    pub fn owner(&self) -> &OwnerContext {
        &self.owner
    }

    pub fn cart(&self) -> &CollectionStore<CartLine> {
        &self.cart
    }

    pub fn cart_mut(&mut self) -> &mut CollectionStore<CartLine> {
        &mut self.cart
    }

    pub fn wishlist(&self) -> &CollectionStore<WishlistEntry> {
        &self.wishlist
    }

    pub fn wishlist_mut(&mut self) -> &mut CollectionStore<WishlistEntry> {
        &mut self.wishlist
    }

    pub fn pricing(&self) -> &PricingEngine {
        &self.pricing
    }

    /// Loads both collections for the current owner (fail-open).
    pub async fn load(&mut self) -> (LoadStatus, LoadStatus) {
        let cart = self.cart.load().await;
        let wishlist = self.wishlist.load().await;
        (cart, wishlist)
    }

    /// Rebuilds both stores for `owner` and loads them.
    async fn rebind(&mut self, owner: OwnerContext) {
        self.cart = CollectionStore::new(owner.clone(), backend_for(&owner, &self.local, &self.remote));
        self.wishlist = CollectionStore::new(owner.clone(), backend_for(&owner, &self.local, &self.remote));
        self.owner = owner;
        self.load().await;
    }

    /// Applies an identity change from the auth provider.
    pub async fn switch_owner(&mut self, next: OwnerContext) -> StoreResult<OwnerChange> {
        if next == self.owner {
            return Ok(OwnerChange::Ignored);
        }

        if let Some(account) = next.account() {
            account.validate().map_err(CoreError::from)?;
        }

        let was_guest = self.owner.is_guest();

        match next {
            OwnerContext::Authenticated(account) if was_guest => self.sign_in(account).await,
            OwnerContext::Guest => {
                info!(owner = %self.owner, "Signing out, switching to guest storage");
                self.rebind(OwnerContext::Guest).await;
                Ok(OwnerChange::SignedOut)
            }
            next => {
                info!(from = %self.owner, to = %next, "Switching account");
                self.rebind(next).await;
                Ok(OwnerChange::Switched)
            }
        }
    }

    /// Guest → Authenticated: merges both guest buckets into the account,
    /// then switches to remote persistence.
    ///
    /// On failure the session stays Guest and can be signed in again.
    pub async fn sign_in(&mut self, account: AccountId) -> StoreResult<OwnerChange> {
        if !self.owner.is_guest() {
            return Ok(OwnerChange::Ignored);
        }
        account.validate().map_err(CoreError::from)?;

        info!(account = %account, "Signing in, merging guest collections");

        let cart = merge_on_sign_in(&self.cart, &self.local, &self.remote, &account).await?;
        let wishlist = merge_on_sign_in(&self.wishlist, &self.local, &self.remote, &account).await?;

        self.rebind(OwnerContext::Authenticated(account)).await;

        Ok(OwnerChange::SignedIn { cart, wishlist })
    }

    /// Moves a wishlist entry into the cart (quantity 1).
    ///
    /// The wishlist is only touched once the cart write succeeded. If the
    /// wishlist removal then fails, the error is
    /// [`StoreError::MoveIncomplete`]: the cart already holds the line and the
    /// entry is still wishlisted.
    pub async fn move_to_cart(&mut self, product_id: &str) -> StoreResult<WriteOutcome> {
        let product = self
            .wishlist
            .items()
            .get(product_id)
            .map(WishlistEntry::to_product)
            .ok_or_else(|| CoreError::ItemNotFound(product_id.to_string()))?;

        let cart_outcome = self.cart.add_item(&product, 1).await?;
        let wishlist_outcome = match self.wishlist.remove_item(product_id).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(product_id, error = %e, "Cart line added but wishlist entry kept");
                return Err(StoreError::MoveIncomplete {
                    product_id: product_id.to_string(),
                    source: Box::new(e),
                });
            }
        };

        if cart_outcome == WriteOutcome::Volatile || wishlist_outcome == WriteOutcome::Volatile {
            Ok(WriteOutcome::Volatile)
        } else {
            Ok(WriteOutcome::Persisted)
        }
    }

    /// Prices the current cart for a destination.
    pub fn checkout_totals(&self, destination_city: &str, tier: ShippingTier) -> CheckoutTotals {
        self.pricing
            .checkout_cart(self.cart.items().items(), destination_city, tier)
    }

    /// Builds an order draft from the cart, priced for the address city.
    pub fn place_order(&self, address: ShippingAddress, tier: ShippingTier) -> StoreResult<OrderDraft> {
        if !self.cart.is_ready() {
            return Err(StoreError::NotReady {
                kind: CollectionKind::Cart,
            });
        }

        let draft = OrderDraft::build(
            &self.pricing,
            self.owner.clone(),
            self.cart.items().items(),
            address,
            tier,
        )?;

        info!(
            order_id = %draft.id,
            owner = %self.owner,
            lines = draft.lines.len(),
            total = %draft.totals.total,
            "Order draft created"
        );

        Ok(draft)
    }
}

// =============================================================================
// Merge
// =============================================================================

/// Pushes guest items absent from the account, then clears the guest bucket.
///
/// Guest items come from the in-memory store when it is loaded (it may hold
/// changes local storage lost), otherwise from local storage.
async fn merge_on_sign_in<T: CollectionItem>(
    guest: &CollectionStore<T>,
    local: &Arc<dyn KeyValueStore>,
    remote: &Arc<dyn RemoteApi>,
    account: &AccountId,
) -> StoreResult<MergeReport> {
    let kind = T::KIND;
    let local_backend = OptimisticBackend::<T>::new(local.clone());
    let remote_backend = ConfirmedBackend::<T>::new(remote.clone(), account.clone());

    let guest_items = if guest.is_ready() {
        guest.items().clone()
    } else {
        match local_backend.load().await {
            Ok(items) => items,
            Err(e) => {
                warn!(kind = %kind, error = %e, "Guest bucket unreadable, nothing to merge");
                Collection::new()
            }
        }
    };

    let mut report = MergeReport {
        kind,
        pushed: Vec::new(),
        discarded: Vec::new(),
    };

    if guest_items.is_empty() {
        return Ok(report);
    }

    // Remote must load for real here: merging against a fail-open empty view
    // would overwrite account entries. Conflicts are checked against the raw
    // payload ids so an entry that fails validation still wins.
    let (account_items, claimed) = remote_backend.load_with_claims().await?;

    let items = guest_items.items();
    for (index, item) in items.iter().enumerate() {
        let product_id = item.product_id();

        if claimed.contains(product_id) {
            report.discarded.push(product_id.to_string());
            continue;
        }

        let change = Change::Upsert(item.clone());
        if let Err(e) = remote_backend.commit(&change, &account_items).await {
            let remaining = Collection::from_items(
                items[index..]
                    .iter()
                    .filter(|i| !claimed.contains(i.product_id()))
                    .cloned(),
            );

            if let Err(write_err) = local_backend.overwrite(&remaining).await {
                warn!(kind = %kind, error = %write_err, "Could not rewrite guest bucket after failed merge");
            }

            let source = match e {
                StoreError::Remote(source) => source,
                other => return Err(other),
            };

            return Err(StoreError::MergeInterrupted {
                kind,
                pushed: report.pushed.len(),
                remaining: remaining.len(),
                source,
            });
        }

        report.pushed.push(product_id.to_string());
    }

    if let Err(e) = local_backend.clear_bucket().await {
        // Leftovers merge again next sign-in; remote-wins makes that harmless
        warn!(kind = %kind, error = %e, "Could not clear guest bucket after merge");
    }

    info!(
        kind = %kind,
        account = %account,
        pushed = report.pushed.len(),
        discarded = report.discarded.len(),
        "Guest collection merged"
    );

    Ok(report)
}
