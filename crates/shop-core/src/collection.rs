//! # Cart & Wishlist Collections
//!
//! Pure state transitions for the two per-owner collections. Nothing here
//! persists anything: every operation takes the current collection and
//! returns a [`Transition`] holding the next collection plus the single
//! [`Change`] a backend has to commit.
//!
//! ## Transitions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Operation            Cart (CartLine)            Wishlist (WishlistEntry)│
//! │  ───────────────────  ─────────────────────────  ──────────────────────  │
//! │  add (new id)         append, Upsert(line)       append, Upsert(entry)   │
//! │  add (existing id)    qty += n, Upsert(line)     no-op, Change::None     │
//! │  remove (present)     drop, Delete(id)           drop, Delete(id)        │
//! │  remove (absent)      Change::None               Change::None            │
//! │  set_quantity(< 1)    same as remove             n/a                     │
//! │  set_quantity(n)      qty = n, Upsert(line)      n/a                     │
//! │  clear                empty, Clear               empty, Clear            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Items keep insertion order; product ids are unique within a collection.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::ProductSummary;
use crate::validation::{
    validate_price, validate_product_id, validate_product_name, validate_quantity, ValidationResult,
};
use crate::{MAX_CART_LINES, MAX_LINE_QUANTITY};

// =============================================================================
// Collection Kind
// =============================================================================

/// Which of the two per-owner collections an item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    Cart,
    Wishlist,
}

impl CollectionKind {
    /// Path segment and storage key suffix (`cart` / `wishlist`).
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionKind::Cart => "cart",
            CollectionKind::Wishlist => "wishlist",
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Collection Item Trait
// =============================================================================

/// Behavior that differs between cart lines and wishlist entries.
pub trait CollectionItem:
    Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    const KIND: CollectionKind;

    /// Upper bound on distinct items.
    const MAX_ITEMS: usize = usize::MAX;

    fn product_id(&self) -> &str;

    /// Builds a new item from the product payload.
    fn from_product(product: &ProductSummary, quantity: u32) -> Self;

    /// Folds a repeated add of the same product into this item.
    ///
    /// Returns `true` if the item changed.
    fn absorb(&mut self, quantity: u32) -> CoreResult<bool>;

    /// Checks an item that came from outside (remote API or local storage).
    fn validate(&self) -> ValidationResult<()>;
}

// =============================================================================
// Cart Line
// =============================================================================

/// A product in the cart.
///
/// Name, price and images are frozen when the line is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: String,
    pub name: String,
    pub unit_price: Money,
    /// Always >= 1.
    pub quantity: u32,
    #[serde(default)]
    pub image_refs: Vec<String>,
}

impl CartLine {
    pub fn from_product(product: &ProductSummary, quantity: u32) -> Self {
        CartLine {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.price,
            quantity,
            image_refs: product.images.clone(),
        }
    }

    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

impl CollectionItem for CartLine {
    const KIND: CollectionKind = CollectionKind::Cart;
    const MAX_ITEMS: usize = MAX_CART_LINES;

    fn product_id(&self) -> &str {
        &self.product_id
    }

    fn from_product(product: &ProductSummary, quantity: u32) -> Self {
        CartLine::from_product(product, quantity)
    }

    fn absorb(&mut self, quantity: u32) -> CoreResult<bool> {
        let requested = self.quantity.saturating_add(quantity);
        if requested > MAX_LINE_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested,
                max: MAX_LINE_QUANTITY,
            });
        }
        self.quantity = requested;
        Ok(true)
    }

    fn validate(&self) -> ValidationResult<()> {
        validate_product_id(&self.product_id)?;
        validate_product_name(&self.name)?;
        validate_price(self.unit_price)?;
        validate_quantity(self.quantity)
    }
}

// =============================================================================
// Wishlist Entry
// =============================================================================

/// Display fields captured when a product was wishlisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
    pub name: String,
    pub price: Money,
    #[serde(default)]
    pub images: Vec<String>,
    pub in_stock: bool,
}

/// A product on the wishlist. At most one per product id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct WishlistEntry {
    pub product_id: String,
    pub snapshot: ProductSnapshot,
    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl WishlistEntry {
    pub fn from_product(product: &ProductSummary) -> Self {
        WishlistEntry {
            product_id: product.id.clone(),
            snapshot: ProductSnapshot {
                name: product.name.clone(),
                price: product.price,
                images: product.images.clone(),
                in_stock: product.in_stock,
            },
            added_at: Utc::now(),
        }
    }

    /// Rebuilds the product payload from the snapshot (for move-to-cart).
    pub fn to_product(&self) -> ProductSummary {
        ProductSummary {
            id: self.product_id.clone(),
            name: self.snapshot.name.clone(),
            price: self.snapshot.price,
            images: self.snapshot.images.clone(),
            in_stock: self.snapshot.in_stock,
        }
    }
}

impl CollectionItem for WishlistEntry {
    const KIND: CollectionKind = CollectionKind::Wishlist;

    fn product_id(&self) -> &str {
        &self.product_id
    }

    fn from_product(product: &ProductSummary, _quantity: u32) -> Self {
        WishlistEntry::from_product(product)
    }

    // Already wishlisted is a successful no-op
    fn absorb(&mut self, _quantity: u32) -> CoreResult<bool> {
        Ok(false)
    }

    fn validate(&self) -> ValidationResult<()> {
        validate_product_id(&self.product_id)?;
        validate_product_name(&self.snapshot.name)?;
        validate_price(self.snapshot.price)
    }
}

// =============================================================================
// Transitions
// =============================================================================

/// The single write a backend must commit for a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Change<T> {
    /// Nothing to persist.
    None,
    /// Insert or replace the item with this product id.
    Upsert(T),
    /// Delete the item with this product id.
    Delete(String),
    /// Delete everything.
    Clear,
}

impl<T> Change<T> {
    pub fn is_none(&self) -> bool {
        matches!(self, Change::None)
    }
}

/// Result of planning an operation against a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition<T> {
    pub next: Collection<T>,
    pub change: Change<T>,
}

impl<T> Transition<T> {
    fn unchanged(current: &Collection<T>) -> Self
    where
        T: Clone,
    {
        Transition {
            next: current.clone(),
            change: Change::None,
        }
    }
}

/// An entry dropped while parsing an untrusted collection payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedEntry {
    pub index: usize,
    pub reason: String,
}

// =============================================================================
// Collection
// =============================================================================

/// Ordered, product-id-unique list of items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Collection<T> {
    items: Vec<T>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Collection { items: Vec::new() }
    }
}

impl<T: CollectionItem> Collection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a collection, keeping the first item for each product id.
    pub fn from_items(items: impl IntoIterator<Item = T>) -> Self {
        let mut collection = Collection::new();
        for item in items {
            if !collection.contains(item.product_id()) {
                collection.items.push(item);
            }
        }
        collection
    }

    /// Parses an untrusted JSON payload.
    ///
    /// A non-array payload is an error. Entries that fail to deserialize or
    /// validate, and repeated product ids, are dropped and reported.
    pub fn from_json(value: serde_json::Value) -> ValidationResult<(Self, Vec<RejectedEntry>)> {
        let serde_json::Value::Array(values) = value else {
            return Err(ValidationError::InvalidFormat {
                field: T::KIND.to_string(),
                reason: "expected a JSON array".to_string(),
            });
        };

        let mut collection = Collection::new();
        let mut rejected = Vec::new();

        for (index, value) in values.into_iter().enumerate() {
            let item = match serde_json::from_value::<T>(value) {
                Ok(item) => item,
                Err(e) => {
                    rejected.push(RejectedEntry {
                        index,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            if let Err(e) = item.validate() {
                rejected.push(RejectedEntry {
                    index,
                    reason: e.to_string(),
                });
                continue;
            }

            if collection.contains(item.product_id()) {
                rejected.push(RejectedEntry {
                    index,
                    reason: format!("duplicate product id {}", item.product_id()),
                });
                continue;
            }

            collection.items.push(item);
        }

        Ok((collection, rejected))
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, product_id: &str) -> Option<&T> {
        self.items.iter().find(|i| i.product_id() == product_id)
    }

    pub fn contains(&self, product_id: &str) -> bool {
        self.get(product_id).is_some()
    }

    pub fn product_ids(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|i| i.product_id())
    }

    /// Plans `add_item(product, quantity)`.
    pub fn add(&self, product: &ProductSummary, quantity: u32) -> CoreResult<Transition<T>> {
        validate_quantity(quantity)?;
        validate_product_id(&product.id)?;

        let mut next = self.clone();

        if let Some(existing) = next.items.iter_mut().find(|i| i.product_id() == product.id) {
            if !existing.absorb(quantity)? {
                return Ok(Transition::unchanged(self));
            }
            let updated = existing.clone();
            return Ok(Transition {
                next,
                change: Change::Upsert(updated),
            });
        }

        validate_product_name(&product.name)?;
        validate_price(product.price)?;

        if self.items.len() >= T::MAX_ITEMS {
            return Err(CoreError::CartTooLarge { max: T::MAX_ITEMS });
        }

        let item = T::from_product(product, quantity);
        next.items.push(item.clone());

        Ok(Transition {
            next,
            change: Change::Upsert(item),
        })
    }

    /// Plans `remove_item(product_id)`. Removing an absent id changes nothing.
    pub fn remove(&self, product_id: &str) -> Transition<T> {
        if !self.contains(product_id) {
            return Transition::unchanged(self);
        }

        let mut next = self.clone();
        next.items.retain(|i| i.product_id() != product_id);

        Transition {
            next,
            change: Change::Delete(product_id.to_string()),
        }
    }

    /// Plans `clear()`. Always yields a `Clear` so the empty state is persisted.
    pub fn clear(&self) -> Transition<T> {
        Transition {
            next: Collection::new(),
            change: Change::Clear,
        }
    }

    /// Applies an already-committed change (used when replaying remote writes).
    pub fn apply_change(&mut self, change: &Change<T>) {
        match change {
            Change::None => {}
            Change::Upsert(item) => {
                match self.items.iter_mut().find(|i| i.product_id() == item.product_id()) {
                    Some(existing) => *existing = item.clone(),
                    None => self.items.push(item.clone()),
                }
            }
            Change::Delete(product_id) => self.items.retain(|i| i.product_id() != product_id),
            Change::Clear => self.items.clear(),
        }
    }
}

impl Collection<CartLine> {
    /// Plans `update_quantity(product_id, quantity)`.
    ///
    /// A quantity below 1 is a removal.
    pub fn set_quantity(&self, product_id: &str, quantity: u32) -> CoreResult<Transition<CartLine>> {
        if quantity < 1 {
            return Ok(self.remove(product_id));
        }

        if quantity > MAX_LINE_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_LINE_QUANTITY,
            });
        }

        let mut next = self.clone();
        let line = next
            .items
            .iter_mut()
            .find(|l| l.product_id == product_id)
            .ok_or_else(|| CoreError::ItemNotFound(product_id.to_string()))?;

        if line.quantity == quantity {
            return Ok(Transition::unchanged(self));
        }

        line.quantity = quantity;
        let updated = line.clone();

        Ok(Transition {
            next,
            change: Change::Upsert(updated),
        })
    }

    pub fn totals(&self) -> CartTotals {
        CartTotals {
            line_count: self.items.len(),
            total_quantity: self.items.iter().map(|l| l.quantity as u64).sum(),
            subtotal: cart_subtotal(&self.items),
        }
    }
}

// =============================================================================
// Cart Totals
// =============================================================================

/// Summary figures for the cart badge and checkout page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub line_count: usize,
    pub total_quantity: u64,
    pub subtotal: Money,
}

/// Σ unit_price × quantity.
pub fn cart_subtotal(lines: &[CartLine]) -> Money {
    lines.iter().map(CartLine::line_total).sum()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn product(id: &str, price: i64) -> ProductSummary {
        ProductSummary::new(id, format!("Product {}", id), Money::from_major(price))
    }

    #[test]
    fn test_cart_add_new_line() {
        let cart = Collection::<CartLine>::new();
        let t = cart.add(&product("p1", 100), 2).unwrap();

        assert_eq!(t.next.len(), 1);
        assert_eq!(t.next.get("p1").unwrap().quantity, 2);
        assert!(matches!(t.change, Change::Upsert(ref l) if l.quantity == 2));
    }

    #[test]
    fn test_cart_add_twice_sums_quantity() {
        let p = product("p1", 100);
        let cart = Collection::<CartLine>::new();
        let cart = cart.add(&p, 2).unwrap().next;
        let t = cart.add(&p, 3).unwrap();

        assert_eq!(t.next.len(), 1);
        assert_eq!(t.next.get("p1").unwrap().quantity, 5);
        assert!(matches!(t.change, Change::Upsert(ref l) if l.quantity == 5));
    }

    #[test]
    fn test_cart_add_rejects_zero_and_overflow() {
        let p = product("p1", 100);
        let cart = Collection::<CartLine>::new();
        assert!(cart.add(&p, 0).is_err());

        let cart = cart.add(&p, 990).unwrap().next;
        let err = cart.add(&p, 10).unwrap_err();
        assert!(matches!(err, CoreError::QuantityTooLarge { requested: 1000, .. }));
    }

    #[test]
    fn test_cart_line_limit() {
        let mut cart = Collection::<CartLine>::new();
        for i in 0..MAX_CART_LINES {
            cart = cart.add(&product(&format!("p{}", i), 1), 1).unwrap().next;
        }
        let err = cart.add(&product("extra", 1), 1).unwrap_err();
        assert!(matches!(err, CoreError::CartTooLarge { .. }));
    }

    #[test]
    fn test_line_keeps_price_at_add_time() {
        let mut p = product("p1", 100);
        let cart = Collection::<CartLine>::new().add(&p, 1).unwrap().next;
        p.price = Money::from_major(999);
        let cart = cart.add(&p, 1).unwrap().next;
        assert_eq!(cart.get("p1").unwrap().unit_price, Money::from_major(100));
    }

    #[test]
    fn test_set_quantity_below_one_removes() {
        let cart = Collection::<CartLine>::new().add(&product("p1", 100), 3).unwrap().next;
        let t = cart.set_quantity("p1", 0).unwrap();

        assert!(t.next.is_empty());
        assert_eq!(t.change, Change::Delete("p1".to_string()));
    }

    #[test]
    fn test_set_quantity_updates_and_detects_noop() {
        let cart = Collection::<CartLine>::new().add(&product("p1", 100), 3).unwrap().next;

        let t = cart.set_quantity("p1", 7).unwrap();
        assert_eq!(t.next.get("p1").unwrap().quantity, 7);

        let t = cart.set_quantity("p1", 3).unwrap();
        assert!(t.change.is_none());

        assert!(matches!(
            cart.set_quantity("missing", 2),
            Err(CoreError::ItemNotFound(_))
        ));
    }

    #[test]
    fn test_wishlist_add_is_idempotent() {
        let p = product("p1", 100);
        let wishlist = Collection::<WishlistEntry>::new().add(&p, 1).unwrap().next;
        let t = wishlist.add(&p, 1).unwrap();

        assert_eq!(t.next.len(), 1);
        assert!(t.change.is_none());
        assert_eq!(t.next, wishlist);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let cart = Collection::<CartLine>::new();
        let t = cart.remove("ghost");
        assert!(t.change.is_none());
        assert!(t.next.is_empty());
    }

    #[test]
    fn test_clear_always_persists() {
        let cart = Collection::<CartLine>::new();
        assert_eq!(cart.clear().change, Change::Clear);
    }

    #[test]
    fn test_totals() {
        let cart = Collection::<CartLine>::new()
            .add(&product("a", 1000), 2)
            .unwrap()
            .next
            .add(&product("b", 250), 2)
            .unwrap()
            .next;

        let totals = cart.totals();
        assert_eq!(totals.line_count, 2);
        assert_eq!(totals.total_quantity, 4);
        assert_eq!(totals.subtotal, Money::from_major(2500));
    }

    #[test]
    fn test_from_json_drops_invalid_entries() {
        let payload = json!([
            {"productId": "a", "name": "A", "unitPrice": 100, "quantity": 1},
            {"productId": "", "name": "Blank", "unitPrice": 100, "quantity": 1},
            {"productId": "b", "name": "B", "unitPrice": 100, "quantity": 0},
            {"productId": "a", "name": "Dup", "unitPrice": 100, "quantity": 1},
            {"unexpected": true},
        ]);

        let (cart, rejected) = Collection::<CartLine>::from_json(payload).unwrap();
        assert_eq!(cart.len(), 1);
        assert_eq!(rejected.len(), 4);
        assert_eq!(rejected[0].index, 1);
    }

    #[test]
    fn test_from_json_rejects_non_array() {
        let result = Collection::<WishlistEntry>::from_json(json!({"items": []}));
        assert!(result.is_err());
    }

    #[test]
    fn test_apply_change_matches_planned_next() {
        let cart = Collection::<CartLine>::new().add(&product("a", 10), 1).unwrap().next;
        let t = cart.add(&product("a", 10), 4).unwrap();

        let mut replayed = cart.clone();
        replayed.apply_change(&t.change);
        assert_eq!(replayed, t.next);
    }

    #[test]
    fn test_wishlist_entry_round_trips_to_product() {
        let p = product("p1", 55).with_images(vec!["img/1.jpg".into()]).out_of_stock();
        let entry = WishlistEntry::from_product(&p);
        assert_eq!(entry.to_product(), p);
    }
}
