//! Locally persisted storefront state: basket, wishlist, and the cached
//! order count.
//!
//! These used to live in ad-hoc persisted singletons on the client. Here they
//! are plain values with an explicit load/save lifecycle over a small
//! key-value store, so callers decide when state is read and written and
//! tests can swap the backing store.

use crate::{
    errors::ServiceError,
    models::Product,
    services::checkout::CheckoutLine,
};
use dashmap::DashMap;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;

const BASKET_KEY: &str = "basket";
const WISHLIST_KEY: &str = "wishlist";
const ORDER_COUNT_KEY: &str = "order-count";

/// Minimal JSON key-value store.
pub trait KvStore: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<Value>, ServiceError>;
    fn save(&self, key: &str, value: Value) -> Result<(), ServiceError>;
    fn remove(&self, key: &str) -> Result<(), ServiceError>;
}

/// In-memory [`KvStore`], shared across threads.
#[derive(Default)]
pub struct InMemoryKvStore {
    entries: DashMap<String, Value>,
}

impl InMemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for InMemoryKvStore {
    fn load(&self, key: &str) -> Result<Option<Value>, ServiceError> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    fn save(&self, key: &str, value: Value) -> Result<(), ServiceError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), ServiceError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// [`KvStore`] persisted as a single JSON file. The whole document is
/// rewritten on every save; state here is small (a basket, a wishlist).
pub struct JsonFileKvStore {
    path: PathBuf,
}

impl JsonFileKvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_all(&self) -> Result<BTreeMap<String, Value>, ServiceError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(ServiceError::Internal(format!(
                "failed to read session store: {}",
                err
            ))),
        }
    }

    fn write_all(&self, entries: &BTreeMap<String, Value>) -> Result<(), ServiceError> {
        let bytes = serde_json::to_vec_pretty(entries)?;
        std::fs::write(&self.path, bytes).map_err(|err| {
            ServiceError::Internal(format!("failed to write session store: {}", err))
        })
    }
}

impl KvStore for JsonFileKvStore {
    fn load(&self, key: &str) -> Result<Option<Value>, ServiceError> {
        Ok(self.read_all()?.remove(key))
    }

    fn save(&self, key: &str, value: Value) -> Result<(), ServiceError> {
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value);
        self.write_all(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), ServiceError> {
        let mut entries = self.read_all()?;
        entries.remove(key);
        self.write_all(&entries)
    }
}

fn load_state<T: DeserializeOwned + Default>(
    store: &dyn KvStore,
    key: &str,
) -> Result<T, ServiceError> {
    match store.load(key)? {
        Some(value) => Ok(serde_json::from_value(value)?),
        None => Ok(T::default()),
    }
}

fn save_state<T: Serialize>(store: &dyn KvStore, key: &str, state: &T) -> Result<(), ServiceError> {
    store.save(key, serde_json::to_value(state)?)
}

/// The shopping basket: product id → line. Lines are keyed by product so
/// repeated adds accumulate quantity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BasketState {
    lines: BTreeMap<String, BasketLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasketLine {
    pub product: Product,
    pub quantity: u32,
}

impl BasketState {
    pub fn load(store: &dyn KvStore) -> Result<Self, ServiceError> {
        load_state(store, BASKET_KEY)
    }

    pub fn save(&self, store: &dyn KvStore) -> Result<(), ServiceError> {
        save_state(store, BASKET_KEY, self)
    }

    pub fn add_item(&mut self, product: Product) {
        let line = self
            .lines
            .entry(product.id.clone())
            .or_insert(BasketLine {
                product,
                quantity: 0,
            });
        line.quantity += 1;
    }

    pub fn remove_item(&mut self, product_id: &str) {
        if let Some(line) = self.lines.get_mut(product_id) {
            if line.quantity > 1 {
                line.quantity -= 1;
            } else {
                self.lines.remove(product_id);
            }
        }
    }

    /// Sets an absolute quantity; zero removes the line.
    pub fn set_quantity(&mut self, product_id: &str, quantity: u32) {
        if quantity == 0 {
            self.lines.remove(product_id);
        } else if let Some(line) = self.lines.get_mut(product_id) {
            line.quantity = quantity;
        }
    }

    pub fn total_items(&self) -> u32 {
        self.lines.values().map(|line| line.quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Grouped lines in product-id order, ready to hand to checkout.
    pub fn grouped_lines(&self) -> Vec<CheckoutLine> {
        self.lines
            .values()
            .map(|line| CheckoutLine {
                product: line.product.clone(),
                quantity: line.quantity,
            })
            .collect()
    }
}

/// The wishlist: an ordered set of products, added at most once each.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WishlistState {
    items: Vec<Product>,
}

impl WishlistState {
    pub fn load(store: &dyn KvStore) -> Result<Self, ServiceError> {
        load_state(store, WISHLIST_KEY)
    }

    pub fn save(&self, store: &dyn KvStore) -> Result<(), ServiceError> {
        save_state(store, WISHLIST_KEY, self)
    }

    pub fn add_item(&mut self, product: Product) {
        if !self.contains(&product.id) {
            self.items.push(product);
        }
    }

    pub fn remove_item(&mut self, product_id: &str) {
        self.items.retain(|item| item.id != product_id);
    }

    pub fn contains(&self, product_id: &str) -> bool {
        self.items.iter().any(|item| item.id == product_id)
    }

    pub fn items(&self) -> &[Product] {
        &self.items
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

/// Cached count of the user's orders, shown as a badge.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct OrderCount(pub u64);

impl OrderCount {
    pub fn load(store: &dyn KvStore) -> Result<Self, ServiceError> {
        load_state(store, ORDER_COUNT_KEY)
    }

    pub fn save(&self, store: &dyn KvStore) -> Result<(), ServiceError> {
        save_state(store, ORDER_COUNT_KEY, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn product(id: &str) -> Product {
        Product {
            id: id.into(),
            name: format!("Product {}", id),
            price: Some(dec!(250)),
            categories: vec![],
            description: None,
            image_url: None,
        }
    }

    #[test]
    fn basket_accumulates_and_round_trips() {
        let store = InMemoryKvStore::new();

        let mut basket = BasketState::load(&store).unwrap();
        assert!(basket.is_empty());

        basket.add_item(product("p1"));
        basket.add_item(product("p1"));
        basket.add_item(product("p2"));
        basket.save(&store).unwrap();

        let reloaded = BasketState::load(&store).unwrap();
        assert_eq!(reloaded.total_items(), 3);
        let lines = reloaded.grouped_lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].product.id, "p1");
        assert_eq!(lines[0].quantity, 2);
    }

    #[test]
    fn basket_set_quantity_zero_removes_line() {
        let store = InMemoryKvStore::new();
        let mut basket = BasketState::load(&store).unwrap();
        basket.add_item(product("p1"));
        basket.set_quantity("p1", 0);
        assert!(basket.is_empty());
    }

    #[test]
    fn wishlist_is_a_set() {
        let store = InMemoryKvStore::new();
        let mut wishlist = WishlistState::load(&store).unwrap();
        wishlist.add_item(product("p1"));
        wishlist.add_item(product("p1"));
        assert_eq!(wishlist.items().len(), 1);
        assert!(wishlist.contains("p1"));

        wishlist.remove_item("p1");
        assert!(!wishlist.contains("p1"));
    }

    #[test]
    fn json_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        {
            let store = JsonFileKvStore::new(&path);
            let mut basket = BasketState::load(&store).unwrap();
            basket.add_item(product("p1"));
            basket.save(&store).unwrap();
            OrderCount(4).save(&store).unwrap();
        }

        let store = JsonFileKvStore::new(&path);
        assert_eq!(BasketState::load(&store).unwrap().total_items(), 1);
        assert_eq!(OrderCount::load(&store).unwrap().0, 4);

        store.remove("basket").unwrap();
        assert!(BasketState::load(&store).unwrap().is_empty());
    }
}
