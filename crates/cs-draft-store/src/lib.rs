use anyhow::{Result, anyhow};
use cs_api_types::{Address, CartItem, parse_cart_items};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

pub const CHECKOUT_ADDRESS_KEY: &str = "checkoutAddress";
pub const CHECKOUT_CART_KEY: &str = "checkoutCart";
pub const CHECKOUT_TOTAL_KEY: &str = "checkoutTotal";

/// String key-value persistence backing the checkout draft.
///
/// Implementations report failures; [`CheckoutDraft`] decides to swallow them.
pub trait DraftStorage {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

impl<T: DraftStorage + ?Sized> DraftStorage for &T {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

impl<T: DraftStorage + ?Sized> DraftStorage for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// Storage that is never available. Every read is a miss.
#[derive(Default)]
pub struct NoopDraftStorage;

impl DraftStorage for NoopDraftStorage {
    fn get(&self, _key: &str) -> Result<Option<String>> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<()> {
        Ok(())
    }

    fn remove(&self, _key: &str) -> Result<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryDraftStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryDraftStorage {
    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .read()
            .map(|guard| guard.contains_key(key))
            .unwrap_or(false)
    }
}

impl DraftStorage for InMemoryDraftStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let guard = self
            .entries
            .read()
            .map_err(|_| anyhow!("draft storage lock poisoned"))?;
        Ok(guard.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut guard = self
            .entries
            .write()
            .map_err(|_| anyhow!("draft storage lock poisoned"))?;
        guard.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut guard = self
            .entries
            .write()
            .map_err(|_| anyhow!("draft storage lock poisoned"))?;
        guard.remove(key);
        Ok(())
    }
}

/// Typed view of the in-progress checkout persisted in a [`DraftStorage`].
///
/// Reads never fail: a storage error or a value that does not parse is logged
/// and reported as absent. Writes are best effort.
pub struct CheckoutDraft<S> {
    storage: S,
}

impl<S: DraftStorage> CheckoutDraft<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn address(&self) -> Option<Address> {
        self.read_json(CHECKOUT_ADDRESS_KEY)
    }

    pub fn save_address(&self, address: &Address) {
        self.write_json(CHECKOUT_ADDRESS_KEY, address);
    }

    pub fn clear_address(&self) {
        self.remove(CHECKOUT_ADDRESS_KEY);
    }

    /// Entries that no longer decode as items are dropped individually.
    pub fn cart(&self) -> Option<Vec<CartItem>> {
        let values: Vec<serde_json::Value> = self.read_json(CHECKOUT_CART_KEY)?;
        let stored = values.len();
        let items = parse_cart_items(values);
        if items.len() < stored {
            debug!(
                dropped = stored - items.len(),
                "skipping unreadable draft cart entries"
            );
        }
        Some(items)
    }

    pub fn total(&self) -> Option<f64> {
        self.read_json::<Option<f64>>(CHECKOUT_TOTAL_KEY).flatten()
    }

    /// Cart and total are always written as a pair.
    pub fn save_cart(&self, items: &[CartItem], total: f64) {
        self.write_json(CHECKOUT_CART_KEY, &items);
        self.write_json(CHECKOUT_TOTAL_KEY, &total);
    }

    pub fn clear_cart(&self) {
        self.remove(CHECKOUT_CART_KEY);
        self.remove(CHECKOUT_TOTAL_KEY);
    }

    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.storage.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                debug!(key, error = %err, "draft storage read failed, treating as absent");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                debug!(key, error = %err, "malformed draft entry, treating as absent");
                None
            }
        }
    }

    fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let encoded = match serde_json::to_string(value) {
            Ok(encoded) => encoded,
            Err(err) => {
                warn!(key, error = %err, "failed to encode draft entry");
                return;
            }
        };

        if let Err(err) = self.storage.set(key, &encoded) {
            debug!(key, error = %err, "draft storage write failed");
        }
    }

    fn remove(&self, key: &str) {
        if let Err(err) = self.storage.remove(key) {
            debug!(key, error = %err, "draft storage remove failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenStorage;

    impl DraftStorage for BrokenStorage {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(anyhow!("storage disabled"))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(anyhow!("quota exceeded"))
        }

        fn remove(&self, _key: &str) -> Result<()> {
            Err(anyhow!("storage disabled"))
        }
    }

    fn sample_address() -> Address {
        Address {
            full_name: "Mona Adel".to_owned(),
            phone: "01012345678".to_owned(),
            city: "Cairo".to_owned(),
            area: "Nasr City".to_owned(),
            address: "Abbas El Akkad St.".to_owned(),
            floor: Some("3".to_owned()),
        }
    }

    #[test]
    fn address_roundtrip_and_clear() {
        let draft = CheckoutDraft::new(InMemoryDraftStorage::default());
        assert!(draft.address().is_none());

        draft.save_address(&sample_address());
        assert_eq!(draft.address(), Some(sample_address()));

        draft.clear_address();
        assert!(draft.address().is_none());
    }

    #[test]
    fn cart_and_total_are_written_and_cleared_together() {
        let draft = CheckoutDraft::new(InMemoryDraftStorage::default());
        draft.save_address(&sample_address());
        draft.save_cart(&[CartItem::new("c1", "Intro", 100.0, 2)], 200.0);

        assert_eq!(draft.cart().map(|items| items.len()), Some(1));
        assert_eq!(draft.total(), Some(200.0));

        draft.clear_cart();
        assert!(draft.cart().is_none());
        assert!(draft.total().is_none());
        assert!(draft.address().is_some());
    }

    #[test]
    fn malformed_entries_read_as_absent() {
        let storage = InMemoryDraftStorage::default();
        storage.set(CHECKOUT_CART_KEY, "{not json").unwrap();
        storage.set(CHECKOUT_TOTAL_KEY, "\"two hundred\"").unwrap();
        storage.set(CHECKOUT_ADDRESS_KEY, "[]").unwrap();

        let draft = CheckoutDraft::new(&storage);
        assert!(draft.cart().is_none());
        assert!(draft.total().is_none());
        assert!(draft.address().is_none());
    }

    #[test]
    fn persisted_cart_survives_odd_quantities() {
        let storage = InMemoryDraftStorage::default();
        storage
            .set(
                CHECKOUT_CART_KEY,
                r#"[{"id":"c1","title":"Intro","price":100,"quantity":-1},
                    {"id":"c2","title":"Advanced","price":50,"quantity":"2"},
                    {"id":"c3","title":"Expert","price":75,"quantity":0.5},
                    "not an item"]"#,
            )
            .unwrap();

        let items = CheckoutDraft::new(&storage).cart().unwrap();
        let quantities: Vec<(&str, u32)> = items
            .iter()
            .map(|item| (item.id.as_str(), item.quantity))
            .collect();
        assert_eq!(quantities, vec![("c1", 1), ("c2", 2), ("c3", 1)]);
    }

    #[test]
    fn null_total_reads_as_absent() {
        let storage = InMemoryDraftStorage::default();
        storage.set(CHECKOUT_TOTAL_KEY, "null").unwrap();
        assert!(CheckoutDraft::new(&storage).total().is_none());
    }

    #[test]
    fn unavailable_storage_is_swallowed() {
        let draft = CheckoutDraft::new(BrokenStorage);
        draft.save_cart(&[CartItem::new("c1", "Intro", 100.0, 1)], 100.0);
        draft.clear_cart();
        draft.clear_address();
        assert!(draft.cart().is_none());
        assert!(draft.address().is_none());
    }

    #[test]
    fn noop_storage_never_remembers() {
        let draft = CheckoutDraft::new(NoopDraftStorage);
        draft.save_address(&sample_address());
        assert!(draft.address().is_none());
    }
}
