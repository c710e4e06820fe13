//! Local storage for the guest wishlist
//!
//! The guest collection lives in a byte-oriented key-value store behind the
//! [`KeyValueStore`] trait. [`GuestStore`] layers the typed contract on top:
//! tolerant loading (corrupt records are dropped, never propagated), saving,
//! clearing, and the last-sync marker.

pub mod sqlite;

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};

use crate::Result;
use crate::item::WishlistItem;
use crate::sync::merge::dedupe;

pub use sqlite::SqliteStore;

/// Storage key for the JSON-encoded guest item collection
pub const ITEMS_KEY: &str = "wishlist:items";

/// Storage key for the last successful sync timestamp
pub const LAST_SYNCED_KEY: &str = "wishlist:last-synced";

/// Byte-oriented key-value store
///
/// The engine only ever touches its two designated keys; the underlying
/// store may be shared with other writers (last-write-wins applies there).
pub trait KeyValueStore: Send + Sync {
    /// Read the value under `key`, or `None` if absent
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store is inaccessible.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Write `value` under `key`, replacing any existing value
    ///
    /// # Errors
    ///
    /// Returns an error on capacity or permission failures.
    fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Delete the value under `key`; deleting an absent key is not an error
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store is inaccessible.
    fn delete(&self, key: &str) -> Result<()>;
}

/// In-memory key-value store for tests and contexts without durable storage
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    /// Create an empty in-memory store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

/// Shared handles to one byte store behave like the store itself; this is
/// how multiple readers (e.g. a controller plus a test harness, or two
/// browser tabs) observe the same keys.
impl<T: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> Result<()> {
        (**self).delete(key)
    }
}

/// Typed adapter over a [`KeyValueStore`] holding the guest collection
pub struct GuestStore<S> {
    store: S,
}

impl<S: KeyValueStore> GuestStore<S> {
    /// Wrap a key-value store
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Load the guest collection
    ///
    /// Never fails: read or parse errors at any level yield an empty
    /// collection. The stored array is decoded record by record so a single
    /// corrupt entry is dropped without discarding the rest; records missing
    /// a product identity or title are excluded, and duplicate identity keys
    /// keep their first occurrence.
    #[must_use]
    pub fn load(&self) -> Vec<WishlistItem> {
        let bytes = match self.store.get(ITEMS_KEY) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::debug!(error = %e, "guest store read failed, treating as empty");
                return Vec::new();
            }
        };

        let raw: Vec<serde_json::Value> = match serde_json::from_slice(&bytes) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::debug!(error = %e, "guest collection is not a JSON array, dropping");
                return Vec::new();
            }
        };

        let total = raw.len();
        let items: Vec<WishlistItem> = raw
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<WishlistItem>(value) {
                Ok(item) if item.is_valid() => Some(item),
                Ok(item) => {
                    tracing::debug!(key = %item.identity_key(), "dropping invalid stored record");
                    None
                }
                Err(e) => {
                    tracing::debug!(error = %e, "dropping corrupt stored record");
                    None
                }
            })
            .collect();

        if items.len() < total {
            tracing::warn!(
                kept = items.len(),
                dropped = total - items.len(),
                "guest collection loaded with dropped records"
            );
        }

        dedupe(&items)
    }

    /// Persist the guest collection
    ///
    /// # Errors
    ///
    /// Returns an error only on storage write failures; callers treat these
    /// as non-fatal and keep their in-memory state.
    pub fn save(&self, items: &[WishlistItem]) -> Result<()> {
        let bytes = serde_json::to_vec(items)?;
        self.store.set(ITEMS_KEY, &bytes)
    }

    /// Remove the guest collection and the last-sync marker
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store is inaccessible.
    pub fn clear(&self) -> Result<()> {
        self.store.delete(ITEMS_KEY)?;
        self.store.delete(LAST_SYNCED_KEY)
    }

    /// Timestamp of the last successful reconciliation, if any
    #[must_use]
    pub fn last_synced(&self) -> Option<DateTime<Utc>> {
        let bytes = self.store.get(LAST_SYNCED_KEY).ok().flatten()?;
        let text = String::from_utf8(bytes).ok()?;
        DateTime::parse_from_rfc3339(&text)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Record a successful reconciliation at `at`
    ///
    /// # Errors
    ///
    /// Returns an error on storage write failures.
    pub fn set_last_synced(&self, at: DateTime<Utc>) -> Result<()> {
        self.store.set(LAST_SYNCED_KEY, at.to_rfc3339().as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn item(product: &str, title: &str) -> WishlistItem {
        WishlistItem {
            product_identity: product.to_string(),
            variant_identity: None,
            title: title.to_string(),
            handle: None,
            variant_title: None,
            image: None,
            price: None,
            added_at: Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn load_on_empty_store_is_empty() {
        let store = GuestStore::new(MemoryStore::new());
        assert!(store.load().is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let store = GuestStore::new(MemoryStore::new());
        store.save(&[item("p1", "One"), item("p2", "Two")]).unwrap();
        let loaded = store.load();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].product_identity, "p1");
    }

    #[test]
    fn corrupt_top_level_value_loads_empty() {
        let kv = MemoryStore::new();
        kv.set(ITEMS_KEY, b"not json at all").unwrap();
        let store = GuestStore::new(kv);
        assert!(store.load().is_empty());
    }

    #[test]
    fn one_corrupt_record_does_not_discard_the_rest() {
        let kv = MemoryStore::new();
        let blob = format!(
            "[{},{},{},{}]",
            serde_json::to_string(&item("p1", "One")).unwrap(),
            r#"{"productIdentity":"p2"}"#,
            serde_json::to_string(&item("p3", "Three")).unwrap(),
            serde_json::to_string(&item("p4", "Four")).unwrap(),
        );
        kv.set(ITEMS_KEY, blob.as_bytes()).unwrap();

        let loaded = GuestStore::new(kv).load();
        let keys: Vec<String> = loaded.iter().map(WishlistItem::identity_key).collect();
        assert_eq!(keys, ["p1::default", "p3::default", "p4::default"]);
    }

    #[test]
    fn invalid_records_are_excluded() {
        let kv = MemoryStore::new();
        let blob = format!(
            "[{},{}]",
            serde_json::to_string(&item("", "Blank product")).unwrap(),
            serde_json::to_string(&item("p1", "Kept")).unwrap(),
        );
        kv.set(ITEMS_KEY, blob.as_bytes()).unwrap();

        let loaded = GuestStore::new(kv).load();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].title, "Kept");
    }

    #[test]
    fn load_dedupes_stored_duplicates() {
        let kv = MemoryStore::new();
        let blob = serde_json::to_string(&[
            item("p1", "First"),
            item("p1", "Duplicate"),
            item("p2", "Other"),
        ])
        .unwrap();
        kv.set(ITEMS_KEY, blob.as_bytes()).unwrap();

        let loaded = GuestStore::new(kv).load();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].title, "First");
    }

    #[test]
    fn clear_removes_items_and_marker() {
        let store = GuestStore::new(MemoryStore::new());
        store.save(&[item("p1", "One")]).unwrap();
        store
            .set_last_synced(Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap())
            .unwrap();
        store.clear().unwrap();
        assert!(store.load().is_empty());
        assert!(store.last_synced().is_none());
    }

    #[test]
    fn last_synced_round_trips() {
        let store = GuestStore::new(MemoryStore::new());
        assert!(store.last_synced().is_none());
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        store.set_last_synced(at).unwrap();
        assert_eq!(store.last_synced(), Some(at));
    }
}
