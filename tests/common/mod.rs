//! Shared fixtures for controller integration tests

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use wishlist_sync::{
    KeyValueStore, NewItemInput, RemoteSync, SyncOutcome, UpdateAction, UpdateOutcome,
    WishlistItem,
};

/// Mock remote store with scripted outcomes and call capture
pub struct MockRemote {
    sync_outcome: Mutex<SyncOutcome>,
    update_outcome: Mutex<UpdateOutcome>,
    /// Identity keys of every `update` call, paired with the action
    pub updates: Arc<Mutex<Vec<(UpdateAction, String)>>>,
    /// Number of `merge_sync` calls issued
    pub merge_calls: Arc<Mutex<usize>>,
}

impl Default for MockRemote {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRemote {
    pub fn new() -> Self {
        Self {
            sync_outcome: Mutex::new(SyncOutcome::Success(Vec::new())),
            update_outcome: Mutex::new(UpdateOutcome::Success),
            updates: Arc::new(Mutex::new(Vec::new())),
            merge_calls: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_sync_outcome(self, outcome: SyncOutcome) -> Self {
        *self.sync_outcome.lock().unwrap() = outcome;
        self
    }

    pub fn with_update_outcome(self, outcome: UpdateOutcome) -> Self {
        *self.update_outcome.lock().unwrap() = outcome;
        self
    }
}

#[async_trait]
impl RemoteSync for MockRemote {
    async fn merge_sync(&self, _local: &[WishlistItem]) -> SyncOutcome {
        *self.merge_calls.lock().unwrap() += 1;
        self.sync_outcome.lock().unwrap().clone()
    }

    async fn update(&self, action: UpdateAction, item: &WishlistItem) -> UpdateOutcome {
        self.updates
            .lock()
            .unwrap()
            .push((action, item.identity_key()));
        self.update_outcome.lock().unwrap().clone()
    }
}

/// Remote whose calls never resolve, for caller-side timeout scenarios
pub struct PendingRemote;

#[async_trait]
impl RemoteSync for PendingRemote {
    async fn merge_sync(&self, _local: &[WishlistItem]) -> SyncOutcome {
        std::future::pending().await
    }

    async fn update(&self, _action: UpdateAction, _item: &WishlistItem) -> UpdateOutcome {
        std::future::pending().await
    }
}

/// Byte store whose writes always fail, for quota/sandbox scenarios
pub struct FailingStore;

impl KeyValueStore for FailingStore {
    fn get(&self, _key: &str) -> wishlist_sync::Result<Option<Vec<u8>>> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &[u8]) -> wishlist_sync::Result<()> {
        Err(wishlist_sync::Error::Storage("quota exceeded".to_string()))
    }

    fn delete(&self, _key: &str) -> wishlist_sync::Result<()> {
        Err(wishlist_sync::Error::Storage("quota exceeded".to_string()))
    }
}

pub fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

pub fn item(product: &str, title: &str, added: DateTime<Utc>) -> WishlistItem {
    WishlistItem {
        product_identity: product.to_string(),
        variant_identity: None,
        title: title.to_string(),
        handle: None,
        variant_title: None,
        image: None,
        price: None,
        added_at: added,
    }
}

pub fn input(product: &str, title: &str) -> NewItemInput {
    NewItemInput::new(product, title)
}
