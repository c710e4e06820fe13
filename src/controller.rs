//! Wishlist state controller
//!
//! Owns the in-memory collection and the loading/syncing/error flags, and
//! orchestrates the guest store, the reconciliation functions, and the
//! remote client. Mutations are applied optimistically and rolled back when
//! the authoritative store rejects them.
//!
//! A controller is a single logical actor: mutating operations take
//! `&mut self`, so one controller can have at most one mutation in flight.
//! Callers sharing a controller across tasks wrap it in `tokio::sync::Mutex`,
//! which yields exactly the one-at-a-time operation queue this design
//! expects.

use chrono::Utc;

use crate::config::{Config, Mode};
use crate::error::Error;
use crate::item::{NewItemInput, WishlistItem, identity_key};
use crate::store::{GuestStore, KeyValueStore};
use crate::sync::client::{RemoteSync, SyncClient, SyncOutcome, UpdateAction, UpdateOutcome};
use crate::sync::merge::find_new;

/// Orchestrator for a session's wishlist state
///
/// Lives for the session; binding a new identity means constructing a new
/// controller. Failures never unwind out of the public operations: they are
/// recorded in [`last_error`](Self::last_error) for the caller to inspect.
pub struct WishlistController<S: KeyValueStore, R: RemoteSync = SyncClient> {
    config: Config,
    mode: Mode,
    store: GuestStore<S>,
    remote: Option<R>,
    items: Vec<WishlistItem>,
    is_loading: bool,
    is_syncing: bool,
    last_error: Option<Error>,
}

impl<S: KeyValueStore> WishlistController<S> {
    /// Create a controller, building the HTTP sync client when the config
    /// carries both an identity and a credential
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConfigured`] when no identity is bound and guest
    /// mode is disabled.
    pub fn new(config: Config, store: S) -> crate::Result<Self> {
        let remote = if config.can_sync() {
            let client = SyncClient::new(
                &config.api_url,
                config.identity.as_deref().unwrap_or_default(),
                &config.tenant,
            );
            Some(match config.access_token.clone() {
                Some(token) => client.with_access_token(token),
                None => client,
            })
        } else {
            None
        };
        Self::with_remote(config, store, remote)
    }
}

impl<S: KeyValueStore, R: RemoteSync> WishlistController<S, R> {
    /// Create a controller with an explicit remote implementation
    ///
    /// Used by tests and by embedders with their own transport.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConfigured`] when no identity is bound and guest
    /// mode is disabled.
    pub fn with_remote(config: Config, store: S, remote: Option<R>) -> crate::Result<Self> {
        if config.identity.is_none() && !config.enable_guest_mode {
            return Err(Error::NotConfigured);
        }
        let mode = config.mode();
        Ok(Self {
            config,
            mode,
            store: GuestStore::new(store),
            remote,
            items: Vec::new(),
            is_loading: false,
            is_syncing: false,
            last_error: None,
        })
    }

    /// Current in-memory collection
    #[must_use]
    pub fn items(&self) -> &[WishlistItem] {
        &self.items
    }

    /// Authority mode of this session
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Whether `init` is in progress
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Whether a remote round trip is in progress
    #[must_use]
    pub const fn is_syncing(&self) -> bool {
        self.is_syncing
    }

    /// Error recorded by the most recent operation, if it failed
    #[must_use]
    pub const fn last_error(&self) -> Option<&Error> {
        self.last_error.as_ref()
    }

    /// Whether an item with this product/variant pair is present
    #[must_use]
    pub fn contains(&self, product_identity: &str, variant_identity: Option<&str>) -> bool {
        let key = identity_key(product_identity, variant_identity);
        self.items.iter().any(|item| item.identity_key() == key)
    }

    /// Timestamp of the last successful reconciliation, if any
    #[must_use]
    pub fn last_synced(&self) -> Option<chrono::DateTime<Utc>> {
        self.store.last_synced()
    }

    /// Initialize session state
    ///
    /// Guest mode loads the guest store. Identified mode with auto-merge
    /// enabled reconciles the guest collection against the server and adopts
    /// the canonical result; on failure the guest items are kept in memory
    /// and the error is recorded, so a failed login-time merge never loses
    /// guest data.
    pub async fn init(&mut self) {
        self.last_error = None;
        let _busy = BusyGuard::raise(&mut self.is_loading);

        let local = self.store.load();
        match (self.mode, &self.remote) {
            (Mode::Identified, Some(remote)) if self.config.enable_auto_merge => {
                match remote.merge_sync(&local).await {
                    SyncOutcome::Success(merged) => {
                        tracing::info!(
                            local = local.len(),
                            merged = merged.len(),
                            "login reconciliation complete"
                        );
                        self.items = merged;
                        if !local.is_empty() {
                            absorb_storage(self.store.clear());
                        }
                        absorb_storage(self.store.set_last_synced(Utc::now()));
                    }
                    outcome => {
                        tracing::warn!("login reconciliation failed, keeping guest items");
                        self.items = local;
                        self.last_error = Some(sync_error(outcome));
                    }
                }
            }
            _ => {
                self.items = local;
            }
        }
    }

    /// Add an item; a key already present is a no-op, not an error
    ///
    /// The item lands in memory immediately. Guest persistence failures are
    /// absorbed (the optimistic state is kept); identified-mode remote
    /// failures roll the add back by identity key.
    pub async fn add(&mut self, input: NewItemInput) {
        self.last_error = None;

        let key = input.identity_key();
        if self.items.iter().any(|item| item.identity_key() == key) {
            tracing::debug!(%key, "add skipped, already present");
            return;
        }

        let item = input.into_item(Utc::now());
        self.items.insert(0, item.clone());

        match self.mode {
            Mode::Guest => self.persist_guest(),
            Mode::Identified => {
                match self.remote_update(UpdateAction::Add, &item).await {
                    Ok(()) => {}
                    Err(e) => {
                        tracing::warn!(%key, error = %e, "remote add failed, rolling back");
                        self.items.retain(|item| item.identity_key() != key);
                        self.last_error = Some(e);
                    }
                }
            }
        }
    }

    /// Remove the item with this product/variant pair, if present
    ///
    /// The item leaves memory immediately. On identified-mode remote failure
    /// it is restored at its original position, so a rejected remove never
    /// silently drops the entry.
    pub async fn remove(&mut self, product_identity: &str, variant_identity: Option<&str>) {
        self.last_error = None;

        let key = identity_key(product_identity, variant_identity);
        let Some(position) = self.items.iter().position(|item| item.identity_key() == key)
        else {
            tracing::debug!(%key, "remove skipped, not present");
            return;
        };
        let removed = self.items.remove(position);

        match self.mode {
            Mode::Guest => self.persist_guest(),
            Mode::Identified => {
                match self.remote_update(UpdateAction::Remove, &removed).await {
                    Ok(()) => {}
                    Err(e) => {
                        tracing::warn!(%key, error = %e, "remote remove failed, restoring item");
                        let position = position.min(self.items.len());
                        self.items.insert(position, removed);
                        self.last_error = Some(e);
                    }
                }
            }
        }
    }

    /// Add or remove based on current membership
    pub async fn toggle(&mut self, input: NewItemInput) {
        if self.contains(&input.product_identity, input.variant_identity.as_deref()) {
            let product = input.product_identity;
            let variant = input.variant_identity;
            self.remove(&product, variant.as_deref()).await;
        } else {
            self.add(input).await;
        }
    }

    /// Empty the in-memory collection
    ///
    /// Guest mode also clears the guest store. There is no remote bulk
    /// clear; identified mode empties memory only.
    pub fn clear(&mut self) {
        self.last_error = None;
        self.items.clear();
        if self.mode == Mode::Guest {
            absorb_storage(self.store.clear());
        }
    }

    /// Caller-initiated reconciliation
    ///
    /// Re-reads the guest store and merge-syncs against the server. Returns
    /// the items that appeared as a result, for caller notification. Without
    /// a configured remote this records [`Error::NotConfigured`] and returns
    /// nothing.
    pub async fn sync(&mut self) -> Vec<WishlistItem> {
        self.last_error = None;

        let Some(remote) = &self.remote else {
            self.last_error = Some(Error::NotConfigured);
            return Vec::new();
        };

        let local = self.store.load();
        let busy = BusyGuard::raise(&mut self.is_syncing);
        let outcome = remote.merge_sync(&local).await;
        drop(busy);

        match outcome {
            SyncOutcome::Success(merged) => {
                let appeared = find_new(&self.items, &merged);
                tracing::info!(
                    merged = merged.len(),
                    appeared = appeared.len(),
                    "manual reconciliation complete"
                );
                self.items = merged;
                absorb_storage(self.store.clear());
                absorb_storage(self.store.set_last_synced(Utc::now()));
                appeared
            }
            outcome => {
                self.last_error = Some(sync_error(outcome));
                Vec::new()
            }
        }
    }

    /// Issue a single-item update, tracking the syncing flag across every
    /// exit path
    async fn remote_update(
        &mut self,
        action: UpdateAction,
        item: &WishlistItem,
    ) -> Result<(), Error> {
        let Some(remote) = &self.remote else {
            return Err(Error::NotConfigured);
        };

        let busy = BusyGuard::raise(&mut self.is_syncing);
        let outcome = remote.update(action, item).await;
        drop(busy);

        match outcome {
            UpdateOutcome::Success => Ok(()),
            UpdateOutcome::RateLimited => Err(Error::RateLimited),
            UpdateOutcome::Network(msg) => Err(Error::Network(msg)),
            UpdateOutcome::Failed(msg) => Err(Error::SyncFailed(msg)),
        }
    }

    /// Persist the in-memory collection to the guest store, absorbing failure
    fn persist_guest(&mut self) {
        absorb_storage(self.store.save(&self.items));
    }
}

/// Raises a busy flag and clears it on drop, so the flag comes back down on
/// every exit path, including cancellation of the owning future mid await
struct BusyGuard<'a> {
    flag: &'a mut bool,
}

impl<'a> BusyGuard<'a> {
    fn raise(flag: &'a mut bool) -> Self {
        *flag = true;
        Self { flag }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        *self.flag = false;
    }
}

/// Storage failures degrade gracefully: log, never surface as blocking
fn absorb_storage(result: crate::Result<()>) {
    if let Err(e) = result {
        tracing::warn!(error = %e, "guest storage unavailable, continuing in memory");
    }
}

fn sync_error(outcome: SyncOutcome) -> Error {
    match outcome {
        SyncOutcome::RateLimited => Error::RateLimited,
        SyncOutcome::Network(msg) => Error::Network(msg),
        SyncOutcome::Failed(msg) => Error::SyncFailed(msg),
        SyncOutcome::Success(_) => Error::Unknown("success treated as failure".to_string()),
    }
}
