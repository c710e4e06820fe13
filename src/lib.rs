//! Wishlist reconciliation and sync engine
//!
//! Maintains a user's saved-items collection across two authority domains:
//! a guest-local key-value store used before authentication and a
//! server-authoritative sync API used after it, reconciling the two exactly
//! once per identity transition.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │              WishlistController                      │
//! │   init │ add │ remove │ toggle │ clear │ sync       │
//! └───────┬─────────────────────────────┬───────────────┘
//!         │                             │
//! ┌───────▼──────────┐        ┌─────────▼───────────────┐
//! │   GuestStore      │        │   SyncClient            │
//! │ key-value bytes   │        │ POST /sync  /update     │
//! └──────────────────┘        └─────────────────────────┘
//!              merge / dedupe / views (pure)
//! ```
//!
//! Mutations land in memory first and roll back when the authoritative
//! store rejects them. Storage failures degrade gracefully: the guest
//! experience keeps working in memory when persistence is unavailable.

pub mod config;
pub mod controller;
pub mod error;
pub mod item;
pub mod store;
pub mod sync;

pub use config::{Config, Mode};
pub use controller::WishlistController;
pub use error::{Error, Result};
pub use item::{ItemImage, ItemPrice, NewItemInput, WishlistItem, identity_key};
pub use store::{GuestStore, KeyValueStore, MemoryStore, SqliteStore};
pub use sync::{
    RemoteSync, SyncClient, SyncOutcome, UpdateAction, UpdateOutcome, dedupe, find_new, merge,
};
