//! Wishlist reconciliation and the remote sync client
//!
//! The guest device keeps its own collection until an identity is bound;
//! the sync API is the authoritative store afterwards. `merge` reconciles
//! the two exactly once per identity transition, and `client` carries every
//! remote round trip.

pub mod client;
pub mod merge;
pub mod views;

pub use client::{RemoteSync, SyncClient, SyncOutcome, UpdateAction, UpdateOutcome};
pub use merge::{dedupe, find_new, merge};
