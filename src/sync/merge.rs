//! Pure reconciliation logic for wishlist collections
//!
//! One-shot merge of a guest-local collection into the server-authoritative
//! one, triggered on identity transition. Remote entries are the baseline:
//! their descriptive fields win, but the surviving timestamp is always the
//! earliest of the two, since that is when the user first wishlisted the
//! product regardless of which device wrote first.

use std::collections::{HashMap, HashSet};

use crate::item::WishlistItem;

/// Merge a local collection into a remote one
///
/// Remote entries seed the result. A local item with a key the remote does
/// not have is inserted as-is. On a key collision the remote entry is kept;
/// if the local timestamp is strictly earlier it replaces the kept entry's
/// `added_at` (ties leave the remote entry untouched). The output is sorted
/// newest-first, with the identity key as a deterministic tie-break.
#[must_use]
pub fn merge(local: &[WishlistItem], remote: &[WishlistItem]) -> Vec<WishlistItem> {
    let mut by_key: HashMap<String, WishlistItem> = remote
        .iter()
        .map(|item| (item.identity_key(), item.clone()))
        .collect();

    for item in local {
        let key = item.identity_key();
        match by_key.get_mut(&key) {
            None => {
                by_key.insert(key, item.clone());
            }
            Some(existing) if item.added_at < existing.added_at => {
                existing.added_at = item.added_at;
            }
            Some(_) => {}
        }
    }

    let mut merged: Vec<WishlistItem> = by_key.into_values().collect();
    merged.sort_by(|a, b| {
        b.added_at
            .cmp(&a.added_at)
            .then_with(|| a.identity_key().cmp(&b.identity_key()))
    });
    merged
}

/// Drop duplicate identity keys, keeping the first occurrence
///
/// Used when loading a single store's raw data; merge handles its own keys.
#[must_use]
pub fn dedupe(items: &[WishlistItem]) -> Vec<WishlistItem> {
    let mut seen = HashSet::new();
    items
        .iter()
        .filter(|item| seen.insert(item.identity_key()))
        .cloned()
        .collect()
}

/// Items of `after` whose identity key is absent from `before`
///
/// Used to tell callers which entries appeared as a result of a merge.
#[must_use]
pub fn find_new(before: &[WishlistItem], after: &[WishlistItem]) -> Vec<WishlistItem> {
    let known: HashSet<String> = before.iter().map(WishlistItem::identity_key).collect();
    after
        .iter()
        .filter(|item| !known.contains(&item.identity_key()))
        .cloned()
        .collect()
}
