//! Presentation-only sort views over a wishlist collection
//!
//! Every function returns a freshly sorted copy; the stored collection keeps
//! whatever order it has and is never reordered in place.

use std::cmp::Ordering;

use crate::item::WishlistItem;

/// Newest first by `added_at`
#[must_use]
pub fn by_added_at_desc(items: &[WishlistItem]) -> Vec<WishlistItem> {
    let mut out = items.to_vec();
    out.sort_by(|a, b| b.added_at.cmp(&a.added_at));
    out
}

/// Oldest first by `added_at`
#[must_use]
pub fn by_added_at_asc(items: &[WishlistItem]) -> Vec<WishlistItem> {
    let mut out = items.to_vec();
    out.sort_by(|a, b| a.added_at.cmp(&b.added_at));
    out
}

/// Case-insensitive lexicographic by title
#[must_use]
pub fn by_title(items: &[WishlistItem]) -> Vec<WishlistItem> {
    let mut out = items.to_vec();
    out.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()));
    out
}

/// Cheapest first; items without a parseable price sort last
#[must_use]
pub fn by_price_asc(items: &[WishlistItem]) -> Vec<WishlistItem> {
    let mut out = items.to_vec();
    out.sort_by(|a, b| cmp_price(a, b, f64::INFINITY));
    out
}

/// Most expensive first; items without a parseable price still sort last
#[must_use]
pub fn by_price_desc(items: &[WishlistItem]) -> Vec<WishlistItem> {
    let mut out = items.to_vec();
    out.sort_by(|a, b| cmp_price(b, a, 0.0));
    out
}

/// Numeric amount of an item's price, if present and parseable
fn amount(item: &WishlistItem) -> Option<f64> {
    item.price.as_ref().and_then(|p| p.amount.parse().ok())
}

fn cmp_price(a: &WishlistItem, b: &WishlistItem, missing: f64) -> Ordering {
    let a = amount(a).unwrap_or(missing);
    let b = amount(b).unwrap_or(missing);
    a.total_cmp(&b)
}
