//! Wishlist item data model and identity key derivation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel used in identity keys when an item has no variant
const NO_VARIANT: &str = "default";

/// Product image reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemImage {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
}

/// Price as a decimal string plus ISO 4217 currency code
///
/// The amount stays a string end to end; it is parsed only for ordering
/// in the price sort views, never re-emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPrice {
    pub amount: String,
    pub currency_code: String,
}

/// A saved-product record
///
/// The pair (`product_identity`, `variant_identity`) is unique within a
/// collection; see [`WishlistItem::identity_key`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
    pub product_identity: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_identity: Option<String>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ItemImage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<ItemPrice>,
    pub added_at: DateTime<Utc>,
}

/// Caller-facing payload for adding an item
///
/// Everything except `added_at`, which the controller stamps at add time.
#[derive(Debug, Clone)]
pub struct NewItemInput {
    pub product_identity: String,
    pub variant_identity: Option<String>,
    pub title: String,
    pub handle: Option<String>,
    pub variant_title: Option<String>,
    pub image: Option<ItemImage>,
    pub price: Option<ItemPrice>,
}

impl NewItemInput {
    /// Build a minimal input from the two required fields
    #[must_use]
    pub fn new(product_identity: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            product_identity: product_identity.into(),
            variant_identity: None,
            title: title.into(),
            handle: None,
            variant_title: None,
            image: None,
            price: None,
        }
    }

    /// Set the variant identity
    #[must_use]
    pub fn with_variant(mut self, variant_identity: impl Into<String>) -> Self {
        self.variant_identity = Some(variant_identity.into());
        self
    }

    /// Set the price
    #[must_use]
    pub fn with_price(mut self, amount: impl Into<String>, currency_code: impl Into<String>) -> Self {
        self.price = Some(ItemPrice {
            amount: amount.into(),
            currency_code: currency_code.into(),
        });
        self
    }

    /// Identity key this input will occupy once added
    #[must_use]
    pub fn identity_key(&self) -> String {
        identity_key(&self.product_identity, self.variant_identity.as_deref())
    }

    /// Materialize a full item stamped with the given timestamp
    #[must_use]
    pub fn into_item(self, added_at: DateTime<Utc>) -> WishlistItem {
        WishlistItem {
            product_identity: self.product_identity,
            variant_identity: self.variant_identity,
            title: self.title,
            handle: self.handle,
            variant_title: self.variant_title,
            image: self.image,
            price: self.price,
            added_at,
        }
    }
}

impl WishlistItem {
    /// Stable identity for this item within a collection
    #[must_use]
    pub fn identity_key(&self) -> String {
        identity_key(&self.product_identity, self.variant_identity.as_deref())
    }

    /// Whether this record satisfies the minimum stored-record contract:
    /// non-empty product identity and non-empty title
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.product_identity.trim().is_empty() && !self.title.trim().is_empty()
    }
}

/// Derive the identity key for a product/variant pair
///
/// Items without a variant share the `"default"` sentinel, so a later add
/// of the same product with no variant maps to the same logical entry.
#[must_use]
pub fn identity_key(product_identity: &str, variant_identity: Option<&str>) -> String {
    let variant = variant_identity.filter(|v| !v.is_empty()).unwrap_or(NO_VARIANT);
    format!("{product_identity}::{variant}")
}
