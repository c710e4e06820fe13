//! HTTP client for the wishlist sync API

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::item::WishlistItem;

/// Per-request timeout; a hang becomes a failed outcome, never a stuck caller
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome of a bulk merge-sync call
#[derive(Debug, Clone)]
pub enum SyncOutcome {
    /// The server reconciled and returned its canonical collection
    Success(Vec<WishlistItem>),
    /// HTTP 429; the caller must not retry immediately
    RateLimited,
    /// Transport-level failure (connect, timeout, DNS)
    Network(String),
    /// The server answered but reported or returned a failure
    Failed(String),
}

/// Outcome of a single-item update call
#[derive(Debug, Clone)]
pub enum UpdateOutcome {
    Success,
    /// HTTP 429; the caller must not retry immediately
    RateLimited,
    /// Transport-level failure (connect, timeout, DNS)
    Network(String),
    /// The server answered but reported or returned a failure
    Failed(String),
}

/// Single-item mutation verb for the update endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateAction {
    Add,
    Remove,
}

/// Remote store operations, both idempotent at the identity-key level
///
/// Implemented by [`SyncClient`] in production and by mocks in tests. Every
/// failure mode is a value; implementations never unwind into the caller.
#[async_trait]
pub trait RemoteSync: Send + Sync {
    /// Send the full local collection for server-side reconciliation
    async fn merge_sync(&self, local: &[WishlistItem]) -> SyncOutcome;

    /// Apply a single add or remove against the authoritative store
    async fn update(&self, action: UpdateAction, item: &WishlistItem) -> UpdateOutcome;
}

/// Client for the wishlist sync API
#[derive(Clone)]
pub struct SyncClient {
    api_url: String,
    identity: String,
    tenant: String,
    client: reqwest::Client,
    access_token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SyncRequest<'a> {
    identity: &'a str,
    items: &'a [WishlistItem],
    tenant: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateRequest<'a> {
    identity: &'a str,
    action: UpdateAction,
    item: &'a WishlistItem,
    tenant: &'a str,
}

/// Response body shared by both endpoints
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponse {
    success: bool,
    items: Option<Vec<WishlistItem>>,
    error: Option<String>,
}

impl SyncClient {
    /// Create a new sync client for the given identity
    #[must_use]
    pub fn new(api_url: &str, identity: &str, tenant: &str) -> Self {
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            identity: identity.to_string(),
            tenant: tenant.to_string(),
            client: reqwest::Client::new(),
            access_token: None,
        }
    }

    /// Set the bearer token attached to every request
    #[must_use]
    pub fn with_access_token(mut self, token: String) -> Self {
        self.access_token = Some(token);
        self
    }

    /// POST a JSON body to `{api_url}{path}` and classify the response
    async fn post<B: Serialize + Sync>(&self, path: &str, body: &B) -> ApiCallResult {
        let url = format!("{}{path}", self.api_url);

        let mut request = self
            .client
            .post(&url)
            .timeout(REQUEST_TIMEOUT)
            .json(body);

        if let Some(ref token) = self.access_token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                // Covers connect failures, DNS errors, and the 10 s timeout
                return ApiCallResult::Network(format!("request to {path} failed: {e}"));
            }
        };

        let status = response.status();
        if status.as_u16() == 429 {
            tracing::warn!(%path, "sync API rate limited");
            return ApiCallResult::RateLimited;
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return ApiCallResult::Failed(format!("sync API error {status}: {body}"));
        }

        match response.json::<ApiResponse>().await {
            Ok(parsed) if parsed.success => ApiCallResult::Success(parsed.items),
            Ok(parsed) => ApiCallResult::Failed(
                parsed.error.unwrap_or_else(|| "server reported failure".to_string()),
            ),
            Err(e) => ApiCallResult::Failed(format!("malformed response from {path}: {e}")),
        }
    }
}

/// Intermediate classification shared by both endpoints
enum ApiCallResult {
    Success(Option<Vec<WishlistItem>>),
    RateLimited,
    Network(String),
    Failed(String),
}

#[async_trait]
impl RemoteSync for SyncClient {
    async fn merge_sync(&self, local: &[WishlistItem]) -> SyncOutcome {
        let body = SyncRequest {
            identity: &self.identity,
            items: local,
            tenant: &self.tenant,
        };

        tracing::debug!(count = local.len(), "sending merge-sync");
        match self.post("/sync", &body).await {
            ApiCallResult::Success(Some(items)) => {
                tracing::info!(count = items.len(), "merge-sync returned canonical collection");
                SyncOutcome::Success(items)
            }
            ApiCallResult::Success(None) => {
                SyncOutcome::Failed("sync response missing items".to_string())
            }
            ApiCallResult::RateLimited => SyncOutcome::RateLimited,
            ApiCallResult::Network(msg) => SyncOutcome::Network(msg),
            ApiCallResult::Failed(msg) => SyncOutcome::Failed(msg),
        }
    }

    async fn update(&self, action: UpdateAction, item: &WishlistItem) -> UpdateOutcome {
        let body = UpdateRequest {
            identity: &self.identity,
            action,
            item,
            tenant: &self.tenant,
        };

        tracing::debug!(?action, key = %item.identity_key(), "sending update");
        match self.post("/update", &body).await {
            ApiCallResult::Success(_) => UpdateOutcome::Success,
            ApiCallResult::RateLimited => UpdateOutcome::RateLimited,
            ApiCallResult::Network(msg) => UpdateOutcome::Network(msg),
            ApiCallResult::Failed(msg) => UpdateOutcome::Failed(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&UpdateAction::Add).unwrap(), r#""add""#);
        assert_eq!(
            serde_json::to_string(&UpdateAction::Remove).unwrap(),
            r#""remove""#
        );
    }

    #[test]
    fn client_trims_trailing_slash() {
        let client = SyncClient::new("https://api.test/wishlist/", "cust-1", "shop-1");
        assert_eq!(client.api_url, "https://api.test/wishlist");
    }

    #[test]
    fn response_parses_with_and_without_items() {
        let with: ApiResponse =
            serde_json::from_str(r#"{"success":true,"items":[]}"#).unwrap();
        assert!(with.success);
        assert!(with.items.unwrap().is_empty());

        let without: ApiResponse =
            serde_json::from_str(r#"{"success":false,"error":"nope"}"#).unwrap();
        assert!(!without.success);
        assert_eq!(without.error.as_deref(), Some("nope"));
    }
}
