//! # Remote Cart/Wishlist API
//!
//! ## Endpoints
//! ```text
//! ┌────────┬────────────────────────────────────────┬──────────────────────┐
//! │ Method │ Path                                   │ Body                 │
//! ├────────┼────────────────────────────────────────┼──────────────────────┤
//! │ GET    │ /api/{cart|wishlist}/{account}         │ → JSON array         │
//! │ POST   │ /api/{cart|wishlist}/{account}         │ one item (upsert)    │
//! │ DELETE │ /api/{cart|wishlist}/{account}/{id}    │ -                    │
//! │ DELETE │ /api/{cart|wishlist}/{account}         │ - (clear)            │
//! └────────┴────────────────────────────────────────┴──────────────────────┘
//! ```
//!
//! POST is an upsert keyed by `productId`, so replaying it is harmless.
//! Bodies travel as `serde_json::Value`; typing and validation happen in
//! [`crate::backend`].

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use shop_core::{AccountId, CollectionKind};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

use crate::config::RemoteSettings;
use crate::error::RemoteError;

/// The remote persistence collaborator for signed-in customers.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// Returns the raw collection payload (expected to be an array).
    async fn fetch(&self, kind: CollectionKind, account: &AccountId) -> Result<Value, RemoteError>;

    /// Inserts or replaces one item, keyed by its `productId`.
    async fn upsert(&self, kind: CollectionKind, account: &AccountId, item: Value) -> Result<(), RemoteError>;

    async fn delete(&self, kind: CollectionKind, account: &AccountId, product_id: &str) -> Result<(), RemoteError>;

    async fn clear(&self, kind: CollectionKind, account: &AccountId) -> Result<(), RemoteError>;
}

// =============================================================================
// HTTP Client
// =============================================================================

#[derive(Debug, Clone)]
pub struct HttpRemoteApi {
    client: Client,
    base_url: Url,
    api_token: Option<String>,
}

impl HttpRemoteApi {
    pub fn new(base_url: &str, timeout: Duration, api_token: Option<String>) -> Result<Self, RemoteError> {
        let base_url = Url::parse(base_url).map_err(|e| RemoteError::InvalidUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(RemoteError::InvalidUrl(format!("{} cannot be a base URL", base_url)));
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(HttpRemoteApi {
            client,
            base_url,
            api_token,
        })
    }

    /// Builds the client from `[remote]`; fails if no base URL is configured.
    pub fn from_settings(settings: &RemoteSettings) -> Result<Self, RemoteError> {
        let base_url = settings
            .base_url
            .as_deref()
            .ok_or_else(|| RemoteError::InvalidUrl("remote.base_url is not configured".to_string()))?;
        Self::new(base_url, settings.timeout(), settings.api_token.clone())
    }

    fn collection_url(&self, kind: CollectionKind, account: &AccountId, product_id: Option<&str>) -> Result<Url, RemoteError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| RemoteError::InvalidUrl(self.base_url.to_string()))?;
            segments.pop_if_empty().extend(["api", kind.as_str(), account.as_str()]);
            if let Some(product_id) = product_id {
                segments.push(product_id);
            }
        }
        Ok(url)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.api_token {
            Some(ref token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, RemoteError> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(RemoteError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl RemoteApi for HttpRemoteApi {
    async fn fetch(&self, kind: CollectionKind, account: &AccountId) -> Result<Value, RemoteError> {
        let url = self.collection_url(kind, account, None)?;
        debug!(%url, "GET remote collection");

        let response = self.send(self.client.get(url)).await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(Value::Array(Vec::new()));
        }
        Ok(response.json::<Value>().await?)
    }

    async fn upsert(&self, kind: CollectionKind, account: &AccountId, item: Value) -> Result<(), RemoteError> {
        let url = self.collection_url(kind, account, None)?;
        debug!(%url, "POST remote item");

        self.send(self.client.post(url).json(&item)).await?;
        Ok(())
    }

    async fn delete(&self, kind: CollectionKind, account: &AccountId, product_id: &str) -> Result<(), RemoteError> {
        let url = self.collection_url(kind, account, Some(product_id))?;
        debug!(%url, "DELETE remote item");

        match self.send(self.client.delete(url)).await {
            // Already gone
            Err(RemoteError::Status { status: 404, .. }) => Ok(()),
            other => other.map(|_| ()),
        }
    }

    async fn clear(&self, kind: CollectionKind, account: &AccountId) -> Result<(), RemoteError> {
        let url = self.collection_url(kind, account, None)?;
        debug!(%url, "DELETE remote collection");

        self.send(self.client.delete(url)).await?;
        Ok(())
    }
}

// =============================================================================
// In-Memory API
// =============================================================================

/// Process-local stand-in for the remote API, with failure injection.
#[derive(Debug, Default)]
pub struct InMemoryRemoteApi {
    collections: Mutex<HashMap<(CollectionKind, String), Vec<Value>>>,
    offline: AtomicBool,
    /// Writes allowed before every further write fails; `None` = unlimited.
    write_budget: Mutex<Option<usize>>,
    writes: AtomicUsize,
}

impl InMemoryRemoteApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces an account's stored collection.
    pub fn seed(&self, kind: CollectionKind, account: &AccountId, items: Vec<Value>) {
        if let Ok(mut collections) = self.collections.lock() {
            collections.insert((kind, account.as_str().to_string()), items);
        }
    }

    pub fn snapshot(&self, kind: CollectionKind, account: &AccountId) -> Vec<Value> {
        self.collections
            .lock()
            .ok()
            .and_then(|c| c.get(&(kind, account.as_str().to_string())).cloned())
            .unwrap_or_default()
    }

    /// Every request fails with `Unavailable` while set.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Lets `budget` more writes succeed, then fails the rest.
    pub fn fail_writes_after(&self, budget: Option<usize>) {
        if let Ok(mut b) = self.write_budget.lock() {
            *b = budget;
        }
    }

    /// Successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> Result<(), RemoteError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(RemoteError::Unavailable("remote API is offline".to_string()));
        }
        Ok(())
    }

    fn begin_write(&self) -> Result<(), RemoteError> {
        self.check_online()?;
        let mut budget = self
            .write_budget
            .lock()
            .map_err(|_| RemoteError::Unavailable("lock poisoned".to_string()))?;
        match *budget {
            Some(0) => return Err(RemoteError::Unavailable("injected write failure".to_string())),
            Some(ref mut n) => *n -= 1,
            None => {}
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn with_collection<R>(
        &self,
        kind: CollectionKind,
        account: &AccountId,
        f: impl FnOnce(&mut Vec<Value>) -> R,
    ) -> Result<R, RemoteError> {
        let mut collections = self
            .collections
            .lock()
            .map_err(|_| RemoteError::Unavailable("lock poisoned".to_string()))?;
        let items = collections.entry((kind, account.as_str().to_string())).or_default();
        Ok(f(items))
    }
}

fn product_id_of(item: &Value) -> Option<&str> {
    item.get("productId").and_then(Value::as_str)
}

#[async_trait]
impl RemoteApi for InMemoryRemoteApi {
    async fn fetch(&self, kind: CollectionKind, account: &AccountId) -> Result<Value, RemoteError> {
        self.check_online()?;
        self.with_collection(kind, account, |items| Value::Array(items.clone()))
    }

    async fn upsert(&self, kind: CollectionKind, account: &AccountId, item: Value) -> Result<(), RemoteError> {
        let product_id = product_id_of(&item)
            .ok_or_else(|| RemoteError::Status {
                status: 400,
                body: "productId is required".to_string(),
            })?
            .to_string();

        self.begin_write()?;
        self.with_collection(kind, account, |items| {
            match items.iter_mut().find(|i| product_id_of(i) == Some(product_id.as_str())) {
                Some(existing) => *existing = item,
                None => items.push(item),
            }
        })
    }

    async fn delete(&self, kind: CollectionKind, account: &AccountId, product_id: &str) -> Result<(), RemoteError> {
        self.begin_write()?;
        self.with_collection(kind, account, |items| {
            items.retain(|i| product_id_of(i) != Some(product_id));
        })
    }

    async fn clear(&self, kind: CollectionKind, account: &AccountId) -> Result<(), RemoteError> {
        self.begin_write()?;
        self.with_collection(kind, account, |items| items.clear())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn account() -> AccountId {
        AccountId::new("u-1")
    }

    async fn client(server: &MockServer) -> HttpRemoteApi {
        HttpRemoteApi::new(&server.uri(), Duration::from_secs(5), Some("secret".to_string())).unwrap()
    }

    #[tokio::test]
    async fn test_http_fetch_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/cart/u-1"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"productId": "p1"}])))
            .expect(1)
            .mount(&server)
            .await;

        let payload = client(&server).await.fetch(CollectionKind::Cart, &account()).await.unwrap();
        assert_eq!(payload, json!([{"productId": "p1"}]));
    }

    #[tokio::test]
    async fn test_http_upsert_posts_item() {
        let server = MockServer::start().await;
        let item = json!({"productId": "p1", "quantity": 2});
        Mock::given(method("POST"))
            .and(path("/api/wishlist/u-1"))
            .and(body_json(item.clone()))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        client(&server)
            .await
            .upsert(CollectionKind::Wishlist, &account(), item)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_http_delete_treats_404_as_done() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/cart/u-1/p9"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let result = client(&server).await.delete(CollectionKind::Cart, &account(), "p9").await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_http_server_error_is_retryable() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/cart/u-1"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let err = client(&server).await.clear(CollectionKind::Cart, &account()).await.unwrap_err();
        assert!(matches!(err, RemoteError::Status { status: 503, .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_http_base_url_with_path_prefix() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/shop/api/cart/u-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let api = HttpRemoteApi::new(&format!("{}/shop/", server.uri()), Duration::from_secs(5), None).unwrap();
        assert_eq!(api.fetch(CollectionKind::Cart, &account()).await.unwrap(), json!([]));
    }

    #[tokio::test]
    async fn test_http_unreachable_is_unavailable() {
        // Nothing listens on port 9 (discard) in the test environment
        let api = HttpRemoteApi::new("http://127.0.0.1:9", Duration::from_secs(2), None).unwrap();
        let err = api.fetch(CollectionKind::Cart, &account()).await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[test]
    fn test_from_settings_requires_base_url() {
        assert!(HttpRemoteApi::from_settings(&RemoteSettings::default()).is_err());
    }

    #[tokio::test]
    async fn test_in_memory_upsert_is_idempotent() {
        let api = InMemoryRemoteApi::new();
        let item = json!({"productId": "p1", "quantity": 1});

        api.upsert(CollectionKind::Cart, &account(), item.clone()).await.unwrap();
        api.upsert(CollectionKind::Cart, &account(), item).await.unwrap();

        assert_eq!(api.snapshot(CollectionKind::Cart, &account()).len(), 1);
    }

    #[tokio::test]
    async fn test_in_memory_write_budget() {
        let api = InMemoryRemoteApi::new();
        api.fail_writes_after(Some(1));

        assert!(api.upsert(CollectionKind::Cart, &account(), json!({"productId": "a"})).await.is_ok());
        assert!(api.upsert(CollectionKind::Cart, &account(), json!({"productId": "b"})).await.is_err());
        assert!(api.fetch(CollectionKind::Cart, &account()).await.is_ok());
        assert_eq!(api.write_count(), 1);

        api.fail_writes_after(None);
        api.set_offline(true);
        assert!(api.fetch(CollectionKind::Cart, &account()).await.is_err());
    }
}
