//! # API Client
//!
//! One `reqwest::Client` plus the session token, shared by every endpoint
//! group.
//!
//! ## Request Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  client.orders().cancel("99")                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  send(POST, "/orders/99/cancel-order/", body)                           │
//! │       │  url   = base_url + path                                        │
//! │       │  auth  = "Authorization: Token <token>"   (when logged in)      │
//! │       ▼                                                                 │
//! │  reqwest ──► backend                                                    │
//! │       │                                                                 │
//! │       ├── transport failure ──► ClientError::Transport                  │
//! │       ├── non-2xx ────────────► ClientError::Http (detail, fields)      │
//! │       ├── 204 / empty body ───► Ok(None)                                │
//! │       └── JSON body ──────────► Ok(Some(T))                             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};
use url::Url;

use crate::api::auth::AuthApi;
use crate::api::cart::CartApi;
use crate::api::catalog::CatalogApi;
use crate::api::orders::OrdersApi;
use crate::api::shops::ShopsApi;
use crate::error::{ClientError, ClientResult};

/// Default backend location.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/v1";

/// Default `Authorization` scheme (`Token <key>`).
pub const DEFAULT_AUTH_SCHEME: &str = "Token";

// =============================================================================
// Configuration
// =============================================================================

/// Client configuration.
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use melar_client::ClientConfig;
///
/// let config = ClientConfig::new("https://melar.example/api/v1")
///     .auth_scheme("Bearer")
///     .timeout(Duration::from_secs(10));
/// assert_eq!(config.auth_scheme, "Bearer");
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL without trailing slash, e.g. `http://localhost:8000/api/v1`.
    pub base_url: String,
    pub auth_scheme: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        ClientConfig {
            base_url: base_url.into(),
            auth_scheme: DEFAULT_AUTH_SCHEME.to_string(),
            timeout: Duration::from_secs(30),
            user_agent: format!("melar/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    pub fn auth_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.auth_scheme = scheme.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// =============================================================================
// List Responses
// =============================================================================

/// List endpoints return either a bare array or a paginated envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ListResponse<T> {
    Plain(Vec<T>),
    Paged { results: Vec<T> },
}

impl<T> ListResponse<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            ListResponse::Plain(items) => items,
            ListResponse::Paged { results } => results,
        }
    }
}

// =============================================================================
// Client
// =============================================================================

/// Backend API client. Clones share the connection pool and the token.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    auth_scheme: String,
    token: Arc<RwLock<Option<String>>>,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        // Fail early on a malformed base URL instead of on the first request.
        Url::parse(&base_url)?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent)
            .build()?;

        Ok(ApiClient {
            http,
            base_url,
            auth_scheme: config.auth_scheme,
            token: Arc::new(RwLock::new(None)),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =========================================================================
    // Session token
    // =========================================================================

    pub async fn set_token(&self, token: Option<String>) {
        *self.token.write().await = token;
    }

    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    pub async fn has_token(&self) -> bool {
        self.token.read().await.is_some()
    }

    // =========================================================================
    // Endpoint groups
    // =========================================================================

    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }

    pub fn catalog(&self) -> CatalogApi<'_> {
        CatalogApi::new(self)
    }

    pub fn shops(&self) -> ShopsApi<'_> {
        ShopsApi::new(self)
    }

    pub fn cart(&self) -> CartApi<'_> {
        CartApi::new(self)
    }

    pub fn orders(&self) -> OrdersApi<'_> {
        OrdersApi::new(self)
    }

    // =========================================================================
    // Request helpers
    // =========================================================================

    /// Absolute URL for an API path (`/products/7/`).
    pub fn url(&self, path: &str) -> ClientResult<Url> {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };
        Ok(Url::parse(&format!("{}{}", self.base_url, path))?)
    }

    /// Sends one request.
    ///
    /// ## Returns
    /// * `Ok(None)` - 2xx with no content (204 or empty body)
    /// * `Ok(Some(T))` - 2xx with a JSON body
    pub async fn send<B, T>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> ClientResult<Option<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path)?;
        debug!(method = %method, path = %path, "API request");

        let mut request = self.http.request(method.clone(), url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(token) = self.token.read().await.as_deref() {
            request = request.header(
                reqwest::header::AUTHORIZATION,
                format!("{} {}", self.auth_scheme, token),
            );
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            warn!(method = %method, path = %path, error = %e, "API request failed");
            ClientError::from(e)
        })?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            warn!(
                method = %method,
                path = %path,
                status = status.as_u16(),
                "API error response"
            );
            return Err(ClientError::from_response(
                status.as_u16(),
                status.canonical_reason(),
                &text,
            ));
        }

        if status == StatusCode::NO_CONTENT || text.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| ClientError::Decode {
                path: path.to_string(),
                reason: e.to_string(),
            })
    }

    fn required<T>(path: &str, value: Option<T>) -> ClientResult<T> {
        value.ok_or_else(|| ClientError::Decode {
            path: path.to_string(),
            reason: "empty response body".to_string(),
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.get_with_query(path, &[]).await
    }

    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ClientResult<T> {
        let value = self.send::<(), T>(Method::GET, path, query, None).await?;
        Self::required(path, value)
    }

    /// GET a list endpoint, accepting both list shapes.
    pub async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ClientResult<Vec<T>> {
        let list: ListResponse<T> = self.get_with_query(path, query).await?;
        Ok(list.into_vec())
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let value = self.send(Method::POST, path, &[], Some(body)).await?;
        Self::required(path, value)
    }

    /// POST whose response body (if any) is not needed.
    pub async fn post_no_content<B>(&self, path: &str, body: &B) -> ClientResult<()>
    where
        B: Serialize + ?Sized,
    {
        self.send::<B, serde_json::Value>(Method::POST, path, &[], Some(body))
            .await
            .map(|_| ())
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let value = self.send(Method::PATCH, path, &[], Some(body)).await?;
        Self::required(path, value)
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let value = self.send(Method::PUT, path, &[], Some(body)).await?;
        Self::required(path, value)
    }

    pub async fn delete(&self, path: &str) -> ClientResult<()> {
        self.send::<(), serde_json::Value>(Method::DELETE, path, &[], None)
            .await
            .map(|_| ())
    }

    /// Fails with `NotAuthenticated` when no token is set.
    pub(crate) async fn require_token(&self) -> ClientResult<()> {
        if self.has_token().await {
            Ok(())
        } else {
            Err(ClientError::NotAuthenticated)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining_keeps_base_path() {
        let client = ApiClient::new(ClientConfig::new("http://localhost:8000/api/v1/")).unwrap();
        assert_eq!(
            client.url("/products/7/").unwrap().as_str(),
            "http://localhost:8000/api/v1/products/7/"
        );
        assert_eq!(
            client.url("cart/").unwrap().as_str(),
            "http://localhost:8000/api/v1/cart/"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            ApiClient::new(ClientConfig::new("not a url")),
            Err(ClientError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_list_response_shapes() {
        let plain: ListResponse<i32> = serde_json::from_str("[1,2]").unwrap();
        assert_eq!(plain.into_vec(), vec![1, 2]);

        let paged: ListResponse<i32> =
            serde_json::from_str(r#"{"count": 2, "next": null, "results": [3, 4]}"#).unwrap();
        assert_eq!(paged.into_vec(), vec![3, 4]);
    }

    #[tokio::test]
    async fn test_token_is_shared_between_clones() {
        let client = ApiClient::new(ClientConfig::default()).unwrap();
        let clone = client.clone();

        client.set_token(Some("abc".into())).await;
        assert_eq!(clone.token().await.as_deref(), Some("abc"));
        assert!(clone.require_token().await.is_ok());

        clone.set_token(None).await;
        assert!(matches!(
            client.require_token().await,
            Err(ClientError::NotAuthenticated)
        ));
    }
}
