//! HTTP client with bearer token injection and session invalidation.
//!
//! Every request goes through [`ApiClient::request`], which joins the base URL
//! and path, sends JSON headers plus the bearer token if one is held, and maps
//! the response status onto [`ApiError`]. A 401 clears the session before the
//! error is returned.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;

use super::auth::{MemoryTokenStore, TokenStore};
use super::error::ApiError;
use super::session::{LoginRedirect, UnauthorizedHandler};
use super::types::{AuthToken, LoginRequest};
use crate::config::ClientConfig;

const JSON_CONTENT_TYPE: &str = "application/json";

/// Payload attached to a request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Already-encoded text, sent verbatim.
    Raw(String),
    /// A JSON document, encoded when the request is sent.
    Json(Value),
}

/// Per-call options for [`ApiClient::request`]. Defaults to a bodiless GET.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<RequestBody>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Set a header. Caller headers replace the client's defaults, and a
    /// later call for the same name replaces an earlier one.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Attach any serializable value as a JSON body.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body).map_err(ApiError::Serialize)?;
        self.body = Some(RequestBody::Json(value));
        Ok(self)
    }

    /// Attach a body that is already encoded.
    pub fn raw_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(RequestBody::Raw(body.into()));
        self
    }
}

/// Builder for [`ApiClient`]. Anything not supplied falls back to an
/// in-memory token store and a logging [`LoginRedirect`].
pub struct ApiClientBuilder {
    config: ClientConfig,
    token_store: Option<Arc<dyn TokenStore>>,
    on_unauthorized: Option<Arc<dyn UnauthorizedHandler>>,
}

impl ApiClientBuilder {
    pub fn token_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.token_store = Some(store);
        self
    }

    pub fn on_unauthorized(mut self, handler: Arc<dyn UnauthorizedHandler>) -> Self {
        self.on_unauthorized = Some(handler);
        self
    }

    /// Build the client, loading any persisted token from the store.
    pub fn build(self) -> Result<ApiClient, ApiError> {
        let mut http = Client::builder().connect_timeout(self.config.connect_timeout);
        if let Some(timeout) = self.config.timeout {
            http = http.timeout(timeout);
        }
        let http = http.build()?;

        let token_store = self
            .token_store
            .unwrap_or_else(|| Arc::new(MemoryTokenStore::new()));
        let on_unauthorized = self
            .on_unauthorized
            .unwrap_or_else(|| Arc::new(LoginRedirect::new(self.config.login_url.clone())));

        let token = token_store.load()?;
        if token.is_some() {
            log::debug!("Loaded persisted session token");
        }

        Ok(ApiClient {
            http,
            base_url: self.config.base_url.trim_end_matches('/').to_string(),
            token: RwLock::new(token),
            token_store,
            on_unauthorized,
        })
    }
}

/// HTTP client wrapper for TrustFlow API communication.
///
/// Holds at most one session token. When present it is sent as
/// `Authorization: Bearer <token>` on every request.
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: RwLock<Option<String>>,
    token_store: Arc<dyn TokenStore>,
    on_unauthorized: Arc<dyn UnauthorizedHandler>,
}

impl ApiClient {
    pub fn builder(config: ClientConfig) -> ApiClientBuilder {
        ApiClientBuilder {
            config,
            token_store: None,
            on_unauthorized: None,
        }
    }

    /// Client with default collaborators for the given base URL.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::builder(ClientConfig::new(base_url)).build()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn has_token(&self) -> bool {
        self.token.read().await.is_some()
    }

    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    /// Hold and persist a session token, typically the `access_token` from
    /// [`ApiClient::login`].
    pub async fn set_token(&self, token: impl Into<String>) -> Result<(), ApiError> {
        let token = token.into();
        self.token_store.save(&token)?;
        *self.token.write().await = Some(token);
        Ok(())
    }

    /// Drop the session token from memory and from the store.
    pub async fn clear_token(&self) -> Result<(), ApiError> {
        *self.token.write().await = None;
        self.token_store.clear()?;
        Ok(())
    }

    /// Send a request to `path` (relative to the base URL) and decode the
    /// JSON response.
    ///
    /// Non-success statuses become [`ApiError::Status`], except 401 which
    /// clears the session, notifies the unauthorized handler and then returns
    /// [`ApiError::Unauthorized`]. Transport failures, including a failed read
    /// of an error body, come back unchanged as [`ApiError::Transport`]; a 401
    /// still ends the session first.
    pub async fn request(&self, path: &str, options: RequestOptions) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let token = self.token.read().await.clone();
        let headers = build_headers(&options.headers, token.is_some());

        log::debug!("{} {}", options.method, url);

        let mut builder = self
            .http
            .request(options.method.clone(), &url)
            .headers(headers);

        if let Some(ref t) = token {
            builder = builder.bearer_auth(t);
        }

        if let Some(body) = options.body {
            builder = builder.body(encode_body(body)?);
        }

        let response = builder.send().await?;
        let status = response.status();

        if status.is_success() {
            let bytes = response.bytes().await?;
            return serde_json::from_slice(&bytes).map_err(ApiError::Decode);
        }

        let body = response.text().await;

        if status == StatusCode::UNAUTHORIZED {
            log::warn!("{} {} rejected with 401, clearing session", options.method, path);
            self.invalidate_session().await;
            return Err(ApiError::Unauthorized { body: body? });
        }

        let body = body?;
        log::debug!("{} {} failed with {}", options.method, path, status);
        Err(ApiError::Status {
            status: status.as_u16(),
            body,
        })
    }

    /// [`ApiClient::request`], deserializing the JSON into `T`.
    pub async fn request_as<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let value = self.request(path, options).await?;
        serde_json::from_value(value).map_err(ApiError::Decode)
    }

    async fn invalidate_session(&self) {
        *self.token.write().await = None;
        if let Err(e) = self.token_store.clear() {
            log::warn!("Failed to clear stored token after 401: {}", e);
        }
        self.on_unauthorized.on_unauthorized();
    }

    async fn send_json<T: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &T,
    ) -> Result<Value, ApiError> {
        let options = RequestOptions::new().method(method).json(body)?;
        self.request(path, options).await
    }

    // ── Auth ────────────────────────────────────────────────────────────

    /// POST /auth/login. The caller decides whether to keep the returned token.
    pub async fn login(&self, email: &str, password: &str) -> Result<Value, ApiError> {
        self.send_json(Method::POST, "/auth/login", &LoginRequest { email, password })
            .await
    }

    /// Log in and keep the returned `access_token` as the session token, in
    /// memory and in the token store.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthToken, ApiError> {
        let response = self.login(email, password).await?;
        let auth: AuthToken = serde_json::from_value(response).map_err(ApiError::Decode)?;
        self.set_token(auth.access_token.clone()).await?;
        Ok(auth)
    }

    /// POST /auth/register. Never stores a token on its own.
    pub async fn register<T: Serialize + ?Sized>(&self, user_data: &T) -> Result<Value, ApiError> {
        self.send_json(Method::POST, "/auth/register", user_data).await
    }

    // ── Users ───────────────────────────────────────────────────────────

    pub async fn get_current_user(&self) -> Result<Value, ApiError> {
        self.request("/users/me", RequestOptions::new()).await
    }

    pub async fn update_user<T: Serialize + ?Sized>(&self, user_data: &T) -> Result<Value, ApiError> {
        self.send_json(Method::PUT, "/users/me", user_data).await
    }

    /// GET /users/me/with-rating: the user plus their on-chain rating.
    pub async fn get_user_with_rating(&self) -> Result<Value, ApiError> {
        self.request("/users/me/with-rating", RequestOptions::new())
            .await
    }

    pub async fn get_profile(&self) -> Result<Value, ApiError> {
        self.request("/users/profile", RequestOptions::new()).await
    }

    pub async fn update_profile<T: Serialize + ?Sized>(&self, profile: &T) -> Result<Value, ApiError> {
        self.send_json(Method::PUT, "/users/profile", profile).await
    }

    // ── Credits ─────────────────────────────────────────────────────────

    pub async fn get_transactions(&self) -> Result<Value, ApiError> {
        self.request("/credits/transactions", RequestOptions::new())
            .await
    }

    pub async fn create_transaction<T: Serialize + ?Sized>(
        &self,
        transaction_data: &T,
    ) -> Result<Value, ApiError> {
        self.send_json(Method::POST, "/credits/transactions", transaction_data)
            .await
    }

    pub async fn get_credit_score(&self) -> Result<Value, ApiError> {
        self.request("/credits/score", RequestOptions::new()).await
    }

    pub async fn get_blockchain_history(&self) -> Result<Value, ApiError> {
        self.request("/credits/blockchain", RequestOptions::new())
            .await
    }
}

/// Default JSON content type, overridden by any caller headers. A held token
/// owns the `Authorization` header, so a caller-supplied one is dropped.
fn build_headers(extra: &HeaderMap, has_token: bool) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));

    for name in extra.keys() {
        headers.remove(name);
    }
    for (name, value) in extra {
        headers.append(name.clone(), value.clone());
    }

    if has_token {
        headers.remove(AUTHORIZATION);
    }
    headers
}

fn encode_body(body: RequestBody) -> Result<Vec<u8>, ApiError> {
    match body {
        RequestBody::Raw(text) => Ok(text.into_bytes()),
        RequestBody::Json(value) => serde_json::to_vec(&value).map_err(ApiError::Serialize),
    }
}
