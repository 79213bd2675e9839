//! API client module for the TrustFlow backend.
//!
//! Provides the HTTP client with bearer token injection, pluggable session
//! token storage, the 401 notification hook, and request/response types
//! matching the backend API.

pub mod auth;
pub mod client;
pub mod error;
pub mod session;
pub mod types;

pub use auth::{KeychainTokenStore, MemoryTokenStore, TokenStore, TokenStoreError};
pub use client::{ApiClient, ApiClientBuilder, RequestBody, RequestOptions};
pub use error::ApiError;
pub use session::{LoginRedirect, UnauthorizedHandler};
