//! Client library for the TrustFlow REST API.
//!
//! Construct an [`ApiClient`] with [`ApiClient::builder`], inject a
//! [`TokenStore`] and an [`UnauthorizedHandler`], and call the endpoint
//! methods. There is no global instance.

pub mod api;
pub mod config;

pub use api::{
    ApiClient, ApiClientBuilder, ApiError, KeychainTokenStore, LoginRedirect, MemoryTokenStore,
    RequestBody, RequestOptions, TokenStore, TokenStoreError, UnauthorizedHandler,
};
pub use config::{ClientConfig, ConfigError};
