//! Durable storage for the session token.
//!
//! The client never touches storage directly; it goes through a [`TokenStore`]
//! handed to it at construction. The OS keychain backs the CLI, while tests and
//! short-lived sessions use [`MemoryTokenStore`].

use std::sync::Mutex;

use keyring::Entry;
use thiserror::Error;

/// Default keychain service name for the TrustFlow client.
pub const DEFAULT_SERVICE_NAME: &str = "com.trustflow.client";

/// Account key the session token is stored under.
pub const TOKEN_KEY: &str = "token";

/// Targets where `keyring` has a native backend enabled. Anywhere else it
/// would fall back to a mock store that forgets every entry.
pub const HAS_PLATFORM_KEYCHAIN: bool = cfg!(any(
    target_os = "macos",
    target_os = "ios",
    target_os = "windows",
    target_os = "linux"
));

#[derive(Debug, Error)]
pub enum TokenStoreError {
    #[error("Token store operation failed: {0}")]
    OperationFailed(String),
}

impl From<keyring::Error> for TokenStoreError {
    fn from(err: keyring::Error) -> Self {
        TokenStoreError::OperationFailed(err.to_string())
    }
}

/// Persistence for the single bearer token a client holds.
pub trait TokenStore: Send + Sync {
    /// Read the persisted token. `None` when nothing was stored.
    fn load(&self) -> Result<Option<String>, TokenStoreError>;

    fn save(&self, token: &str) -> Result<(), TokenStoreError>;

    /// Remove the persisted token. Succeeds when nothing was stored.
    fn clear(&self) -> Result<(), TokenStoreError>;
}

/// Token store backed by the platform keychain.
#[derive(Debug, Clone)]
pub struct KeychainTokenStore {
    service: String,
}

impl KeychainTokenStore {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    fn entry(&self) -> Result<Entry, TokenStoreError> {
        if !HAS_PLATFORM_KEYCHAIN {
            return Err(TokenStoreError::OperationFailed(
                "no platform keychain is available on this target".to_string(),
            ));
        }
        Ok(Entry::new(&self.service, TOKEN_KEY)?)
    }
}

impl Default for KeychainTokenStore {
    fn default() -> Self {
        Self::new(DEFAULT_SERVICE_NAME)
    }
}

impl TokenStore for KeychainTokenStore {
    fn load(&self) -> Result<Option<String>, TokenStoreError> {
        match self.entry()?.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(TokenStoreError::from(e)),
        }
    }

    fn save(&self, token: &str) -> Result<(), TokenStoreError> {
        self.entry()?.set_password(token)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        match self.entry()?.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(TokenStoreError::from(e)),
        }
    }
}

/// In-process token store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `token`, as if a previous session saved it.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<String>>, TokenStoreError> {
        self.token
            .lock()
            .map_err(|_| TokenStoreError::OperationFailed("token mutex poisoned".to_string()))
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>, TokenStoreError> {
        Ok(self.lock()?.clone())
    }

    fn save(&self, token: &str) -> Result<(), TokenStoreError> {
        *self.lock()? = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        *self.lock()? = None;
        Ok(())
    }
}
