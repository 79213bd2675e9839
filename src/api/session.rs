//! Notification hook for expired or rejected sessions.
//!
//! When the backend answers 401 the client clears its token and calls the
//! installed [`UnauthorizedHandler`]. A GUI would navigate to its login screen
//! here; the CLI just tells the user where to sign in again.

/// Default login location shown when a session is rejected.
pub const DEFAULT_LOGIN_URL: &str = "login.html";

/// Invoked once per 401 response, after the token has been cleared.
pub trait UnauthorizedHandler: Send + Sync {
    fn on_unauthorized(&self);
}

impl<F> UnauthorizedHandler for F
where
    F: Fn() + Send + Sync,
{
    fn on_unauthorized(&self) {
        self()
    }
}

/// Logs a warning pointing the user at the login location.
#[derive(Debug, Clone)]
pub struct LoginRedirect {
    login_url: String,
}

impl LoginRedirect {
    pub fn new(login_url: impl Into<String>) -> Self {
        Self {
            login_url: login_url.into(),
        }
    }

    pub fn login_url(&self) -> &str {
        &self.login_url
    }
}

impl Default for LoginRedirect {
    fn default() -> Self {
        Self::new(DEFAULT_LOGIN_URL)
    }
}

impl UnauthorizedHandler for LoginRedirect {
    fn on_unauthorized(&self) {
        log::warn!("Session is no longer valid, sign in again at {}", self.login_url);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    #[test]
    fn closures_act_as_handlers() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let handler = move || {
            counter.fetch_add(1, Ordering::SeqCst);
        };

        handler.on_unauthorized();
        handler.on_unauthorized();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn login_redirect_defaults_to_login_page() {
        assert_eq!(LoginRedirect::default().login_url(), DEFAULT_LOGIN_URL);
        // Only logs; must not panic without a logger installed.
        LoginRedirect::new("https://app.example/login").on_unauthorized();
    }
}
