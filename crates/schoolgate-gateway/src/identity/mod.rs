//! Session -> identity resolution.
//!
//! Verification itself is delegated to an [`IdentityProvider`]; this module
//! only locates the session token in the request cookies and bounds the
//! provider call with the configured lookup timeout.

pub mod cookie;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::HeaderMap;

use schoolgate_core::error::Result;
use schoolgate_core::Identity;

/// External identity provider: "verify session, return subject".
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// `Ok(None)` means the session is absent, expired or invalid.
    async fn verify_session(&self, token: &str) -> Result<Option<Identity>>;
}

pub struct IdentityResolver {
    provider: Arc<dyn IdentityProvider>,
    cookie_names: Vec<String>,
    timeout: Duration,
}

impl IdentityResolver {
    pub fn new(provider: Arc<dyn IdentityProvider>, cookie_names: Vec<String>, timeout: Duration) -> Self {
        Self {
            provider,
            cookie_names,
            timeout,
        }
    }

    /// Resolve the authenticated subject, or `None` for "unauthenticated".
    /// Provider errors and timeouts are logged and treated as unauthenticated.
    pub async fn resolve(&self, headers: &HeaderMap) -> Option<Identity> {
        let token = cookie::session_token(headers, &self.cookie_names)?;

        match tokio::time::timeout(self.timeout, self.provider.verify_session(&token)).await {
            Ok(Ok(identity)) => identity,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "session verification failed");
                None
            }
            Err(_) => {
                tracing::warn!(timeout_ms = self.timeout.as_millis() as u64, "session verification timed out");
                None
            }
        }
    }
}
