use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{error, warn};

use crate::access::types::Identity;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("auth provider unreachable: {0}")]
    Unreachable(String),
    #[error("auth provider rejected token: HTTP {0}")]
    Rejected(u16),
    #[error("auth response parse error: {0}")]
    Parse(String),
}

/// Resolves a bearer token to a stable user id against the hosted auth
/// provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn authenticate(&self, token: &str) -> Result<String, AuthError>;
}

/// HTTP client for the hosted auth provider's user endpoint.
pub struct HostedAuth {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl HostedAuth {
    pub fn new(base_url: String, anon_key: String) -> Self {
        let client = Client::builder()
            .pool_max_idle_per_host(50)
            .pool_idle_timeout(Duration::from_secs(90))
            // Hard per-call timeout: identity resolution must not hang an
            // access check; a slow provider degrades to the anonymous path.
            .timeout(Duration::from_secs(2))
            .use_rustls_tls()
            .build()
            .expect("Failed to build auth HTTP client");

        Self {
            client,
            base_url,
            anon_key,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
}

#[async_trait]
impl IdentityProvider for HostedAuth {
    async fn authenticate(&self, token: &str) -> Result<String, AuthError> {
        let url = format!("{}/auth/v1/user", self.base_url.trim_end_matches('/'));

        let resp = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", token))
            .header("apikey", &self.anon_key)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Auth provider unreachable");
                AuthError::Unreachable(e.to_string())
            })?;

        if !resp.status().is_success() {
            warn!(status = %resp.status(), "Auth provider rejected session token");
            return Err(AuthError::Rejected(resp.status().as_u16()));
        }

        let user: AuthUser = resp.json().await.map_err(|e| {
            error!(error = %e, "Failed to parse auth provider response");
            AuthError::Parse(e.to_string())
        })?;

        Ok(user.id)
    }
}

/// Resolve a session to an identity. A failed token check falls back to the
/// anonymous path (most-restricted) instead of erroring; a session with
/// neither a usable token nor a fingerprint cannot be resolved at all and
/// the caller denies conservatively.
pub async fn resolve(
    provider: &dyn IdentityProvider,
    token: Option<&str>,
    fingerprint: Option<&str>,
) -> Option<Identity> {
    if let Some(token) = token {
        match provider.authenticate(token).await {
            Ok(user_id) => return Some(Identity::Authenticated { user_id }),
            Err(e) => {
                warn!(error = %e, "identity resolution failed, treating session as anonymous");
            }
        }
    }

    fingerprint
        .filter(|fp| !fp.is_empty())
        .map(|fp| Identity::Anonymous {
            fingerprint: fp.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingProvider;

    #[async_trait]
    impl IdentityProvider for FailingProvider {
        async fn authenticate(&self, _token: &str) -> Result<String, AuthError> {
            Err(AuthError::Unreachable("connection refused".into()))
        }
    }

    struct FixedProvider(&'static str);

    #[async_trait]
    impl IdentityProvider for FixedProvider {
        async fn authenticate(&self, _token: &str) -> Result<String, AuthError> {
            Ok(self.0.to_string())
        }
    }

    #[tokio::test]
    async fn provider_failure_degrades_to_anonymous() {
        let identity = resolve(&FailingProvider, Some("jwt"), Some("fp-1234")).await;
        assert_eq!(
            identity,
            Some(Identity::Anonymous {
                fingerprint: "fp-1234".into()
            })
        );
    }

    #[tokio::test]
    async fn provider_failure_without_fingerprint_is_unresolvable() {
        assert_eq!(resolve(&FailingProvider, Some("jwt"), None).await, None);
    }

    #[tokio::test]
    async fn valid_token_wins_over_fingerprint() {
        let identity = resolve(&FixedProvider("user-1"), Some("jwt"), Some("fp")).await;
        assert_eq!(
            identity,
            Some(Identity::Authenticated {
                user_id: "user-1".into()
            })
        );
    }
}
