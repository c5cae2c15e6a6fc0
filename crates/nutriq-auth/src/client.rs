//! Identity provider client
//!
//! Exchanges a bearer token for the caller's identity by asking the
//! provider's user endpoint. Successful lookups are cached briefly so a
//! burst of requests from one session does not hammer the provider.

use std::time::Duration;

use moka::future::Cache;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use nutriq_types::{AuthenticatedUser, UserId};

use crate::error::AuthError;

/// Identity client configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Base URL of the identity provider
    pub base_url: String,
    /// Provider API key, sent alongside every request
    pub api_key: String,
    /// Timeout for provider calls
    pub request_timeout: Duration,
    /// How long resolved identities stay cached
    pub cache_ttl: Duration,
}

impl AuthConfig {
    /// Create a new identity client config with default timeouts
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            request_timeout: Duration::from_secs(10),
            cache_ttl: Duration::from_secs(60),
        }
    }

    /// Override the identity cache TTL
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }
}

/// Identity provider client with a short-TTL token cache
#[derive(Clone)]
pub struct AuthClient {
    client: Client,
    config: AuthConfig,
    /// Cache of token-hash -> identity
    identity_cache: Cache<String, AuthenticatedUser>,
}

/// User payload returned by the provider
#[derive(Debug, Deserialize)]
struct ProviderUser {
    id: String,
    email: Option<String>,
}

impl AuthClient {
    /// Create a new identity client
    pub fn new(config: AuthConfig) -> Result<Self, AuthError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let identity_cache = Cache::builder()
            .time_to_live(config.cache_ttl)
            .max_capacity(10_000)
            .build();

        Ok(Self {
            client,
            config,
            identity_cache,
        })
    }

    /// Resolve a bearer token to the caller's identity
    #[instrument(skip(self, token))]
    pub async fn authenticate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        // Raw tokens never become cache keys or log fields.
        let cache_key = hash_token(token);

        if let Some(user) = self.identity_cache.get(&cache_key).await {
            return Ok(user);
        }

        let user = self.fetch_user(token).await?;
        self.identity_cache.insert(cache_key, user.clone()).await;

        Ok(user)
    }

    /// Drop a cached identity (call on logout or revocation signals)
    pub async fn invalidate(&self, token: &str) {
        self.identity_cache.invalidate(&hash_token(token)).await;
    }

    /// Ask the provider who holds this token
    async fn fetch_user(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let url = format!("{}/auth/v1/user", self.config.base_url.trim_end_matches('/'));

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .header("apikey", &self.config.api_key)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Identity provider request failed");
                AuthError::Provider(e.to_string())
            })?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                debug!("Identity provider rejected token");
                return Err(AuthError::Unauthenticated);
            }
            status if !status.is_success() => {
                warn!(status = %status, "Identity provider error");
                return Err(AuthError::Provider(format!("provider returned {status}")));
            }
            _ => {}
        }

        let user: ProviderUser = response.json().await.map_err(|e| {
            warn!(error = %e, "Failed to parse identity provider response");
            AuthError::Provider(e.to_string())
        })?;

        let id = UserId::parse(&user.id).map_err(|_| {
            warn!("Identity provider returned a non-UUID user id");
            AuthError::Provider("malformed user id".to_string())
        })?;

        Ok(AuthenticatedUser {
            id,
            email: user.email,
        })
    }
}

impl std::fmt::Debug for AuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthClient")
            .field("base_url", &self.config.base_url)
            .finish_non_exhaustive()
    }
}

/// Hash a token for cache keying
fn hash_token(token: &str) -> String {
    use sha2::Digest;
    let mut hasher = sha2::Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}
