//! Management API Authentication
//!
//! Acquires a bearer credential through the OAuth2 client-credentials grant
//! (or uses a static API token) and caches it for its declared lifetime.

use super::error::{ApiError, ApiResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};

/// Token expiry buffer - refresh tokens this much before they actually expire
/// This prevents using tokens that are about to expire during a request
const TOKEN_EXPIRY_BUFFER: Duration = Duration::from_secs(60);

/// Default token TTL when the token endpoint omits `expires_in`
const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(30 * 60);

/// Credentials supplied at client construction.
///
/// The [`Debug`] impl redacts secrets.
#[derive(Clone)]
pub enum Credentials {
    /// Pre-issued management API token
    StaticToken(String),
    /// OAuth2 client-credentials grant
    ClientCredentials {
        client_id: String,
        client_secret: String,
        audience: String,
    },
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StaticToken(_) => f
                .debug_tuple("StaticToken")
                .field(&"[REDACTED]")
                .finish(),
            Self::ClientCredentials {
                client_id,
                audience,
                ..
            } => f
                .debug_struct("ClientCredentials")
                .field("client_id", client_id)
                .field("client_secret", &"[REDACTED]")
                .field("audience", audience)
                .finish(),
        }
    }
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    grant_type: &'static str,
    client_id: &'a str,
    client_secret: &'a str,
    audience: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Clone)]
struct CachedToken {
    token: String,
    /// When this token expires (with buffer applied)
    expires_at: Instant,
}

impl CachedToken {
    fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

/// Bearer credential provider with token caching.
///
/// Clones share one cache. Valid-token reads only take the read lock;
/// refreshes are single-flight behind `refresh_lock`.
#[derive(Clone)]
pub struct TokenProvider {
    credentials: Credentials,
    token_url: String,
    http: Client,
    token_cache: Arc<RwLock<Option<CachedToken>>>,
    refresh_lock: Arc<Mutex<()>>,
}

impl TokenProvider {
    pub fn new(credentials: Credentials, token_url: impl Into<String>, http: Client) -> Self {
        Self {
            credentials,
            token_url: token_url.into(),
            http,
            token_cache: Arc::new(RwLock::new(None)),
            refresh_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Get a bearer token for API calls
    pub async fn get_token(&self) -> ApiResult<String> {
        let (client_id, client_secret, audience) = match &self.credentials {
            Credentials::StaticToken(token) => return Ok(token.clone()),
            Credentials::ClientCredentials {
                client_id,
                client_secret,
                audience,
            } => (client_id, client_secret, audience),
        };

        if let Some(token) = self.cached().await {
            return Ok(token);
        }

        let _guard = self.refresh_lock.lock().await;

        // Another caller may have refreshed while we waited
        if let Some(token) = self.cached().await {
            return Ok(token);
        }

        tracing::debug!("Requesting management API token from {}", self.token_url);

        let response = self
            .http
            .post(&self.token_url)
            .json(&TokenRequest {
                grant_type: "client_credentials",
                client_id,
                client_secret,
                audience,
            })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let parsed = super::error::ErrorBody::parse(status.as_u16(), &body);
            return Err(ApiError::Auth(format!(
                "{} {}: {}",
                parsed.status_code, parsed.error, parsed.message
            )));
        }

        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| ApiError::Auth(format!("invalid token response: {e}")))?;

        let ttl = token
            .expires_in
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TOKEN_TTL);
        let expires_at = Instant::now() + ttl.saturating_sub(TOKEN_EXPIRY_BUFFER);

        {
            let mut cache = self.token_cache.write().await;
            *cache = Some(CachedToken {
                token: token.access_token.clone(),
                expires_at,
            });
        }

        tracing::debug!(
            "New token cached, expires in ~{} seconds",
            ttl.saturating_sub(TOKEN_EXPIRY_BUFFER).as_secs()
        );

        Ok(token.access_token)
    }

    /// Drop the cached token so the next call performs a fresh exchange
    pub async fn invalidate(&self) {
        let mut cache = self.token_cache.write().await;
        *cache = None;
    }

    async fn cached(&self) -> Option<String> {
        let cache = self.token_cache.read().await;
        match cache.as_ref() {
            Some(cached) if cached.is_valid() => Some(cached.token.clone()),
            Some(_) => {
                tracing::debug!("Cached token expired, fetching new token");
                None
            }
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secrets() {
        let creds = Credentials::ClientCredentials {
            client_id: "abc".into(),
            client_secret: "super-secret".into(),
            audience: "https://tenant.example.com/api/v2/".into(),
        };
        let printed = format!("{:?}", creds);
        assert!(printed.contains("abc"));
        assert!(!printed.contains("super-secret"));

        let printed = format!("{:?}", Credentials::StaticToken("tok".into()));
        assert_eq!(printed, "StaticToken(\"[REDACTED]\")");
    }

    #[test]
    fn test_cached_token_validity() {
        let fresh = CachedToken {
            token: "t".into(),
            expires_at: Instant::now() + Duration::from_secs(10),
        };
        assert!(fresh.is_valid());

        let stale = CachedToken {
            token: "t".into(),
            expires_at: Instant::now() - Duration::from_millis(1),
        };
        assert!(!stale.is_valid());
    }

    #[test]
    fn test_static_token_skips_exchange() {
        let provider = TokenProvider::new(
            Credentials::StaticToken("static".into()),
            "http://127.0.0.1:9/oauth/token",
            Client::new(),
        );
        let token = tokio_test::assert_ok!(tokio_test::block_on(provider.get_token()));
        assert_eq!(token, "static");
    }
}
