//! Management Client
//!
//! Main client for the management API, combining authentication, the HTTP
//! transport, rate-limit backoff and deadline handling.

use super::auth::{Credentials, TokenProvider};
use super::error::{ApiError, ApiResult};
use super::http::{Attempt, HttpClient};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Default per-attempt HTTP timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Backoff used when a 429 carries no usable reset header
pub const DEFAULT_RATE_LIMIT_FALLBACK: Duration = Duration::from_secs(1);

/// Caller-supplied instant by which a request (including backoff) must finish
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline(tokio::time::Instant);

impl Deadline {
    pub fn after(timeout: Duration) -> Self {
        Self(tokio::time::Instant::now() + timeout)
    }

    pub fn at(instant: tokio::time::Instant) -> Self {
        Self(instant)
    }

    pub fn remaining(&self) -> Duration {
        self.0.saturating_duration_since(tokio::time::Instant::now())
    }

    pub fn instant(&self) -> tokio::time::Instant {
        self.0
    }
}

/// Endpoint and transport settings
#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Versioned API base, always ending in `/`
    pub api_base: Url,
    pub token_url: String,
    pub request_timeout: Duration,
    pub rate_limit_fallback: Duration,
}

impl ClientSettings {
    /// Settings for `https://{domain}/api/v2/`
    pub fn for_domain(domain: &str) -> ApiResult<Self> {
        Self::new(
            &format!("https://{domain}/api/v2/"),
            &format!("https://{domain}/oauth/token"),
        )
    }

    /// Settings for an explicit API base and token URL
    pub fn new(api_base: &str, token_url: &str) -> ApiResult<Self> {
        let mut base = api_base.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let api_base = Url::parse(&base)
            .map_err(|e| ApiError::Transport(format!("invalid API base {base:?}: {e}")))?;

        Ok(Self {
            api_base,
            token_url: token_url.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            rate_limit_fallback: DEFAULT_RATE_LIMIT_FALLBACK,
        })
    }

    /// The audience a client-credentials grant should request
    pub fn default_audience(&self) -> String {
        self.api_base.to_string()
    }
}

/// Main management API client.
///
/// Cheap to clone; clones share the connection pool and the token cache.
#[derive(Clone)]
pub struct ManagementClient {
    tokens: TokenProvider,
    http: HttpClient,
    settings: ClientSettings,
}

impl ManagementClient {
    /// Create a new management client
    pub fn new(settings: ClientSettings, credentials: Credentials) -> ApiResult<Self> {
        let http = HttpClient::new(settings.request_timeout)?;
        let tokens = TokenProvider::new(credentials, settings.token_url.clone(), http.inner().clone());

        Ok(Self {
            tokens,
            http,
            settings,
        })
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// Issue a request and decode the response.
    ///
    /// Returns `Ok(None)` for 2xx responses without a body. 429 responses are
    /// retried after the server-announced reset until the deadline expires.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        deadline: Deadline,
    ) -> ApiResult<Option<T>> {
        let text = match tokio::time::timeout_at(
            deadline.instant(),
            self.request_with_backoff(method.clone(), path, body),
        )
        .await
        {
            Ok(result) => result?,
            Err(_) => {
                tracing::warn!("{} {} abandoned: deadline exceeded", method, path);
                return Err(ApiError::DeadlineExceeded);
            }
        };

        match text {
            Some(text) => serde_json::from_str(&text)
                .map(Some)
                .map_err(|e| ApiError::Decode(e.to_string())),
            None => Ok(None),
        }
    }

    async fn request_with_backoff(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> ApiResult<Option<String>> {
        let url = self.url(path)?;

        loop {
            let token = self.tokens.get_token().await?;

            match self.http.execute(method.clone(), url.as_str(), &token, body).await {
                Ok(Attempt::Completed(text)) => return Ok(text),
                Ok(Attempt::RateLimited { retry_in }) => {
                    let wait = retry_in.unwrap_or(self.settings.rate_limit_fallback);
                    tracing::warn!(
                        "Rate limited on {} {}, retrying in {}ms",
                        method,
                        path,
                        wait.as_millis()
                    );
                    tokio::time::sleep(wait).await;
                }
                Err(err) if err.status() == Some(401) => {
                    self.tokens.invalidate().await;
                    return Err(err);
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// GET and decode
    pub async fn get<T: DeserializeOwned>(&self, path: &str, deadline: Deadline) -> ApiResult<T> {
        self.request(Method::GET, path, None, deadline)
            .await?
            .ok_or_else(|| ApiError::Decode(format!("empty response body from GET {path}")))
    }

    /// POST and decode (body optional in the response)
    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &Value,
        deadline: Deadline,
    ) -> ApiResult<Option<T>> {
        self.request(Method::POST, path, Some(body), deadline).await
    }

    /// PATCH and decode (body optional in the response)
    pub async fn patch<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &Value,
        deadline: Deadline,
    ) -> ApiResult<Option<T>> {
        self.request(Method::PATCH, path, Some(body), deadline).await
    }

    /// PUT and decode (body optional in the response)
    pub async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &Value,
        deadline: Deadline,
    ) -> ApiResult<Option<T>> {
        self.request(Method::PUT, path, Some(body), deadline).await
    }

    /// DELETE, optionally with a body (relationship removals take one)
    pub async fn delete(&self, path: &str, body: Option<&Value>, deadline: Deadline) -> ApiResult<()> {
        self.request::<Value>(Method::DELETE, path, body, deadline)
            .await
            .map(|_| ())
    }

    /// Resolve a path relative to the versioned API base
    pub fn url(&self, path: &str) -> ApiResult<Url> {
        self.settings
            .api_base
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::Transport(format!("invalid path {path:?}: {e}")))
    }
}

/// Build `{collection}/{id}` with the identity percent-encoded
pub fn resource_path(collection: &str, id: &str) -> String {
    format!("{}/{}", collection, urlencoding::encode(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ManagementClient {
        let settings = ClientSettings::new("https://tenant.example.com/api/v2", "https://tenant.example.com/oauth/token").unwrap();
        ManagementClient::new(settings, Credentials::StaticToken("t".into())).unwrap()
    }

    #[test]
    fn test_settings_for_domain() {
        let settings = ClientSettings::for_domain("tenant.example.com").unwrap();
        assert_eq!(settings.api_base.as_str(), "https://tenant.example.com/api/v2/");
        assert_eq!(settings.token_url, "https://tenant.example.com/oauth/token");
        assert_eq!(settings.default_audience(), "https://tenant.example.com/api/v2/");
    }

    #[test]
    fn test_url_keeps_versioned_base() {
        let url = client().url("connections/con_123").unwrap();
        assert_eq!(url.as_str(), "https://tenant.example.com/api/v2/connections/con_123");

        let url = client().url("/roles").unwrap();
        assert_eq!(url.as_str(), "https://tenant.example.com/api/v2/roles");
    }

    #[test]
    fn test_resource_path_encodes_identity() {
        assert_eq!(resource_path("users", "auth0|abc"), "users/auth0%7Cabc");
        let url = client().url(&resource_path("users", "auth0|abc")).unwrap();
        assert!(url.as_str().ends_with("/users/auth0%7Cabc"));
    }

    #[test]
    fn test_deadline_remaining_shrinks() {
        let deadline = Deadline::after(Duration::from_secs(60));
        assert!(deadline.remaining() <= Duration::from_secs(60));
        assert!(deadline.remaining() > Duration::from_secs(59));
    }
}
