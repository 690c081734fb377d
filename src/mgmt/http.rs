//! HTTP utilities for management API calls

use super::error::{ApiError, ApiResult, ErrorBody};
use reqwest::header::HeaderMap;
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use std::time::Duration;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Epoch-seconds instant at which the rate-limit window resets
pub const RATE_LIMIT_RESET_HEADER: &str = "x-ratelimit-reset";

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut cut = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..cut], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Outcome of a single HTTP exchange
#[derive(Debug)]
pub enum Attempt {
    /// 2xx; `None` when the body was empty
    Completed(Option<String>),
    /// 429; `retry_in` is absent when the reset header was missing or unparsable
    RateLimited { retry_in: Option<Duration> },
}

/// Compute how long to wait until the server-announced reset instant.
///
/// Returns `None` when the header is absent or not an integer. Reset
/// instants already in the past yield a zero delay.
pub fn reset_delay(headers: &HeaderMap, now_millis: i64) -> Option<Duration> {
    let reset_secs = headers
        .get(RATE_LIMIT_RESET_HEADER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<i64>()
        .ok()?;

    let wait_millis = reset_secs.saturating_mul(1000).saturating_sub(now_millis);
    Some(Duration::from_millis(wait_millis.max(0) as u64))
}

/// HTTP client wrapper for management API calls
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new(request_timeout: Duration) -> ApiResult<Self> {
        let client = Client::builder()
            .user_agent(format!("idpsync/{}", crate::VERSION))
            .timeout(request_timeout)
            .build()
            .map_err(|e| ApiError::Transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// The underlying reqwest client, shared with the token exchange
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Perform one request and classify the response
    pub async fn execute(
        &self,
        method: Method,
        url: &str,
        token: &str,
        body: Option<&Value>,
    ) -> ApiResult<Attempt> {
        tracing::debug!("{} {}", method, url);

        let mut request = self.client.request(method, url).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_in = reset_delay(response.headers(), chrono::Utc::now().timestamp_millis());
            return Ok(Attempt::RateLimited { retry_in });
        }

        let text = response.text().await?;

        if status.is_success() {
            if text.trim().is_empty() {
                return Ok(Attempt::Completed(None));
            }
            return Ok(Attempt::Completed(Some(text)));
        }

        // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
        tracing::error!("API error: {} - {}", status, sanitize_for_log(&text));

        let parsed = ErrorBody::parse(status.as_u16(), &text);
        Err(match status {
            StatusCode::NOT_FOUND => ApiError::NotFound {
                message: parsed.message,
            },
            s if s.is_server_error() => ApiError::Server(parsed),
            _ => ApiError::Api(parsed),
        })
    }
}
