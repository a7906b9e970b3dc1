//! reqwest-backed [`Transport`].

use crate::config::ClientConfig;
use async_trait::async_trait;
use cma_core::{CmaError, CmaResult, Headers, HttpError, HttpRequest, Method, Transport};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response, StatusCode, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Default content type of management API request bodies.
pub const MANAGEMENT_CONTENT_TYPE: &str = "application/vnd.contentful.management.v1+json";

/// Seconds until the rate limit window resets, sent with 429 responses.
pub const RATE_LIMIT_RESET_HEADER: &str = "x-contentful-ratelimit-reset";

pub const REQUEST_ID_HEADER: &str = "x-contentful-request-id";

/// Retry settings taken from the client config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub enabled: bool,
    pub limit: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            enabled: config.retry_on_error,
            limit: config.retry_limit,
            base_delay: Duration::from_millis(config.retry_base_delay_ms),
        }
    }

    /// Exponential backoff for the given zero-based retry attempt.
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(1u32 << attempt.min(16))
    }

    fn allows(&self, attempt: u32) -> bool {
        self.enabled && attempt < self.limit
    }
}

/// HTTP transport for the management API.
pub struct HttpTransport {
    client: Client,
    base_url: Url,
    default_headers: Headers,
    retry: RetryPolicy,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> CmaResult<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| CmaError::Config(format!("failed to create HTTP client: {e}")))?;

        let mut default_headers = Headers::new();
        default_headers.insert(
            "Authorization".to_string(),
            format!("Bearer {}", config.access_token),
        );
        default_headers.insert(
            "Content-Type".to_string(),
            MANAGEMENT_CONTENT_TYPE.to_string(),
        );
        default_headers.extend(config.headers.clone());

        Ok(Self {
            client,
            base_url: config.base_url()?,
            default_headers,
            retry: RetryPolicy::from_config(config),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    fn url(&self, path: &str) -> CmaResult<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| CmaError::validation("url", format!("cannot join {path}: {e}")))
    }

    /// Default headers overlaid with `extra`. Names compare case-insensitively.
    fn header_map(&self, extra: &Headers) -> CmaResult<HeaderMap> {
        let mut map = HeaderMap::new();
        for (name, value) in self.default_headers.iter().chain(extra.iter()) {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| CmaError::validation("headers", format!("{name}: {e}")))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|e| CmaError::validation("headers", format!("{name}: {e}")))?;
            map.insert(header_name, header_value);
        }
        Ok(map)
    }

    async fn send(&self, request: &HttpRequest, url: &Url, headers: &HeaderMap) -> reqwest::Result<Response> {
        let mut builder = self
            .client
            .request(to_reqwest_method(request.method), url.clone())
            .headers(headers.clone());
        if !request.config.query.is_empty() {
            builder = builder.query(&request.config.query);
        }
        if let Some(body) = &request.body {
            // Serialized by hand so the configured content type is kept.
            builder = builder.body(body.to_string());
        }
        builder.send().await
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(&self, request: HttpRequest) -> CmaResult<Value> {
        let url = self.url(&request.url)?;
        let headers = self.header_map(&request.config.headers)?;
        let mut attempt = 0;

        loop {
            debug!("{} {}", request.method, url);

            match self.send(&request, &url, &headers).await {
                Ok(response) if response.status().is_success() => {
                    return read_body(response).await;
                }
                Ok(response) if is_retryable(response.status()) && self.retry.allows(attempt) => {
                    let delay = rate_limit_reset(&response).unwrap_or_else(|| self.retry.backoff(attempt));
                    warn!(
                        "{} {} answered {}, retry {}/{} in {:?}",
                        request.method,
                        url,
                        response.status(),
                        attempt + 1,
                        self.retry.limit,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Ok(response) => {
                    return Err(CmaError::Http(http_error(request.method, &url, response).await));
                }
                Err(e) if (e.is_connect() || e.is_timeout()) && self.retry.allows(attempt) => {
                    let delay = self.retry.backoff(attempt);
                    warn!(
                        "{} {} failed: {}, retry {}/{} in {:?}",
                        request.method,
                        url,
                        e,
                        attempt + 1,
                        self.retry.limit,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    return Err(CmaError::Network(format!("{} {url} failed: {e}", request.method)));
                }
            }
            attempt += 1;
        }
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn rate_limit_reset(response: &Response) -> Option<Duration> {
    if response.status() != StatusCode::TOO_MANY_REQUESTS {
        return None;
    }
    response
        .headers()
        .get(RATE_LIMIT_RESET_HEADER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

/// Parsed JSON body; `Value::Null` when the body is empty.
async fn read_body(response: Response) -> CmaResult<Value> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| CmaError::Network(format!("failed to read response body: {e}")))?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_slice(&bytes)?)
}

/// Maps a non-success response onto [`HttpError`].
///
/// The remote error body carries `sys.id` (the error name), `message` and
/// `details`. Non-JSON bodies become the message as-is.
pub(crate) async fn http_error(method: Method, url: &Url, response: Response) -> HttpError {
    let status = response.status();
    let status_text = status.canonical_reason().unwrap_or_default().to_string();
    let request_id = response
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let text = response.text().await.unwrap_or_default();
    let body: Value = serde_json::from_str(&text).unwrap_or(Value::Null);

    let name = body
        .pointer("/sys/id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| status_text.clone());
    let message = match body.get("message").and_then(Value::as_str) {
        Some(message) => message.to_string(),
        None if body.is_null() => text,
        None => String::new(),
    };

    HttpError {
        status: status.as_u16(),
        status_text,
        name,
        message,
        request_id,
        details: body.get("details").cloned(),
        method: method.as_str().to_string(),
        url: url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_per_attempt() {
        let policy = RetryPolicy {
            enabled: true,
            limit: 5,
            base_delay: Duration::from_millis(1000),
        };
        assert_eq!(policy.backoff(0), Duration::from_millis(1000));
        assert_eq!(policy.backoff(1), Duration::from_millis(2000));
        assert_eq!(policy.backoff(3), Duration::from_millis(8000));
    }

    #[test]
    fn retries_stop_at_the_limit() {
        let policy = RetryPolicy {
            enabled: true,
            limit: 2,
            base_delay: Duration::ZERO,
        };
        assert!(policy.allows(0));
        assert!(policy.allows(1));
        assert!(!policy.allows(2));
        assert!(!RetryPolicy { enabled: false, ..policy }.allows(0));
    }

    #[test]
    fn only_rate_limits_and_server_errors_retry() {
        assert!(is_retryable(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_retryable(StatusCode::BAD_GATEWAY));
        assert!(!is_retryable(StatusCode::CONFLICT));
        assert!(!is_retryable(StatusCode::NOT_FOUND));
    }
}
