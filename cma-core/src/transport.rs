//! Transport abstraction.
//!
//! Handlers only ever talk to a [`Transport`]. The concrete HTTP client lives
//! in `cma-http`; tests substitute an in-memory implementation.

use crate::error::CmaResult;
use crate::params::Headers;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// HTTP method of a transport request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-request options: query string pairs and extra headers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestConfig {
    pub query: Vec<(String, String)>,
    pub headers: Headers,
}

impl RequestConfig {
    pub fn with_headers(headers: Headers) -> Self {
        Self {
            query: Vec::new(),
            headers,
        }
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }
}

/// A single request handed to the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    /// Path relative to the client's base URL, without a leading slash.
    pub url: String,
    pub body: Option<Value>,
    pub config: RequestConfig,
}

/// The narrow contract every handler depends on.
///
/// Implementations resolve to the parsed JSON body (`Value::Null` for empty
/// bodies) or reject through their error mapping with [`CmaError::Http`].
///
/// [`CmaError::Http`]: crate::CmaError::Http
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends a request and returns the parsed response body.
    async fn request(&self, request: HttpRequest) -> CmaResult<Value>;

    async fn get(&self, url: &str, config: RequestConfig) -> CmaResult<Value> {
        self.request(HttpRequest {
            method: Method::Get,
            url: url.to_string(),
            body: None,
            config,
        })
        .await
    }

    async fn post(&self, url: &str, body: Option<Value>, config: RequestConfig) -> CmaResult<Value> {
        self.request(HttpRequest {
            method: Method::Post,
            url: url.to_string(),
            body,
            config,
        })
        .await
    }

    async fn put(&self, url: &str, body: Option<Value>, config: RequestConfig) -> CmaResult<Value> {
        self.request(HttpRequest {
            method: Method::Put,
            url: url.to_string(),
            body,
            config,
        })
        .await
    }

    async fn patch(&self, url: &str, body: Option<Value>, config: RequestConfig) -> CmaResult<Value> {
        self.request(HttpRequest {
            method: Method::Patch,
            url: url.to_string(),
            body,
            config,
        })
        .await
    }

    async fn delete(&self, url: &str, config: RequestConfig) -> CmaResult<Value> {
        self.request(HttpRequest {
            method: Method::Delete,
            url: url.to_string(),
            body: None,
            config,
        })
        .await
    }
}
