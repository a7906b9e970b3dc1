//! Shared test helpers for cma-core tests.

#![allow(dead_code)]

use async_trait::async_trait;
use cma_core::{CmaError, CmaResult, Delay, HttpError, HttpRequest, Method, Transport};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Responder = Box<dyn Fn(&HttpRequest) -> CmaResult<Value> + Send + Sync>;

/// In-memory transport that records every request.
pub struct MockTransport {
    requests: Mutex<Vec<HttpRequest>>,
    responder: Responder,
}

impl MockTransport {
    pub fn new(responder: impl Fn(&HttpRequest) -> CmaResult<Value> + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            responder: Box::new(responder),
        })
    }

    /// Answers every request with its own method and url.
    pub fn echo() -> Arc<Self> {
        Self::new(|request| {
            Ok(json!({
                "method": request.method.as_str(),
                "url": request.url,
            }))
        })
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn count(&self, method: Method, url: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.url == url)
            .count()
    }

    pub fn last(&self) -> HttpRequest {
        self.requests.lock().unwrap().last().cloned().expect("no request sent")
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn request(&self, request: HttpRequest) -> CmaResult<Value> {
        let response = (self.responder)(&request);
        self.requests.lock().unwrap().push(request);
        response
    }
}

/// Delay that returns at once and records what it was asked to wait.
#[derive(Default)]
pub struct RecordingDelay {
    waits: Mutex<Vec<Duration>>,
}

impl RecordingDelay {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn waits(&self) -> Vec<Duration> {
        self.waits.lock().unwrap().clone()
    }
}

#[async_trait]
impl Delay for RecordingDelay {
    async fn wait(&self, duration: Duration) {
        self.waits.lock().unwrap().push(duration);
    }
}

/// An asset whose `fields.file` lists `locales`, none processed yet.
pub fn unprocessed_asset(id: &str, version: u64, locales: &[&str]) -> Value {
    let files: serde_json::Map<String, Value> = locales
        .iter()
        .map(|locale| {
            (
                locale.to_string(),
                json!({"upload": "https://upload.example/file", "fileName": "a.png"}),
            )
        })
        .collect();
    json!({
        "sys": {"id": id, "version": version, "type": "Asset"},
        "fields": {"file": files},
    })
}

/// Sets `fields.file[locale].url` on `asset`.
pub fn with_url(mut asset: Value, locale: &str) -> Value {
    asset["fields"]["file"][locale]["url"] = json!(format!("//assets.example/{locale}.png"));
    asset
}

pub fn not_found(url: &str) -> CmaError {
    CmaError::Http(HttpError {
        status: 404,
        status_text: "Not Found".to_string(),
        name: "NotFound".to_string(),
        message: "The resource could not be found.".to_string(),
        request_id: Some("req-1".to_string()),
        details: None,
        method: "GET".to_string(),
        url: url.to_string(),
    })
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
