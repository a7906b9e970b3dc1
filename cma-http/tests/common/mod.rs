//! Shared test helpers for cma-http tests.

#![allow(dead_code)]

use cma_core::DefaultParams;
use cma_http::ClientConfig;
use wiremock::MockServer;

pub const TOKEN: &str = "test-token";

/// Config pointed at `server`, with millisecond backoff.
pub fn mock_config(server: &MockServer) -> ClientConfig {
    ClientConfig {
        api_base_url: Some(server.uri()),
        retry_base_delay_ms: 1,
        ..ClientConfig::new(TOKEN)
    }
}

/// Like [`mock_config`], with space `A` and environment `master` bound.
pub fn bound_config(server: &MockServer) -> ClientConfig {
    ClientConfig {
        defaults: DefaultParams {
            space_id: Some("A".to_string()),
            environment_id: Some("master".to_string()),
            organization_id: None,
        },
        ..mock_config(server)
    }
}

/// Header value of the first request the server received.
pub async fn first_header(server: &MockServer, name: &str) -> Option<String> {
    let requests = server.received_requests().await?;
    let request = requests.first()?;
    request
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}
