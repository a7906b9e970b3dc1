//! HTTP side of the management API client.
//!
//! [`HttpTransport`] implements `cma_core::Transport` over reqwest: auth and
//! content-type headers, error mapping onto `HttpError`, and retries for
//! rate-limited or failing requests. [`create_client`] wires it into a
//! `PlainClient` with the configured defaults and user agent.

mod config;
mod transport;

pub use config::ClientConfig;
pub use transport::{
    HttpTransport, MANAGEMENT_CONTENT_TYPE, RATE_LIMIT_RESET_HEADER, REQUEST_ID_HEADER,
    RetryPolicy,
};

use cma_core::{CmaResult, Dispatcher, PlainClient};
use std::sync::Arc;
use tracing::debug;

/// Builds a client whose calls go over HTTP.
///
/// Fails with `CmaError::Config` when the access token is missing or the base
/// URL cannot be parsed. No request is sent.
pub fn create_client(config: ClientConfig) -> CmaResult<PlainClient> {
    let transport = HttpTransport::new(&config)?;
    debug!("management client for {}", transport.base_url());

    let dispatcher = Dispatcher::with_default_endpoints(Arc::new(transport));
    Ok(PlainClient::new(dispatcher, config.defaults.clone()).with_user_agent(config.user_agent()))
}
