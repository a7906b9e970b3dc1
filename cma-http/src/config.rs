//! Client configuration.

use cma_core::{CmaError, CmaResult, DefaultParams, Headers};
use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Settings for one management API client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Personal access token or OAuth token. Required.
    pub access_token: String,
    /// API host, optionally with a port.
    pub host: String,
    /// Use plain http instead of https.
    pub insecure: bool,
    /// Path prefix placed in front of every endpoint path.
    pub base_path: String,
    /// Full base URL (e.g. `http://127.0.0.1:8080`). Replaces scheme, host
    /// and base path when set.
    pub api_base_url: Option<String>,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Retry rate-limited and server-error responses.
    pub retry_on_error: bool,
    /// Maximum number of retries per request.
    pub retry_limit: u32,
    /// First backoff step in milliseconds, doubled on every retry.
    pub retry_base_delay_ms: u64,
    /// Application name and version reported in the user agent.
    pub application: Option<String>,
    /// Integration name and version reported in the user agent.
    pub integration: Option<String>,
    /// Feature name reported in the user agent.
    pub feature: Option<String>,
    /// Extra headers sent with every request.
    pub headers: Headers,
    /// Identifiers bound into every call that declares them.
    pub defaults: DefaultParams,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            host: "api.contentful.com".to_string(),
            insecure: false,
            base_path: String::new(),
            api_base_url: None,
            timeout_ms: 30_000,
            retry_on_error: true,
            retry_limit: 5,
            retry_base_delay_ms: 1000,
            application: None,
            integration: None,
            feature: None,
            headers: Headers::new(),
            defaults: DefaultParams::default(),
        }
    }
}

impl ClientConfig {
    /// Creates a config for `access_token` with every other setting at its default.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            ..Default::default()
        }
    }

    /// Checks the settings that cannot be defaulted.
    pub fn validate(&self) -> CmaResult<()> {
        if self.access_token.trim().is_empty() {
            return Err(CmaError::Config(
                "expected parameter accessToken".to_string(),
            ));
        }
        if self.api_base_url.is_none() && self.host.trim().is_empty() {
            return Err(CmaError::Config("host must not be empty".to_string()));
        }
        self.base_url()?;
        Ok(())
    }

    /// Base URL every relative endpoint path is joined onto. Always ends in `/`.
    pub fn base_url(&self) -> CmaResult<Url> {
        let raw = match &self.api_base_url {
            Some(url) => format!("{}/", url.trim_end_matches('/')),
            None => {
                let scheme = if self.insecure { "http" } else { "https" };
                let base_path = self.base_path.trim_matches('/');
                if base_path.is_empty() {
                    format!("{scheme}://{}/", self.host)
                } else {
                    format!("{scheme}://{}/{base_path}/", self.host)
                }
            }
        };
        Url::parse(&raw).map_err(|e| CmaError::Config(format!("invalid base url {raw}: {e}")))
    }

    /// Caller-agent string, e.g. `sdk cma-rs/0.4.0; platform rust; os linux; app blog/1.0;`.
    pub fn user_agent(&self) -> String {
        let mut agent = format!(
            "sdk cma-rs/{}; platform rust; os {};",
            env!("CARGO_PKG_VERSION"),
            std::env::consts::OS
        );
        for (label, value) in [
            ("app", &self.application),
            ("integration", &self.integration),
            ("feature", &self.feature),
        ] {
            if let Some(value) = value {
                agent.push_str(&format!(" {label} {value};"));
            }
        }
        agent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_joins_host_and_path() {
        let config = ClientConfig {
            base_path: "/proxy/".to_string(),
            ..ClientConfig::new("token")
        };
        assert_eq!(
            config.base_url().unwrap().as_str(),
            "https://api.contentful.com/proxy/"
        );
    }

    #[test]
    fn api_base_url_overrides_host() {
        let config = ClientConfig {
            api_base_url: Some("http://127.0.0.1:9000".to_string()),
            insecure: false,
            ..ClientConfig::new("token")
        };
        let url = config.base_url().unwrap().join("spaces/s1").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9000/spaces/s1");
    }
}
