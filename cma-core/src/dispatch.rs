//! Action dispatcher.
//!
//! Routes an [`ActionDescriptor`] to the handler registered for its
//! `(entity type, action)` pair. No retries, timeouts or caching happen here.

use crate::error::{CmaError, CmaResult};
use crate::params::{Headers, Params, Payload};
use crate::registry::{Endpoint, Registry};
use crate::transport::Transport;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Header carrying the caller-agent string.
pub const USER_AGENT_HEADER: &str = "X-Contentful-User-Agent";

/// Public action names that map to a different registry key.
///
/// `delete` is reserved in several host languages, so handlers are registered
/// as `del`. Callers may use either name.
const ACTION_ALIASES: &[(&str, &str)] = &[("delete", "del")];

/// Maps a public action name to its registry key.
pub fn resolve_action(action: &str) -> &str {
    ACTION_ALIASES
        .iter()
        .find(|(public, _)| *public == action)
        .map(|(_, key)| *key)
        .unwrap_or(action)
}

/// Identifies one registered handler plus the inputs for a single call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionDescriptor {
    pub entity_type: String,
    pub action: String,
    pub params: Params,
    pub payload: Option<Payload>,
    pub headers: Headers,
    /// When set, replaces any [`USER_AGENT_HEADER`] value in `headers`, whatever
    /// the letter case of the caller's key.
    pub user_agent: Option<String>,
}

impl ActionDescriptor {
    pub fn new(entity_type: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            action: action.into(),
            ..Default::default()
        }
    }

    pub fn params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    pub fn payload(mut self, payload: impl Into<Payload>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    pub fn headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}

/// Looks up and invokes handlers against one transport.
#[derive(Clone)]
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    registry: Arc<Registry>,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn Transport>, registry: Arc<Registry>) -> Self {
        Self {
            transport,
            registry,
        }
    }

    /// A dispatcher over the built-in endpoint handlers.
    pub fn with_default_endpoints(transport: Arc<dyn Transport>) -> Self {
        Self::new(transport, Arc::new(Registry::with_default_endpoints()))
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Resolves the endpoint for a public entity type / action pair.
    pub fn endpoint(&self, entity_type: &str, action: &str) -> CmaResult<&Endpoint> {
        self.registry
            .lookup(entity_type, resolve_action(action))
            .ok_or_else(|| CmaError::UnknownEndpoint {
                entity_type: entity_type.to_string(),
                action: action.to_string(),
            })
    }

    /// Invokes the handler registered for `descriptor`.
    pub async fn dispatch(&self, descriptor: ActionDescriptor) -> CmaResult<Value> {
        let ActionDescriptor {
            entity_type,
            action,
            params,
            payload,
            mut headers,
            user_agent,
        } = descriptor;

        let endpoint = self.endpoint(&entity_type, &action)?;
        if let Some(user_agent) = user_agent {
            headers.retain(|name, _| !name.eq_ignore_ascii_case(USER_AGENT_HEADER));
            headers.insert(USER_AGENT_HEADER.to_string(), user_agent);
        }

        debug!(entity_type = %entity_type, action = %action, "dispatching");
        endpoint
            .call(Arc::clone(&self.transport), params, payload, headers)
            .await
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("entity_types", &self.registry.entity_types())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_resolves_to_del() {
        assert_eq!(resolve_action("delete"), "del");
        assert_eq!(resolve_action("del"), "del");
        assert_eq!(resolve_action("get"), "get");
    }
}
