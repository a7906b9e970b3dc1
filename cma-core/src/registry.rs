//! Handler registry keyed by `(entity type, action)`.
//!
//! Handlers differ in what they use, but all are stored behind one 4-slot
//! calling convention: transport, params, payload, headers. Unused slots are
//! simply ignored (`None` payload, empty params).

use crate::error::CmaResult;
use crate::params::{Headers, IdentifierKey, Params, Payload};
use crate::transport::Transport;
use futures::future::BoxFuture;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

/// Future returned by a registered handler.
pub type HandlerFuture = BoxFuture<'static, CmaResult<Value>>;

/// A type-erased handler.
pub type Handler =
    Arc<dyn Fn(Arc<dyn Transport>, Params, Option<Payload>, Headers) -> HandlerFuture + Send + Sync>;

/// One registered operation.
#[derive(Clone)]
pub struct Endpoint {
    handler: Handler,
    identifiers: &'static [IdentifierKey],
}

impl Endpoint {
    /// Identifier keys this operation's params declare. Only these are
    /// eligible for default injection.
    pub fn identifiers(&self) -> &'static [IdentifierKey] {
        self.identifiers
    }

    pub fn call(
        &self,
        transport: Arc<dyn Transport>,
        params: Params,
        payload: Option<Payload>,
        headers: Headers,
    ) -> HandlerFuture {
        (self.handler)(transport, params, payload, headers)
    }
}

impl std::fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Endpoint")
            .field("identifiers", &self.identifiers)
            .finish_non_exhaustive()
    }
}

/// `registry[entity_type][action]`.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entities: HashMap<String, HashMap<String, Endpoint>>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry populated with the built-in endpoint handlers.
    pub fn with_default_endpoints() -> Self {
        let mut registry = Self::new();
        crate::endpoints::register_all(&mut registry);
        registry
    }

    /// Registers `handler` under `entity_type`/`action`, replacing any
    /// previous registration.
    pub fn register<F, Fut>(
        &mut self,
        entity_type: &str,
        action: &str,
        identifiers: &'static [IdentifierKey],
        handler: F,
    ) -> &mut Self
    where
        F: Fn(Arc<dyn Transport>, Params, Option<Payload>, Headers) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CmaResult<Value>> + Send + 'static,
    {
        let erased: Handler = Arc::new(
            move |transport: Arc<dyn Transport>,
                  params: Params,
                  payload: Option<Payload>,
                  headers: Headers|
                  -> HandlerFuture { Box::pin(handler(transport, params, payload, headers)) },
        );
        self.entities
            .entry(entity_type.to_string())
            .or_default()
            .insert(
                action.to_string(),
                Endpoint {
                    handler: erased,
                    identifiers,
                },
            );
        self
    }

    pub fn lookup(&self, entity_type: &str, action: &str) -> Option<&Endpoint> {
        self.entities.get(entity_type)?.get(action)
    }

    pub fn contains(&self, entity_type: &str, action: &str) -> bool {
        self.lookup(entity_type, action).is_some()
    }

    /// Registered entity types, sorted.
    pub fn entity_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.entities.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    /// Registered actions for one entity type, sorted.
    pub fn actions(&self, entity_type: &str) -> Vec<&str> {
        let mut actions: Vec<&str> = self
            .entities
            .get(entity_type)
            .map(|actions| actions.keys().map(String::as_str).collect())
            .unwrap_or_default();
        actions.sort_unstable();
        actions
    }
}
