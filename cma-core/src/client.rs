//! Plain client: dispatcher plus the default identifiers of one configuration.

use crate::dispatch::{ActionDescriptor, Dispatcher};
use crate::endpoints::asset::AssetProcessor;
use crate::error::CmaResult;
use crate::params::{DefaultParams, Headers, Params, Payload, merge_defaults};
use serde_json::Value;
use std::sync::Arc;

/// Entry point for callers: binds actions to this configuration's defaults.
#[derive(Debug, Clone)]
pub struct PlainClient {
    dispatcher: Dispatcher,
    defaults: Arc<DefaultParams>,
    user_agent: Option<String>,
}

impl PlainClient {
    pub fn new(dispatcher: Dispatcher, defaults: DefaultParams) -> Self {
        Self {
            dispatcher,
            defaults: Arc::new(defaults),
            user_agent: None,
        }
    }

    /// Sets the caller-agent string sent with every dispatched call.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn defaults(&self) -> &DefaultParams {
        &self.defaults
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    /// Binds `entity_type`/`action` to this client's defaults.
    ///
    /// Binding never fails; an unknown pair is reported when called.
    pub fn bind(&self, entity_type: &str, action: &str) -> BoundAction {
        BoundAction {
            dispatcher: self.dispatcher.clone(),
            defaults: Arc::clone(&self.defaults),
            entity_type: entity_type.to_string(),
            action: action.to_string(),
            user_agent: self.user_agent.clone(),
        }
    }

    /// Shorthand for `bind(entity_type, action).call(...)`.
    pub async fn call(
        &self,
        entity_type: &str,
        action: &str,
        params: Params,
        payload: Option<Payload>,
        headers: Headers,
    ) -> CmaResult<Value> {
        self.bind(entity_type, action)
            .call(params, payload, headers)
            .await
    }

    /// Dispatches a descriptor as given: no defaults are merged.
    pub async fn raw(&self, mut descriptor: ActionDescriptor) -> CmaResult<Value> {
        if descriptor.user_agent.is_none() {
            descriptor.user_agent = self.user_agent.clone();
        }
        self.dispatcher.dispatch(descriptor).await
    }

    /// Asset processing over this client's transport, for callers that need
    /// to inject their own [`Delay`](crate::poller::Delay).
    pub fn asset_processor(&self) -> AssetProcessor {
        AssetProcessor::new(Arc::clone(self.dispatcher.transport()))
    }
}

/// An action bound to a fixed default identifier set.
#[derive(Debug, Clone)]
pub struct BoundAction {
    dispatcher: Dispatcher,
    defaults: Arc<DefaultParams>,
    entity_type: String,
    action: String,
    user_agent: Option<String>,
}

impl BoundAction {
    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    /// `{ ...defaults, ...params }`, limited to the identifiers the endpoint
    /// declares. Fails only when the pair is not registered.
    pub fn effective_params(&self, params: Params) -> CmaResult<Params> {
        let endpoint = self.dispatcher.endpoint(&self.entity_type, &self.action)?;
        Ok(merge_defaults(&self.defaults, endpoint.identifiers(), params))
    }

    pub async fn call(
        &self,
        params: Params,
        payload: Option<Payload>,
        headers: Headers,
    ) -> CmaResult<Value> {
        let params = self.effective_params(params)?;
        let descriptor = ActionDescriptor {
            entity_type: self.entity_type.clone(),
            action: self.action.clone(),
            params,
            payload,
            headers,
            user_agent: self.user_agent.clone(),
        };
        self.dispatcher.dispatch(descriptor).await
    }
}
