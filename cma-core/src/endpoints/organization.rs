//! Organization handlers.
//!
//! There is no single-organization endpoint: `get` lists the organizations
//! visible to the token and picks one out.

use super::query_config;
use crate::error::{CmaError, CmaResult, HttpError};
use crate::params::{Headers, Params, Payload};
use crate::transport::{RequestConfig, Transport};
use serde_json::Value;
use std::sync::Arc;

pub async fn get_many(
    transport: Arc<dyn Transport>,
    params: Params,
    _payload: Option<Payload>,
    headers: Headers,
) -> CmaResult<Value> {
    transport
        .get("organizations", query_config(&params, headers))
        .await
}

pub async fn get(
    transport: Arc<dyn Transport>,
    params: Params,
    _payload: Option<Payload>,
    headers: Headers,
) -> CmaResult<Value> {
    let organization_id = params.id("organizationId");
    let data = transport
        .get("organizations", RequestConfig::with_headers(headers))
        .await?;

    let found = data
        .get("items")
        .and_then(Value::as_array)
        .and_then(|items| {
            items.iter().find(|org| {
                org.pointer("/sys/id").and_then(Value::as_str) == Some(organization_id.as_str())
            })
        })
        .cloned();

    found.ok_or_else(|| {
        CmaError::Http(HttpError {
            status: 404,
            status_text: "Not Found".to_string(),
            name: "NotFound".to_string(),
            message: format!(
                "No organization was found with the ID {organization_id} instead got {data}"
            ),
            request_id: None,
            details: None,
            method: "GET".to_string(),
            url: "organizations".to_string(),
        })
    })
}
