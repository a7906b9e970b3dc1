//! Space handlers.

use super::{query_config, require_json, space_path, sys_version, versioned_config, without_sys};
use crate::error::CmaResult;
use crate::params::{Headers, Params, Payload};
use crate::transport::{RequestConfig, Transport};
use serde_json::Value;
use std::sync::Arc;

/// Header naming the organization a new space belongs to.
pub const ORGANIZATION_HEADER: &str = "X-Contentful-Organization";

pub async fn get(
    transport: Arc<dyn Transport>,
    params: Params,
    _payload: Option<Payload>,
    headers: Headers,
) -> CmaResult<Value> {
    transport
        .get(&space_path(&params), RequestConfig::with_headers(headers))
        .await
}

pub async fn get_many(
    transport: Arc<dyn Transport>,
    params: Params,
    _payload: Option<Payload>,
    headers: Headers,
) -> CmaResult<Value> {
    transport.get("spaces", query_config(&params, headers)).await
}

pub async fn create(
    transport: Arc<dyn Transport>,
    params: Params,
    payload: Option<Payload>,
    headers: Headers,
) -> CmaResult<Value> {
    let data = require_json(payload)?;
    let mut merged = Headers::new();
    if let Some(organization_id) = params.str("organizationId") {
        merged.insert(ORGANIZATION_HEADER.to_string(), organization_id.to_string());
    }
    merged.extend(headers);
    transport
        .post("spaces", Some(data), RequestConfig::with_headers(merged))
        .await
}

pub async fn update(
    transport: Arc<dyn Transport>,
    params: Params,
    payload: Option<Payload>,
    headers: Headers,
) -> CmaResult<Value> {
    let data = require_json(payload)?;
    let config = versioned_config(&sys_version(&data), headers);
    transport
        .put(&space_path(&params), Some(without_sys(&data)), config)
        .await
}

pub async fn del(
    transport: Arc<dyn Transport>,
    params: Params,
    _payload: Option<Payload>,
    headers: Headers,
) -> CmaResult<Value> {
    transport
        .delete(&space_path(&params), RequestConfig::with_headers(headers))
        .await
}
