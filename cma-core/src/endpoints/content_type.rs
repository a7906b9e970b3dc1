//! Content type handlers.

use super::{environment_path, query_config, require_json, sys_version, versioned_config};
use crate::error::CmaResult;
use crate::params::{Headers, Params, Payload};
use crate::transport::{RequestConfig, Transport};
use serde_json::Value;
use std::sync::Arc;

fn content_type_path(params: &Params) -> String {
    format!(
        "{}/content_types/{}",
        environment_path(params),
        params.id("contentTypeId")
    )
}

pub async fn get(
    transport: Arc<dyn Transport>,
    params: Params,
    _payload: Option<Payload>,
    headers: Headers,
) -> CmaResult<Value> {
    transport
        .get(&content_type_path(&params), RequestConfig::with_headers(headers))
        .await
}

pub async fn get_many(
    transport: Arc<dyn Transport>,
    params: Params,
    _payload: Option<Payload>,
    headers: Headers,
) -> CmaResult<Value> {
    let url = format!("{}/content_types", environment_path(&params));
    transport.get(&url, query_config(&params, headers)).await
}

pub async fn publish(
    transport: Arc<dyn Transport>,
    params: Params,
    payload: Option<Payload>,
    headers: Headers,
) -> CmaResult<Value> {
    let data = require_json(payload)?;
    let url = format!("{}/published", content_type_path(&params));
    transport
        .put(&url, None, versioned_config(&sys_version(&data), headers))
        .await
}
