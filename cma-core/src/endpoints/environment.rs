//! Environment handlers.

use super::{
    environment_path, query_config, require_json, space_path, sys_version, versioned_config,
    without_sys,
};
use crate::error::CmaResult;
use crate::params::{Headers, Params, Payload};
use crate::transport::{RequestConfig, Transport};
use serde_json::Value;
use std::sync::Arc;

pub async fn get(
    transport: Arc<dyn Transport>,
    params: Params,
    _payload: Option<Payload>,
    headers: Headers,
) -> CmaResult<Value> {
    transport
        .get(&environment_path(&params), RequestConfig::with_headers(headers))
        .await
}

pub async fn get_many(
    transport: Arc<dyn Transport>,
    params: Params,
    _payload: Option<Payload>,
    headers: Headers,
) -> CmaResult<Value> {
    let url = format!("{}/environments", space_path(&params));
    transport.get(&url, query_config(&params, headers)).await
}

pub async fn create(
    transport: Arc<dyn Transport>,
    params: Params,
    payload: Option<Payload>,
    headers: Headers,
) -> CmaResult<Value> {
    let data = require_json(payload)?;
    let url = format!("{}/environments", space_path(&params));
    transport
        .post(&url, Some(data), RequestConfig::with_headers(headers))
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
        .put(&environment_path(&params), Some(without_sys(&data)), config)
        .await
}

pub async fn del(
    transport: Arc<dyn Transport>,
    params: Params,
    _payload: Option<Payload>,
    headers: Headers,
) -> CmaResult<Value> {
    transport
        .delete(&environment_path(&params), RequestConfig::with_headers(headers))
        .await
}
