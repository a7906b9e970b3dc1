//! Entry handlers.

use super::{
    PATCH_CONTENT_TYPE, environment_path, require_json, selection_config, sys_version,
    versioned_config, without_sys,
};
use crate::error::{CmaError, CmaResult};
use crate::params::{Headers, Params, Payload};
use crate::transport::{RequestConfig, Transport};
use serde_json::{Value, json};
use std::sync::Arc;

/// Header naming the content type of a new entry.
pub const CONTENT_TYPE_HEADER: &str = "X-Contentful-Content-Type";

fn entries_path(params: &Params) -> String {
    format!("{}/entries", environment_path(params))
}

fn entry_path(params: &Params) -> String {
    format!("{}/{}", entries_path(params), params.id("entryId"))
}

pub async fn get(
    transport: Arc<dyn Transport>,
    params: Params,
    _payload: Option<Payload>,
    headers: Headers,
) -> CmaResult<Value> {
    transport
        .get(&entry_path(&params), selection_config(&params, headers))
        .await
}

pub async fn get_many(
    transport: Arc<dyn Transport>,
    params: Params,
    _payload: Option<Payload>,
    headers: Headers,
) -> CmaResult<Value> {
    transport
        .get(&entries_path(&params), selection_config(&params, headers))
        .await
}

pub async fn create(
    transport: Arc<dyn Transport>,
    params: Params,
    payload: Option<Payload>,
    headers: Headers,
) -> CmaResult<Value> {
    let data = require_json(payload)?;
    let mut merged = Headers::new();
    merged.insert(CONTENT_TYPE_HEADER.to_string(), params.id("contentTypeId"));
    merged.extend(headers);
    transport
        .post(&entries_path(&params), Some(data), RequestConfig::with_headers(merged))
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
        .put(&entry_path(&params), Some(without_sys(&data)), config)
        .await
}

/// Applies JSON-Patch operations. The version comes from `params.version`.
pub async fn patch(
    transport: Arc<dyn Transport>,
    params: Params,
    payload: Option<Payload>,
    headers: Headers,
) -> CmaResult<Value> {
    let body = match payload {
        Some(payload @ Payload::Patch(_)) => payload.to_body()?,
        Some(Payload::Json(ops @ Value::Array(_))) => ops,
        _ => {
            return Err(CmaError::validation(
                "payload",
                "expected a list of patch operations",
            ));
        }
    };

    let version = params.get("version").cloned().unwrap_or_else(|| json!(0));
    let mut merged = Headers::new();
    merged.insert("Content-Type".to_string(), PATCH_CONTENT_TYPE.to_string());
    merged.extend(headers);
    transport
        .patch(&entry_path(&params), Some(body), versioned_config(&version, merged))
        .await
}

pub async fn del(
    transport: Arc<dyn Transport>,
    params: Params,
    _payload: Option<Payload>,
    headers: Headers,
) -> CmaResult<Value> {
    transport
        .delete(&entry_path(&params), RequestConfig::with_headers(headers))
        .await
}

pub async fn publish(
    transport: Arc<dyn Transport>,
    params: Params,
    payload: Option<Payload>,
    headers: Headers,
) -> CmaResult<Value> {
    let data = require_json(payload)?;
    let url = format!("{}/published", entry_path(&params));
    transport
        .put(&url, None, versioned_config(&sys_version(&data), headers))
        .await
}

pub async fn unpublish(
    transport: Arc<dyn Transport>,
    params: Params,
    _payload: Option<Payload>,
    headers: Headers,
) -> CmaResult<Value> {
    let url = format!("{}/published", entry_path(&params));
    transport
        .delete(&url, RequestConfig::with_headers(headers))
        .await
}

pub async fn archive(
    transport: Arc<dyn Transport>,
    params: Params,
    _payload: Option<Payload>,
    headers: Headers,
) -> CmaResult<Value> {
    let url = format!("{}/archived", entry_path(&params));
    transport
        .put(&url, None, RequestConfig::with_headers(headers))
        .await
}

pub async fn unarchive(
    transport: Arc<dyn Transport>,
    params: Params,
    _payload: Option<Payload>,
    headers: Headers,
) -> CmaResult<Value> {
    let url = format!("{}/archived", entry_path(&params));
    transport
        .delete(&url, RequestConfig::with_headers(headers))
        .await
}
