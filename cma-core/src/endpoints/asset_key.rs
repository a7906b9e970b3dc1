//! Asset key handlers.

use super::{environment_path, require_json};
use crate::error::CmaResult;
use crate::params::{Headers, Params, Payload};
use crate::transport::{RequestConfig, Transport};
use crate::validation::{Clock, SystemClock, TimestampBounds, validate_timestamp};
use serde_json::{Value, json};
use std::sync::Arc;

/// Longest allowed asset key lifetime, in seconds (48 hours).
pub const ASSET_KEY_MAX_LIFETIME: i64 = 48 * 60 * 60;

pub async fn create(
    transport: Arc<dyn Transport>,
    params: Params,
    payload: Option<Payload>,
    headers: Headers,
) -> CmaResult<Value> {
    create_with_clock(transport, params, payload, headers, &SystemClock).await
}

/// Creates an asset key, validating `expiresAt` against `clock` first.
///
/// `expiresAt` must be numeric, not in the past, and at most
/// [`ASSET_KEY_MAX_LIFETIME`] seconds ahead. Nothing is sent otherwise.
pub async fn create_with_clock(
    transport: Arc<dyn Transport>,
    params: Params,
    payload: Option<Payload>,
    headers: Headers,
    clock: &dyn Clock,
) -> CmaResult<Value> {
    let data = require_json(payload)?;
    let expires_at = data.get("expiresAt");
    let now = clock.now_unix();
    validate_timestamp(
        "expiresAt",
        expires_at,
        TimestampBounds {
            now: Some(now),
            maximum: Some(now + ASSET_KEY_MAX_LIFETIME),
        },
    )?;

    let body = json!({ "expiresAt": expires_at });
    let url = format!("{}/asset_keys", environment_path(&params));
    transport
        .post(&url, Some(body), RequestConfig::with_headers(headers))
        .await
}
