//! Built-in endpoint handlers.
//!
//! Every handler takes the same four arguments (transport, params, payload,
//! headers) and ignores the ones it has no use for. URLs are relative to the
//! transport's base URL.

pub mod asset;
pub mod asset_key;
pub mod content_type;
pub mod entry;
pub mod environment;
pub mod organization;
pub mod space;

use crate::error::{CmaError, CmaResult};
use crate::params::{Headers, NO_IDS, ORGANIZATION, Params, Payload, SPACE, SPACE_ENV, VERSION_HEADER};
use crate::query::{normalize_select, to_query_pairs};
use crate::registry::Registry;
use crate::transport::RequestConfig;
use serde_json::{Value, json};

/// Content type for JSON-Patch request bodies.
pub const PATCH_CONTENT_TYPE: &str = "application/json-patch+json";

/// Registers every built-in handler.
pub fn register_all(registry: &mut Registry) {
    registry
        .register("Organization", "get", ORGANIZATION, organization::get)
        .register("Organization", "getMany", NO_IDS, organization::get_many);

    registry
        .register("Space", "get", SPACE, space::get)
        .register("Space", "getMany", NO_IDS, space::get_many)
        .register("Space", "create", ORGANIZATION, space::create)
        .register("Space", "update", SPACE, space::update)
        .register("Space", "del", SPACE, space::del);

    registry
        .register("Environment", "get", SPACE_ENV, environment::get)
        .register("Environment", "getMany", SPACE, environment::get_many)
        .register("Environment", "create", SPACE, environment::create)
        .register("Environment", "update", SPACE_ENV, environment::update)
        .register("Environment", "del", SPACE_ENV, environment::del);

    registry
        .register("ContentType", "get", SPACE_ENV, content_type::get)
        .register("ContentType", "getMany", SPACE_ENV, content_type::get_many)
        .register("ContentType", "publish", SPACE_ENV, content_type::publish);

    registry
        .register("Entry", "get", SPACE_ENV, entry::get)
        .register("Entry", "getMany", SPACE_ENV, entry::get_many)
        .register("Entry", "create", SPACE_ENV, entry::create)
        .register("Entry", "update", SPACE_ENV, entry::update)
        .register("Entry", "patch", SPACE_ENV, entry::patch)
        .register("Entry", "del", SPACE_ENV, entry::del)
        .register("Entry", "publish", SPACE_ENV, entry::publish)
        .register("Entry", "unpublish", SPACE_ENV, entry::unpublish)
        .register("Entry", "archive", SPACE_ENV, entry::archive)
        .register("Entry", "unarchive", SPACE_ENV, entry::unarchive);

    registry
        .register("Asset", "get", SPACE_ENV, asset::get)
        .register("Asset", "getMany", SPACE_ENV, asset::get_many)
        .register("Asset", "create", SPACE_ENV, asset::create)
        .register("Asset", "update", SPACE_ENV, asset::update)
        .register("Asset", "del", SPACE_ENV, asset::del)
        .register("Asset", "publish", SPACE_ENV, asset::publish)
        .register("Asset", "unpublish", SPACE_ENV, asset::unpublish)
        .register("Asset", "processForLocale", SPACE_ENV, asset::process_for_locale)
        .register("Asset", "processForAllLocales", SPACE_ENV, asset::process_for_all_locales);

    registry.register("AssetKey", "create", SPACE_ENV, asset_key::create);
}

pub(crate) fn space_path(params: &Params) -> String {
    format!("spaces/{}", params.id("spaceId"))
}

pub(crate) fn environment_path(params: &Params) -> String {
    format!(
        "spaces/{}/environments/{}",
        params.id("spaceId"),
        params.id("environmentId")
    )
}

/// Request config forwarding `params.query` verbatim.
pub(crate) fn query_config(params: &Params, headers: Headers) -> RequestConfig {
    let query = params.get("query").map(to_query_pairs).unwrap_or_default();
    RequestConfig::with_headers(headers).with_query(query)
}

/// Request config forwarding `params.query` with its selection normalized.
pub(crate) fn selection_config(params: &Params, headers: Headers) -> RequestConfig {
    let query = normalize_select(params.get("query"))
        .map(|query| to_query_pairs(&query))
        .unwrap_or_default();
    RequestConfig::with_headers(headers).with_query(query)
}

/// Request config carrying the version header. Caller headers win.
pub(crate) fn versioned_config(version: &Value, headers: Headers) -> RequestConfig {
    let mut merged = Headers::new();
    merged.insert(VERSION_HEADER.to_string(), version_header_value(version));
    merged.extend(headers);
    RequestConfig::with_headers(merged)
}

/// `sys.version` of an entity, `0` when absent.
pub(crate) fn sys_version(data: &Value) -> Value {
    data.pointer("/sys/version").cloned().unwrap_or_else(|| json!(0))
}

fn version_header_value(version: &Value) -> String {
    match version {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        _ => "0".to_string(),
    }
}

/// The JSON body of a payload-carrying call.
pub(crate) fn require_json(payload: Option<Payload>) -> CmaResult<Value> {
    match payload {
        Some(Payload::Json(value)) => Ok(value),
        Some(Payload::Patch(_)) => Err(CmaError::validation(
            "payload",
            "expected a JSON document, got patch operations",
        )),
        None => Err(CmaError::validation("payload", "a JSON body is required")),
    }
}

/// Entity data with its `sys` block stripped, as sent on create/update.
pub(crate) fn without_sys(data: &Value) -> Value {
    let mut body = data.clone();
    if let Some(map) = body.as_object_mut() {
        map.remove("sys");
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_headers_override_version() {
        let mut headers = Headers::new();
        headers.insert(VERSION_HEADER.to_string(), "9".to_string());
        let config = versioned_config(&json!(4), headers);
        assert_eq!(config.headers.get(VERSION_HEADER).map(String::as_str), Some("9"));
    }

    #[test]
    fn missing_version_defaults_to_zero() {
        assert_eq!(sys_version(&json!({"fields": {}})), json!(0));
        let config = versioned_config(&json!(null), Headers::new());
        assert_eq!(config.headers.get(VERSION_HEADER).map(String::as_str), Some("0"));
    }

    #[test]
    fn without_sys_keeps_fields() {
        let body = without_sys(&json!({"sys": {"id": "x"}, "fields": {"a": 1}}));
        assert_eq!(body, json!({"fields": {"a": 1}}));
    }
}
