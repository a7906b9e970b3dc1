//! Call parameters, default identifiers and request payloads.

use crate::error::{CmaError, CmaResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Header name/value pairs passed to a handler.
pub type Headers = BTreeMap<String, String>;

/// Header carrying the entity version for version-sensitive mutations.
pub const VERSION_HEADER: &str = "X-Contentful-Version";

/// The ambient identifiers a client configuration may supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IdentifierKey {
    SpaceId,
    EnvironmentId,
    OrganizationId,
}

impl IdentifierKey {
    /// The parameter name used on the wire.
    pub const fn as_str(&self) -> &'static str {
        match self {
            IdentifierKey::SpaceId => "spaceId",
            IdentifierKey::EnvironmentId => "environmentId",
            IdentifierKey::OrganizationId => "organizationId",
        }
    }
}

/// Shorthands for the identifier shapes endpoints declare.
pub const NO_IDS: &[IdentifierKey] = &[];
pub const SPACE: &[IdentifierKey] = &[IdentifierKey::SpaceId];
pub const SPACE_ENV: &[IdentifierKey] = &[IdentifierKey::SpaceId, IdentifierKey::EnvironmentId];
pub const ORGANIZATION: &[IdentifierKey] = &[IdentifierKey::OrganizationId];

/// Default identifier set bound to one client configuration.
///
/// Immutable once the client is built; explicit call params always win.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
}

impl DefaultParams {
    pub fn get(&self, key: IdentifierKey) -> Option<&str> {
        match key {
            IdentifierKey::SpaceId => self.space_id.as_deref(),
            IdentifierKey::EnvironmentId => self.environment_id.as_deref(),
            IdentifierKey::OrganizationId => self.organization_id.as_deref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.space_id.is_none() && self.environment_id.is_none() && self.organization_id.is_none()
    }
}

/// Named call parameters: identifiers, query, and handler-specific values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(Map<String, Value>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds params from a JSON object. `null` yields empty params.
    pub fn from_json(value: Value) -> CmaResult<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::default()),
            other => Err(CmaError::validation(
                "params",
                format!("expected an object, got {}", json_type_name(&other)),
            )),
        }
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Path segment for an identifier.
    ///
    /// A missing identifier renders as an empty segment; the remote system
    /// rejects the request rather than this layer.
    pub fn id(&self, key: &str) -> String {
        match self.0.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Params {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Merges defaults into `params`, restricted to the identifier keys the
/// target endpoint declares.
///
/// Explicit params always win, including an explicit `null`; only an absent
/// key takes the default. No completeness check is made.
pub fn merge_defaults(defaults: &DefaultParams, declared: &[IdentifierKey], params: Params) -> Params {
    let mut merged = params;
    for key in declared {
        if merged.contains(key.as_str()) {
            continue;
        }
        if let Some(value) = defaults.get(*key) {
            merged.insert(key.as_str(), value);
        }
    }
    merged
}

/// One JSON-Patch operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchOp {
    pub op: PatchKind,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchKind {
    Add,
    Remove,
    Replace,
    Move,
    Copy,
    Test,
}

impl PatchOp {
    pub fn replace(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            op: PatchKind::Replace,
            path: path.into(),
            value: Some(value.into()),
        }
    }

    pub fn add(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            op: PatchKind::Add,
            path: path.into(),
            value: Some(value.into()),
        }
    }

    pub fn remove(path: impl Into<String>) -> Self {
        Self {
            op: PatchKind::Remove,
            path: path.into(),
            value: None,
        }
    }
}

/// Request payload: a JSON document or a list of patch operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Patch(Vec<PatchOp>),
}

impl Payload {
    /// The JSON body sent on the wire.
    pub fn to_body(&self) -> CmaResult<Value> {
        match self {
            Payload::Json(value) => Ok(value.clone()),
            Payload::Patch(ops) => Ok(serde_json::to_value(ops)?),
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Payload::Json(value) => Some(value),
            Payload::Patch(_) => None,
        }
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::Json(value)
    }
}

impl From<Vec<PatchOp>> for Payload {
    fn from(ops: Vec<PatchOp>) -> Self {
        Payload::Patch(ops)
    }
}

/// JSON type name, as reported in validation messages.
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
