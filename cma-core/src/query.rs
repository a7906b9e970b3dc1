//! Query normalization applied before a request reaches the transport.

use serde_json::Value;
use std::borrow::Cow;

/// Ensures a field selection keeps the system metadata.
///
/// Wrapped entities need `sys` (id, links, version) for later update and
/// delete calls, so a `select` that does not mention `sys` (case-insensitive)
/// gets `,sys` appended. The input is never mutated; queries without a
/// string `select` come back borrowed.
pub fn normalize_select(query: Option<&Value>) -> Option<Cow<'_, Value>> {
    let query = query?;
    let select = match query.get("select") {
        Some(Value::String(select)) if !select.is_empty() => select,
        _ => return Some(Cow::Borrowed(query)),
    };

    if select.to_ascii_lowercase().contains("sys") {
        return Some(Cow::Borrowed(query));
    }

    let mut normalized = query.clone();
    normalized["select"] = Value::String(format!("{select},sys"));
    Some(Cow::Owned(normalized))
}

/// Flattens a query object into URL query pairs.
///
/// Scalars are stringified, arrays are comma-joined and nulls are dropped.
pub fn to_query_pairs(query: &Value) -> Vec<(String, String)> {
    let Some(map) = query.as_object() else {
        return Vec::new();
    };

    map.iter()
        .filter_map(|(key, value)| query_value(value).map(|v| (key.clone(), v)))
        .collect()
}

fn query_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(query_value)
                .collect::<Vec<_>>()
                .join(","),
        ),
        Value::Object(_) => Some(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn appends_sys_to_selection() {
        let query = json!({"select": "fields.title"});
        let normalized = normalize_select(Some(&query)).unwrap();
        assert_eq!(*normalized, json!({"select": "fields.title,sys"}));
        assert_eq!(query, json!({"select": "fields.title"}));
    }

    #[test]
    fn leaves_selection_with_sys_borrowed() {
        let query = json!({"select": "SYS.id,fields.title"});
        assert!(matches!(normalize_select(Some(&query)), Some(Cow::Borrowed(_))));
    }

    #[test]
    fn absent_query_stays_absent() {
        assert!(normalize_select(None).is_none());
    }

    #[test]
    fn query_pairs_flatten_arrays_and_drop_nulls() {
        let pairs = to_query_pairs(&json!({
            "limit": 10,
            "order": ["-sys.createdAt", "sys.id"],
            "skip": null,
        }));
        assert_eq!(
            pairs,
            vec![
                ("limit".to_string(), "10".to_string()),
                ("order".to_string(), "-sys.createdAt,sys.id".to_string()),
            ]
        );
    }
}
