//! Local precondition checks raised before any request is sent.

use crate::error::{CmaError, CmaResult};
use crate::params::json_type_name;
use serde_json::Value;

/// Source of "now", in seconds since the Unix epoch.
pub trait Clock: Send + Sync {
    fn now_unix(&self) -> i64;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// A clock stuck at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_unix(&self) -> i64 {
        self.0
    }
}

/// Optional bounds for [`validate_timestamp`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimestampBounds {
    /// Values earlier than this are in the past.
    pub now: Option<i64>,
    /// Values later than this are too far in the future.
    pub maximum: Option<i64>,
}

/// Checks that `value` is a numeric timestamp within `bounds`.
///
/// `value == now` and `value == maximum` are both accepted.
pub fn validate_timestamp(name: &str, value: Option<&Value>, bounds: TimestampBounds) -> CmaResult<f64> {
    let timestamp = match value {
        Some(Value::Number(n)) => n,
        other => {
            let provided = other.map(json_type_name).unwrap_or("undefined");
            return Err(CmaError::validation(
                name,
                format!("only numeric values are allowed for timestamps, provided type was \"{provided}\""),
            ));
        }
    };
    let seconds = timestamp.as_f64().unwrap_or(f64::NAN);

    if let Some(maximum) = bounds.maximum {
        if seconds > maximum as f64 {
            return Err(CmaError::validation(
                name,
                format!(
                    "value ({timestamp}) cannot be further in the future than expected maximum ({maximum})"
                ),
            ));
        }
    }

    if let Some(now) = bounds.now {
        if seconds < now as f64 {
            return Err(CmaError::validation(
                name,
                format!("value ({timestamp}) cannot be in the past, current time was {now}"),
            ));
        }
    }

    Ok(seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const NOW: i64 = 1_700_000_000;

    fn bounds() -> TimestampBounds {
        TimestampBounds {
            now: Some(NOW),
            maximum: Some(NOW + 100),
        }
    }

    #[test]
    fn accepts_now_and_maximum() {
        assert!(validate_timestamp("expiresAt", Some(&json!(NOW)), bounds()).is_ok());
        assert!(validate_timestamp("expiresAt", Some(&json!(NOW + 100)), bounds()).is_ok());
    }

    #[test]
    fn rejects_one_second_in_the_past() {
        let err = validate_timestamp("expiresAt", Some(&json!(NOW - 1)), bounds()).unwrap_err();
        assert!(err.to_string().contains("cannot be in the past"));
    }

    #[test]
    fn rejects_string_and_missing_values() {
        let err = validate_timestamp("expiresAt", Some(&json!("soon")), bounds()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid \"expiresAt\" provided, only numeric values are allowed for timestamps, provided type was \"string\""
        );
        let err = validate_timestamp("expiresAt", None, bounds()).unwrap_err();
        assert!(err.to_string().contains("\"undefined\""));
    }
}
