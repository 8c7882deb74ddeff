//! Turning backend failures into one user-facing string.

use serde_json::Value;
use tutorhub_gateway::GatewayError;

/// Text shown when the backend produced no response body.
pub const SERVER_ERROR: &str = "Server error";

/// Reduces an error response body to a single display string.
///
/// A string body is returned as is. An object yields its `error` field, or
/// failing that its `message` field. Any other body is shown as compact JSON.
/// No body at all, or a `null`, `false` or empty body, gives [`SERVER_ERROR`].
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use tutorhub_session::failure::normalize_failure;
///
/// assert_eq!(normalize_failure(Some(&json!({"error": "E", "message": "M"}))), "E");
/// assert_eq!(normalize_failure(None), "Server error");
/// ```
#[must_use]
pub fn normalize_failure(body: Option<&Value>) -> String {
    let Some(body) = body.filter(|b| is_present(b)) else {
        return SERVER_ERROR.to_string();
    };

    match body {
        Value::String(text) => text.clone(),
        Value::Object(fields) => fields
            .get("error")
            .filter(|v| is_present(v))
            .or_else(|| fields.get("message").filter(|v| is_present(v)))
            .map_or_else(|| body.to_string(), display_field),
        other => other.to_string(),
    }
}

/// Normalizes a gateway error; transport and decode failures have no body.
#[must_use]
pub fn failure_reason(error: &GatewayError) -> String {
    normalize_failure(error.response_body())
}

/// Null, `false` and empty strings are treated as absent.
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

fn display_field(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
