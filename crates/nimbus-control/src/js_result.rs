//! Parser for the engine's raw script-completion payload.
//!
//! The engine reports script completion as a JSON object:
//! `{success, type, result, stringResult?, error: {message, stack?}?}`.
//! Three outcomes are kept strictly apart: the payload itself failing to
//! decode (a contract violation, logged loudly), the script throwing
//! (reported to the client with message and stack), and plain success.

use nimbus_common::ControlError;
use serde_json::Value;
use tracing::error;

/// The fixed, exhaustive type-tag set for script results. Engine-reported
/// tags outside the set degrade to `Object` rather than failing the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsType {
    String,
    Number,
    Boolean,
    Object,
    Array,
    Null,
    Undefined,
}

impl JsType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JsType::String => "string",
            JsType::Number => "number",
            JsType::Boolean => "boolean",
            JsType::Object => "object",
            JsType::Array => "array",
            JsType::Null => "null",
            JsType::Undefined => "undefined",
        }
    }

    /// Map an engine-reported tag; the bool is false when the tag was
    /// outside the known set and `Object` was substituted.
    fn from_tag(tag: &str) -> (Self, bool) {
        match tag {
            "string" => (JsType::String, true),
            "number" => (JsType::Number, true),
            "boolean" => (JsType::Boolean, true),
            "object" => (JsType::Object, true),
            "array" => (JsType::Array, true),
            "null" => (JsType::Null, true),
            "undefined" => (JsType::Undefined, true),
            _ => (JsType::Object, false),
        }
    }
}

/// A typed script-execution result.
#[derive(Debug, Clone)]
pub struct JsExecutionResult {
    pub success: bool,
    pub kind: JsType,
    pub value: Value,
    pub string_value: Option<String>,
    pub error_message: Option<String>,
    pub error_stack: Option<String>,
}

/// Decode a raw completion payload. `Err` here always means ParseError —
/// the envelope itself was malformed — never a script-level failure.
pub fn parse(raw: &str) -> Result<JsExecutionResult, ControlError> {
    if raw.is_empty() {
        return parse_failure("engine returned an empty script payload");
    }

    let payload: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => return parse_failure(format!("payload is not valid JSON: {e}")),
    };
    let Some(object) = payload.as_object() else {
        return parse_failure("payload is not a JSON object");
    };

    let success = object
        .get("success")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let tag = object
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or("unknown");
    let (kind, known_tag) = JsType::from_tag(tag);

    let value = object.get("result").cloned().unwrap_or(Value::Null);
    let mut string_value = object
        .get("stringResult")
        .and_then(Value::as_str)
        .map(String::from);

    // Unrecognized tag: best-effort stringification so the client still
    // gets something readable.
    if !known_tag && string_value.is_none() && !value.is_null() {
        string_value = Some(value.to_string());
    }

    let (error_message, error_stack) = match object.get("error") {
        Some(Value::Object(err)) => (
            err.get("message").and_then(Value::as_str).map(String::from),
            err.get("stack").and_then(Value::as_str).map(String::from),
        ),
        _ => (None, None),
    };

    Ok(JsExecutionResult {
        success,
        kind,
        value,
        string_value,
        error_message,
        error_stack,
    })
}

fn parse_failure(message: impl Into<String>) -> Result<JsExecutionResult, ControlError> {
    let message = message.into();
    // A ParseError is a contract mismatch with the engine, not a client
    // mistake; it outranks ordinary execution failures in the logs.
    error!(%message, "script payload could not be decoded");
    Err(ControlError::Parse(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_success() {
        let result = parse(r#"{"success":true,"type":"number","result":2}"#).unwrap();
        assert!(result.success);
        assert_eq!(result.kind, JsType::Number);
        assert_eq!(result.value, json!(2));
        assert!(result.string_value.is_none());
        assert!(result.error_message.is_none());
    }

    #[test]
    fn object_with_string_result() {
        let raw = r#"{"success":true,"type":"object","result":{"a":1},"stringResult":"{\"a\":1}"}"#;
        let result = parse(raw).unwrap();
        assert_eq!(result.kind, JsType::Object);
        assert_eq!(result.string_value.as_deref(), Some("{\"a\":1}"));
    }

    #[test]
    fn script_throw_is_not_a_parse_error() {
        let raw = r#"{"success":false,"error":{"message":"x","stack":"Error: x\n  at <anonymous>"}}"#;
        let result = parse(raw).unwrap();
        assert!(!result.success);
        assert_eq!(result.error_message.as_deref(), Some("x"));
        assert!(result.error_stack.as_deref().unwrap().starts_with("Error"));
    }

    #[test]
    fn empty_payload_is_parse_error() {
        let err = parse("").unwrap_err();
        assert!(matches!(err, ControlError::Parse(_)));
    }

    #[test]
    fn non_json_payload_is_parse_error() {
        assert!(matches!(parse("garbage").unwrap_err(), ControlError::Parse(_)));
        assert!(matches!(parse("[1,2]").unwrap_err(), ControlError::Parse(_)));
    }

    #[test]
    fn unknown_tag_falls_back_to_object_with_stringification() {
        let result = parse(r#"{"success":true,"type":"symbol","result":"Symbol(x)"}"#).unwrap();
        assert_eq!(result.kind, JsType::Object);
        assert_eq!(result.string_value.as_deref(), Some("\"Symbol(x)\""));
    }

    #[test]
    fn missing_fields_default_conservatively() {
        let result = parse("{}").unwrap();
        assert!(!result.success);
        assert_eq!(result.kind, JsType::Object);
        assert_eq!(result.value, Value::Null);
    }
}
