//! The uniform response envelope.
//!
//! Every handler outcome passes through here: each response is a JSON
//! object with a `success` boolean, and error responses always carry a
//! non-empty human-readable `error` string. Handlers never write to the
//! connection themselves.

use serde_json::{json, Value};

#[derive(Debug, Clone)]
pub struct Envelope(Value);

impl Envelope {
    pub fn ok() -> Self {
        Self(json!({ "success": true }))
    }

    pub fn error(message: impl ToString) -> Self {
        let mut message = message.to_string();
        if message.is_empty() {
            message = "unspecified error".into();
        }
        Self(json!({ "success": false, "error": message }))
    }

    /// Attach a diagnostic field alongside either shape.
    pub fn field(mut self, key: &str, value: impl serde::Serialize) -> Self {
        if let Value::Object(map) = &mut self.0 {
            map.insert(
                key.to_string(),
                serde_json::to_value(value).unwrap_or(Value::Null),
            );
        }
        self
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Envelope> for Value {
    fn from(e: Envelope) -> Value {
        e.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_has_success_true() {
        let v = Envelope::ok().into_value();
        assert_eq!(v["success"], json!(true));
    }

    #[test]
    fn error_is_never_empty() {
        let v = Envelope::error("").into_value();
        assert_eq!(v["success"], json!(false));
        assert_eq!(v["error"], json!("unspecified error"));
    }

    #[test]
    fn fields_attach_to_either_shape() {
        let v = Envelope::ok()
            .field("tabIndex", 2)
            .field("loadWaitTimedOut", true)
            .into_value();
        assert_eq!(v["tabIndex"], json!(2));
        assert_eq!(v["loadWaitTimedOut"], json!(true));

        let v = Envelope::error("page is still loading")
            .field("tabIndex", 0)
            .into_value();
        assert_eq!(v["success"], json!(false));
        assert_eq!(v["tabIndex"], json!(0));
    }
}
