//! Script wrapping for completion reporting.
//!
//! User code runs inside a try/catch shim whose value is the completion
//! payload object: `{success, type, result, stringResult?, error?}`. wry
//! serializes that object to JSON and hands it to the evaluation callback,
//! which is exactly the raw payload the result parser consumes.

/// Wrap `code` in the completion shim. The user code is embedded as a JS
/// string literal and run through `eval`, so statements (`throw`, `var`)
/// work as well as expressions.
pub fn completion_wrapper(code: &str) -> String {
    let literal = serde_json::Value::String(code.to_string()).to_string();
    format!(
        r#"(function() {{
  try {{
    var result = eval({literal});
    var tag = Array.isArray(result) ? "array"
      : result === null ? "null"
      : typeof result;
    if (tag === "function" || tag === "symbol" || tag === "bigint") {{
      return {{ success: true, type: tag, result: null, stringResult: String(result) }};
    }}
    var out = {{ success: true, type: tag, result: result === undefined ? null : result }};
    if (tag === "object" || tag === "array") {{
      try {{ out.stringResult = JSON.stringify(result); }} catch (e) {{ out.stringResult = String(result); }}
    }}
    return out;
  }} catch (e) {{
    return {{
      success: false,
      error: {{
        message: String(e && e.message !== undefined ? e.message : e),
        stack: String(e && e.stack !== undefined ? e.stack : "")
      }}
    }};
  }}
}})()"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embeds_code_as_a_string_literal() {
        let wrapped = completion_wrapper("1+1");
        assert!(wrapped.contains(r#"eval("1+1")"#));
    }

    #[test]
    fn escapes_quotes_and_newlines() {
        let wrapped = completion_wrapper("var s = \"a\nb\";");
        assert!(wrapped.contains(r#"eval("var s = \"a\nb\";")"#));
        // The raw newline must not survive into the literal.
        assert!(!wrapped.contains("var s = \"a\nb\";"));
    }

    #[test]
    fn shim_is_a_single_expression() {
        let wrapped = completion_wrapper("document.title");
        assert!(wrapped.starts_with("(function()"));
        assert!(wrapped.ends_with("})()"));
    }
}
