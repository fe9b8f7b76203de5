//! Unwrapping of the gateway's response envelope.
//!
//! Every successful call answers with
//! `{"<namespace>_response": {"resp_result": {"result": ...}}}` where the
//! namespace is the method name with `.` replaced by `_`. Errors can appear
//! at three levels: a top-level `error_response`, a `resp_result.error`
//! object, or a non-200 `resp_result.resp_code`.

use serde_json::Value;

use crate::error::AffiliateError;

/// Returns the envelope key for `method`, e.g.
/// `aliexpress.affiliate.link.generate` → `aliexpress_affiliate_link_generate_response`.
#[must_use]
pub fn envelope_key(method: &str) -> String {
    format!("{}_response", method.replace('.', "_"))
}

/// Re-parses a body that arrived as a JSON-encoded string.
///
/// The gateway occasionally double-encodes its payload. Values that are not
/// strings, or strings that are not valid JSON, are returned unchanged.
#[must_use]
pub fn decode_embedded_json(raw: Value) -> Value {
    match raw {
        Value::String(s) => serde_json::from_str(&s).unwrap_or(Value::String(s)),
        other => other,
    }
}

/// Locates `resp_result.result` inside the envelope for `method`.
///
/// Falls back to the first `*_response` key when the exact namespace is not
/// present.
///
/// # Errors
///
/// - [`AffiliateError::Gateway`] if the body carries an error at any level.
/// - [`AffiliateError::MalformedResponse`] if the envelope, `resp_result`,
///   or `result` is missing.
pub fn locate_result<'a>(raw: &'a Value, method: &str) -> Result<&'a Value, AffiliateError> {
    if let Some(err) = raw.get("error_response").filter(|v| !v.is_null()) {
        return Err(AffiliateError::Gateway(describe_error(err)));
    }

    let key = envelope_key(method);
    let envelope = raw
        .get(&key)
        .or_else(|| {
            raw.as_object().and_then(|obj| {
                obj.iter()
                    .find(|(k, _)| k.ends_with("_response") && k.as_str() != "error_response")
                    .map(|(_, v)| v)
            })
        })
        .ok_or_else(|| malformed(method, format!("missing `{key}`")))?;

    let resp_result = envelope
        .get("resp_result")
        .ok_or_else(|| malformed(method, "missing `resp_result`".to_string()))?;

    if let Some(err) = resp_result.get("error").filter(|v| !v.is_null()) {
        return Err(AffiliateError::Gateway(describe_error(err)));
    }

    if let Some(code) = resp_result.get("resp_code").and_then(response_code) {
        if code != 200 {
            let msg = resp_result
                .get("resp_msg")
                .and_then(Value::as_str)
                .unwrap_or("no message");
            return Err(AffiliateError::Gateway(format!("resp_code {code}: {msg}")));
        }
    }

    resp_result
        .get("result")
        .filter(|v| !v.is_null())
        .ok_or_else(|| malformed(method, "missing `resp_result.result`".to_string()))
}

fn malformed(method: &str, reason: String) -> AffiliateError {
    AffiliateError::MalformedResponse {
        method: method.to_owned(),
        reason,
    }
}

/// `resp_code` arrives as a number or a numeric string.
fn response_code(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
}

fn describe_error(err: &Value) -> String {
    if let Some(s) = err.as_str() {
        return s.to_owned();
    }
    ["sub_msg", "msg", "message", "code"]
        .iter()
        .find_map(|field| match err.get(field) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })
        .unwrap_or_else(|| err.to_string())
}
