//! Request signing for the affiliate gateway.
//!
//! The gateway authenticates every call with an HMAC-SHA256 over the sorted,
//! concatenated request parameters. Any drift in ordering or stringification
//! makes every downstream call fail authentication, so [`ParamValue`]'s
//! `Display` impl is the only stringification used for both the signature
//! input and the query string.

use hmac::{Hmac, Mac};
use rust_decimal::Decimal;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Name of the signature parameter. Never part of its own input.
pub const SIGN_PARAM: &str = "sign";

/// A single request parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Text(String),
    Integer(i64),
    Decimal(Decimal),
}

impl std::fmt::Display for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamValue::Text(s) => f.write_str(s),
            ParamValue::Integer(n) => write!(f, "{n}"),
            ParamValue::Decimal(d) => write!(f, "{d}"),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_owned())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Integer(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Integer(i64::from(value))
    }
}

impl From<Decimal> for ParamValue {
    fn from(value: Decimal) -> Self {
        ParamValue::Decimal(value)
    }
}

/// Computes the gateway signature for a parameter set.
///
/// Entries with a `None` value and any existing `sign` entry are excluded;
/// the rest are sorted by key in byte order and concatenated as
/// `key + value` with no separator. The result is the uppercase hex
/// HMAC-SHA256 of that string keyed by `app_secret`.
///
/// Insertion order of `params` does not affect the output.
pub fn sign<'a, I>(params: I, app_secret: &str) -> String
where
    I: IntoIterator<Item = (&'a str, Option<&'a ParamValue>)>,
{
    let mut entries: Vec<(&str, &ParamValue)> = params
        .into_iter()
        .filter(|(key, _)| *key != SIGN_PARAM)
        .filter_map(|(key, value)| value.map(|v| (key, v)))
        .collect();
    entries.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

    let mut payload = String::new();
    for (key, value) in entries {
        payload.push_str(key);
        payload.push_str(&value.to_string());
    }

    // HMAC accepts keys of any length; `new_from_slice` cannot fail here.
    let mut mac =
        HmacSha256::new_from_slice(app_secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(payload.as_bytes());
    hex::encode_upper(mac.finalize().into_bytes())
}
