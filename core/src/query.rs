//! Query string encoding.
//!
//! `QsEncoder` follows the conventions of the `qs` family of encoders:
//! indexed brackets for arrays, nested brackets for objects and RFC 3986
//! percent-encoding of keys and values.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::{Map, Value};

/// Query parameters. Values may be scalars, arrays or nested objects.
pub type Params = Map<String, Value>;

/// Everything but the RFC 3986 unreserved characters.
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Turns query parameters into a query string without the leading `?`.
pub trait QueryEncoder: Send + Sync {
    fn encode(&self, params: &Params) -> String;
}

impl<F> QueryEncoder for F
where
    F: Fn(&Params) -> String + Send + Sync,
{
    fn encode(&self, params: &Params) -> String {
        self(params)
    }
}

/// Default encoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct QsEncoder;

impl QueryEncoder for QsEncoder {
    fn encode(&self, params: &Params) -> String {
        let mut pairs = Vec::new();
        for (key, value) in params {
            push_pairs(key, value, &mut pairs);
        }
        pairs.join("&")
    }
}

fn push_pairs(prefix: &str, value: &Value, pairs: &mut Vec<String>) {
    match value {
        Value::Null => pairs.push(format!("{}=", encode_component(prefix))),
        Value::Bool(b) => pairs.push(pair(prefix, &b.to_string())),
        Value::Number(n) => pairs.push(pair(prefix, &n.to_string())),
        Value::String(s) => pairs.push(pair(prefix, s)),
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                push_pairs(&format!("{prefix}[{index}]"), item, pairs);
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                push_pairs(&format!("{prefix}[{key}]"), item, pairs);
            }
        }
    }
}

fn pair(key: &str, value: &str) -> String {
    format!("{}={}", encode_component(key), encode_component(value))
}

fn encode_component(s: &str) -> String {
    utf8_percent_encode(s, QUERY_COMPONENT).to_string()
}
