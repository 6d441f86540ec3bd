//! Request options and the layered option merge.
//!
//! # Design
//! Options are composed from three layers: client defaults, per-call
//! overrides, and the method/body overlay the executor derives. Every layer
//! is folded in with `RequestOptions::merge`, which never mutates its inputs
//! and always produces a freshly owned value.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::http::HttpMethod;

/// Header carrying the correlation id of the current logical request.
pub const REQUEST_ID_HEADER: &str = "request-id";

/// Per-request configuration.
///
/// Header names are matched case-insensitively and stored lowercase once
/// merged. `extensions` holds transport-specific passthrough fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestOptions {
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<HttpMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(flatten)]
    pub extensions: Map<String, Value>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_extension(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extensions.insert(key.into(), value);
        self
    }

    /// Overlay `overrides` on top of `self`.
    ///
    /// Headers are unioned with the override winning per (lowercased) name.
    /// An active `request_id` is written to the `request-id` header after the
    /// union, so it always beats an explicitly supplied value. Every other
    /// field is taken from `overrides` when set there.
    pub fn merge(
        &self,
        overrides: Option<&RequestOptions>,
        request_id: Option<&str>,
    ) -> RequestOptions {
        let empty = RequestOptions::default();
        let overrides = overrides.unwrap_or(&empty);

        let mut headers = BTreeMap::new();
        for (name, value) in self.headers.iter().chain(&overrides.headers) {
            headers.insert(name.to_ascii_lowercase(), value.clone());
        }
        if let Some(id) = request_id {
            headers.insert(REQUEST_ID_HEADER.to_string(), id.to_string());
        }

        let mut extensions = self.extensions.clone();
        for (key, value) in &overrides.extensions {
            extensions.insert(key.clone(), value.clone());
        }

        RequestOptions {
            headers,
            method: overrides.method.clone().or_else(|| self.method.clone()),
            body: overrides.body.clone().or_else(|| self.body.clone()),
            extensions,
        }
    }
}

/// Built-in defaults every client starts from.
pub fn default_options() -> RequestOptions {
    RequestOptions::new().with_header("accept", "application/json")
}
