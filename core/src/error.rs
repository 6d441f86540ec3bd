//! Error types for the JSON client.
//!
//! # Design
//! Every failed response becomes an `ApiError`, discriminated by `code`.
//! The three variants record how much the server contributed to the error:
//! nothing usable (`Base`), a plain JSON object that replaces `meta`
//! (`Envelope`), or a JSON object declaring its own `code` whose fields take
//! precedence over the locally derived ones (`Enriched`). `to_value` renders
//! any of them as the flat JSON object callers expect.
//!
//! `ClientError` is the per-call failure channel. Transport failures are
//! carried unwrapped in `Transport`, with whatever type the transport uses.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use thiserror::Error;

/// Response details attached to errors built from an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseMeta {
    #[serde(rename = "httpStatus")]
    pub http_status: u16,
    pub method: String,
    pub url: String,
    /// Raw, unparsed response body.
    pub data: String,
    #[serde(rename = "requestID")]
    pub request_id: String,
}

/// Error built entirely from the HTTP exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseError {
    pub message: String,
    pub code: String,
    pub status_code: u16,
    pub meta: ResponseMeta,
}

/// Error whose `meta` was replaced by a JSON object body lacking a `code`.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvelopeError {
    pub message: String,
    pub code: String,
    pub status_code: u16,
    pub meta: Map<String, Value>,
}

/// Error enriched with the fields of a server payload shaped `{code, ...}`.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedError {
    base: BaseError,
    message: String,
    code: String,
    status_code: u16,
    payload: Map<String, Value>,
}

impl EnrichedError {
    /// `code` is the string `code` field of `payload`.
    pub(crate) fn new(base: BaseError, code: String, payload: Map<String, Value>) -> Self {
        let message = match payload.get("message") {
            Some(Value::String(message)) => message.clone(),
            Some(other) => other.to_string(),
            None => base.message.clone(),
        };
        let status_code = payload
            .get("statusCode")
            .and_then(Value::as_u64)
            .and_then(|status| u16::try_from(status).ok())
            .unwrap_or(base.status_code);

        Self {
            base,
            message,
            code,
            status_code,
            payload,
        }
    }

    /// The error as it stood before the payload was applied.
    pub fn base(&self) -> &BaseError {
        &self.base
    }

    pub fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }
}

/// A failed HTTP exchange, normalized.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("{}", .0.message)]
    Base(BaseError),

    #[error("{}", .0.message)]
    Envelope(EnvelopeError),

    #[error("{}", .0.message)]
    Enriched(EnrichedError),
}

impl ApiError {
    pub fn code(&self) -> &str {
        match self {
            ApiError::Base(e) => &e.code,
            ApiError::Envelope(e) => &e.code,
            ApiError::Enriched(e) => &e.code,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::Base(e) => &e.message,
            ApiError::Envelope(e) => &e.message,
            ApiError::Enriched(e) => &e.message,
        }
    }

    /// HTTP status, unless the server promoted an integral `statusCode`.
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Base(e) => e.status_code,
            ApiError::Envelope(e) => e.status_code,
            ApiError::Enriched(e) => e.status_code,
        }
    }

    pub fn meta(&self) -> Value {
        match self {
            ApiError::Base(e) => meta_value(&e.meta),
            ApiError::Envelope(e) => Value::Object(e.meta.clone()),
            ApiError::Enriched(e) => e
                .payload
                .get("meta")
                .cloned()
                .unwrap_or_else(|| meta_value(&e.base.meta)),
        }
    }

    /// A field promoted from the server payload.
    pub fn field(&self, key: &str) -> Option<&Value> {
        match self {
            ApiError::Enriched(e) => e.payload.get(key),
            _ => None,
        }
    }

    /// The error as a flat JSON object.
    pub fn to_value(&self) -> Value {
        let (message, code, status_code, meta) = match self {
            ApiError::Base(e) => (&e.message, &e.code, e.status_code, meta_value(&e.meta)),
            ApiError::Envelope(e) => (
                &e.message,
                &e.code,
                e.status_code,
                Value::Object(e.meta.clone()),
            ),
            ApiError::Enriched(e) => (
                &e.base.message,
                &e.base.code,
                e.base.status_code,
                meta_value(&e.base.meta),
            ),
        };

        let mut object = Map::new();
        object.insert("message".to_string(), Value::from(message.as_str()));
        object.insert("code".to_string(), Value::from(code.as_str()));
        object.insert("statusCode".to_string(), Value::from(status_code));
        object.insert("meta".to_string(), meta);

        if let ApiError::Enriched(e) = self {
            for (key, value) in &e.payload {
                object.insert(key.clone(), value.clone());
            }
        }
        Value::Object(object)
    }
}

impl Serialize for ApiError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

fn meta_value(meta: &ResponseMeta) -> Value {
    serde_json::to_value(meta).unwrap_or(Value::Null)
}

/// Errors returned by `JsonClient` calls.
#[derive(Debug, Error)]
pub enum ClientError<E>
where
    E: std::error::Error + 'static,
{
    /// The path could not be resolved against the base URL.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    /// The request payload could not be serialized to JSON.
    #[error("failed to serialize request body: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The JSON result did not match the requested type.
    #[error("failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error(transparent)]
    Transport(E),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl<E> ClientError<E>
where
    E: std::error::Error + 'static,
{
    pub fn api(&self) -> Option<&ApiError> {
        match self {
            ClientError::Api(e) => Some(e),
            _ => None,
        }
    }

    pub fn code(&self) -> Option<&str> {
        self.api().map(ApiError::code)
    }
}
