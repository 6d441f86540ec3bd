//! Minimal JSON-over-HTTP request client.
//!
//! # Overview
//! `JsonClient` binds a base URL and default request options, then performs
//! requests whose bodies are parsed as JSON. Every failure is normalized into
//! a structured `ApiError` discriminated by `code`, with the raw response body
//! kept for diagnostics.
//!
//! # Design
//! - The HTTP round-trip, the query-string encoder and the correlation-id
//!   source are injected (`Transport`, `QueryEncoder`, `TraceContext`).
//! - Request building (`build_request`) and response interpretation
//!   (`parse_response`) are pure; the client only adds the transport call.
//! - No retries, timeouts or caching: every failure reaches the caller on
//!   first occurrence.

pub mod client;
pub mod error;
pub mod executor;
pub mod http;
pub mod options;
pub mod query;
pub mod trace;
pub mod transport;

pub use client::{ClientConfig, ClientSettings, JsonClient, JsonClientBuilder};
pub use error::{ApiError, BaseError, ClientError, EnrichedError, EnvelopeError, ResponseMeta};
pub use executor::{build_request, normalize_reason, parse_response};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use options::{default_options, RequestOptions, REQUEST_ID_HEADER};
pub use query::{Params, QsEncoder, QueryEncoder};
pub use trace::{with_request_id, NoTrace, TaskLocalTrace, TraceContext};
pub use transport::Transport;

#[cfg(feature = "reqwest")]
pub use transport::{ReqwestTransport, ReqwestTransportError};
