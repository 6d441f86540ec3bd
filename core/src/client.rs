//! JSON client bound to a base URL and default options.
//!
//! # Design
//! `JsonClient` holds an immutable `ClientConfig` plus the injected
//! collaborators (transport, query encoder, trace context) and carries no
//! mutable state between calls. Each call resolves its URL, merges options,
//! builds an `HttpRequest`, hands it to the transport and interprets the
//! response. Concurrent calls share nothing but the read-only config.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, field, instrument, Span};
use url::Url;

use crate::error::ClientError;
use crate::executor::{build_request, parse_response};
use crate::http::HttpMethod;
use crate::options::{default_options, RequestOptions};
use crate::query::{Params, QsEncoder, QueryEncoder};
use crate::trace::{NoTrace, TraceContext};
use crate::transport::Transport;

/// Base URL and baseline options of a client. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    base_url: Url,
    default_options: RequestOptions,
}

impl ClientConfig {
    /// Normalize `base_url` to end in exactly one `/` and merge `options`
    /// over the built-in defaults.
    pub fn new(
        base_url: &str,
        options: Option<&RequestOptions>,
        request_id: Option<&str>,
    ) -> Result<Self, url::ParseError> {
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        Ok(Self {
            base_url: Url::parse(&normalized)?,
            default_options: default_options().merge(options, request_id),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn default_options(&self) -> &RequestOptions {
        &self.default_options
    }

    /// Resolve `path` plus the encoded `params` against the base URL.
    pub fn resolve(
        &self,
        path: &str,
        params: Option<&Params>,
        encoder: &dyn QueryEncoder,
    ) -> Result<Url, url::ParseError> {
        let query = match params {
            Some(params) => format!("?{}", encoder.encode(params)),
            None => String::new(),
        };
        self.base_url.join(&format!("{path}{query}"))
    }
}

/// Deserializable client settings, e.g. from a configuration file.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSettings {
    pub base_url: String,
    #[serde(default)]
    pub options: Option<RequestOptions>,
}

/// Builder for a [`JsonClient`] with non-default collaborators.
pub struct JsonClientBuilder {
    base_url: String,
    options: Option<RequestOptions>,
    encoder: Arc<dyn QueryEncoder>,
    trace: Arc<dyn TraceContext>,
}

impl JsonClientBuilder {
    fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            options: None,
            encoder: Arc::new(QsEncoder),
            trace: Arc::new(NoTrace),
        }
    }

    pub fn options(mut self, options: RequestOptions) -> Self {
        self.options = Some(options);
        self
    }

    pub fn encoder(mut self, encoder: impl QueryEncoder + 'static) -> Self {
        self.encoder = Arc::new(encoder);
        self
    }

    pub fn trace(mut self, trace: impl TraceContext + 'static) -> Self {
        self.trace = Arc::new(trace);
        self
    }

    /// Build the client.
    ///
    /// ## Errors
    ///
    /// Returns an error if the normalized base URL does not parse.
    pub fn build<T: Transport>(self, transport: T) -> Result<JsonClient<T>, url::ParseError> {
        let request_id = self.trace.request_id();
        let config =
            ClientConfig::new(&self.base_url, self.options.as_ref(), request_id.as_deref())?;
        Ok(JsonClient {
            config,
            transport,
            encoder: self.encoder,
            trace: self.trace,
        })
    }
}

/// Async JSON-over-HTTP client.
///
/// ## Examples
///
/// ```rust,ignore
/// use jsonclient_core::{HttpMethod, JsonClient, ReqwestTransport};
///
/// let client = JsonClient::new("https://api.example.com/v1/", None, ReqwestTransport::new())?;
/// let user = client
///     .request(HttpMethod::Get, "users/1", None, None, None)
///     .await?;
/// ```
pub struct JsonClient<T> {
    config: ClientConfig,
    transport: T,
    encoder: Arc<dyn QueryEncoder>,
    trace: Arc<dyn TraceContext>,
}

impl<T> fmt::Debug for JsonClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl JsonClient<()> {
    pub fn builder(base_url: impl Into<String>) -> JsonClientBuilder {
        JsonClientBuilder::new(base_url)
    }
}

impl<T: Transport> JsonClient<T> {
    /// Client with the default query encoder and no trace context.
    pub fn new(
        base_url: &str,
        options: Option<RequestOptions>,
        transport: T,
    ) -> Result<Self, url::ParseError> {
        let mut builder = JsonClientBuilder::new(base_url);
        builder.options = options;
        builder.build(transport)
    }

    pub fn from_settings(settings: ClientSettings, transport: T) -> Result<Self, url::ParseError> {
        Self::new(&settings.base_url, settings.options, transport)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Perform one request and return the parsed JSON body.
    ///
    /// An empty 2xx body yields `Value::Null`. A `body` of `None` or JSON
    /// `null` sends no body and no content type.
    ///
    /// ## Errors
    ///
    /// - `ClientError::Url` if `path` does not resolve against the base URL
    /// - `ClientError::Transport` with the transport's error, unwrapped
    /// - `ClientError::Api` for non-2xx responses and malformed 2xx bodies
    #[instrument(
        name = "json_request",
        skip_all,
        fields(
            http.method = %method,
            http.url = field::Empty,
            http.status_code = field::Empty,
        )
    )]
    pub async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        params: Option<&Params>,
        body: Option<&Value>,
        options: Option<&RequestOptions>,
    ) -> Result<Value, ClientError<T::Error>> {
        let url = self.config.resolve(path, params, self.encoder.as_ref())?;
        Span::current().record("http.url", url.as_str());

        let request_id = self.trace.request_id();
        let options = self
            .config
            .default_options
            .merge(options, request_id.as_deref());
        let request = build_request(
            method.clone(),
            url.as_str(),
            body,
            &options,
            request_id.as_deref(),
        )
        .map_err(ClientError::Serialize)?;

        debug!(has_body = request.body.is_some(), "sending request");
        let response = self
            .transport
            .send(request)
            .await
            .map_err(ClientError::Transport)?;
        Span::current().record("http.status_code", response.status);
        debug!(status = response.status, bytes = response.body.len(), "response received");

        Ok(parse_response(&method, url.as_str(), response)?)
    }

    /// Like [`JsonClient::request`], deserializing the result into `R`.
    pub async fn request_as<R: DeserializeOwned>(
        &self,
        method: HttpMethod,
        path: &str,
        params: Option<&Params>,
        body: Option<&Value>,
        options: Option<&RequestOptions>,
    ) -> Result<R, ClientError<T::Error>> {
        let value = self.request(method, path, params, body, options).await?;
        serde_json::from_value(value).map_err(ClientError::Decode)
    }
}
