//! The injectable HTTP round-trip.
//!
//! A `Transport` sends one fully merged `HttpRequest` and answers with the
//! complete `HttpResponse`, body included. Network-level failures are
//! reported through the transport's own `Error` type, which `JsonClient`
//! hands back to the caller unwrapped.

use std::sync::Arc;

use async_trait::async_trait;

use crate::http::{HttpRequest, HttpResponse};

#[cfg(feature = "reqwest")]
mod reqwest_transport;

#[cfg(feature = "reqwest")]
pub use reqwest_transport::{ReqwestTransport, ReqwestTransportError};

#[async_trait]
pub trait Transport: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Perform the request and read the whole response body as text.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, Self::Error>;
}

#[async_trait]
impl<T> Transport for Arc<T>
where
    T: Transport + ?Sized,
{
    type Error = T::Error;

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, Self::Error> {
        (**self).send(request).await
    }
}
