//! Correlation ids for the logical request currently in flight.
//!
//! The client asks its `TraceContext` for an id on every option merge and,
//! when one is active, sends it as the `request-id` header.

use std::future::Future;

tokio::task_local! {
    static REQUEST_ID: String;
}

/// Supplies the correlation id of the current logical request, if any.
pub trait TraceContext: Send + Sync {
    fn request_id(&self) -> Option<String>;
}

impl<F> TraceContext for F
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn request_id(&self) -> Option<String> {
        self()
    }
}

/// Never supplies an id.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTrace;

impl TraceContext for NoTrace {
    fn request_id(&self) -> Option<String> {
        None
    }
}

/// Reads the id installed by [`with_request_id`] for the current task.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskLocalTrace;

impl TraceContext for TaskLocalTrace {
    fn request_id(&self) -> Option<String> {
        REQUEST_ID.try_with(|id| id.clone()).ok()
    }
}

/// Run `fut` with `id` as the active request id for [`TaskLocalTrace`].
///
/// Scopes nest; the innermost id wins.
pub async fn with_request_id<F>(id: impl Into<String>, fut: F) -> F::Output
where
    F: Future,
{
    REQUEST_ID.scope(id.into(), fut).await
}
