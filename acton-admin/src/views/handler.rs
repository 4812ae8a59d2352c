//! Request handlers attached to views

use std::future::Future;

use axum::response::{IntoResponse, Response};
use futures::future::BoxFuture;
use futures::FutureExt;

use super::context::ViewContext;
use crate::error::Result;

/// Handler serving one or more methods of a view
///
/// Errors are turned into responses by the router via
/// [`Error`](crate::Error)'s `IntoResponse` implementation.
pub trait ViewHandler: Send + Sync + 'static {
    /// Handle one request
    fn handle(&self, ctx: ViewContext) -> BoxFuture<'_, Result<Response>>;
}

/// [`ViewHandler`] backed by an async closure, see [`handler_fn`]
#[derive(Clone)]
pub struct HandlerFn<F> {
    f: F,
}

/// Wrap an async closure as a [`ViewHandler`]
///
/// ```rust
/// use acton_admin::views::{handler_fn, ViewContext};
///
/// let hello = handler_fn(|ctx: ViewContext| async move {
///     Ok::<_, acton_admin::Error>(format!("hello from {}", ctx.route_name()))
/// });
/// # let _ = hello;
/// ```
pub fn handler_fn<F, Fut, R>(f: F) -> HandlerFn<F>
where
    F: Fn(ViewContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R>> + Send + 'static,
    R: IntoResponse,
{
    HandlerFn { f }
}

impl<F, Fut, R> ViewHandler for HandlerFn<F>
where
    F: Fn(ViewContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R>> + Send + 'static,
    R: IntoResponse,
{
    fn handle(&self, ctx: ViewContext) -> BoxFuture<'_, Result<Response>> {
        (self.f)(ctx)
            .map(|result| result.map(IntoResponse::into_response))
            .boxed()
    }
}
