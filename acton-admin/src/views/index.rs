//! Site index page

use axum::response::{IntoResponse, Response};
use futures::future::BoxFuture;

use super::context::ViewContext;
use super::handler::ViewHandler;
use crate::error::Result;

/// Renders `index.html`, which lists the top-level groups
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct IndexView;

impl ViewHandler for IndexView {
    fn handle(&self, ctx: ViewContext) -> BoxFuture<'_, Result<Response>> {
        Box::pin(async move {
            let title = ctx.settings().title.clone();
            Ok(ctx.render("index.html", title, ())?.into_response())
        })
    }
}
