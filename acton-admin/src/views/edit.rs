//! Edit form for a single repository item

use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use futures::future::BoxFuture;
use serde::Serialize;

use super::context::ViewContext;
use super::handler::ViewHandler;
use super::model::ModelBinding;
use crate::error::{Error, Result};
use crate::forms::{BoundField, EditForm, Submission};
use crate::repository::{ProviderModel, Repository, RepositoryProvider, ScopeOutcome};

/// Path parameter holding the primary key
pub const PRIMARY_KEY_PARAM: &str = "pk";

/// Handler behind a model view set's `edit` view
///
/// `GET` renders the form bound to the stored item. `POST` validates the
/// submitted form: invalid input is re-rendered with `400 Bad Request` and
/// the item is left untouched; valid input is applied through
/// [`Repository::update`] and the form is rendered again with the stored
/// values.
pub(crate) struct EditView<P: RepositoryProvider> {
    binding: ModelBinding<P>,
    form: EditForm,
}

#[derive(Serialize)]
struct EditPage<'a> {
    fields: Vec<BoundField>,
    action: &'a str,
    saved: bool,
}

impl<P> EditView<P>
where
    P: RepositoryProvider,
    ProviderModel<P>: Serialize,
{
    pub(crate) fn new(binding: ModelBinding<P>, form: EditForm) -> Self {
        Self { binding, form }
    }

    async fn serve(&self, ctx: ViewContext) -> Result<Response> {
        let provider = self.binding.provider();
        let repository = provider.acquire(ctx.parts()).await?;
        let result = self.handle_scoped(&ctx, &repository).await;
        provider
            .release(repository, ScopeOutcome::of(&result))
            .await;
        result
    }

    async fn handle_scoped(&self, ctx: &ViewContext, repository: &P::Repository) -> Result<Response> {
        let key = ctx
            .path_param(PRIMARY_KEY_PARAM)
            .ok_or_else(|| Error::BadRequest("missing primary key".to_string()))?;
        let item = repository
            .get_by_key(key)
            .await?
            .ok_or_else(|| Error::NotFound(format!("no item with key {}", key)))?;

        if ctx.method() != Method::POST {
            let fields = self.form.bind(&to_json(&item)?);
            return self.page(ctx, StatusCode::OK, &item, fields, false);
        }

        match self.form.submit(&ctx.form()?) {
            Submission::Invalid(fields) => {
                tracing::debug!(route = ctx.route_name(), key, "edit form rejected");
                self.page(ctx, StatusCode::BAD_REQUEST, &item, fields, false)
            }
            Submission::Valid(changes) => {
                let updated = repository.update(item, changes).await?;
                tracing::info!(route = ctx.route_name(), key, "item updated");
                let fields = self.form.bind(&to_json(&updated)?);
                self.page(ctx, StatusCode::OK, &updated, fields, true)
            }
        }
    }

    fn page(
        &self,
        ctx: &ViewContext,
        status: StatusCode,
        item: &ProviderModel<P>,
        fields: Vec<BoundField>,
        saved: bool,
    ) -> Result<Response> {
        let action = ctx.current_url()?;
        let page = EditPage {
            fields,
            action: &action,
            saved,
        };
        Ok(ctx
            .render_with_status(status, "edit.html", self.binding.title_of(item), page)?
            .into_response())
    }
}

impl<P> ViewHandler for EditView<P>
where
    P: RepositoryProvider,
    ProviderModel<P>: Serialize,
{
    fn handle(&self, ctx: ViewContext) -> BoxFuture<'_, Result<Response>> {
        Box::pin(self.serve(ctx))
    }
}

fn to_json<T: Serialize>(item: &T) -> Result<serde_json::Value> {
    serde_json::to_value(item)
        .map_err(|e| Error::Internal(format!("failed to serialize item: {}", e)))
}
