//! Paginated, sortable, searchable list view over a repository

use axum::response::{IntoResponse, Response};
use futures::future::BoxFuture;
use once_cell::sync::OnceCell;
use serde::Serialize;
use serde_json::Value;

use super::context::ViewContext;
use super::handler::ViewHandler;
use super::model::ModelBinding;
use crate::error::{Error, Result};
use crate::listing::{list_page, ListViewConfig, QUERY_PARAM};
use crate::pagination::OFFSET_PARAM;
use crate::repository::{ProviderModel, RepositoryProvider, ScopeOutcome};
use crate::site::SiteSettings;

/// Page-size settings left to the site when not set on the view
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ListOverrides {
    pub default_limit: Option<u64>,
    pub max_limit: Option<u64>,
    pub reset_offset_on_sort: Option<bool>,
}

impl ListOverrides {
    /// Combine with the site defaults
    ///
    /// A site default above the view's own maximum is lowered to it.
    fn apply(&self, mut config: ListViewConfig, settings: &SiteSettings) -> ListViewConfig {
        let max_limit = self.max_limit.unwrap_or(settings.max_list_limit);
        config.max_limit = max_limit;
        config.default_limit = self
            .default_limit
            .unwrap_or_else(|| settings.default_list_limit.min(max_limit));
        config.reset_offset_on_sort = self
            .reset_offset_on_sort
            .unwrap_or(settings.reset_offset_on_sort);
        config
    }
}

#[derive(Serialize)]
struct Column<'a> {
    key: &'a str,
    label: &'a str,
    sortable: bool,
}

#[derive(Serialize)]
struct Row {
    cells: Vec<String>,
    url: Option<String>,
}

/// Handler behind a model view set's `list` view
pub(crate) struct ListView<P: RepositoryProvider> {
    binding: ModelBinding<P>,
    template: ListViewConfig,
    overrides: ListOverrides,
    edit_view: Option<String>,
    resolved: OnceCell<ListViewConfig>,
}

impl<P> ListView<P>
where
    P: RepositoryProvider,
    ProviderModel<P>: Serialize,
{
    pub(crate) fn new(
        binding: ModelBinding<P>,
        template: ListViewConfig,
        overrides: ListOverrides,
        edit_view: Option<String>,
    ) -> Self {
        Self {
            binding,
            template,
            overrides,
            edit_view,
            resolved: OnceCell::new(),
        }
    }

    fn config(&self, ctx: &ViewContext) -> Result<&ListViewConfig> {
        self.resolved.get_or_try_init(|| {
            let config = self.overrides.apply(self.template.clone(), ctx.settings());
            config.validate(ctx.route_name())?;
            Ok::<_, Error>(config)
        })
    }

    async fn serve(&self, ctx: ViewContext) -> Result<Response> {
        let provider = self.binding.provider();
        let repository = provider.acquire(ctx.parts()).await?;
        let result = self.render(&ctx, &repository).await;
        provider
            .release(repository, ScopeOutcome::of(&result))
            .await;
        result
    }

    async fn render(&self, ctx: &ViewContext, repository: &P::Repository) -> Result<Response> {
        let config = self.config(ctx)?;
        let list_url = ctx.current_url()?;
        let page = list_page(ctx.query(), &list_url, config, repository).await?;

        let edit_route = self
            .edit_view
            .as_deref()
            .and_then(|name| ctx.sibling_route_name(name));

        let rows = page
            .items
            .iter()
            .map(|item| -> Result<Row> {
                let value = serde_json::to_value(item).map_err(|e| {
                    Error::Internal(format!("failed to serialize list item: {}", e))
                })?;
                let url = match edit_route {
                    Some(route) => {
                        let key = self.binding.key_of(item);
                        Some(ctx.url_for(route, &[("pk", key.as_str())])?)
                    }
                    None => None,
                };
                Ok(Row {
                    cells: config
                        .fields
                        .iter()
                        .map(|field| display(value.get(field.attribute())))
                        .collect(),
                    url,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let columns: Vec<Column<'_>> = config
            .fields
            .iter()
            .map(|field| Column {
                key: &field.key,
                label: &field.label,
                sortable: field.is_sortable(),
            })
            .collect();

        let hidden_params: Vec<(&str, &str)> = ctx
            .query()
            .iter()
            .filter(|(name, _)| *name != QUERY_PARAM && *name != OFFSET_PARAM)
            .collect();

        let html = ctx.render(
            "list.html",
            ctx.group_title(),
            serde_json::json!({
                "rows": rows,
                "columns": columns,
                "pagination": page.pagination,
                "sorting": page.sorting.view(),
                "query": page.query,
                "query_enabled": config.query_fields.is_some(),
                "list_url": list_url,
                "hidden_params": hidden_params,
            }),
        )?;
        Ok(html.into_response())
    }
}

impl<P> ViewHandler for ListView<P>
where
    P: RepositoryProvider,
    ProviderModel<P>: Serialize,
{
    fn handle(&self, ctx: ViewContext) -> BoxFuture<'_, Result<Response>> {
        Box::pin(self.serve(ctx))
    }
}

/// Text shown in a table cell
fn display(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sorting::SortableFieldSet;
    use serde_json::json;

    fn settings(default: u64, max: u64) -> SiteSettings {
        SiteSettings {
            default_list_limit: default,
            max_list_limit: max,
            ..SiteSettings::default()
        }
    }

    #[test]
    fn test_site_defaults_fill_gaps() {
        let config = ListOverrides::default()
            .apply(ListViewConfig::new(SortableFieldSet::default()), &settings(20, 50));
        assert_eq!(config.default_limit, 20);
        assert_eq!(config.max_limit, 50);
        assert!(!config.reset_offset_on_sort);
    }

    #[test]
    fn test_view_max_lowers_site_default() {
        let overrides = ListOverrides {
            max_limit: Some(5),
            reset_offset_on_sort: Some(true),
            ..ListOverrides::default()
        };
        let config = overrides.apply(ListViewConfig::new(SortableFieldSet::default()), &settings(20, 50));
        assert_eq!(config.default_limit, 5);
        assert_eq!(config.max_limit, 5);
        assert!(config.reset_offset_on_sort);
    }

    #[test]
    fn test_display() {
        assert_eq!(display(None), "");
        assert_eq!(display(Some(&Value::Null)), "");
        assert_eq!(display(Some(&json!("a"))), "a");
        assert_eq!(display(Some(&json!(3))), "3");
        assert_eq!(display(Some(&json!(true))), "true");
    }
}
