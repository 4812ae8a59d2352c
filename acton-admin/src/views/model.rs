//! Model view sets: list and edit views generated for one repository
//!
//! A [`ModelViewSet`] mounts two views under its prefix:
//!
//! | name   | path    | methods     | template    |
//! |--------|---------|-------------|-------------|
//! | `list` | `/`     | GET         | `list.html` |
//! | `edit` | `/{pk}` | GET, POST   | `edit.html` |
//!
//! `list` is the group's index view, so the model shows up in navigation and
//! breadcrumbs. Extra views and nested groups can be added next to them.
//!
//! # Example
//!
//! ```rust
//! use acton_admin::forms::FormField;
//! use acton_admin::repository::InMemoryRepository;
//! use acton_admin::views::{IntoViewSet, ModelViewSet};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Clone, Serialize, Deserialize)]
//! struct Article {
//!     slug: String,
//!     headline: String,
//! }
//!
//! let articles = InMemoryRepository::new(Vec::<Article>::new(), |a: &Article| a.slug.clone());
//! let viewset = ModelViewSet::for_model(articles)
//!     .title("Articles")
//!     .primary_key(|a: &Article| a.slug.clone())
//!     .item_title(|a: &Article| a.headline.clone())
//!     .list_fields([("slug", "Slug"), ("headline", "Headline")])
//!     .query_fields(["headline"])
//!     .edit_fields([FormField::text("headline", "Headline").required()])
//!     .into_viewset()
//!     .unwrap();
//! assert_eq!(viewset.name(), "article");
//! ```

use std::fmt;
use std::sync::Arc;

use axum::http::Method;
use http::request::Parts;
use serde::Serialize;

use super::edit::{EditView, PRIMARY_KEY_PARAM};
use super::list::{ListOverrides, ListView};
use super::viewset::{IntoViewSet, View, ViewSet};
use crate::error::{ConfigurationError, Result};
use crate::forms::{EditForm, FormField};
use crate::listing::ListViewConfig;
use crate::naming::model_view_name;
use crate::repository::{ProviderModel, Repository, RepositoryProvider, ScopeOutcome};
use crate::sorting::{SortableField, SortableFieldSet};
use crate::templates::Renderer;

type Accessor<P> = Arc<dyn Fn(&ProviderModel<P>) -> String + Send + Sync>;

/// Provider plus the accessors views need to address and label items
pub struct ModelBinding<P: RepositoryProvider> {
    provider: Arc<P>,
    key: Accessor<P>,
    title: Accessor<P>,
}

impl<P: RepositoryProvider> ModelBinding<P> {
    /// Primary key of `item`, used in edit URLs
    pub fn key_of(&self, item: &ProviderModel<P>) -> String {
        (self.key)(item)
    }

    /// Display title of `item`
    pub fn title_of(&self, item: &ProviderModel<P>) -> String {
        (self.title)(item)
    }

    /// The repository provider
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Fetch one item in its own repository scope
    pub async fn get(&self, parts: &Parts, key: &str) -> Result<Option<ProviderModel<P>>> {
        let repository = self.provider.acquire(parts).await?;
        let result = repository.get_by_key(key).await;
        self.provider
            .release(repository, ScopeOutcome::of(&result))
            .await;
        Ok(result?)
    }
}

impl<P: RepositoryProvider> Clone for ModelBinding<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            key: Arc::clone(&self.key),
            title: Arc::clone(&self.title),
        }
    }
}

impl<P: RepositoryProvider> fmt::Debug for ModelBinding<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelBinding").finish_non_exhaustive()
    }
}

/// Builder for a model's list and edit views
///
/// `title`, `primary_key`, `item_title` and `list_fields` are required;
/// [`IntoViewSet::into_viewset`] reports the first one missing.
pub struct ModelViewSet<P: RepositoryProvider> {
    name: String,
    provider: Arc<P>,
    title: Option<String>,
    key: Option<Accessor<P>>,
    item_title: Option<Accessor<P>>,
    fields: Vec<SortableField>,
    sortable: Option<Vec<String>>,
    query_fields: Option<Vec<String>>,
    overrides: ListOverrides,
    form: EditForm,
    extras: ViewSet,
}

impl<P> ModelViewSet<P>
where
    P: RepositoryProvider,
    ProviderModel<P>: Serialize,
{
    /// Model views named `name` over `provider`
    pub fn new(name: impl Into<String>, provider: P) -> Self {
        let name = name.into();
        Self {
            extras: ViewSet::new(name.clone()),
            name,
            provider: Arc::new(provider),
            title: None,
            key: None,
            item_title: None,
            fields: Vec::new(),
            sortable: None,
            query_fields: None,
            overrides: ListOverrides::default(),
            form: EditForm::default(),
        }
    }

    /// Model views named after the model type, e.g. `MyModel` → `my-model`
    pub fn for_model(provider: P) -> Self {
        Self::new(model_view_name::<ProviderModel<P>>(), provider)
    }

    /// Title shown in navigation, breadcrumbs and on the list page
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Mount below `prefix` instead of `/{name}`
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.extras = self.extras.prefix(prefix);
        self
    }

    /// How to read an item's primary key
    #[must_use]
    pub fn primary_key<F>(mut self, key: F) -> Self
    where
        F: Fn(&ProviderModel<P>) -> String + Send + Sync + 'static,
    {
        self.key = Some(Arc::new(key));
        self
    }

    /// How to title an item on its edit page
    #[must_use]
    pub fn item_title<F>(mut self, title: F) -> Self
    where
        F: Fn(&ProviderModel<P>) -> String + Send + Sync + 'static,
    {
        self.item_title = Some(Arc::new(title));
        self
    }

    /// Replace the list columns with `(key, label)` pairs, all sortable
    #[must_use]
    pub fn list_fields<I, K, L>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, L)>,
        K: Into<String>,
        L: Into<String>,
    {
        self.fields = fields
            .into_iter()
            .map(|(key, label)| SortableField::new(key, label))
            .collect();
        self
    }

    /// Append one fully specified list column
    #[must_use]
    pub fn list_field(mut self, field: SortableField) -> Self {
        self.fields.push(field);
        self
    }

    /// Restrict sorting to `keys`; other columns become unsortable
    #[must_use]
    pub fn sortable_fields<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sortable = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    /// Enable the search box over the given column keys
    #[must_use]
    pub fn query_fields<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query_fields = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    /// Page size when the request has none; defaults to the site setting
    #[must_use]
    pub fn default_limit(mut self, limit: u64) -> Self {
        self.overrides.default_limit = Some(limit);
        self
    }

    /// Largest page size; defaults to the site setting
    #[must_use]
    pub fn max_limit(mut self, limit: u64) -> Self {
        self.overrides.max_limit = Some(limit);
        self
    }

    /// Drop `offset` from sort links; defaults to the site setting
    #[must_use]
    pub fn reset_offset_on_sort(mut self, reset: bool) -> Self {
        self.overrides.reset_offset_on_sort = Some(reset);
        self
    }

    /// Fields shown on the edit form, in order
    #[must_use]
    pub fn edit_fields(mut self, fields: impl IntoIterator<Item = FormField>) -> Self {
        self.form = EditForm::new(fields);
        self
    }

    /// Add an extra view next to `list` and `edit`
    #[must_use]
    pub fn view(mut self, view: View) -> Self {
        self.extras = self.extras.view(view);
        self
    }

    /// Add a nested group
    #[must_use]
    pub fn viewset(mut self, viewset: impl IntoViewSet) -> Self {
        self.extras = self.extras.viewset(viewset);
        self
    }

    /// Renderer for the model's views
    #[must_use]
    pub fn renderer(mut self, renderer: Renderer) -> Self {
        self.extras = self.extras.renderer(renderer);
        self
    }

    /// Group name
    pub fn name(&self) -> &str {
        &self.name
    }

    fn missing(&self, attribute: &'static str) -> ConfigurationError {
        ConfigurationError::MissingAttribute {
            view: self.name.clone(),
            attribute,
        }
    }

    fn list_config(&self) -> std::result::Result<ListViewConfig, ConfigurationError> {
        let mut fields = self.fields.clone();
        if let Some(sortable) = &self.sortable {
            if let Some(unknown) = sortable
                .iter()
                .find(|key| !fields.iter().any(|field| &field.key == *key))
            {
                return Err(ConfigurationError::UnknownSortableField {
                    view: self.name.clone(),
                    field: unknown.clone(),
                });
            }
            for field in &mut fields {
                if !sortable.contains(&field.key) {
                    field.sortable = false;
                }
            }
        }

        let mut config = ListViewConfig::new(SortableFieldSet::new(fields));
        if let Some(query_fields) = &self.query_fields {
            config = config.query_fields(query_fields.iter().cloned());
        }

        // limits are checked once site defaults are known
        let probe = ListViewConfig {
            default_limit: 1,
            max_limit: 1,
            ..config.clone()
        };
        probe.validate(&self.name)?;
        if let (Some(default), Some(max)) = (self.overrides.default_limit, self.overrides.max_limit) {
            ListViewConfig {
                default_limit: default,
                max_limit: max,
                ..config.clone()
            }
            .validate(&self.name)?;
        }
        Ok(config)
    }

    /// Shared accessors, available once the required ones are set
    pub fn binding(&self) -> std::result::Result<ModelBinding<P>, ConfigurationError> {
        let key = self
            .key
            .clone()
            .ok_or_else(|| self.missing("primary key accessor"))?;
        let title = self
            .item_title
            .clone()
            .ok_or_else(|| self.missing("item title accessor"))?;
        Ok(ModelBinding {
            provider: Arc::clone(&self.provider),
            key,
            title,
        })
    }
}

impl<P> IntoViewSet for ModelViewSet<P>
where
    P: RepositoryProvider,
    ProviderModel<P>: Serialize,
{
    fn into_viewset(self) -> std::result::Result<ViewSet, ConfigurationError> {
        let title = self.title.clone().ok_or_else(|| self.missing("title"))?;
        let binding = self.binding()?;
        if self.fields.is_empty() {
            return Err(self.missing("list fields"));
        }
        let config = self.list_config()?;

        let list = View::new("list", "/").title("List").get(ListView::new(
            binding.clone(),
            config,
            self.overrides,
            Some("edit".to_string()),
        ));
        let edit = View::new("edit", format!("/{{{}}}", PRIMARY_KEY_PARAM))
            .title("Edit")
            .methods([Method::GET, Method::POST], EditView::new(binding, self.form));

        let mut set = self.extras.title(title).index_view("list");
        set.push_front(edit);
        set.push_front(list);
        Ok(set)
    }
}

impl<P: RepositoryProvider> fmt::Debug for ModelViewSet<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelViewSet")
            .field("name", &self.name)
            .field("title", &self.title)
            .field("fields", &self.fields)
            .field("query_fields", &self.query_fields)
            .finish_non_exhaustive()
    }
}
