//! # acton-admin
//!
//! Pluggable admin panel toolkit for axum. Declare views and view sets, point
//! model view sets at a repository, and get a mounted router with list pages
//! (pagination, multi-key sorting, text search) and edit forms.
//!
//! ## Features
//!
//! - **View tree**: groups and leaf views with route names derived from their
//!   position (`admin:my-model:edit`), breadcrumbs and navigation
//! - **Model views**: list and edit views generated from a repository
//! - **Query codecs**: `offset`/`limit` pagination and `sorting=-label,id`
//!   sort order, decoded and re-encoded without losing other parameters
//! - **Repository contract**: async list/get/update/create with request-scoped
//!   acquisition and release
//! - **Templates**: built-in minijinja templates, overridable per directory
//! - **Configuration**: layered figment config with environment overrides
//!
//! ## Example
//!
//! ```rust,no_run
//! use acton_admin::prelude::*;
//!
//! #[derive(Clone, Serialize, Deserialize)]
//! struct MyModel {
//!     id: String,
//!     label: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config)?;
//!
//!     let items = InMemoryRepository::new(
//!         (0..10).map(|i| MyModel { id: format!("item_{i}"), label: format!("Item {i}") }),
//!         |m: &MyModel| m.id.clone(),
//!     );
//!
//!     let site = AdminSite::from_config(&config.admin)
//!         .viewset(
//!             ModelViewSet::for_model(items)
//!                 .title("My Model")
//!                 .primary_key(|m: &MyModel| m.id.clone())
//!                 .item_title(|m: &MyModel| m.label.clone())
//!                 .list_fields([("id", "ID"), ("label", "Label")])
//!                 .query_fields(["label"])
//!                 .edit_fields([FormField::text("label", "Label").required()]),
//!         )
//!         .build()?;
//!
//!     Server::new(config).serve(site.into_router()).await
//! }
//! ```

pub mod config;
pub mod error;
pub mod forms;
pub mod listing;
pub mod naming;
pub mod observability;
pub mod pagination;
pub mod query;
pub mod repository;
pub mod server;
pub mod site;
pub mod sorting;
pub mod templates;
pub mod views;

pub use error::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{AdminConfig, Config, ServiceConfig};
    pub use crate::error::{ConfigurationError, Error, QueryError, Result};
    pub use crate::forms::{EditForm, FormField, Validator};
    pub use crate::listing::{list_page, ListPage, ListViewConfig};
    pub use crate::observability::init_tracing;
    pub use crate::pagination::{PaginationResult, PaginationWindow};
    pub use crate::query::QueryParams;
    pub use crate::repository::{
        Changes, InMemoryRepository, Repository, RepositoryError, RepositoryErrorKind,
        RepositoryProvider, RepositoryResult, ScopeOutcome,
    };
    pub use crate::server::Server;
    pub use crate::site::{AdminSite, AdminSiteBuilder, UrlMap};
    pub use crate::sorting::{SortDirection, SortSpec, SortableField, SortableFieldSet};
    pub use crate::templates::{PageContext, Renderer};
    pub use crate::views::{
        handler_fn, IntoViewSet, ModelViewSet, View, ViewContext, ViewHandler, ViewSet,
    };

    pub use axum::{
        http::{Method, StatusCode},
        response::{Html, IntoResponse, Response},
        Router,
    };

    pub use serde::{Deserialize, Serialize};

    // Re-export tracing macros
    pub use tracing::{debug, error, info, instrument, trace, warn};

    // Re-export tokio for async runtime
    pub use tokio;
}
