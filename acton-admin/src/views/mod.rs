//! Views, view sets and the assembled view tree
//!
//! Registration is declarative: build [`View`]s and [`ViewSet`]s (or
//! [`ModelViewSet`]s), hand the root to [`AdminSite`](crate::site::AdminSite),
//! and the site assembles a [`ViewTree`] and a router from it.
//!
//! Every node has a route name derived from its position, such as
//! `admin:my-model:edit`, which templates and handlers use to build URLs.

mod context;
mod edit;
mod handler;
mod index;
mod list;
mod model;
mod tree;
mod viewset;

pub use context::ViewContext;
pub use edit::PRIMARY_KEY_PARAM;
pub use handler::{handler_fn, HandlerFn, ViewHandler};
pub use model::{ModelBinding, ModelViewSet};
pub use tree::{NodeId, ViewNode, ViewTree};
pub use viewset::{IntoViewSet, Route, View, ViewSet};

pub(crate) use index::IndexView;
