//! Declarative view and view-set builders
//!
//! A [`View`] is a leaf: a name, a path relative to its group, a title and an
//! explicit list of `(method, handler)` registrations. A [`ViewSet`] groups
//! views and nested view sets under a path prefix. Nothing is discovered at
//! runtime; the builders are the whole registration list.

use std::fmt;
use std::sync::Arc;

use http::Method;

use super::handler::ViewHandler;
use crate::error::ConfigurationError;
use crate::templates::Renderer;

/// One `(method, handler)` registration of a view
#[derive(Clone)]
pub struct Route {
    /// HTTP method served
    pub method: Method,
    /// Handler invoked for the method
    pub handler: Arc<dyn ViewHandler>,
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .finish_non_exhaustive()
    }
}

/// Leaf view registration
///
/// # Example
///
/// ```rust
/// use acton_admin::views::{handler_fn, View, ViewContext};
/// use axum::http::Method;
///
/// let view = View::new("stats", "/stats")
///     .title("Statistics")
///     .method(Method::GET, handler_fn(|ctx: ViewContext| async move {
///         ctx.render("index.html", "Statistics", ())
///     }));
/// assert_eq!(view.name(), "stats");
/// ```
#[derive(Debug, Clone)]
pub struct View {
    pub(crate) name: String,
    pub(crate) path: String,
    pub(crate) title: Option<String>,
    pub(crate) routes: Vec<Route>,
    pub(crate) renderer: Option<Renderer>,
}

impl View {
    /// Create a view named `name` served at `path` below its group
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            title: None,
            routes: Vec::new(),
            renderer: None,
        }
    }

    /// Set the page title
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Serve `method` with `handler`
    #[must_use]
    pub fn method(mut self, method: Method, handler: impl ViewHandler) -> Self {
        self.routes.push(Route {
            method,
            handler: Arc::new(handler),
        });
        self
    }

    /// Serve several methods with one shared handler
    #[must_use]
    pub fn methods<I>(mut self, methods: I, handler: impl ViewHandler) -> Self
    where
        I: IntoIterator<Item = Method>,
    {
        let handler: Arc<dyn ViewHandler> = Arc::new(handler);
        self.routes.extend(methods.into_iter().map(|method| Route {
            method,
            handler: Arc::clone(&handler),
        }));
        self
    }

    /// Shorthand for `method(Method::GET, handler)`
    #[must_use]
    pub fn get(self, handler: impl ViewHandler) -> Self {
        self.method(Method::GET, handler)
    }

    /// Shorthand for `method(Method::POST, handler)`
    #[must_use]
    pub fn post(self, handler: impl ViewHandler) -> Self {
        self.method(Method::POST, handler)
    }

    /// Render this view with its own renderer instead of the inherited one
    #[must_use]
    pub fn renderer(mut self, renderer: Renderer) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// View name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path relative to the group
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Child of a [`ViewSet`], kept in registration order
#[derive(Debug, Clone)]
pub(crate) enum Child {
    View(View),
    ViewSet(ViewSet),
}

/// Anything that can be mounted as a group
pub trait IntoViewSet {
    /// Produce the group, or the configuration error that prevents it
    fn into_viewset(self) -> Result<ViewSet, ConfigurationError>;
}

/// Group of views and nested groups
///
/// The title defaults to the name and the mount prefix to `/{name}`.
///
/// # Example
///
/// ```rust
/// use acton_admin::views::{handler_fn, View, ViewContext, ViewSet};
///
/// let reports = ViewSet::new("reports")
///     .title("Reports")
///     .view(
///         View::new("summary", "/")
///             .title("Summary")
///             .get(handler_fn(|ctx: ViewContext| async move {
///                 ctx.render("index.html", "Summary", ())
///             })),
///     )
///     .index_view("summary");
/// assert_eq!(reports.mount_prefix(), "/reports");
/// ```
#[derive(Debug, Clone)]
pub struct ViewSet {
    pub(crate) name: String,
    pub(crate) title: Option<String>,
    pub(crate) prefix: Option<String>,
    pub(crate) children: Vec<Child>,
    pub(crate) index: Option<String>,
    pub(crate) renderer: Option<Renderer>,
    pub(crate) deferred_error: Option<ConfigurationError>,
}

impl ViewSet {
    /// Create an empty group
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: None,
            prefix: None,
            children: Vec::new(),
            index: None,
            renderer: None,
            deferred_error: None,
        }
    }

    /// Set the title used in navigation and breadcrumbs
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Mount below `prefix` instead of `/{name}`
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Add a leaf view
    #[must_use]
    pub fn view(mut self, view: View) -> Self {
        self.children.push(Child::View(view));
        self
    }

    /// Add a nested group
    ///
    /// A group that fails to build is reported when the site is built.
    #[must_use]
    pub fn viewset(mut self, viewset: impl IntoViewSet) -> Self {
        match viewset.into_viewset() {
            Ok(viewset) => self.children.push(Child::ViewSet(viewset)),
            Err(e) => {
                self.deferred_error.get_or_insert(e);
            }
        }
        self
    }

    /// Name the leaf view that represents the group in navigation
    #[must_use]
    pub fn index_view(mut self, name: impl Into<String>) -> Self {
        self.index = Some(name.into());
        self
    }

    /// Renderer for this group and everything below it
    #[must_use]
    pub fn renderer(mut self, renderer: Renderer) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Group name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Effective mount prefix
    pub fn mount_prefix(&self) -> String {
        self.prefix
            .clone()
            .unwrap_or_else(|| format!("/{}", self.name))
    }

    pub(crate) fn push_front(&mut self, view: View) {
        self.children.insert(0, Child::View(view));
    }
}

impl IntoViewSet for ViewSet {
    fn into_viewset(self) -> Result<ViewSet, ConfigurationError> {
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::{handler_fn, ViewContext};

    fn noop() -> impl ViewHandler {
        handler_fn(|_ctx: ViewContext| async move { Ok::<_, crate::Error>("ok") })
    }

    struct Broken;

    impl IntoViewSet for Broken {
        fn into_viewset(self) -> Result<ViewSet, ConfigurationError> {
            Err(ConfigurationError::MissingAttribute {
                view: "broken".into(),
                attribute: "title",
            })
        }
    }

    #[test]
    fn test_view_methods_share_handler() {
        let view = View::new("edit", "/{pk}").methods([Method::GET, Method::POST], noop());
        assert_eq!(view.routes.len(), 2);
        assert!(Arc::ptr_eq(&view.routes[0].handler, &view.routes[1].handler));
    }

    #[test]
    fn test_viewset_defaults() {
        let set = ViewSet::new("reports");
        assert_eq!(set.mount_prefix(), "/reports");
        assert!(set.title.is_none());
        assert_eq!(ViewSet::new("x").prefix("/custom").mount_prefix(), "/custom");
    }

    #[test]
    fn test_children_keep_order() {
        let set = ViewSet::new("g")
            .view(View::new("a", "/a").get(noop()))
            .viewset(ViewSet::new("b"))
            .view(View::new("c", "/c").get(noop()));
        let names: Vec<&str> = set
            .children
            .iter()
            .map(|child| match child {
                Child::View(v) => v.name(),
                Child::ViewSet(s) => s.name(),
            })
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_failed_child_is_deferred() {
        let set = ViewSet::new("g").viewset(Broken).viewset(ViewSet::new("ok"));
        assert!(set.deferred_error.is_some());
        assert_eq!(set.children.len(), 1);
    }
}
