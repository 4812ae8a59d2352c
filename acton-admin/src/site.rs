//! Admin site: root view set, URL table and axum router
//!
//! [`AdminSite`] owns the root group of the view tree. Building it assembles
//! and validates the tree, computes the URL of every view and checks that no
//! two views claim the same method and path. [`AdminSite::into_router`] then
//! turns the tree into an axum [`Router`] mounted at the configured path.
//!
//! # Example
//!
//! ```rust
//! use acton_admin::repository::InMemoryRepository;
//! use acton_admin::site::AdminSite;
//! use acton_admin::views::ModelViewSet;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Clone, Serialize, Deserialize)]
//! struct MyModel {
//!     id: String,
//!     label: String,
//! }
//!
//! let repository = InMemoryRepository::new(Vec::<MyModel>::new(), |m: &MyModel| m.id.clone());
//! let site = AdminSite::builder()
//!     .title("Demo")
//!     .viewset(
//!         ModelViewSet::for_model(repository)
//!             .title("My Model")
//!             .primary_key(|m: &MyModel| m.id.clone())
//!             .item_title(|m: &MyModel| m.label.clone())
//!             .list_fields([("id", "ID"), ("label", "Label")]),
//!     )
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(site.url_for("admin:my-model:list", &[]).unwrap(), "/admin/my-model/");
//! assert_eq!(
//!     site.url_for("admin:my-model:edit", &[("pk", "item 1")]).unwrap(),
//!     "/admin/my-model/item%201"
//! );
//! let router: axum::Router = site.into_router();
//! # let _ = router;
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::body::to_bytes;
use axum::extract::{FromRequestParts, Path, Request};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, MethodFilter, MethodRouter};
use axum::Router;
use http::Method;

use crate::config::AdminConfig;
use crate::error::{ConfigurationError, Error, Result};
use crate::listing::{DEFAULT_LIST_LIMIT, DEFAULT_MAX_LIST_LIMIT};
use crate::templates::Renderer;
use crate::views::{IndexView, IntoViewSet, NodeId, View, ViewContext, ViewHandler, ViewSet, ViewTree};

/// Largest request body a view receives
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Name of the root group unless configured otherwise
pub const DEFAULT_ROOT_NAME: &str = "admin";

/// Mount path unless configured otherwise
pub const DEFAULT_MOUNT_PATH: &str = "/admin";

/// Site-wide settings visible to every view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteSettings {
    /// Site title shown in the page header
    pub title: String,
    /// Page size of list views that set none
    pub default_list_limit: u64,
    /// Largest page size of list views that set none
    pub max_list_limit: u64,
    /// Sort links drop `offset` unless a view says otherwise
    pub reset_offset_on_sort: bool,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            title: "Administration".to_string(),
            default_list_limit: DEFAULT_LIST_LIMIT,
            max_list_limit: DEFAULT_MAX_LIST_LIMIT,
            reset_offset_on_sort: false,
        }
    }
}

/// Route name → URL pattern of every view
#[derive(Debug, Clone, Default)]
pub struct UrlMap {
    patterns: HashMap<String, String>,
}

impl UrlMap {
    /// URL patterns of every view of `tree` mounted at `mount_path`
    pub fn from_tree(tree: &ViewTree, mount_path: &str) -> Self {
        let mount = mount_path.trim_end_matches('/');
        let patterns = tree
            .views()
            .map(|id| {
                (
                    tree.route_name(id).to_string(),
                    format!("{}{}", mount, tree.full_path(id)),
                )
            })
            .collect();
        Self { patterns }
    }

    /// URL pattern of `route_name`, with `{param}` placeholders
    pub fn pattern(&self, route_name: &str) -> Option<&str> {
        self.patterns.get(route_name).map(String::as_str)
    }

    /// Number of routes
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether the map has no routes
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Build the URL of `route_name`
    ///
    /// Every `{param}` placeholder is replaced by the percent-encoded value
    /// from `params`; parameters without a placeholder are ignored. Unknown
    /// route names and missing parameters are internal errors: they mean a
    /// handler or template refers to a route that does not exist.
    pub fn url_for(&self, route_name: &str, params: &[(&str, &str)]) -> Result<String> {
        let pattern = self
            .pattern(route_name)
            .ok_or_else(|| Error::Routing(format!("unknown route name '{}'", route_name)))?;

        let mut url = String::with_capacity(pattern.len());
        let mut rest = pattern;
        while let Some(start) = rest.find('{') {
            let end = rest[start..]
                .find('}')
                .map(|offset| start + offset)
                .ok_or_else(|| Error::Routing(format!("malformed pattern '{}'", pattern)))?;
            let name = &rest[start + 1..end];
            let value = params
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| *value)
                .ok_or_else(|| {
                    Error::Routing(format!(
                        "route '{}' needs parameter '{}'",
                        route_name, name
                    ))
                })?;
            url.push_str(&rest[..start]);
            url.push_str(&urlencoding::encode(value));
            rest = &rest[end + 1..];
        }
        url.push_str(rest);
        Ok(url)
    }
}

/// Immutable state shared by every request
#[derive(Debug)]
pub(crate) struct SiteState {
    pub(crate) tree: ViewTree,
    pub(crate) urls: UrlMap,
    pub(crate) settings: SiteSettings,
}

/// Builder for [`AdminSite`]
#[derive(Debug)]
pub struct AdminSiteBuilder {
    root_name: String,
    mount_path: String,
    renderer: Renderer,
    settings: SiteSettings,
    children: ViewSet,
}

impl Default for AdminSiteBuilder {
    fn default() -> Self {
        Self {
            root_name: DEFAULT_ROOT_NAME.to_string(),
            mount_path: DEFAULT_MOUNT_PATH.to_string(),
            renderer: Renderer::new(),
            settings: SiteSettings::default(),
            children: ViewSet::new(DEFAULT_ROOT_NAME),
        }
    }
}

impl AdminSiteBuilder {
    /// Site title, also the title of the root group
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.settings.title = title.into();
        self
    }

    /// Name of the root group, the first segment of every route name
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.root_name = name.into();
        self
    }

    /// Path the admin is mounted at; `""` mounts it at the server root
    #[must_use]
    pub fn mount_path(mut self, path: impl Into<String>) -> Self {
        self.mount_path = path.into();
        self
    }

    /// Default renderer for every view that sets none
    #[must_use]
    pub fn renderer(mut self, renderer: Renderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// Default page size of list views
    #[must_use]
    pub fn default_list_limit(mut self, limit: u64) -> Self {
        self.settings.default_list_limit = limit;
        self
    }

    /// Largest page size of list views
    #[must_use]
    pub fn max_list_limit(mut self, limit: u64) -> Self {
        self.settings.max_list_limit = limit;
        self
    }

    /// Whether sort links drop `offset` by default
    #[must_use]
    pub fn reset_offset_on_sort(mut self, reset: bool) -> Self {
        self.settings.reset_offset_on_sort = reset;
        self
    }

    /// Add a top-level view
    #[must_use]
    pub fn view(mut self, view: View) -> Self {
        self.children = self.children.view(view);
        self
    }

    /// Add a top-level group
    #[must_use]
    pub fn viewset(mut self, viewset: impl IntoViewSet) -> Self {
        self.children = self.children.viewset(viewset);
        self
    }

    /// Assemble and validate the site
    pub fn build(self) -> std::result::Result<AdminSite, ConfigurationError> {
        let settings = self.settings;
        if settings.default_list_limit == 0 || settings.max_list_limit < settings.default_list_limit
        {
            return Err(ConfigurationError::Invalid {
                what: "list limits",
                value: format!(
                    "default {} max {}",
                    settings.default_list_limit, settings.max_list_limit
                ),
                reason: "limits must satisfy 1 <= default <= max",
            });
        }

        let mount_path = normalize_mount_path(&self.mount_path)?;

        let mut root = self.children;
        root.name = self.root_name;
        root.title = Some(settings.title.clone());
        root.index = Some("index".to_string());
        root.push_front(
            View::new("index", "/")
                .title(settings.title.clone())
                .get(IndexView),
        );

        let tree = ViewTree::assemble(root, self.renderer)?;
        check_routes(&tree, &mount_path)?;
        let urls = UrlMap::from_tree(&tree, &mount_path);

        tracing::info!(
            root = tree.route_name(tree.root()),
            mount_path = %mount_path,
            views = urls.len(),
            "admin site assembled"
        );
        for id in tree.views() {
            tracing::debug!(
                route = tree.route_name(id),
                path = urls.pattern(tree.route_name(id)).unwrap_or_default(),
                "registered view"
            );
        }

        Ok(AdminSite {
            state: Arc::new(SiteState {
                tree,
                urls,
                settings,
            }),
            mount_path,
        })
    }
}

/// Assembled admin site
#[derive(Debug, Clone)]
pub struct AdminSite {
    state: Arc<SiteState>,
    mount_path: String,
}

impl AdminSite {
    /// Start a site with default settings
    pub fn builder() -> AdminSiteBuilder {
        AdminSiteBuilder::default()
    }

    /// Start a site from the `[admin]` configuration section
    pub fn from_config(config: &AdminConfig) -> AdminSiteBuilder {
        AdminSiteBuilder {
            root_name: config.root_name.clone(),
            mount_path: config.mount_path.clone(),
            renderer: Renderer::with_template_dirs(config.template_dirs.iter().cloned()),
            settings: SiteSettings {
                title: config.title.clone(),
                default_list_limit: config.default_list_limit,
                max_list_limit: config.max_list_limit,
                reset_offset_on_sort: config.reset_offset_on_sort,
            },
            children: ViewSet::new(config.root_name.clone()),
        }
    }

    /// The assembled view tree
    pub fn tree(&self) -> &ViewTree {
        &self.state.tree
    }

    /// Route name → URL table
    pub fn urls(&self) -> &UrlMap {
        &self.state.urls
    }

    /// URL of a named route
    pub fn url_for(&self, route_name: &str, params: &[(&str, &str)]) -> Result<String> {
        self.state.urls.url_for(route_name, params)
    }

    /// Site-wide settings
    pub fn settings(&self) -> &SiteSettings {
        &self.state.settings
    }

    /// Site title
    pub fn title(&self) -> &str {
        &self.state.settings.title
    }

    /// Normalized mount path; empty when mounted at the server root
    pub fn mount_path(&self) -> &str {
        &self.mount_path
    }

    /// Axum router serving every view
    ///
    /// Requests for the bare mount path are redirected to the site index.
    pub fn into_router<S>(self) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        let tree = &self.state.tree;
        let mut paths: BTreeMap<String, MethodRouter<S>> = BTreeMap::new();

        for id in tree.views() {
            let Some(path) = self.state.urls.pattern(tree.route_name(id)) else {
                continue;
            };
            let has_params = path.contains('{');

            for route in tree.node(id).routes() {
                let Ok(filter) = MethodFilter::try_from(route.method.clone()) else {
                    continue;
                };
                let site = Arc::clone(&self.state);
                let handler = Arc::clone(&route.handler);
                let entry = paths.remove(path).unwrap_or_default();
                paths.insert(
                    path.to_string(),
                    entry.on(filter, move |request: Request| {
                        dispatch(site.clone(), id, handler.clone(), has_params, request)
                    }),
                );
            }
        }

        let mut router = paths
            .into_iter()
            .fold(Router::new(), |router, (path, methods)| router.route(&path, methods));

        if !self.mount_path.is_empty() {
            let index = format!("{}/", self.mount_path);
            router = router.route(
                &self.mount_path,
                get(move || {
                    let index = index.clone();
                    async move { Redirect::permanent(&index) }
                }),
            );
        }

        router
    }
}

async fn dispatch(
    site: Arc<SiteState>,
    node: NodeId,
    handler: Arc<dyn ViewHandler>,
    has_params: bool,
    request: Request,
) -> Response {
    let (mut parts, body) = request.into_parts();

    let path_params = if has_params {
        match Path::<HashMap<String, String>>::from_request_parts(&mut parts, &()).await {
            Ok(Path(params)) => params,
            Err(rejection) => return rejection.into_response(),
        }
    } else {
        HashMap::new()
    };

    let body = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(body) => body,
        Err(e) => {
            return Error::BadRequest(format!("failed to read request body: {}", e))
                .into_response()
        }
    };

    tracing::debug!(
        route = site.tree.route_name(node),
        method = %parts.method,
        uri = %parts.uri,
        "dispatching view"
    );

    let ctx = ViewContext::new(site, node, parts, path_params, body);
    match handler.handle(ctx).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    }
}

fn normalize_mount_path(path: &str) -> std::result::Result<String, ConfigurationError> {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() || (trimmed.starts_with('/') && !trimmed.contains('{')) {
        Ok(trimmed.to_string())
    } else {
        Err(ConfigurationError::Invalid {
            what: "mount path",
            value: path.to_string(),
            reason: "mount paths start with '/' and have no parameters",
        })
    }
}

/// Reject unroutable methods and two views sharing a method and path
fn check_routes(tree: &ViewTree, mount_path: &str) -> std::result::Result<(), ConfigurationError> {
    let mut seen: HashMap<(Method, String), NodeId> = HashMap::new();
    for id in tree.views() {
        let path = format!("{}{}", mount_path, tree.full_path(id));
        for method in tree.node(id).methods() {
            if MethodFilter::try_from(method.clone()).is_err() {
                return Err(ConfigurationError::Invalid {
                    what: "method",
                    value: method.to_string(),
                    reason: "method cannot be routed",
                });
            }
            let key = (method.clone(), normalize_params(&path));
            if let Some(first) = seen.insert(key, id) {
                return Err(ConfigurationError::DuplicateRoute {
                    method: method.to_string(),
                    path,
                    first: tree.route_name(first).to_string(),
                    second: tree.route_name(id).to_string(),
                });
            }
        }
    }
    Ok(())
}

/// `/a/{pk}` and `/a/{id}` match the same requests
fn normalize_params(path: &str) -> String {
    let mut normalized = String::with_capacity(path.len());
    let mut in_param = false;
    for c in path.chars() {
        match c {
            '{' => {
                in_param = true;
                normalized.push_str("{}");
            }
            '}' => in_param = false,
            _ if in_param => {}
            _ => normalized.push(c),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::FormField;
    use crate::repository::{InMemoryRepository, Repository};
    use crate::views::{handler_fn, ModelViewSet};
    use axum::body::Body;
    use axum::http::StatusCode;
    use chrono::{DateTime, TimeZone, Utc};
    use serde::{Deserialize, Serialize};
    use tower::ServiceExt;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct MyModel {
        id: String,
        label: String,
        created_at: DateTime<Utc>,
    }

    fn items() -> Vec<MyModel> {
        (0..10)
            .map(|i| MyModel {
                id: format!("item_{i}"),
                label: format!("Item {i}"),
                created_at: Utc.with_ymd_and_hms(2024, 1, 1 + i, 0, 0, 0).unwrap(),
            })
            .collect()
    }

    fn repository() -> InMemoryRepository<MyModel> {
        InMemoryRepository::new(items(), |m: &MyModel| m.id.clone())
    }

    fn site(repository: InMemoryRepository<MyModel>) -> AdminSite {
        AdminSite::builder()
            .title("Test Admin")
            .viewset(
                ModelViewSet::for_model(repository)
                    .title("My Model")
                    .primary_key(|m: &MyModel| m.id.clone())
                    .item_title(|m: &MyModel| m.label.clone())
                    .list_fields([("id", "ID"), ("label", "Label"), ("created_at", "Created")])
                    .query_fields(["label"])
                    .edit_fields([FormField::text("label", "Label").required()]),
            )
            .build()
            .unwrap()
    }

    async fn send(router: Router, request: Request) -> (StatusCode, String) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        // minijinja escapes '/' inside HTML output
        let html = String::from_utf8(body.to_vec()).unwrap().replace("&#x2f;", "/");
        (status, html)
    }

    async fn get_page(router: Router, uri: &str) -> (StatusCode, String) {
        send(router, http::Request::builder().uri(uri).body(Body::empty()).unwrap()).await
    }

    async fn post_form(router: Router, uri: &str, form: &str) -> (StatusCode, String) {
        let request = http::Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .unwrap();
        send(router, request).await
    }

    fn row_count(html: &str) -> usize {
        let Some(start) = html.find("<tbody>") else {
            return 0;
        };
        let end = html[start..].find("</tbody>").map_or(html.len(), |e| start + e);
        html[start..end].matches("<tr>").count()
    }

    #[test]
    fn test_url_map() {
        let site = site(repository());
        assert_eq!(site.url_for("admin:index", &[]).unwrap(), "/admin/");
        assert_eq!(
            site.url_for("admin:my-model:edit", &[("pk", "a/b")]).unwrap(),
            "/admin/my-model/a%2Fb"
        );
        assert!(matches!(
            site.url_for("admin:my-model:edit", &[]),
            Err(Error::Routing(_))
        ));
        assert!(matches!(site.url_for("admin:nope", &[]), Err(Error::Routing(_))));
    }

    #[test]
    fn test_mount_at_root() {
        let site = AdminSite::builder().mount_path("/").build().unwrap();
        assert_eq!(site.mount_path(), "");
        assert_eq!(site.url_for("admin:index", &[]).unwrap(), "/");
        assert!(AdminSite::builder().mount_path("admin").build().is_err());
    }

    #[test]
    fn test_duplicate_routes_rejected() {
        let noop = || handler_fn(|_ctx: ViewContext| async move { Ok::<_, Error>("ok") });
        let err = AdminSite::builder()
            .view(View::new("a", "/x/{id}").title("A").get(noop()))
            .view(View::new("b", "/x/{pk}").title("B").get(noop()))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::DuplicateRoute {
                method: "GET".into(),
                path: "/admin/x/{pk}".into(),
                first: "admin:a".into(),
                second: "admin:b".into(),
            }
        );

        // same path with different methods is fine
        assert!(AdminSite::builder()
            .view(View::new("a", "/x").title("A").get(noop()))
            .view(View::new("b", "/x").title("B").post(noop()))
            .build()
            .is_ok());
    }

    #[test]
    fn test_invalid_limits_rejected() {
        assert!(AdminSite::builder().default_list_limit(0).build().is_err());
        assert!(AdminSite::builder()
            .default_list_limit(50)
            .max_list_limit(10)
            .build()
            .is_err());
    }

    #[test]
    fn test_from_config() {
        let config = AdminConfig {
            title: "Configured".into(),
            root_name: "backoffice".into(),
            mount_path: "/bo".into(),
            ..AdminConfig::default()
        };
        let site = AdminSite::from_config(&config).build().unwrap();
        assert_eq!(site.title(), "Configured");
        assert_eq!(site.url_for("backoffice:index", &[]).unwrap(), "/bo/");
    }

    #[tokio::test]
    async fn test_index_page() {
        let (status, html) = get_page(site(repository()).into_router(), "/admin/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("Test Admin"));
        assert!(html.contains(r#"href="/admin/my-model/""#));
    }

    #[tokio::test]
    async fn test_bare_mount_path_redirects() {
        let router: Router = site(repository()).into_router();
        let response = router
            .oneshot(http::Request::builder().uri("/admin").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT);
        assert_eq!(response.headers()["location"], "/admin/");
    }

    #[tokio::test]
    async fn test_list_shows_all_rows() {
        let (status, html) = get_page(site(repository()).into_router(), "/admin/my-model/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(row_count(&html), 10);
        assert!(html.contains(r#"href="/admin/my-model/item_0""#));
        assert!(html.contains("My Model"));
    }

    #[tokio::test]
    async fn test_list_sorted_descending() {
        let (status, html) =
            get_page(site(repository()).into_router(), "/admin/my-model/?sorting=-label").await;
        assert_eq!(status, StatusCode::OK);
        let first = html.find("Item 9").unwrap();
        let last = html.find("Item 0").unwrap();
        assert!(first < last);
    }

    #[tokio::test]
    async fn test_list_ignores_sorting_outside_sortable_fields() {
        let site = AdminSite::builder()
            .viewset(
                ModelViewSet::for_model(repository())
                    .title("My Model")
                    .primary_key(|m: &MyModel| m.id.clone())
                    .item_title(|m: &MyModel| m.label.clone())
                    .list_fields([("id", "ID"), ("label", "Label")])
                    .sortable_fields(["label"]),
            )
            .build()
            .unwrap();

        let (status, html) = get_page(site.into_router(), "/admin/my-model/?sorting=-id").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(row_count(&html), 10);
        assert!(html.find("Item 0").unwrap() < html.find("Item 9").unwrap());
        assert!(html.contains(">Label</a>"));
        assert!(!html.contains(">ID</a>"));
        assert!(!html.contains("sorting=id"));
        assert!(html.contains(r#"href="/admin/my-model/?sorting=label""#));
    }

    #[tokio::test]
    async fn test_list_query_filter() {
        let (status, html) =
            get_page(site(repository()).into_router(), "/admin/my-model/?query=item+0").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(row_count(&html), 1);
        assert!(html.contains(r#"value="item 0""#));
    }

    #[tokio::test]
    async fn test_list_pagination_links() {
        let (_, html) =
            get_page(site(repository()).into_router(), "/admin/my-model/?limit=3&offset=3").await;
        assert_eq!(row_count(&html), 3);
        assert!(html.contains(r#"href="/admin/my-model/?limit=3&amp;offset=6""#));
        assert!(html.contains(r#"href="/admin/my-model/?limit=3&amp;offset=0""#));
        assert!(html.contains("4–6 of 10"));
    }

    #[tokio::test]
    async fn test_list_offset_past_end() {
        let (status, html) =
            get_page(site(repository()).into_router(), "/admin/my-model/?offset=20").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(row_count(&html), 0);
        assert!(html.contains("No results on this page"));
        assert!(!html.contains("21–"));
        assert!(html.contains(r#"href="/admin/my-model/?offset=10""#));
    }

    #[tokio::test]
    async fn test_list_bad_query_is_400() {
        let (status, _) =
            get_page(site(repository()).into_router(), "/admin/my-model/?limit=0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) =
            get_page(site(repository()).into_router(), "/admin/my-model/?offset=x").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_edit_unknown_key_is_404() {
        let (status, _) = get_page(site(repository()).into_router(), "/admin/my-model/missing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_edit_form() {
        let (status, html) = get_page(site(repository()).into_router(), "/admin/my-model/item_0").await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains(r#"method="POST""#));
        assert!(html.contains(r#"action="/admin/my-model/item_0""#));
        assert!(html.contains(r#"value="Item 0""#));
    }

    #[tokio::test]
    async fn test_edit_invalid_submission() {
        let repository = repository();
        let router = site(repository.clone()).into_router();
        let (status, html) = post_form(router, "/admin/my-model/item_0", "label=").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(html.contains("This field is required."));

        let stored = repository.get_by_key("item_0").await.unwrap().unwrap();
        assert_eq!(stored.label, "Item 0");
    }

    #[tokio::test]
    async fn test_edit_valid_submission() {
        let repository = repository();
        let router = site(repository.clone()).into_router();
        let (status, html) = post_form(router, "/admin/my-model/item_0", "label=Renamed").await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains(r#"value="Renamed""#));

        let stored = repository.get_by_key("item_0").await.unwrap().unwrap();
        assert_eq!(stored.label, "Renamed");
    }

    #[tokio::test]
    async fn test_custom_view() {
        let site = AdminSite::builder()
            .view(
                View::new("hello", "/hello/{name}")
                    .title("Hello")
                    .get(handler_fn(|ctx: ViewContext| async move {
                        let name = ctx.path_param("name").unwrap_or_default().to_string();
                        let count = ctx.query().get("n").unwrap_or("0").to_string();
                        Ok::<_, Error>(format!("{} {} {}", ctx.route_name(), name, count))
                    })),
            )
            .build()
            .unwrap();
        let (status, body) = get_page(site.into_router(), "/admin/hello/world%21?n=2").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "admin:hello world! 2");
    }

    #[tokio::test]
    async fn test_method_not_allowed() {
        let (status, _) = post_form(site(repository()).into_router(), "/admin/my-model/", "").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }
}
