//! Per-request context handed to view handlers

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::http::{request::Parts, HeaderMap, Method, StatusCode};
use axum::response::Html;
use serde::Serialize;

use super::tree::{NodeId, ViewTree};
use crate::error::{Error, Result};
use crate::query::QueryParams;
use crate::site::{SiteSettings, SiteState, UrlMap};
use crate::templates::{Breadcrumb, NavigationItem, PageContext, Renderer};

/// Everything a handler knows about the request and its place in the site
///
/// Created by the router for every request that reaches a view. The request
/// body has already been read; use [`ViewContext::form`] for URL-encoded
/// submissions.
pub struct ViewContext {
    site: Arc<SiteState>,
    node: NodeId,
    parts: Parts,
    path_params: HashMap<String, String>,
    query: QueryParams,
    body: Bytes,
}

impl ViewContext {
    pub(crate) fn new(
        site: Arc<SiteState>,
        node: NodeId,
        parts: Parts,
        path_params: HashMap<String, String>,
        body: Bytes,
    ) -> Self {
        let query = QueryParams::from_uri(&parts.uri);
        Self {
            site,
            node,
            parts,
            path_params,
            query,
            body,
        }
    }

    /// Request head
    pub fn parts(&self) -> &Parts {
        &self.parts
    }

    /// Request method
    pub fn method(&self) -> &Method {
        &self.parts.method
    }

    /// Request headers
    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    /// Decoded query string
    pub fn query(&self) -> &QueryParams {
        &self.query
    }

    /// Path parameter captured by the route, e.g. `pk` for `/{pk}`
    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name).map(String::as_str)
    }

    /// All captured path parameters
    pub fn path_params(&self) -> &HashMap<String, String> {
        &self.path_params
    }

    /// Raw request body
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Request body decoded as `application/x-www-form-urlencoded`
    pub fn form(&self) -> Result<QueryParams> {
        let raw = std::str::from_utf8(&self.body)
            .map_err(|_| Error::BadRequest("form body is not valid UTF-8".to_string()))?;
        Ok(QueryParams::parse(raw))
    }

    /// Node serving the request
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// The site's view tree
    pub fn tree(&self) -> &ViewTree {
        &self.site.tree
    }

    /// Fully qualified route name of the view
    pub fn route_name(&self) -> &str {
        self.site.tree.route_name(self.node)
    }

    /// View title
    pub fn title(&self) -> &str {
        self.site.tree.node(self.node).title()
    }

    /// Title of the enclosing group
    pub fn group_title(&self) -> &str {
        let tree = &self.site.tree;
        tree.node(tree.group_of(self.node)).title()
    }

    /// Route name of the view `name` in the same group
    pub fn sibling_route_name(&self, name: &str) -> Option<&str> {
        let tree = &self.site.tree;
        tree.get_view(tree.group_of(self.node), name)
            .map(|id| tree.route_name(id))
    }

    /// Site-wide settings
    pub fn settings(&self) -> &SiteSettings {
        &self.site.settings
    }

    /// Route name to URL table
    pub fn urls(&self) -> &UrlMap {
        &self.site.urls
    }

    /// URL of this view with the request's path parameters, without query
    pub fn current_url(&self) -> Result<String> {
        let params: Vec<(&str, &str)> = self
            .path_params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        self.site.urls.url_for(self.route_name(), &params)
    }

    /// URL of any named route
    pub fn url_for(&self, route_name: &str, params: &[(&str, &str)]) -> Result<String> {
        self.site.urls.url_for(route_name, params)
    }

    /// Breadcrumb trail of this view
    pub fn breadcrumbs(&self) -> Result<Vec<Breadcrumb>> {
        self.site.tree.breadcrumbs(self.node, &self.site.urls)
    }

    /// Navigation menu with the current group marked
    pub fn navigation(&self) -> Result<Vec<NavigationItem>> {
        self.site.tree.navigation(self.node, &self.site.urls)
    }

    /// Common page keys for a page titled `page_title`
    pub fn page(&self, page_title: impl Into<String>) -> Result<PageContext> {
        Ok(PageContext::new(self.site.settings.title.clone(), page_title)
            .with_route(self.route_name())
            .with_breadcrumbs(self.breadcrumbs()?)
            .with_navigation(self.navigation()?))
    }

    /// Renderer inherited by this view
    pub fn renderer(&self) -> &Renderer {
        self.site.tree.renderer(self.node)
    }

    /// Render `template` as a full page
    ///
    /// `extra` must serialize to a map; its keys are added to the common page
    /// keys.
    pub fn render<S: Serialize>(
        &self,
        template: &str,
        page_title: impl Into<String>,
        extra: S,
    ) -> Result<Html<String>> {
        let page = self.page(page_title)?;
        let html = self.renderer().render_page(template, &page, extra)?;
        Ok(Html(html))
    }

    /// Like [`render`](Self::render) with an explicit status code
    pub fn render_with_status<S: Serialize>(
        &self,
        status: StatusCode,
        template: &str,
        page_title: impl Into<String>,
        extra: S,
    ) -> Result<(StatusCode, Html<String>)> {
        Ok((status, self.render(template, page_title, extra)?))
    }
}

impl std::fmt::Debug for ViewContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewContext")
            .field("route_name", &self.route_name())
            .field("method", &self.parts.method)
            .field("uri", &self.parts.uri)
            .field("path_params", &self.path_params)
            .finish_non_exhaustive()
    }
}
