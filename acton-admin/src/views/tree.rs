//! Frozen view tree
//!
//! [`ViewTree::assemble`] turns the declarative [`ViewSet`] builders into an
//! arena of nodes. Each node knows its parent by [`NodeId`] only; parents own
//! their children through the arena. After assembly the tree is immutable and
//! shared behind an `Arc`.
//!
//! Route names are derived from tree position: the root's name, then each
//! ancestor's name, then the node's own name, joined by
//! [`ROUTE_NAME_SEPARATOR`]. They are computed on first use and memoized per
//! node.

use std::fmt;

use http::Method;
use once_cell::sync::OnceCell;

use super::viewset::{Child, Route, View, ViewSet};
use crate::error::{ConfigurationError, Result};
use crate::naming::{join_route_name, ROUTE_NAME_SEPARATOR};
use crate::site::UrlMap;
use crate::templates::{Breadcrumb, NavigationItem, Renderer};

/// Index of a node in a [`ViewTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug)]
pub(crate) enum NodeKind {
    Group {
        prefix: String,
        index: Option<String>,
    },
    View {
        path: String,
        routes: Vec<Route>,
    },
}

/// One group or view of the assembled tree
pub struct ViewNode {
    name: String,
    title: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
    renderer: Option<Renderer>,
    route_name: OnceCell<String>,
}

impl ViewNode {
    /// Name, unique among siblings
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Title shown in navigation, breadcrumbs and page headers
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Parent group; `None` for the root
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in registration order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Whether the node is a group
    pub fn is_group(&self) -> bool {
        matches!(self.kind, NodeKind::Group { .. })
    }

    /// Group prefix or view path, relative to the parent
    pub fn path(&self) -> &str {
        match &self.kind {
            NodeKind::Group { prefix, .. } => prefix,
            NodeKind::View { path, .. } => path,
        }
    }

    /// Methods served by a view; empty for groups
    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.routes().iter().map(|route| &route.method)
    }

    pub(crate) fn routes(&self) -> &[Route] {
        match &self.kind {
            NodeKind::View { routes, .. } => routes,
            NodeKind::Group { .. } => &[],
        }
    }
}

impl fmt::Debug for ViewNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewNode")
            .field("name", &self.name)
            .field("title", &self.title)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Assembled, immutable view hierarchy
#[derive(Debug)]
pub struct ViewTree {
    nodes: Vec<ViewNode>,
    renderer: Renderer,
}

impl ViewTree {
    /// Build the tree rooted at `root`
    ///
    /// The root is mounted without a prefix of its own. `renderer` is used by
    /// every node that neither sets nor inherits another one.
    ///
    /// Fails on the first configuration problem found: an invalid name or
    /// path, siblings sharing a name, a view without title or handlers, or an
    /// index view that is not a view of its group.
    pub fn assemble(
        root: ViewSet,
        renderer: Renderer,
    ) -> std::result::Result<Self, ConfigurationError> {
        let mut tree = Self {
            nodes: Vec::new(),
            renderer,
        };
        tree.insert_group(root, None)?;
        tracing::debug!(nodes = tree.nodes.len(), "assembled view tree");
        Ok(tree)
    }

    fn insert_group(
        &mut self,
        set: ViewSet,
        parent: Option<(NodeId, &str)>,
    ) -> std::result::Result<NodeId, ConfigurationError> {
        if let Some(error) = set.deferred_error {
            return Err(error);
        }
        validate_name(&set.name)?;

        let prefix = match parent {
            None => String::new(),
            Some(_) => {
                let prefix = set
                    .prefix
                    .clone()
                    .unwrap_or_else(|| format!("/{}", set.name));
                validate_prefix(&prefix)?;
                prefix
            }
        };

        let route_name = match parent {
            None => set.name.clone(),
            Some((_, parent_route)) => join_route_name(parent_route, &set.name),
        };

        let id = self.push(ViewNode {
            title: set.title.unwrap_or_else(|| set.name.clone()),
            name: set.name,
            parent: parent.map(|(id, _)| id),
            children: Vec::new(),
            kind: NodeKind::Group {
                prefix,
                index: set.index.clone(),
            },
            renderer: set.renderer,
            route_name: OnceCell::new(),
        });

        for child in set.children {
            let child_name = match &child {
                Child::View(view) => view.name.clone(),
                Child::ViewSet(viewset) => viewset.name.clone(),
            };
            if self.child(id, &child_name).is_some() {
                return Err(ConfigurationError::DuplicateName {
                    parent: route_name,
                    name: child_name,
                });
            }

            let child_id = match child {
                Child::View(view) => self.insert_view(view, id, &route_name)?,
                Child::ViewSet(viewset) => {
                    self.insert_group(viewset, Some((id, route_name.as_str())))?
                }
            };
            self.nodes[id.0].children.push(child_id);
        }

        if let Some(index) = set.index {
            if self.get_view(id, &index).is_none() {
                return Err(ConfigurationError::UnknownIndexView {
                    viewset: route_name,
                    index,
                });
            }
        }

        Ok(id)
    }

    fn insert_view(
        &mut self,
        view: View,
        parent: NodeId,
        parent_route: &str,
    ) -> std::result::Result<NodeId, ConfigurationError> {
        validate_name(&view.name)?;
        let route_name = join_route_name(parent_route, &view.name);

        if !view.path.starts_with('/') {
            return Err(ConfigurationError::Invalid {
                what: "path",
                value: view.path,
                reason: "view paths start with '/'",
            });
        }
        let Some(title) = view.title else {
            return Err(ConfigurationError::MissingAttribute {
                view: route_name,
                attribute: "title",
            });
        };
        if view.routes.is_empty() {
            return Err(ConfigurationError::MissingAttribute {
                view: route_name,
                attribute: "handler",
            });
        }

        Ok(self.push(ViewNode {
            name: view.name,
            title,
            parent: Some(parent),
            children: Vec::new(),
            kind: NodeKind::View {
                path: view.path,
                routes: view.routes,
            },
            renderer: view.renderer,
            route_name: OnceCell::new(),
        }))
    }

    fn push(&mut self, node: ViewNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    /// The root group
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Node data
    ///
    /// # Panics
    ///
    /// Panics if `id` was not produced by this tree.
    pub fn node(&self, id: NodeId) -> &ViewNode {
        &self.nodes[id.0]
    }

    /// Number of nodes, groups included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false; a tree has at least its root
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Fully qualified route name, memoized
    pub fn route_name(&self, id: NodeId) -> &str {
        let node = self.node(id);
        node.route_name.get_or_init(|| match node.parent {
            None => node.name.clone(),
            Some(parent) => join_route_name(self.route_name(parent), &node.name),
        })
    }

    /// Child of `id` named `name`
    pub fn child(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.node(id)
            .children
            .iter()
            .copied()
            .find(|child| self.node(*child).name == name)
    }

    /// Leaf view of group `id` named `name`
    pub fn get_view(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.child(id, name)
            .filter(|child| !self.node(*child).is_group())
    }

    /// Index view of group `id`, if it has one
    pub fn index_view(&self, id: NodeId) -> Option<NodeId> {
        match &self.node(id).kind {
            NodeKind::Group {
                index: Some(index), ..
            } => self.get_view(id, index),
            _ => None,
        }
    }

    /// `id` itself when it is a group, otherwise its parent
    pub fn group_of(&self, id: NodeId) -> NodeId {
        let node = self.node(id);
        match node.parent {
            Some(parent) if !node.is_group() => parent,
            _ => id,
        }
    }

    /// Whether `ancestor` is a strict ancestor of `id`
    pub fn is_nested(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut current = self.node(id).parent;
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.node(parent).parent;
        }
        false
    }

    /// Look a node up by its fully qualified route name
    pub fn find(&self, route_name: &str) -> Option<NodeId> {
        let mut segments = route_name.split(ROUTE_NAME_SEPARATOR);
        let root = self.root();
        if segments.next() != Some(self.node(root).name.as_str()) {
            return None;
        }
        segments.try_fold(root, |id, name| self.child(id, name))
    }

    /// Path below the site mount point: group prefixes plus the view path
    pub fn full_path(&self, id: NodeId) -> String {
        let mut segments = vec![self.node(id).path()];
        let mut current = self.node(id).parent;
        while let Some(parent) = current {
            segments.push(self.node(parent).path());
            current = self.node(parent).parent;
        }
        segments.reverse();
        segments.concat()
    }

    /// Renderer of `id`: its own, else the nearest ancestor's, else the default
    pub fn renderer(&self, id: NodeId) -> &Renderer {
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.node(node_id);
            if let Some(renderer) = &node.renderer {
                return renderer;
            }
            current = node.parent;
        }
        &self.renderer
    }

    /// All leaf views in registration order
    pub fn views(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len())
            .map(NodeId)
            .filter(|id| !self.node(*id).is_group())
    }

    /// Breadcrumb trail for `id`
    ///
    /// One entry per enclosing group that has an index view, from the root
    /// down to the group containing `id`.
    pub fn breadcrumbs(&self, id: NodeId, urls: &UrlMap) -> Result<Vec<Breadcrumb>> {
        let mut trail = Vec::new();
        let mut current = Some(self.group_of(id));
        while let Some(group) = current {
            if let Some(index) = self.index_view(group) {
                trail.push(Breadcrumb {
                    label: self.node(group).title.clone(),
                    url: urls.url_for(self.route_name(index), &[])?,
                });
            }
            current = self.node(group).parent;
        }
        trail.reverse();
        Ok(trail)
    }

    /// Top-level groups for the menu, marking the one containing `current`
    ///
    /// Groups without an index view have no page to link to and are left
    /// out.
    pub fn navigation(&self, current: NodeId, urls: &UrlMap) -> Result<Vec<NavigationItem>> {
        let root = self.root();
        self.node(root)
            .children
            .iter()
            .copied()
            .filter(|child| self.node(*child).is_group())
            .filter_map(|group| self.index_view(group).map(|index| (group, index)))
            .map(|(group, index)| {
                let route_name = self.route_name(index).to_string();
                Ok(NavigationItem {
                    title: self.node(group).title.clone(),
                    url: urls.url_for(&route_name, &[])?,
                    route_name,
                    active: current == group || self.is_nested(current, group),
                })
            })
            .collect()
    }
}

fn validate_name(name: &str) -> std::result::Result<(), ConfigurationError> {
    let reason = if name.is_empty() {
        "names must not be empty"
    } else if name.contains(ROUTE_NAME_SEPARATOR) {
        "names must not contain the route name separator"
    } else if name.contains(['/', '{', '}']) || name.chars().any(char::is_whitespace) {
        "names must not contain '/', braces or whitespace"
    } else {
        return Ok(());
    };
    Err(ConfigurationError::Invalid {
        what: "name",
        value: name.to_string(),
        reason,
    })
}

fn validate_prefix(prefix: &str) -> std::result::Result<(), ConfigurationError> {
    if prefix.starts_with('/') && !prefix.ends_with('/') {
        Ok(())
    } else {
        Err(ConfigurationError::Invalid {
            what: "prefix",
            value: prefix.to_string(),
            reason: "prefixes start with '/' and do not end with '/'",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::{handler_fn, ViewContext, ViewHandler};

    fn noop() -> impl ViewHandler {
        handler_fn(|_ctx: ViewContext| async move { Ok::<_, crate::Error>("ok") })
    }

    fn leaf(name: &str, path: &str) -> View {
        View::new(name, path).title(name.to_uppercase()).get(noop())
    }

    fn sample() -> ViewTree {
        let models = ViewSet::new("my-model")
            .title("My Model")
            .view(leaf("list", "/"))
            .view(leaf("edit", "/{pk}"))
            .viewset(ViewSet::new("nested").view(leaf("deep", "/deep")))
            .index_view("list");
        let root = ViewSet::new("admin")
            .title("Admin")
            .view(leaf("index", "/"))
            .viewset(models)
            .viewset(ViewSet::new("hidden").view(leaf("page", "/page")))
            .index_view("index");
        ViewTree::assemble(root, Renderer::new()).unwrap()
    }

    fn urls(tree: &ViewTree) -> UrlMap {
        UrlMap::from_tree(tree, "/admin")
    }

    #[test]
    fn test_route_names_follow_tree_position() {
        let tree = sample();
        let root = tree.root();
        assert_eq!(tree.route_name(root), "admin");

        let models = tree.child(root, "my-model").unwrap();
        let edit = tree.child(models, "edit").unwrap();
        assert_eq!(tree.route_name(models), "admin:my-model");
        assert_eq!(tree.route_name(edit), "admin:my-model:edit");

        let nested = tree.child(models, "nested").unwrap();
        let deep = tree.child(nested, "deep").unwrap();
        assert_eq!(tree.route_name(deep), "admin:my-model:nested:deep");
        // memoized value is stable
        assert!(std::ptr::eq(tree.route_name(deep), tree.route_name(deep)));
    }

    #[test]
    fn test_missing_child_is_none() {
        let tree = sample();
        assert!(tree.child(tree.root(), "nope").is_none());
        let models = tree.child(tree.root(), "my-model").unwrap();
        assert!(tree.get_view(models, "nested").is_none());
        assert!(tree.get_view(models, "list").is_some());
    }

    #[test]
    fn test_find_by_route_name() {
        let tree = sample();
        let edit = tree.find("admin:my-model:edit").unwrap();
        assert_eq!(tree.node(edit).name(), "edit");
        assert!(tree.find("admin:missing").is_none());
        assert!(tree.find("other:my-model").is_none());
        assert_eq!(tree.find("admin"), Some(tree.root()));
    }

    #[test]
    fn test_full_paths() {
        let tree = sample();
        let check = |name: &str, path: &str| {
            assert_eq!(tree.full_path(tree.find(name).unwrap()), path);
        };
        check("admin:index", "/");
        check("admin:my-model:list", "/my-model/");
        check("admin:my-model:edit", "/my-model/{pk}");
        check("admin:my-model:nested:deep", "/my-model/nested/deep");
    }

    #[test]
    fn test_index_and_nesting() {
        let tree = sample();
        let models = tree.find("admin:my-model").unwrap();
        let deep = tree.find("admin:my-model:nested:deep").unwrap();
        assert_eq!(tree.index_view(models), tree.find("admin:my-model:list"));
        assert!(tree.index_view(tree.find("admin:hidden").unwrap()).is_none());
        assert!(tree.is_nested(deep, models));
        assert!(tree.is_nested(deep, tree.root()));
        assert!(!tree.is_nested(models, deep));
        assert!(!tree.is_nested(models, models));
    }

    #[test]
    fn test_breadcrumbs_root_first() {
        let tree = sample();
        let urls = urls(&tree);
        let edit = tree.find("admin:my-model:edit").unwrap();
        let crumbs = tree.breadcrumbs(edit, &urls).unwrap();
        assert_eq!(
            crumbs,
            vec![
                Breadcrumb {
                    label: "Admin".into(),
                    url: "/admin/".into()
                },
                Breadcrumb {
                    label: "My Model".into(),
                    url: "/admin/my-model/".into()
                },
            ]
        );

        // groups without an index view are skipped
        let deep = tree.find("admin:my-model:nested:deep").unwrap();
        assert_eq!(tree.breadcrumbs(deep, &urls).unwrap().len(), 2);
    }

    #[test]
    fn test_navigation_marks_active_group() {
        let tree = sample();
        let urls = urls(&tree);
        let deep = tree.find("admin:my-model:nested:deep").unwrap();
        let nav = tree.navigation(deep, &urls).unwrap();
        assert_eq!(nav.len(), 1);
        assert_eq!(nav[0].title, "My Model");
        assert_eq!(nav[0].url, "/admin/my-model/");
        assert!(nav[0].active);

        let index = tree.find("admin:index").unwrap();
        assert!(!tree.navigation(index, &urls).unwrap()[0].active);
    }

    #[test]
    fn test_renderer_inherited() {
        let custom = Renderer::with_template_dirs(["/nonexistent"]);
        let root = ViewSet::new("admin")
            .viewset(
                ViewSet::new("a")
                    .renderer(custom)
                    .view(leaf("x", "/x")),
            )
            .viewset(ViewSet::new("b").view(leaf("y", "/y")));
        let tree = ViewTree::assemble(root, Renderer::new()).unwrap();
        let x = tree.find("admin:a:x").unwrap();
        let y = tree.find("admin:b:y").unwrap();
        assert_eq!(tree.renderer(x).template_dirs().len(), 1);
        assert!(tree.renderer(y).template_dirs().is_empty());
    }

    #[test]
    fn test_duplicate_sibling_names_rejected() {
        let root = ViewSet::new("admin")
            .view(leaf("same", "/a"))
            .viewset(ViewSet::new("same"));
        assert_eq!(
            ViewTree::assemble(root, Renderer::new()).unwrap_err(),
            ConfigurationError::DuplicateName {
                parent: "admin".into(),
                name: "same".into()
            }
        );
    }

    #[test]
    fn test_same_name_in_different_groups_allowed() {
        let root = ViewSet::new("admin")
            .viewset(ViewSet::new("a").view(leaf("list", "/")))
            .viewset(ViewSet::new("b").view(leaf("list", "/")));
        assert!(ViewTree::assemble(root, Renderer::new()).is_ok());
    }

    #[test]
    fn test_unknown_index_view_rejected() {
        let root = ViewSet::new("admin")
            .viewset(ViewSet::new("group"))
            .index_view("group");
        assert!(matches!(
            ViewTree::assemble(root, Renderer::new()),
            Err(ConfigurationError::UnknownIndexView { .. })
        ));
    }

    #[test]
    fn test_missing_title_and_handler_rejected() {
        let untitled = ViewSet::new("admin").view(View::new("x", "/x").get(noop()));
        assert!(matches!(
            ViewTree::assemble(untitled, Renderer::new()),
            Err(ConfigurationError::MissingAttribute { attribute: "title", .. })
        ));

        let unhandled = ViewSet::new("admin").view(View::new("x", "/x").title("X"));
        assert!(matches!(
            ViewTree::assemble(unhandled, Renderer::new()),
            Err(ConfigurationError::MissingAttribute { attribute: "handler", .. })
        ));
    }

    #[test]
    fn test_invalid_names_and_paths_rejected() {
        for name in ["", "a:b", "a/b", "a b"] {
            let root = ViewSet::new("admin").view(leaf(name, "/x"));
            assert!(ViewTree::assemble(root, Renderer::new()).is_err(), "{name:?}");
        }
        let root = ViewSet::new("admin").view(leaf("x", "x"));
        assert!(ViewTree::assemble(root, Renderer::new()).is_err());
        let root = ViewSet::new("admin").viewset(ViewSet::new("g").prefix("/g/"));
        assert!(ViewTree::assemble(root, Renderer::new()).is_err());
    }
}
