//! Common page context shared by every admin template.

use serde::Serialize;

/// One entry of the breadcrumb trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Breadcrumb {
    /// Group title
    pub label: String,
    /// URL of the group's index view
    pub url: String,
}

/// One top-level entry of the navigation menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationItem {
    /// Group title
    pub title: String,
    /// Route name of the group's index view
    pub route_name: String,
    /// URL of the group's index view
    pub url: String,
    /// Whether the current page belongs to this group
    pub active: bool,
}

/// Keys every admin page receives.
///
/// # Example
///
/// ```rust
/// use acton_admin::templates::{Breadcrumb, PageContext};
///
/// let page = PageContext::new("Admin", "Item 3")
///     .with_route("admin:my-model:edit")
///     .with_breadcrumbs(vec![Breadcrumb {
///         label: "My Model".into(),
///         url: "/admin/my-model/".into(),
///     }]);
/// assert!(page.is_current("admin:my-model:edit"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageContext {
    /// Title of the whole admin site.
    pub site_title: String,

    /// Title of the current page.
    pub page_title: String,

    /// Route name of the view being rendered.
    pub current_route: Option<String>,

    /// Trail of ancestor groups, root first.
    pub breadcrumbs: Vec<Breadcrumb>,

    /// Top-level groups for the menu.
    pub navigation: Vec<NavigationItem>,
}

impl PageContext {
    /// Create a context with titles only.
    #[must_use]
    pub fn new(site_title: impl Into<String>, page_title: impl Into<String>) -> Self {
        Self {
            site_title: site_title.into(),
            page_title: page_title.into(),
            ..Self::default()
        }
    }

    /// Set the current route name.
    #[must_use]
    pub fn with_route(mut self, route_name: impl Into<String>) -> Self {
        self.current_route = Some(route_name.into());
        self
    }

    /// Set the breadcrumb trail.
    #[must_use]
    pub fn with_breadcrumbs(mut self, breadcrumbs: Vec<Breadcrumb>) -> Self {
        self.breadcrumbs = breadcrumbs;
        self
    }

    /// Set the navigation menu.
    #[must_use]
    pub fn with_navigation(mut self, navigation: Vec<NavigationItem>) -> Self {
        self.navigation = navigation;
        self
    }

    /// Check if `route_name` is the page being rendered.
    pub fn is_current(&self, route_name: &str) -> bool {
        self.current_route.as_deref() == Some(route_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_empty() {
        let page = PageContext::new("Admin", "Home");
        assert_eq!(page.site_title, "Admin");
        assert!(page.current_route.is_none());
        assert!(page.breadcrumbs.is_empty());
        assert!(!page.is_current("admin:index"));
    }

    #[test]
    fn test_serialized_keys() {
        let json = serde_json::to_value(PageContext::new("Admin", "Home").with_route("admin:index"))
            .unwrap();
        assert_eq!(json["current_route"], "admin:index");
        assert_eq!(json["navigation"], serde_json::json!([]));
    }
}
