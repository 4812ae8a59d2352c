//! Route-name and URL-segment helpers

use once_cell::sync::Lazy;
use regex::Regex;

/// Separator between the segments of a hierarchical route name
pub const ROUTE_NAME_SEPARATOR: &str = ":";

static WORD_BOUNDARY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([a-z0-9])([A-Z])|([A-Z]+)([A-Z][a-z])")
        .expect("word boundary pattern is valid")
});

/// Last path segment of a type name, without generic arguments
///
/// `my_app::models::MyModel` becomes `MyModel`.
pub fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Kebab-case URL segment for an identifier
///
/// ```rust
/// use acton_admin::naming::to_url_segment;
///
/// assert_eq!(to_url_segment("MyModel"), "my-model");
/// assert_eq!(to_url_segment("HTTPRequestLog"), "http-request-log");
/// assert_eq!(to_url_segment("audit_entry"), "audit-entry");
/// ```
pub fn to_url_segment(name: &str) -> String {
    WORD_BOUNDARY
        .replace_all(name, |caps: &regex::Captures<'_>| {
            match (caps.get(1), caps.get(2)) {
                (Some(a), Some(b)) => format!("{}-{}", a.as_str(), b.as_str()),
                _ => format!(
                    "{}-{}",
                    caps.get(3).map_or("", |m| m.as_str()),
                    caps.get(4).map_or("", |m| m.as_str())
                ),
            }
        })
        .replace(['_', ' '], "-")
        .to_lowercase()
}

/// View name derived from a model type (`MyModel` → `my-model`)
pub fn model_view_name<M: ?Sized>() -> String {
    to_url_segment(short_type_name::<M>())
}

/// Join a parent route name and a child name
pub fn join_route_name(parent: &str, name: &str) -> String {
    format!("{}{}{}", parent, ROUTE_NAME_SEPARATOR, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MyModel;

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name::<MyModel>(), "MyModel");
        assert_eq!(short_type_name::<Vec<String>>(), "Vec");
        assert_eq!(short_type_name::<u64>(), "u64");
    }

    #[test]
    fn test_to_url_segment() {
        assert_eq!(to_url_segment("MyModel"), "my-model");
        assert_eq!(to_url_segment("User"), "user");
        assert_eq!(to_url_segment("APIKey"), "api-key");
        assert_eq!(to_url_segment("Order2Line"), "order2-line");
        assert_eq!(to_url_segment("already-kebab"), "already-kebab");
    }

    #[test]
    fn test_model_view_name() {
        assert_eq!(model_view_name::<MyModel>(), "my-model");
    }

    #[test]
    fn test_join_route_name() {
        assert_eq!(join_route_name("admin", "my-model"), "admin:my-model");
    }
}
