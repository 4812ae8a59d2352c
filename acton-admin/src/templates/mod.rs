//! Page rendering with minijinja
//!
//! A [`Renderer`] owns a `minijinja` environment whose loader looks up
//! templates in user template directories first and then in the built-in
//! templates embedded at compile time. Overriding `list.html` in a template
//! directory therefore restyles every list view without touching code.
//!
//! Built-in templates:
//!
//! - `base.html`: layout with navigation and breadcrumbs
//! - `index.html`: site index listing the top-level groups
//! - `list.html`: list view table with sorting, pagination and search
//! - `edit.html`: edit form
//!
//! Every page receives the [`PageContext`] keys (`site_title`, `page_title`,
//! `current_route`, `breadcrumbs`, `navigation`) merged with page-specific
//! values.
//!
//! # Example
//!
//! ```rust
//! use acton_admin::templates::{PageContext, Renderer};
//! use serde_json::json;
//!
//! let renderer = Renderer::new();
//! let page = PageContext::new("Admin", "Dashboard");
//! let html = renderer.render_page("index.html", &page, json!({})).unwrap();
//! assert!(html.contains("Dashboard"));
//! ```

mod context;

use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use minijinja::{Environment, ErrorKind};
use rust_embed::Embed;
use serde::Serialize;
use serde_json::{Map, Value};

pub use context::{Breadcrumb, NavigationItem, PageContext};

use crate::error::{Error, Result};

/// Built-in templates, compiled into the binary
#[derive(Embed)]
#[folder = "templates/"]
struct EmbeddedTemplates;

/// Shared template environment
///
/// Cloning is cheap; clones share the environment.
#[derive(Clone)]
pub struct Renderer {
    env: Arc<Environment<'static>>,
    template_dirs: Arc<[PathBuf]>,
}

impl Renderer {
    /// Renderer using only the built-in templates
    pub fn new() -> Self {
        Self::with_template_dirs(Vec::<PathBuf>::new())
    }

    /// Renderer searching `dirs` in order before the built-in templates
    pub fn with_template_dirs<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let template_dirs: Arc<[PathBuf]> = dirs.into_iter().map(Into::into).collect();
        let search = Arc::clone(&template_dirs);

        let mut env = Environment::new();
        env.set_loader(move |name| load_template(&search, name));

        Self {
            env: Arc::new(env),
            template_dirs,
        }
    }

    /// User template directories in search order
    pub fn template_dirs(&self) -> &[PathBuf] {
        &self.template_dirs
    }

    /// Names of the built-in templates
    pub fn builtin_templates() -> Vec<String> {
        EmbeddedTemplates::iter().map(|name| name.to_string()).collect()
    }

    /// Whether `name` resolves to a template
    pub fn has_template(&self, name: &str) -> bool {
        self.env.get_template(name).is_ok()
    }

    /// Render `name` with an arbitrary serializable context
    pub fn render<S: Serialize>(&self, name: &str, context: S) -> Result<String> {
        let template = self.env.get_template(name)?;
        Ok(template.render(context)?)
    }

    /// Render a page: the common page keys merged with `extra`
    ///
    /// Keys in `extra` win over the common keys. `extra` must serialize to
    /// a map (or unit / null for no extra keys).
    pub fn render_page<S: Serialize>(
        &self,
        name: &str,
        page: &PageContext,
        extra: S,
    ) -> Result<String> {
        let mut context = to_map(page)?;
        context.extend(to_map(&extra)?);
        self.render(name, Value::Object(context))
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer")
            .field("template_dirs", &self.template_dirs)
            .finish_non_exhaustive()
    }
}

fn to_map<S: Serialize>(value: &S) -> Result<Map<String, Value>> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(Value::Null) => Ok(Map::new()),
        Ok(other) => Err(Error::Internal(format!(
            "template context must be a map, got {}",
            other
        ))),
        Err(e) => Err(Error::Internal(format!(
            "failed to serialize template context: {}",
            e
        ))),
    }
}

fn load_template(dirs: &[PathBuf], name: &str) -> std::result::Result<Option<String>, minijinja::Error> {
    if !is_safe_name(name) {
        return Ok(None);
    }

    for dir in dirs {
        let path = dir.join(name);
        if path.is_file() {
            return std::fs::read_to_string(&path).map(Some).map_err(|e| {
                minijinja::Error::new(
                    ErrorKind::InvalidOperation,
                    format!("failed to read template {}", path.display()),
                )
                .with_source(e)
            });
        }
    }

    match EmbeddedTemplates::get(name) {
        Some(file) => String::from_utf8(file.data.into_owned())
            .map(Some)
            .map_err(|e| {
                minijinja::Error::new(
                    ErrorKind::InvalidOperation,
                    format!("built-in template {} is not UTF-8", name),
                )
                .with_source(e)
            }),
        None => Ok(None),
    }
}

/// Template names are relative paths without `..`
fn is_safe_name(name: &str) -> bool {
    Path::new(name)
        .components()
        .all(|component| matches!(component, Component::Normal(_)))
}
