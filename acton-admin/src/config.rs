//! Configuration management using Figment
//!
//! Configuration is loaded from multiple sources with the following precedence (highest to lowest):
//! 1. Environment variables (prefix: `ACTON_ADMIN_`, nested keys split on `__`)
//! 2. Current working directory: ./config.toml
//! 3. XDG config directory: ~/.config/acton-admin/{service_name}/config.toml
//! 4. System directory: /etc/acton-admin/{service_name}/config.toml
//! 5. Default values
//!
//! ```toml
//! [service]
//! name = "shop-admin"
//! port = 8080
//!
//! [admin]
//! title = "Shop"
//! mount_path = "/admin"
//! default_list_limit = 25
//! template_dirs = ["./templates"]
//! ```

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;
use crate::listing::{DEFAULT_LIST_LIMIT, DEFAULT_MAX_LIST_LIMIT};

/// Prefix of environment variable overrides
pub const ENV_PREFIX: &str = "ACTON_ADMIN_";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Service configuration
    #[serde(default)]
    pub service: ServiceConfig,

    /// Admin site configuration
    #[serde(default)]
    pub admin: AdminConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service name
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error) or a full filter directive
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl ServiceConfig {
    /// Request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            port: default_port(),
            log_level: default_log_level(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Admin site configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Site title shown in the page header
    #[serde(default = "default_title")]
    pub title: String,

    /// Name of the root view set; the first segment of every route name
    #[serde(default = "default_root_name")]
    pub root_name: String,

    /// Path the admin is mounted at
    #[serde(default = "default_mount_path")]
    pub mount_path: String,

    /// Page size of list views when the request has none
    #[serde(default = "default_list_limit")]
    pub default_list_limit: u64,

    /// Largest page size a request may ask for
    #[serde(default = "default_max_list_limit")]
    pub max_list_limit: u64,

    /// Drop `offset` from sort links so a re-sort starts on the first page
    #[serde(default)]
    pub reset_offset_on_sort: bool,

    /// Template directories searched before the built-in templates
    #[serde(default)]
    pub template_dirs: Vec<PathBuf>,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            root_name: default_root_name(),
            mount_path: default_mount_path(),
            default_list_limit: default_list_limit(),
            max_list_limit: default_max_list_limit(),
            reset_offset_on_sort: false,
            template_dirs: Vec::new(),
        }
    }
}

fn default_service_name() -> String {
    "acton-admin".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_title() -> String {
    "Administration".to_string()
}

fn default_root_name() -> String {
    "admin".to_string()
}

fn default_mount_path() -> String {
    "/admin".to_string()
}

fn default_list_limit() -> u64 {
    DEFAULT_LIST_LIMIT
}

fn default_max_list_limit() -> u64 {
    DEFAULT_MAX_LIST_LIMIT
}

impl Config {
    /// Load configuration from all sources
    ///
    /// The service name is inferred from the binary name.
    pub fn load() -> Result<Self> {
        let service_name = std::env::current_exe()
            .ok()
            .and_then(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .unwrap_or_else(default_service_name);

        Self::load_for_service(&service_name)
    }

    /// Load configuration for a specific service name
    pub fn load_for_service(service_name: &str) -> Result<Self> {
        let config_paths = Self::find_config_paths(service_name);

        tracing::debug!("Searching for config files in order:");
        for path in &config_paths {
            tracing::debug!("  - {}", path.display());
        }

        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        // lowest priority first
        for path in config_paths.iter().rev() {
            if path.exists() {
                tracing::info!("Loading configuration from: {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config = figment.extract()?;
        Ok(config)
    }

    /// Load configuration from a specific file plus environment overrides
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

        Ok(config)
    }

    /// Config file candidates, highest priority first
    fn find_config_paths(service_name: &str) -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        let xdg_dirs = xdg::BaseDirectories::with_prefix("acton-admin");
        let config_file_path = Path::new(service_name).join("config.toml");
        if let Some(path) = xdg_dirs.find_config_file(&config_file_path) {
            paths.push(path);
        }

        paths.push(
            PathBuf::from("/etc/acton-admin")
                .join(service_name)
                .join("config.toml"),
        );

        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.service.port, 8080);
        assert_eq!(config.service.log_level, "info");
        assert_eq!(config.admin.root_name, "admin");
        assert_eq!(config.admin.mount_path, "/admin");
        assert_eq!(config.admin.default_list_limit, 10);
        assert_eq!(config.admin.max_list_limit, 100);
        assert!(!config.admin.reset_offset_on_sort);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[service]
name = "shop-admin"

[admin]
title = "Shop"
default_list_limit = 25
template_dirs = ["./custom"]
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.service.name, "shop-admin");
        assert_eq!(config.service.port, 8080);
        assert_eq!(config.admin.title, "Shop");
        assert_eq!(config.admin.default_list_limit, 25);
        assert_eq!(config.admin.template_dirs, vec![PathBuf::from("./custom")]);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = Config::load_from("/nonexistent/config.toml").unwrap();
        assert_eq!(config.admin, AdminConfig::default());
    }
}
