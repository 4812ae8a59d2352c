//! Tracing initialization

use tracing_subscriber::EnvFilter;

use crate::{config::Config, error::Result};

/// Install a JSON `tracing` subscriber filtered by `service.log_level`
///
/// `RUST_LOG`-style directives are accepted; an unparsable level falls back
/// to `info`. Calling this twice leaves the first subscriber in place.
pub fn init_tracing(config: &Config) -> Result<()> {
    let log_level = config.service.log_level.clone();

    let installed = tracing_subscriber::fmt()
        .json()
        .with_env_filter(build_filter(&log_level))
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("Tracing initialized for service: {}", config.service.name);
    } else {
        tracing::debug!("Tracing subscriber already installed");
    }

    Ok(())
}

fn build_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_twice() {
        let config = Config::default();
        assert!(init_tracing(&config).is_ok());
        assert!(init_tracing(&config).is_ok());
    }

    #[test]
    fn test_filter_accepts_directives() {
        assert_eq!(build_filter("acton_admin=debug").to_string(), "acton_admin=debug");
        assert_eq!(build_filter("warn").to_string(), "warn");
    }
}
