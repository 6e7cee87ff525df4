//! Unified service bootstrap utilities
//!
//! Startup banner, logging initialization and environment setup shared by
//! Summit Ops services.

use std::path::PathBuf;

use crate::logging::{self, LogConfig};
use tracing::{info, Level};

/// Service metadata for startup
pub struct ServiceInfo {
    /// Service name (e.g., "sheetsrv")
    pub name: String,
    /// Service version
    pub version: String,
    /// Service description
    pub description: String,
    /// Default port
    pub default_port: u16,
}

impl ServiceInfo {
    pub fn new(name: impl Into<String>, description: impl Into<String>, default_port: u16) -> Self {
        Self {
            name: name.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: description.into(),
            default_port,
        }
    }

    /// Override the version (services pass their own `CARGO_PKG_VERSION`)
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }
}

/// Logging options a service reads from its own configuration
#[derive(Debug, Clone, Default)]
pub struct LoggingOptions {
    /// Log directory; `SUMMIT_LOG_DIR` overrides it
    pub dir: Option<PathBuf>,
    /// Default level when `RUST_LOG` is unset
    pub level: Option<String>,
    /// JSON file output
    pub json: bool,
}

/// Print the startup banner
pub fn print_startup_banner(service: &ServiceInfo) {
    let banner = r#"
  ███████╗██╗   ██╗███╗   ███╗███╗   ███╗██╗████████╗
  ██╔════╝██║   ██║████╗ ████║████╗ ████║██║╚══██╔══╝
  ███████╗██║   ██║██╔████╔██║██╔████╔██║██║   ██║
  ╚════██║██║   ██║██║╚██╔╝██║██║╚██╔╝██║██║   ██║
  ███████║╚██████╔╝██║ ╚═╝ ██║██║ ╚═╝ ██║██║   ██║
  ╚══════╝ ╚═════╝ ╚═╝     ╚═╝╚═╝     ╚═╝╚═╝   ╚═╝
    "#;

    info!("{}", banner);
    info!(" {} v{}", service.name.to_uppercase(), service.version);
    info!(" {}", service.description);
    info!(" Default Port: {}", service.default_port);
    info!("");
}

/// Resolve the log directory: `SUMMIT_LOG_DIR` > configured dir > `logs/{service}`
pub fn resolve_log_dir(service: &ServiceInfo, configured: Option<&PathBuf>) -> PathBuf {
    if let Ok(dir) = std::env::var("SUMMIT_LOG_DIR") {
        return PathBuf::from(dir).join(&service.name);
    }
    match configured {
        Some(dir) => dir.clone(),
        None => PathBuf::from("logs").join(&service.name),
    }
}

/// Initialize logging for a service with standard configuration
pub fn init_logging(service: &ServiceInfo, options: &LoggingOptions) -> anyhow::Result<()> {
    let level = options
        .level
        .as_deref()
        .and_then(|s| s.parse::<Level>().ok())
        .unwrap_or(Level::INFO);

    let log_config = LogConfig {
        service_name: service.name.clone(),
        log_dir: Some(resolve_log_dir(service, options.dir.as_ref())),
        level,
        enable_json: options.json,
        enable_api_log: true,
        api_log_level: Level::INFO,
    };

    logging::init_with_config(log_config)
}

/// Load a `.env` file in development builds
///
/// Variables already present in the environment are not overridden. Release
/// builds expect the environment to be set externally.
pub fn load_development_env() {
    #[cfg(debug_assertions)]
    {
        if let Ok(path) = dotenvy::dotenv() {
            eprintln!("Loaded environment from {}", path.display());
        }
    }
}

/// Pick the listening port: `SERVICE_PORT` / `{NAME}_PORT` apply only when the
/// configured port is unset or left at the default
pub fn get_service_port(config_port: u16, service: &ServiceInfo) -> u16 {
    let is_default = config_port == 0 || config_port == service.default_port;

    if is_default {
        let service_var = format!("{}_PORT", service.name.to_uppercase());
        for var in ["SERVICE_PORT", service_var.as_str()] {
            if let Some(port) = std::env::var(var).ok().and_then(|p| p.parse::<u16>().ok()) {
                return port;
            }
        }
    }

    if config_port > 0 {
        config_port
    } else {
        service.default_port
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[test]
    fn test_service_info_creation() {
        let service = ServiceInfo::new("sheetsrv", "Sheet Reconciler", 6010).with_version("1.2.3");
        assert_eq!(service.name, "sheetsrv");
        assert_eq!(service.description, "Sheet Reconciler");
        assert_eq!(service.default_port, 6010);
        assert_eq!(service.version, "1.2.3");
    }

    #[test]
    fn test_explicit_port_wins() {
        let service = ServiceInfo::new("portcheck", "Test", 6010);
        assert_eq!(get_service_port(7000, &service), 7000);
    }

    #[test]
    fn test_configured_log_dir() {
        let service = ServiceInfo::new("logcheck", "Test", 6010);
        if std::env::var("SUMMIT_LOG_DIR").is_err() {
            let configured = PathBuf::from("/var/log/summit");
            assert_eq!(resolve_log_dir(&service, Some(&configured)), configured);
            assert_eq!(
                resolve_log_dir(&service, None),
                PathBuf::from("logs/logcheck")
            );
        }
    }
}
