//! Startup orchestration.
//!
//! # Responsibilities
//! - Load configuration and apply command-line overrides
//! - Initialize logging and, when enabled, the metrics endpoint
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Overrides are validated together with the file

use std::path::PathBuf;

use thiserror::Error;

use crate::config::loader::{load_config, ConfigError};
use crate::config::validation::validate_config;
use crate::config::EmulatorConfig;
use crate::observability::{logging, metrics};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to initialize logging: {0}")]
    Logging(#[from] tracing_subscriber::util::TryInitError),

    #[error("failed to start metrics endpoint: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),
}

/// What the process was asked to run with.
#[derive(Debug, Clone, Default)]
pub struct StartupOptions {
    pub config_path: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Resolve the effective configuration: file (or defaults), then overrides.
pub fn resolve_config(options: &StartupOptions) -> Result<EmulatorConfig, ConfigError> {
    let mut config = match &options.config_path {
        Some(path) => load_config(path)?,
        None => EmulatorConfig::default(),
    };

    if let Some(host) = &options.host {
        config.listener.host = host.clone();
    }
    if let Some(port) = options.port {
        config.listener.port = port;
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Install logging and, if configured, the Prometheus exporter.
///
/// Must be called from within a Tokio runtime.
pub fn init_observability(config: &EmulatorConfig) -> Result<(), StartupError> {
    logging::init_logging(&config.observability)?;

    if config.observability.metrics_enabled {
        if let Some(addr) = config.observability.metrics_socket_addr() {
            metrics::init_metrics(addr)?;
        }
    }

    tracing::info!(
        address = %config.listener.bind_address(),
        tick_interval_ms = config.timing.tick_interval_ms,
        metrics_enabled = config.observability.metrics_enabled,
        "Configuration loaded"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_file() {
        let config = resolve_config(&StartupOptions::default()).unwrap();
        assert_eq!(config.listener.bind_address(), "127.0.0.1:57005");
    }

    #[test]
    fn overrides_win() {
        let options = StartupOptions {
            port: Some(4000),
            host: Some("127.0.0.2".into()),
            ..Default::default()
        };
        let config = resolve_config(&options).unwrap();
        assert_eq!(config.listener.bind_address(), "127.0.0.2:4000");
    }

    #[test]
    fn bad_override_fails_validation() {
        let options = StartupOptions {
            host: Some("not-an-ip".into()),
            ..Default::default()
        };
        assert!(matches!(
            resolve_config(&options),
            Err(ConfigError::Validation(_))
        ));
    }
}
