//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (intervals > 0, buffer sizes > 0)
//! - Check addresses parse and the listener stays on loopback
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: EmulatorConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::IpAddr;

use crate::config::schema::EmulatorConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field, e.g. `timing.tick_interval_ms`.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub fn validate_config(config: &EmulatorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match config.listener.host.parse::<IpAddr>() {
        Ok(ip) if !ip.is_loopback() => errors.push(ValidationError::new(
            "listener.host",
            format!("'{}' is not a loopback address", config.listener.host),
        )),
        Ok(_) => {}
        Err(_) => errors.push(ValidationError::new(
            "listener.host",
            format!("'{}' is not an IP address", config.listener.host),
        )),
    }

    let timing = &config.timing;
    if timing.tick_interval_ms == 0 {
        errors.push(ValidationError::new("timing.tick_interval_ms", "must be greater than 0"));
    }
    if timing.probe_timeout_ms == 0 {
        errors.push(ValidationError::new("timing.probe_timeout_ms", "must be greater than 0"));
    } else if timing.tick_interval_ms > 0 && timing.probe_timeout_ms > timing.tick_interval_ms {
        errors.push(ValidationError::new(
            "timing.probe_timeout_ms",
            format!(
                "must not exceed tick_interval_ms ({})",
                timing.tick_interval_ms
            ),
        ));
    }

    if config.handshake.read_buffer_bytes == 0 {
        errors.push(ValidationError::new(
            "handshake.read_buffer_bytes",
            "must be greater than 0",
        ));
    }

    let observability = &config.observability;
    if observability.metrics_enabled && observability.metrics_socket_addr().is_none() {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&EmulatorConfig::default()).is_ok());
    }

    #[test]
    fn rejects_non_ip_host() {
        let mut config = EmulatorConfig::default();
        config.listener.host = "localhost".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "listener.host");
    }

    #[test]
    fn rejects_non_loopback_host() {
        let mut config = EmulatorConfig::default();
        config.listener.host = "0.0.0.0".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "listener.host");
        assert!(errors[0].message.contains("loopback"));
    }

    #[test]
    fn accepts_ipv6_loopback() {
        let mut config = EmulatorConfig::default();
        config.listener.host = "::1".into();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn probe_timeout_bounded_by_tick() {
        let mut config = EmulatorConfig::default();
        config.timing.tick_interval_ms = 10;
        config.timing.probe_timeout_ms = 50;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "timing.probe_timeout_ms");
    }

    #[test]
    fn metrics_address_checked_only_when_enabled() {
        let mut config = EmulatorConfig::default();
        config.observability.metrics_address = "nowhere".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "observability.metrics_address");
    }
}
