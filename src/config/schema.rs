//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the emulator.
//! All types derive Serde traits for deserialization from config files.

use std::net::{AddrParseError, IpAddr, SocketAddr};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Port the physical device listens on.
pub const DEFAULT_PORT: u16 = 57005;

/// Root configuration for the device emulator.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct EmulatorConfig {
    /// Listener configuration (host, port).
    pub listener: ListenerConfig,

    /// Tick cadence of the driver and the liveness monitor.
    pub timing: TimingConfig,

    /// Identity reported during the Hello exchange.
    pub handshake: HandshakeConfig,

    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Host to bind. Must be a loopback IP address, v4 or v6.
    pub host: String,

    /// Port to bind. `0` picks an ephemeral port (useful in tests).
    pub port: u16,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ListenerConfig {
    /// The address handed to the socket layer.
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        let ip: IpAddr = self.host.parse()?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// `host:port` for logs and errors. IPv6 hosts are bracketed.
    pub fn bind_address(&self) -> String {
        match self.socket_addr() {
            Ok(addr) => addr.to_string(),
            Err(_) => format!("{}:{}", self.host, self.port),
        }
    }
}

/// Polling cadence.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Delay between two ticks of the driver and of the monitor, in milliseconds.
    pub tick_interval_ms: u64,

    /// How long a liveness probe waits for read-readiness, in milliseconds.
    pub probe_timeout_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 20,
            probe_timeout_ms: 1,
        }
    }
}

impl TimingConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

/// Handshake parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HandshakeConfig {
    /// Protocol major version reported in the Hello response.
    pub version_major: u32,

    /// Protocol minor version reported in the Hello response.
    pub version_minor: u32,

    /// Size of the buffer a single request read lands in.
    pub read_buffer_bytes: usize,
}

impl Default for HandshakeConfig {
    fn default() -> Self {
        Self {
            version_major: 0,
            version_minor: 2,
            read_buffer_bytes: 512,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Human-readable or JSON log lines.
    pub log_format: LogFormat,

    /// Enable the Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

impl ObservabilityConfig {
    pub fn metrics_socket_addr(&self) -> Option<SocketAddr> {
        self.metrics_address.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ipv6_host_is_bracketed() {
        let listener = ListenerConfig {
            host: "::1".into(),
            port: 4000,
        };

        assert_eq!(listener.bind_address(), "[::1]:4000");
        assert_eq!(
            listener.socket_addr().unwrap(),
            SocketAddr::new(IpAddr::from([0, 0, 0, 0, 0, 0, 0, 1u16]), 4000)
        );
    }

    #[test]
    fn non_ip_host_has_no_socket_addr() {
        let listener = ListenerConfig {
            host: "localhost".into(),
            port: 4000,
        };

        assert!(listener.socket_addr().is_err());
        assert_eq!(listener.bind_address(), "localhost:4000");
    }
}
