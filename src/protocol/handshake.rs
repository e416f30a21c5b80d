//! Hello exchange performed once per connection.
//!
//! # Responsibilities
//! - Poll the peer for a request, one read per poll
//! - Ignore anything that is not a decodable Hello
//! - Answer with the configured protocol version and `Status::Ok`
//!
//! # Design Decisions
//! - No retries and no timeout: a client that never says Hello keeps us waiting
//! - The future is cancel-safe; the driver races it against shutdown

use std::fmt;
use std::time::Duration;

use prost::Message;
use thiserror::Error;

use crate::config::{HandshakeConfig, TimingConfig};
use crate::net::PeerSocket;
use crate::observability::metrics;
use crate::protocol::commands::{Command, Status};
use crate::protocol::messages::{DeviceRequest, DeviceResponse};

/// Protocol version the emulated device reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolVersion {
    pub major: u32,
    pub minor: u32,
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[derive(Debug, Error)]
pub enum HandshakeError {
    #[error("failed to read request: {0}")]
    Read(#[source] std::io::Error),

    #[error("failed to write response: {0}")]
    Write(#[source] std::io::Error),
}

/// What to do with one chunk of bytes read from the peer.
#[derive(Debug, PartialEq)]
pub enum RequestDisposition {
    Hello(DeviceRequest),
    /// Decoded, but carries another command id.
    Unhandled(u64),
    Malformed,
}

/// Classify a single read as a request.
pub fn classify(bytes: &[u8]) -> RequestDisposition {
    match DeviceRequest::decode_frame(bytes) {
        Ok(request) if request.command() == Some(Command::Hello) => RequestDisposition::Hello(request),
        Ok(request) => RequestDisposition::Unhandled(request.command_id),
        Err(_) => RequestDisposition::Malformed,
    }
}

#[derive(Debug, Clone)]
pub struct Handshake {
    version: ProtocolVersion,
    read_buffer_bytes: usize,
    poll_interval: Duration,
}

impl Handshake {
    pub fn new(config: &HandshakeConfig, timing: &TimingConfig) -> Self {
        Self {
            version: ProtocolVersion {
                major: config.version_major,
                minor: config.version_minor,
            },
            read_buffer_bytes: config.read_buffer_bytes,
            poll_interval: timing.tick_interval(),
        }
    }

    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    /// The response sent to a Hello.
    pub fn hello_response(&self) -> DeviceResponse {
        DeviceResponse::hello(Status::Ok, self.version.major, self.version.minor)
    }

    /// Wait for Hello, then answer it.
    pub async fn exchange(&self, peer: &PeerSocket) -> Result<(), HandshakeError> {
        self.wait_for_hello(peer).await?;
        let written = self.respond(peer).await?;

        tracing::info!(
            connection_id = %peer.id(),
            version = %self.version,
            bytes = written,
            "Hello answered"
        );
        metrics::record_handshake("ok");
        Ok(())
    }

    /// Poll the peer until a read decodes to a Hello request.
    pub async fn wait_for_hello(&self, peer: &PeerSocket) -> Result<DeviceRequest, HandshakeError> {
        let mut buffer = vec![0u8; self.read_buffer_bytes];

        loop {
            let n = peer
                .read_available(&mut buffer)
                .await
                .map_err(HandshakeError::Read)?;

            if n > 0 {
                match classify(&buffer[..n]) {
                    RequestDisposition::Hello(request) => return Ok(request),
                    RequestDisposition::Unhandled(command_id) => {
                        tracing::debug!(
                            connection_id = %peer.id(),
                            command_id = %format!("{:#010x}", command_id),
                            "Ignoring non-Hello request"
                        );
                        metrics::record_ignored_request();
                    }
                    RequestDisposition::Malformed => {
                        tracing::debug!(connection_id = %peer.id(), bytes = n, "Ignoring malformed request");
                        metrics::record_ignored_request();
                    }
                }
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Encode the Hello response and write it in one go. Returns the frame length.
    pub async fn respond(&self, peer: &PeerSocket) -> Result<usize, HandshakeError> {
        let frame = self.hello_response().encode_to_vec();
        peer.write_all(&frame).await.map_err(HandshakeError::Write)?;
        Ok(frame.len())
    }
}
