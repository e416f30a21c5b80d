//! Device wire protocol.
//!
//! # Data Flow
//! ```text
//! bytes from peer
//!     → messages.rs (protobuf decode into DeviceRequest)
//!     → commands.rs (classify command id)
//!     → handshake.rs (Hello? build DeviceResponse, encode, write)
//! ```
//!
//! # Design Decisions
//! - One read is one message; there is no framing or cross-read buffer
//! - Unknown or undecodable requests are dropped silently
//! - Reserved commands are recognised but never acted upon

pub mod commands;
pub mod handshake;
pub mod messages;

pub use commands::{Command, Status};
pub use handshake::{Handshake, HandshakeError, ProtocolVersion};
pub use messages::{DeviceRequest, DeviceResponse, HelloPayload};
