//! Protobuf frames exchanged with the client.
//!
//! ```text
//! message DeviceRequest  { uint64 command_id = 1; }
//! message HelloPayload   { uint32 major = 1; uint32 minor = 2; }
//! message DeviceResponse { uint32 status = 1; HelloPayload hello = 2; }
//! ```

use prost::Message;
use thiserror::Error;

use crate::protocol::commands::{Command, Status};

/// Client → device frame.
#[derive(Clone, PartialEq, Message)]
pub struct DeviceRequest {
    #[prost(uint64, tag = "1")]
    pub command_id: u64,
}

/// Version carried by a Hello response.
#[derive(Clone, PartialEq, Message)]
pub struct HelloPayload {
    #[prost(uint32, tag = "1")]
    pub major: u32,
    #[prost(uint32, tag = "2")]
    pub minor: u32,
}

/// Device → client frame.
#[derive(Clone, PartialEq, Message)]
pub struct DeviceResponse {
    #[prost(uint32, tag = "1")]
    pub status: u32,
    #[prost(message, optional, tag = "2")]
    pub hello: Option<HelloPayload>,
}

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed frame: {0}")]
    Decode(#[from] prost::DecodeError),
}

impl DeviceRequest {
    pub fn new(command: Command) -> Self {
        Self {
            command_id: command.id(),
        }
    }

    pub fn decode_frame(bytes: &[u8]) -> Result<Self, CodecError> {
        Ok(Self::decode(bytes)?)
    }

    pub fn command(&self) -> Option<Command> {
        Command::from_id(self.command_id)
    }
}

impl DeviceResponse {
    pub fn hello(status: Status, major: u32, minor: u32) -> Self {
        Self {
            status: status.code(),
            hello: Some(HelloPayload { major, minor }),
        }
    }

    pub fn decode_frame(bytes: &[u8]) -> Result<Self, CodecError> {
        Ok(Self::decode(bytes)?)
    }

    pub fn status(&self) -> Option<Status> {
        Status::from_code(self.status)
    }
}
