//! Command identifiers and status codes.

use std::fmt;

/// Command identifiers a client may send.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Hello = 0x0000_1000,
    GetInfo = 0x0000_1010,
    SetConfig = 0x0000_2000,
    Marker = 0x0000_3000,
}

impl Command {
    /// Wire value of the command.
    pub fn id(self) -> u64 {
        self as u32 as u64
    }

    /// Resolve a wire value, `None` for ids outside the known family.
    pub fn from_id(id: u64) -> Option<Self> {
        match id {
            0x0000_1000 => Some(Command::Hello),
            0x0000_1010 => Some(Command::GetInfo),
            0x0000_2000 => Some(Command::SetConfig),
            0x0000_3000 => Some(Command::Marker),
            _ => None,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Command::Hello => "Hello",
            Command::GetInfo => "GetInfo",
            Command::SetConfig => "SetConfig",
            Command::Marker => "Marker",
        };
        write!(f, "{}", name)
    }
}

/// Response status codes, HTTP-flavoured.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Processing = 0x102,
    Ok = 0x200,
    BadRequest = 0x400,
    NotFound = 0x404,
    NotAcceptable = 0x406,
    InternalError = 0x500,
}

impl Status {
    pub fn code(self) -> u32 {
        self as u32
    }

    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0x102 => Some(Status::Processing),
            0x200 => Some(Status::Ok),
            0x400 => Some(Status::BadRequest),
            0x404 => Some(Status::NotFound),
            0x406 => Some(Status::NotAcceptable),
            0x500 => Some(Status::InternalError),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_ids_match_device_numbering() {
        assert_eq!(Command::Hello.id(), 0x1000);
        assert_eq!(Command::GetInfo.id(), 0x1010);
        assert_eq!(Command::SetConfig.id(), 0x2000);
        assert_eq!(Command::Marker.id(), 0x3000);
    }

    #[test]
    fn unknown_command_id() {
        assert_eq!(Command::from_id(0x1000), Some(Command::Hello));
        assert_eq!(Command::from_id(0x1001), None);
        assert_eq!(Command::from_id(0x1_0000_1000), None);
    }

    #[test]
    fn status_codes() {
        assert_eq!(Status::Ok.code(), 0x200);
        assert_eq!(Status::from_code(0x406), Some(Status::NotAcceptable));
        assert_eq!(Status::from_code(0x201), None);
    }
}
