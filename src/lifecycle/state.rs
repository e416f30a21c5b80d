//! Connection lifecycle state machine.
//!
//! # States
//! ```text
//! Init → Listening → Connecting → Connected → Identified
//!            ↑                        ↺           ↺
//!            └──── Disconnected ←─────┴───────────┘  (forced on peer loss)
//! ```
//!
//! # Design Decisions
//! - Only the driver assigns states; the monitor merely requests `Disconnected`
//! - `Connected` and `Identified` may repeat; every other state moves on each tick

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionState {
    #[default]
    Init,
    Listening,
    Connecting,
    Connected,
    Disconnected,
    Identified,
}

impl ConnectionState {
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionState::Init => "init",
            ConnectionState::Listening => "listening",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Identified => "identified",
        }
    }

    /// States in which a peer socket is held.
    pub fn holds_socket(self) -> bool {
        matches!(
            self,
            ConnectionState::Connecting | ConnectionState::Connected | ConnectionState::Identified
        )
    }

    /// Whether `self → next` is an edge of the lifecycle.
    pub fn permits(self, next: ConnectionState) -> bool {
        use ConnectionState::*;

        if next == Disconnected {
            return self.holds_socket();
        }

        matches!(
            (self, next),
            (Init, Listening)
                | (Listening, Connecting)
                | (Connecting, Connected)
                | (Connected, Connected)
                | (Connected, Identified)
                | (Identified, Identified)
                | (Disconnected, Listening)
        )
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observed state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: ConnectionState,
    pub to: ConnectionState,
}

impl Transition {
    pub fn is_valid(&self) -> bool {
        self.from.permits(self.to)
    }
}

#[cfg(test)]
mod tests {
    use super::ConnectionState::*;
    use super::*;

    const ALL: [ConnectionState; 6] = [Init, Listening, Connecting, Connected, Disconnected, Identified];

    #[test]
    fn starts_at_init() {
        assert_eq!(ConnectionState::default(), Init);
    }

    #[test]
    fn happy_path_is_permitted() {
        let path = [Init, Listening, Connecting, Connected, Identified, Identified];
        for pair in path.windows(2) {
            assert!(pair[0].permits(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn forced_disconnect_only_with_socket() {
        assert!(Connecting.permits(Disconnected));
        assert!(Connected.permits(Disconnected));
        assert!(Identified.permits(Disconnected));
        assert!(!Init.permits(Disconnected));
        assert!(!Listening.permits(Disconnected));
        assert!(!Disconnected.permits(Disconnected));
    }

    #[test]
    fn disconnected_only_returns_to_listening() {
        for next in ALL {
            assert_eq!(Disconnected.permits(next), next == Listening, "disconnected -> {next}");
        }
    }

    #[test]
    fn nothing_returns_to_init() {
        for from in ALL {
            assert!(!from.permits(Init));
        }
    }

    #[test]
    fn no_skipping_the_handshake() {
        assert!(!Listening.permits(Connected));
        assert!(!Listening.permits(Identified));
        assert!(!Connecting.permits(Identified));
        assert!(!Identified.permits(Listening));
    }
}
