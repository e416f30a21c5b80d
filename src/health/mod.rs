//! Peer health subsystem.
//!
//! # Data Flow
//! ```text
//! Liveness monitor (liveness.rs):
//!     Periodic timer
//!     → Read current peer snapshot published by the driver
//!     → Probe socket (read-ready + nothing queued = closed)
//!     → Send PeerLost(connection_id) to the driver, once per connection
//! ```
//!
//! # Design Decisions
//! - The monitor never touches lifecycle state; the driver applies its message
//! - Probe failures count as "peer gone" and are never propagated

pub mod liveness;

pub use liveness::{LivenessMonitor, MonitorEvent};
