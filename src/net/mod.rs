//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (bind on loopback, accept one peer)
//!     → connection.rs (PeerSocket: id, non-blocking reads/writes, liveness probe)
//!     → handed to the lifecycle driver, shared read-only with the liveness monitor
//! ```
//!
//! # Design Decisions
//! - The driver only accepts while `Listening`, so at most one peer is live
//! - The socket is reference-counted; every operation takes `&self`
//! - Absence of a socket is `Option::None`, never a dangling handle

pub mod connection;
pub mod listener;

pub use connection::{ConnectionId, PeerSocket};
pub use listener::{Listener, ListenerError};
