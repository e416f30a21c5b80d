//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Apply overrides → Validate → Init logging/metrics
//!
//! Driver (driver.rs, state.rs, hook.rs):
//!     Init → Listening → Connecting → Connected → Identified
//!     PeerLost from health::liveness → Disconnected → Listening
//!
//! Shutdown (shutdown.rs, signals.rs):
//!     SIGTERM/SIGINT → trigger → driver and monitor leave their loops
//! ```
//!
//! # Design Decisions
//! - One driver task owns all lifecycle state; observers get `EmulatorHandle`
//! - Fail fast: a bind failure is fatal, nothing is retried
//! - Shutdown needs no rollback; sockets are dropped

pub mod driver;
pub mod handle;
pub mod hook;
pub mod shutdown;
pub mod signals;
pub mod startup;
pub mod state;

pub use driver::{DriverError, LifecycleDriver};
pub use handle::EmulatorHandle;
pub use hook::{AlwaysReady, ConfigurationHook};
pub use shutdown::{Shutdown, ShutdownSignal};
pub use state::{ConnectionState, Transition};
