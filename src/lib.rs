//! Network-facing emulator of a level-gauge device, for integration tests.

pub mod config;
pub mod health;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod protocol;

pub use config::EmulatorConfig;
pub use lifecycle::{
    AlwaysReady, ConfigurationHook, ConnectionState, EmulatorHandle, LifecycleDriver, Shutdown,
};
