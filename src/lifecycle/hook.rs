//! Post-handshake configuration hook.
//!
//! The device's configuration exchange has no defined protocol yet. The driver
//! calls the hook once per tick while `Connected`; returning `true` moves the
//! connection to `Identified`, returning `false` keeps it `Connected`.

use std::future::Future;

use crate::net::PeerSocket;

pub trait ConfigurationHook: Send {
    /// Report whether the connected peer is configured.
    fn configure(&mut self, peer: &PeerSocket) -> impl Future<Output = bool> + Send;
}

/// Declares every peer configured as soon as it is asked.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysReady;

impl ConfigurationHook for AlwaysReady {
    async fn configure(&mut self, _peer: &PeerSocket) -> bool {
        true
    }
}
