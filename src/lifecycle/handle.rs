//! Read-only view of a running emulator, for test harnesses.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tokio::time::error::Elapsed;

use crate::lifecycle::state::{ConnectionState, Transition};

#[derive(Debug, Clone)]
pub struct EmulatorHandle {
    pub(crate) state: watch::Receiver<ConnectionState>,
    pub(crate) local_addr: watch::Receiver<Option<SocketAddr>>,
    pub(crate) transitions: broadcast::Sender<Transition>,
}

impl EmulatorHandle {
    /// Latest published state.
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Address the listener is bound to, once `Init` has run.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        *self.local_addr.borrow()
    }

    /// Every state change from now on, in order.
    ///
    /// Unlike [`EmulatorHandle::state`] this never skips short-lived states.
    pub fn subscribe_transitions(&self) -> broadcast::Receiver<Transition> {
        self.transitions.subscribe()
    }

    /// Wait until the published state equals `target`.
    ///
    /// Short-lived states may be missed; use `subscribe_transitions` for those.
    pub async fn wait_for_state(
        &self,
        target: ConnectionState,
        timeout: Duration,
    ) -> Result<(), Elapsed> {
        let mut rx = self.state.clone();
        tokio::time::timeout(timeout, async move {
            if rx.wait_for(|state| *state == target).await.is_err() {
                // Driver dropped without reaching the target.
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Wait until the listener is bound.
    pub async fn wait_for_local_addr(&self, timeout: Duration) -> Option<SocketAddr> {
        let mut rx = self.local_addr.clone();
        tokio::time::timeout(timeout, async move {
            rx.wait_for(Option::is_some).await.ok().and_then(|addr| *addr)
        })
        .await
        .ok()
        .flatten()
    }
}
