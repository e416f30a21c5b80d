//! Liveness monitoring of the connected peer.
//!
//! # Responsibilities
//! - Periodically probe the current peer socket
//! - Report a disconnect to the driver exactly once per connection

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time;

use crate::config::TimingConfig;
use crate::lifecycle::ShutdownSignal;
use crate::net::{ConnectionId, PeerSocket};
use crate::observability::metrics;

/// Messages from the monitor to the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorEvent {
    PeerLost(ConnectionId),
}

/// "Client previously connected" latch.
///
/// Armed when a new connection shows up, disarmed when its loss is reported.
#[derive(Debug, Default)]
struct ClientLatch {
    seen: Option<ConnectionId>,
    armed: bool,
}

impl ClientLatch {
    fn observe(&mut self, id: ConnectionId) {
        if self.seen != Some(id) {
            self.seen = Some(id);
            self.armed = true;
        }
    }

    /// Disarm, returning whether it was armed.
    fn take(&mut self) -> bool {
        std::mem::replace(&mut self.armed, false)
    }
}

pub struct LivenessMonitor {
    peers: watch::Receiver<Option<PeerSocket>>,
    events: mpsc::Sender<MonitorEvent>,
    interval: Duration,
    probe_timeout: Duration,
    latch: ClientLatch,
}

impl LivenessMonitor {
    pub fn new(
        peers: watch::Receiver<Option<PeerSocket>>,
        events: mpsc::Sender<MonitorEvent>,
        timing: &TimingConfig,
    ) -> Self {
        Self {
            peers,
            events,
            interval: timing.tick_interval(),
            probe_timeout: timing.probe_timeout(),
            latch: ClientLatch::default(),
        }
    }

    pub async fn run(mut self, mut shutdown: ShutdownSignal) {
        tracing::info!(
            interval_ms = self.interval.as_millis() as u64,
            "Liveness monitor starting"
        );

        while !shutdown.is_triggered() {
            if !self.check().await {
                tracing::debug!("Driver gone, liveness monitor exiting");
                return;
            }

            tokio::select! {
                _ = time::sleep(self.interval) => {}
                _ = shutdown.recv() => break,
            }
        }

        tracing::info!("Liveness monitor received shutdown signal, exiting loop");
    }

    /// One probe of the current peer. Returns `false` once the driver has hung up.
    async fn check(&mut self) -> bool {
        let peer = self.peers.borrow_and_update().clone();
        let Some(peer) = peer else {
            return true;
        };

        self.latch.observe(peer.id());

        if !peer.is_peer_closed(self.probe_timeout).await || !self.latch.take() {
            return true;
        }

        tracing::info!(
            connection_id = %peer.id(),
            peer_addr = %peer.peer_addr(),
            "Peer disconnected"
        );
        metrics::record_peer_lost();

        self.events
            .send(MonitorEvent::PeerLost(peer.id()))
            .await
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::Shutdown;
    use tokio::net::{TcpListener, TcpStream};

    async fn pair() -> (PeerSocket, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let client = TcpStream::connect(listener.local_addr().unwrap()).await.unwrap();
        let (server, addr) = listener.accept().await.unwrap();
        (PeerSocket::new(server, addr), client)
    }

    fn spawn_monitor(
        peers: watch::Receiver<Option<PeerSocket>>,
    ) -> (Shutdown, mpsc::Receiver<MonitorEvent>, tokio::task::JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(4);
        let shutdown = Shutdown::new();
        let monitor = LivenessMonitor::new(peers, tx, &TimingConfig::default());
        let handle = tokio::spawn(monitor.run(shutdown.subscribe()));
        (shutdown, rx, handle)
    }

    #[test]
    fn latch_arms_once_per_connection() {
        let mut latch = ClientLatch::default();
        assert!(!latch.take());

        let id = ConnectionId::new();
        latch.observe(id);
        assert!(latch.take());

        latch.observe(id);
        assert!(!latch.take(), "same connection must not re-arm");

        latch.observe(ConnectionId::new());
        assert!(latch.take());
    }

    #[tokio::test]
    async fn idle_without_socket() {
        let (_peer_tx, peer_rx) = watch::channel(None);
        let (shutdown, mut events, handle) = spawn_monitor(peer_rx);

        let got = time::timeout(Duration::from_millis(100), events.recv()).await;
        assert!(got.is_err());

        shutdown.trigger();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn reports_peer_loss_exactly_once() {
        let (peer, client) = pair().await;
        let id = peer.id();
        let (_peer_tx, peer_rx) = watch::channel(Some(peer));
        let (shutdown, mut events, handle) = spawn_monitor(peer_rx);

        time::sleep(Duration::from_millis(50)).await;
        drop(client);

        let event = time::timeout(Duration::from_secs(1), events.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event, MonitorEvent::PeerLost(id));

        let again = time::timeout(Duration::from_millis(150), events.recv()).await;
        assert!(again.is_err(), "loss must be reported once");

        shutdown.trigger();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn live_peer_is_not_reported() {
        let (peer, _client) = pair().await;
        let (_peer_tx, peer_rx) = watch::channel(Some(peer));
        let (shutdown, mut events, handle) = spawn_monitor(peer_rx);

        let got = time::timeout(Duration::from_millis(150), events.recv()).await;
        assert!(got.is_err());

        shutdown.trigger();
        time::timeout(Duration::from_millis(100), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
