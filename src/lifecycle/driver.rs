//! Lifecycle driver.
//!
//! # Responsibilities
//! - Own `ConnectionState`, the listener and the peer socket
//! - Once per tick, run the action of the current state and assign the next one
//! - Spawn the liveness monitor and apply its disconnect reports
//!
//! # Design Decisions
//! - Single writer: the monitor only sends `MonitorEvent`s, so a forced
//!   disconnect can never interleave with a transition
//! - Reports are applied at the top of a tick; that tick does nothing else,
//!   so `Disconnected` stays visible for one interval
//! - Every blocking action races against shutdown

use std::net::SocketAddr;

use thiserror::Error;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time;

use crate::config::EmulatorConfig;
use crate::health::{LivenessMonitor, MonitorEvent};
use crate::lifecycle::handle::EmulatorHandle;
use crate::lifecycle::hook::ConfigurationHook;
use crate::lifecycle::shutdown::ShutdownSignal;
use crate::lifecycle::state::{ConnectionState, Transition};
use crate::net::{ConnectionId, Listener, ListenerError, PeerSocket};
use crate::observability::metrics;
use crate::protocol::Handshake;

const TRANSITION_CAPACITY: usize = 64;
const EVENT_CAPACITY: usize = 8;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("listener setup failed: {0}")]
    Listener(#[from] ListenerError),
}

/// Outcome of one tick's action.
enum Step {
    Next(ConnectionState),
    Cancelled,
}

pub struct LifecycleDriver<H> {
    config: EmulatorConfig,
    handshake: Handshake,
    hook: H,
    state: ConnectionState,
    listener: Option<Listener>,
    peer: Option<PeerSocket>,
    state_tx: watch::Sender<ConnectionState>,
    addr_tx: watch::Sender<Option<SocketAddr>>,
    transitions: broadcast::Sender<Transition>,
    /// Read-only socket snapshot for the monitor.
    peer_tx: watch::Sender<Option<PeerSocket>>,
    events_tx: mpsc::Sender<MonitorEvent>,
    events_rx: mpsc::Receiver<MonitorEvent>,
    monitor: Option<JoinHandle<()>>,
}

impl<H: ConfigurationHook> LifecycleDriver<H> {
    pub fn new(config: EmulatorConfig, hook: H) -> (Self, EmulatorHandle) {
        let (state_tx, state_rx) = watch::channel(ConnectionState::Init);
        let (addr_tx, addr_rx) = watch::channel(None);
        let (transitions, _) = broadcast::channel(TRANSITION_CAPACITY);
        let (peer_tx, _) = watch::channel(None);
        let (events_tx, events_rx) = mpsc::channel(EVENT_CAPACITY);

        let handle = EmulatorHandle {
            state: state_rx,
            local_addr: addr_rx,
            transitions: transitions.clone(),
        };

        let driver = Self {
            handshake: Handshake::new(&config.handshake, &config.timing),
            config,
            hook,
            state: ConnectionState::Init,
            listener: None,
            peer: None,
            state_tx,
            addr_tx,
            transitions,
            peer_tx,
            events_tx,
            events_rx,
            monitor: None,
        };

        (driver, handle)
    }

    /// Drive the lifecycle until `shutdown` fires.
    ///
    /// Only a listener setup failure ends the loop with an error.
    pub async fn run(mut self, mut shutdown: ShutdownSignal) -> Result<(), DriverError> {
        tracing::info!(
            address = %self.config.listener.bind_address(),
            tick_interval_ms = self.config.timing.tick_interval_ms,
            version = %self.handshake.version(),
            "Lifecycle driver starting"
        );

        let result = self.drive(&mut shutdown).await;
        self.teardown(&shutdown).await;

        match &result {
            Ok(()) => tracing::info!("Lifecycle driver stopped"),
            Err(e) => tracing::error!(error = %e, "Lifecycle driver failed"),
        }
        result
    }

    async fn drive(&mut self, shutdown: &mut ShutdownSignal) -> Result<(), DriverError> {
        let interval = self.config.timing.tick_interval();

        while !shutdown.is_triggered() {
            if !self.apply_monitor_events() {
                match self.tick(shutdown).await? {
                    Step::Next(next) => self.transition(next),
                    Step::Cancelled => break,
                }
            }

            tokio::select! {
                _ = time::sleep(interval) => {}
                _ = shutdown.recv() => break,
            }
        }

        Ok(())
    }

    /// Run the action for the current state and compute the next state.
    async fn tick(&mut self, shutdown: &mut ShutdownSignal) -> Result<Step, DriverError> {
        let next = match self.state {
            ConnectionState::Init => {
                self.init(shutdown).await?;
                ConnectionState::Listening
            }

            ConnectionState::Listening => {
                // `Listening` is only entered after `init` stored the listener.
                let Some(listener) = self.listener.as_ref() else {
                    debug_assert!(false, "listening without a bound listener");
                    tracing::error!("No listener bound, stopping");
                    return Ok(Step::Cancelled);
                };

                let accepted = tokio::select! {
                    _ = shutdown.recv() => return Ok(Step::Cancelled),
                    accepted = listener.accept() => accepted,
                };

                match accepted {
                    Ok(peer) => {
                        self.attach_peer(peer);
                        ConnectionState::Connecting
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Accept failed, still listening");
                        ConnectionState::Listening
                    }
                }
            }

            ConnectionState::Connecting => {
                let Some(peer) = self.peer.clone() else {
                    return Ok(Step::Next(ConnectionState::Disconnected));
                };

                let exchanged = tokio::select! {
                    _ = shutdown.recv() => return Ok(Step::Cancelled),
                    _ = peer_lost(&mut self.events_rx, peer.id()) => {
                        tracing::info!(connection_id = %peer.id(), "Peer left during handshake");
                        metrics::record_handshake("peer_lost");
                        return Ok(Step::Next(ConnectionState::Disconnected));
                    }
                    exchanged = self.handshake.exchange(&peer) => exchanged,
                };

                match exchanged {
                    Ok(()) => ConnectionState::Connected,
                    Err(e) => {
                        tracing::warn!(connection_id = %peer.id(), error = %e, "Handshake failed");
                        metrics::record_handshake("failed");
                        ConnectionState::Disconnected
                    }
                }
            }

            ConnectionState::Connected => {
                let Some(peer) = self.peer.clone() else {
                    return Ok(Step::Next(ConnectionState::Disconnected));
                };

                let ready = tokio::select! {
                    _ = shutdown.recv() => return Ok(Step::Cancelled),
                    ready = self.hook.configure(&peer) => ready,
                };

                if ready {
                    ConnectionState::Identified
                } else {
                    ConnectionState::Connected
                }
            }

            ConnectionState::Disconnected => {
                self.release_peer();
                ConnectionState::Listening
            }

            ConnectionState::Identified => ConnectionState::Identified,
        };

        Ok(Step::Next(next))
    }

    /// Bind the listener and start the liveness monitor.
    async fn init(&mut self, shutdown: &ShutdownSignal) -> Result<(), DriverError> {
        let listener = Listener::bind(&self.config.listener).await?;
        let local_addr = listener.local_addr().map_err(|source| ListenerError::Bind {
            address: self.config.listener.bind_address(),
            source,
        })?;

        self.listener = Some(listener);
        self.addr_tx.send_replace(Some(local_addr));

        let monitor = LivenessMonitor::new(
            self.peer_tx.subscribe(),
            self.events_tx.clone(),
            &self.config.timing,
        );
        self.monitor = Some(tokio::spawn(monitor.run(shutdown.clone())));

        Ok(())
    }

    /// Drain pending monitor reports. Returns `true` if a disconnect was forced.
    fn apply_monitor_events(&mut self) -> bool {
        let mut forced = false;

        while let Ok(MonitorEvent::PeerLost(id)) = self.events_rx.try_recv() {
            let current = self.peer.as_ref().map(PeerSocket::id);
            if current == Some(id) && self.state.holds_socket() {
                self.transition(ConnectionState::Disconnected);
                forced = true;
            } else {
                tracing::trace!(connection_id = %id, "Ignoring stale peer loss report");
            }
        }

        forced
    }

    fn transition(&mut self, next: ConnectionState) {
        let from = self.state;
        if from == next {
            return;
        }

        debug_assert!(from.permits(next), "illegal transition {from} -> {next}");

        self.state = next;
        tracing::info!(from = %from, to = %next, "State transition");
        metrics::record_transition(from, next);

        self.state_tx.send_replace(next);
        let _ = self.transitions.send(Transition { from, to: next });
    }

    fn attach_peer(&mut self, peer: PeerSocket) {
        tracing::info!(
            connection_id = %peer.id(),
            peer_addr = %peer.peer_addr(),
            "Client connected"
        );
        metrics::record_connection_accepted();
        metrics::set_connected(true);

        self.peer_tx.send_replace(Some(peer.clone()));
        self.peer = Some(peer);
    }

    fn release_peer(&mut self) {
        if let Some(peer) = self.peer.take() {
            tracing::debug!(connection_id = %peer.id(), "Socket released");
        }
        self.peer_tx.send_replace(None);
        metrics::set_connected(false);
    }

    async fn teardown(&mut self, shutdown: &ShutdownSignal) {
        self.release_peer();
        self.listener = None;
        self.addr_tx.send_replace(None);

        if let Some(monitor) = self.monitor.take() {
            if !shutdown.is_triggered() {
                monitor.abort();
            }
            if let Err(e) = monitor.await {
                if !e.is_cancelled() {
                    tracing::error!(error = %e, "Liveness monitor panicked");
                }
            }
        }
    }
}

/// Resolve once the monitor reports `id` as lost. Reports for older
/// connections are discarded.
async fn peer_lost(events: &mut mpsc::Receiver<MonitorEvent>, id: ConnectionId) {
    while let Some(MonitorEvent::PeerLost(lost)) = events.recv().await {
        if lost == id {
            return;
        }
        tracing::trace!(connection_id = %lost, "Ignoring stale peer loss report");
    }
    std::future::pending::<()>().await
}
