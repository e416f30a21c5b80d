//! The accepted peer connection.
//!
//! # Responsibilities
//! - Give each accepted connection a unique id for tracing
//! - Non-blocking "read whatever is available" and full writes
//! - Liveness probe: read-ready with nothing queued means the peer closed

use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpStream;

/// Global atomic counter for connection IDs.
/// Using relaxed ordering is sufficient since we only need uniqueness, not synchronization.
static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Generate a new unique connection ID.
    pub fn new() -> Self {
        Self(CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Handle to the single live peer connection.
///
/// Cloning is cheap and shares the same socket. The driver owns the slot the
/// handle lives in; the liveness monitor only ever probes through a clone.
#[derive(Debug, Clone)]
pub struct PeerSocket {
    id: ConnectionId,
    peer_addr: SocketAddr,
    stream: Arc<TcpStream>,
}

impl PeerSocket {
    pub fn new(stream: TcpStream, peer_addr: SocketAddr) -> Self {
        Self {
            id: ConnectionId::new(),
            peer_addr,
            stream: Arc::new(stream),
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Wait for read-readiness, then perform a single read of whatever is queued.
    ///
    /// Returns `Ok(0)` both at end-of-stream and when readiness turned out to be
    /// spurious. No bytes are kept between calls.
    pub async fn read_available(&self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.readable().await?;
        match self.stream.try_read(buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(0),
            Err(e) => Err(e),
        }
    }

    /// Write the whole buffer.
    pub async fn write_all(&self, mut buf: &[u8]) -> io::Result<()> {
        while !buf.is_empty() {
            self.stream.writable().await?;
            match self.stream.try_write(buf) {
                Ok(0) => return Err(io::ErrorKind::WriteZero.into()),
                Ok(n) => buf = &buf[n..],
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Probe whether the peer has gone away.
    ///
    /// Waits at most `timeout` for read-readiness. A zero-length peek on a
    /// readable socket means the peer closed; queued data or no readiness means
    /// it is still there. Socket errors count as gone.
    pub async fn is_peer_closed(&self, timeout: Duration) -> bool {
        let mut byte = [0u8; 1];
        match tokio::time::timeout(timeout, self.stream.peek(&mut byte)).await {
            Ok(Ok(0)) => true,
            Ok(Ok(_)) => false,
            Ok(Err(e)) => {
                tracing::debug!(connection_id = %self.id, error = %e, "Liveness probe failed");
                true
            }
            Err(_) => false,
        }
    }
}
