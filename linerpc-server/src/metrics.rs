//! Plain server metrics
//!
//! Atomic counters the reactor updates inline as it processes events.
//! There is no exporter behind these: no OpenTelemetry, no metrics-export
//! side channel — just `AtomicU64`s a caller can snapshot whenever it
//! likes, e.g. to log periodically or expose through its own endpoint.

use std::sync::atomic::{AtomicU64, Ordering};

/// Server-wide counters, safe to share across threads (even though the
/// reactor itself is single-threaded, a caller may snapshot metrics from
/// another thread).
#[derive(Debug, Default)]
pub struct ServerMetrics {
    accepted: AtomicU64,
    active: AtomicU64,
    closed_timeout: AtomicU64,
    closed_error: AtomicU64,
    closed_peer: AtomicU64,
    bytes_read: AtomicU64,
    bytes_written: AtomicU64,
}

/// A point-in-time copy of [`ServerMetrics`], cheap to pass around.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Total connections accepted since startup.
    pub accepted: u64,
    /// Connections currently open.
    pub active: u64,
    /// Connections closed due to idle timeout.
    pub closed_timeout: u64,
    /// Connections closed due to a protocol or I/O error.
    pub closed_error: u64,
    /// Connections closed because the peer closed first.
    pub closed_peer: u64,
    /// Total bytes read from client sockets.
    pub bytes_read: u64,
    /// Total bytes written to client sockets.
    pub bytes_written: u64,
}

impl ServerMetrics {
    /// Construct a fresh, zeroed counter set.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_accept(&self) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
        self.active.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_closed_timeout(&self) {
        self.active.fetch_sub(1, Ordering::Relaxed);
        self.closed_timeout.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_closed_error(&self) {
        self.active.fetch_sub(1, Ordering::Relaxed);
        self.closed_error.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_closed_peer(&self) {
        self.active.fetch_sub(1, Ordering::Relaxed);
        self.closed_peer.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_read(&self, bytes: u64) {
        self.bytes_read.fetch_add(bytes, Ordering::Relaxed);
    }

    pub(crate) fn record_written(&self, bytes: u64) {
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Take a consistent-enough snapshot for logging or export. Individual
    /// counters are read independently (`Relaxed`), so under concurrent
    /// access the snapshot is a best-effort view, not a single atomic
    /// transaction.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            accepted: self.accepted.load(Ordering::Relaxed),
            active: self.active.load(Ordering::Relaxed),
            closed_timeout: self.closed_timeout.load(Ordering::Relaxed),
            closed_error: self.closed_error.load(Ordering::Relaxed),
            closed_peer: self.closed_peer.load(Ordering::Relaxed),
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_accept_and_close_counts() {
        let metrics = ServerMetrics::new();
        metrics.record_accept();
        metrics.record_accept();
        metrics.record_closed_timeout();
        let snap = metrics.snapshot();
        assert_eq!(snap.accepted, 2);
        assert_eq!(snap.active, 1);
        assert_eq!(snap.closed_timeout, 1);
    }

    #[test]
    fn tracks_byte_counters() {
        let metrics = ServerMetrics::new();
        metrics.record_read(128);
        metrics.record_written(64);
        let snap = metrics.snapshot();
        assert_eq!(snap.bytes_read, 128);
        assert_eq!(snap.bytes_written, 64);
    }
}
