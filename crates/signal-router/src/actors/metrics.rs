//! Router metrics.
//!
//! An atomics-backed snapshot for in-process readers plus emission through
//! the `metrics` facade for the Prometheus `/metrics` endpoint. All metrics
//! carry the `sr_` prefix.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

/// Shared router metrics.
#[derive(Debug, Default)]
pub struct RouterMetrics {
    /// Live transport connections.
    connections: AtomicUsize,
    /// Events delivered to at least one recipient.
    events_routed: AtomicU64,
    /// Directed events dropped on lookup miss or full buffer.
    events_dropped: AtomicU64,
    /// Inbound frames rejected as malformed.
    payloads_rejected: AtomicU64,
}

/// Point-in-time metrics values.
#[derive(Debug, Clone, Copy)]
pub struct MetricsSnapshot {
    pub connections: usize,
    pub events_routed: u64,
    pub events_dropped: u64,
    pub payloads_rejected: u64,
}

impl RouterMetrics {
    /// Create shared metrics.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Record a connection being accepted.
    pub fn connection_opened(&self) {
        let count = self.connections.fetch_add(1, Ordering::Relaxed) + 1;
        metrics::gauge!("sr_connections_active").set(usize_as_f64(count));
    }

    /// Record a connection closing.
    pub fn connection_closed(&self) {
        let previous = self.connections.fetch_sub(1, Ordering::Relaxed);
        metrics::gauge!("sr_connections_active").set(usize_as_f64(previous.saturating_sub(1)));
    }

    /// Record a delivered event.
    pub fn event_routed(&self) {
        self.events_routed.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("sr_events_routed_total").increment(1);
    }

    /// Record a dropped event (unresolved target or full buffer).
    pub fn event_dropped(&self) {
        self.events_dropped.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("sr_events_dropped_total").increment(1);
    }

    /// Record a malformed inbound frame.
    pub fn payload_rejected(&self) {
        self.payloads_rejected.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("sr_payloads_rejected_total").increment(1);
    }

    /// Current values.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connections: self.connections.load(Ordering::Relaxed),
            events_routed: self.events_routed.load(Ordering::Relaxed),
            events_dropped: self.events_dropped.load(Ordering::Relaxed),
            payloads_rejected: self.payloads_rejected.load(Ordering::Relaxed),
        }
    }
}

/// Gauge values stay far below 2^52; the conversion is lossless in practice.
#[allow(clippy::cast_precision_loss)]
fn usize_as_f64(value: usize) -> f64 {
    value as f64
}
