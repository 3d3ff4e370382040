//! In-process packet/byte/xfer counters (§10 of the expanded spec).
//!
//! Deliberately not the `metrics` crate's global recorder: a server
//! embedding this crate may run many sessions concurrently and wants one
//! summary object it owns, not process-wide global state.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Metrics {
    packets: AtomicU64,
    bytes_in: AtomicU64,
    bytes_out: AtomicU64,
    xfer_calls: AtomicU64,
}

impl Metrics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_packet(&self, bytes_in: usize, bytes_out: usize) {
        self.packets.fetch_add(1, Ordering::Relaxed);
        self.bytes_in.fetch_add(bytes_in as u64, Ordering::Relaxed);
        self.bytes_out.fetch_add(bytes_out as u64, Ordering::Relaxed);
    }

    pub fn record_xfer(&self) {
        self.xfer_calls.fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            packets: self.packets.load(Ordering::Relaxed),
            bytes_in: self.bytes_in.load(Ordering::Relaxed),
            bytes_out: self.bytes_out.load(Ordering::Relaxed),
            xfer_calls: self.xfer_calls.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub packets: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub xfer_calls: u64,
}

impl std::fmt::Display for MetricsSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "packets={} bytes_in={} bytes_out={} xfer_calls={}",
            self.packets, self.bytes_in, self.bytes_out, self.xfer_calls
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_accumulate_across_calls() {
        let metrics = Metrics::new();
        metrics.record_packet(3, 5);
        metrics.record_packet(2, 2);
        metrics.record_xfer();
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.packets, 2);
        assert_eq!(snapshot.bytes_in, 5);
        assert_eq!(snapshot.bytes_out, 7);
        assert_eq!(snapshot.xfer_calls, 1);
    }
}
