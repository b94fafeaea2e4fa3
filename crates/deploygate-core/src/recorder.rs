//! Counters for validation runs, owned by the caller.
//!
//! A recorder is passed into [`crate::run::run_with_recorder`] explicitly.
//! Each caller (a pipeline stage, a test) owns its own instance, so counts
//! from concurrent runs never mix. Call [`CountingRecorder::flush`] to emit
//! the current values as a single `tracing::info!` event.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::domain::action::RequiredAction;

/// Sink for per-run measurements.
pub trait ValidationRecorder {
    /// One cluster pair was compared.
    fn record_cluster_validated(&self, cluster: &str);

    /// Actions produced by a run, before gating.
    fn record_actions(&self, actions: &[RequiredAction]);

    /// A run ended with blocking actions.
    fn record_blocked(&self, blocking: usize);
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRecorder;

impl ValidationRecorder for NoopRecorder {
    fn record_cluster_validated(&self, _cluster: &str) {}

    fn record_actions(&self, _actions: &[RequiredAction]) {}

    fn record_blocked(&self, _blocking: usize) {}
}

/// Lightweight atomic counters; no allocations, no locking.
#[derive(Debug, Default)]
pub struct CountingRecorder {
    clusters_validated: AtomicU64,
    restart_actions: AtomicU64,
    refeed_actions: AtomicU64,
    blocked_runs: AtomicU64,
}

impl CountingRecorder {
    pub const fn new() -> Self {
        Self {
            clusters_validated: AtomicU64::new(0),
            restart_actions: AtomicU64::new(0),
            refeed_actions: AtomicU64::new(0),
            blocked_runs: AtomicU64::new(0),
        }
    }

    pub fn clusters_validated(&self) -> u64 {
        self.clusters_validated.load(Ordering::Relaxed)
    }

    pub fn restart_actions(&self) -> u64 {
        self.restart_actions.load(Ordering::Relaxed)
    }

    pub fn refeed_actions(&self) -> u64 {
        self.refeed_actions.load(Ordering::Relaxed)
    }

    pub fn blocked_runs(&self) -> u64 {
        self.blocked_runs.load(Ordering::Relaxed)
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            clusters_validated = self.clusters_validated(),
            restart_actions = self.restart_actions(),
            refeed_actions = self.refeed_actions(),
            blocked_runs = self.blocked_runs(),
        );
    }
}

impl ValidationRecorder for CountingRecorder {
    fn record_cluster_validated(&self, _cluster: &str) {
        self.clusters_validated.fetch_add(1, Ordering::Relaxed);
    }

    fn record_actions(&self, actions: &[RequiredAction]) {
        let refeeds = actions.iter().filter(|a| a.is_refeed()).count() as u64;
        let restarts = actions.len() as u64 - refeeds;
        self.refeed_actions.fetch_add(refeeds, Ordering::Relaxed);
        self.restart_actions.fetch_add(restarts, Ordering::Relaxed);
        tracing::trace!(restarts, refeeds, "action counters incremented");
    }

    fn record_blocked(&self, _blocking: usize) {
        self.blocked_runs.fetch_add(1, Ordering::Relaxed);
    }
}
