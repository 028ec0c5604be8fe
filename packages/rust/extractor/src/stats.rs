//! Cumulative extraction counters shared by concurrent batch tasks.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::strategies::StrategyKind;

/// Lock-free counters, owned by one [`Extractor`](crate::Extractor) and
/// shared with its batch tasks.
#[derive(Debug)]
pub struct ExtractionStats {
    total_attempts: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
    by_strategy: [AtomicU64; 3],
    since: Mutex<DateTime<Utc>>,
}

/// Point-in-time copy of [`ExtractionStats`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub total_attempts: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub successes_by_strategy: BTreeMap<StrategyKind, u64>,
    /// `succeeded / total_attempts`, or 0 before the first attempt.
    pub success_rate: f64,
    /// Whether the remote-render tier is configured.
    pub remote_render_available: bool,
    /// When counting started (construction or last reset).
    pub since: DateTime<Utc>,
}

impl Default for ExtractionStats {
    fn default() -> Self {
        Self {
            total_attempts: AtomicU64::new(0),
            succeeded: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            by_strategy: [AtomicU64::new(0), AtomicU64::new(0), AtomicU64::new(0)],
            since: Mutex::new(Utc::now()),
        }
    }
}

impl ExtractionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_attempt(&self) {
        self.total_attempts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_success(&self, kind: StrategyKind) {
        self.succeeded.fetch_add(1, Ordering::Relaxed);
        self.by_strategy[kind.index()].fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self, remote_render_available: bool) -> StatsSnapshot {
        let total_attempts = self.total_attempts.load(Ordering::Relaxed);
        let succeeded = self.succeeded.load(Ordering::Relaxed);
        let failed = self.failed.load(Ordering::Relaxed);

        let successes_by_strategy = StrategyKind::ALL
            .into_iter()
            .map(|kind| (kind, self.by_strategy[kind.index()].load(Ordering::Relaxed)))
            .collect();

        let success_rate = if total_attempts == 0 {
            0.0
        } else {
            succeeded as f64 / total_attempts as f64
        };

        StatsSnapshot {
            total_attempts,
            succeeded,
            failed,
            successes_by_strategy,
            success_rate,
            remote_render_available,
            since: *self.since.lock().unwrap_or_else(|e| e.into_inner()),
        }
    }

    pub fn reset(&self) {
        self.total_attempts.store(0, Ordering::Relaxed);
        self.succeeded.store(0, Ordering::Relaxed);
        self.failed.store(0, Ordering::Relaxed);
        for counter in &self.by_strategy {
            counter.store(0, Ordering::Relaxed);
        }
        *self.since.lock().unwrap_or_else(|e| e.into_inner()) = Utc::now();
    }
}
