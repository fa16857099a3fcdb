use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::info;

/// Engine activity counters
#[derive(Debug, Default)]
pub struct EngineMetrics {
    pub handoffs_advanced: AtomicU64,
    pub projects_completed: AtomicU64,
    pub link_edits: AtomicU64,
    pub handoffs_rejected: AtomicU64,
    pub ticks: AtomicU64,
    pub samples_written: AtomicU64,
    pub projects_skipped: AtomicU64,
    pub notifications_sent: AtomicU64,
    pub notification_failures: AtomicU64,
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_advance(&self) {
        self.handoffs_advanced.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_completion(&self) {
        self.projects_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_link_edit(&self) {
        self.link_edits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejection(&self) {
        self.handoffs_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_tick(&self, written: u64, skipped: u64) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
        self.samples_written.fetch_add(written, Ordering::Relaxed);
        self.projects_skipped.fetch_add(skipped, Ordering::Relaxed);
    }

    pub fn record_notification(&self, delivered: bool) {
        if delivered {
            self.notifications_sent.fetch_add(1, Ordering::Relaxed);
        } else {
            self.notification_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn get_stats(&self) -> EngineStats {
        EngineStats {
            handoffs_advanced: self.handoffs_advanced.load(Ordering::Relaxed),
            projects_completed: self.projects_completed.load(Ordering::Relaxed),
            link_edits: self.link_edits.load(Ordering::Relaxed),
            handoffs_rejected: self.handoffs_rejected.load(Ordering::Relaxed),
            ticks: self.ticks.load(Ordering::Relaxed),
            samples_written: self.samples_written.load(Ordering::Relaxed),
            projects_skipped: self.projects_skipped.load(Ordering::Relaxed),
            notifications_sent: self.notifications_sent.load(Ordering::Relaxed),
            notification_failures: self.notification_failures.load(Ordering::Relaxed),
        }
    }

    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            "Engine metrics: advanced={}, completed={}, link_edits={}, rejected={}, ticks={}, samples={}, skipped={}, notified={}, notify_failures={}",
            stats.handoffs_advanced,
            stats.projects_completed,
            stats.link_edits,
            stats.handoffs_rejected,
            stats.ticks,
            stats.samples_written,
            stats.projects_skipped,
            stats.notifications_sent,
            stats.notification_failures
        );
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineStats {
    pub handoffs_advanced: u64,
    pub projects_completed: u64,
    pub link_edits: u64,
    pub handoffs_rejected: u64,
    pub ticks: u64,
    pub samples_written: u64,
    pub projects_skipped: u64,
    pub notifications_sent: u64,
    pub notification_failures: u64,
}

/// Global metrics instance
static ENGINE_METRICS: std::sync::LazyLock<EngineMetrics> =
    std::sync::LazyLock::new(EngineMetrics::new);

pub fn engine_metrics() -> &'static EngineMetrics {
    &ENGINE_METRICS
}

/// Time an operation and log its duration
pub struct OperationTimer {
    operation: String,
    start: Instant,
}

impl OperationTimer {
    pub fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
            start: Instant::now(),
        }
    }

    pub fn finish(self) {
        let duration = self.start.elapsed();
        info!(
            operation = %self.operation,
            duration_ms = duration.as_millis(),
            "Operation completed"
        );
    }
}
