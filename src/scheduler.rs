use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use fd_lock::RwLock;
use tokio::sync::watch;
use tracing::{error, info};

use crate::coordinator::PodCoordinator;
use crate::shutdown::wait_for_shutdown;

/// Periodically runs `PodCoordinator::tick` until shutdown.
pub struct ClockSampler {
    coordinator: Arc<PodCoordinator>,
    interval: Duration,
}

impl ClockSampler {
    pub fn new(coordinator: Arc<PodCoordinator>, interval: Duration) -> Self {
        Self {
            coordinator,
            interval,
        }
    }

    /// Tick at a fixed interval until `shutdown` flips. Returns the number of ticks run.
    ///
    /// The first tick fires immediately. A slow tick delays the next one
    /// instead of causing a burst.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> u64 {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut ticks = 0u64;

        info!(
            interval_seconds = self.interval.as_secs(),
            "Clock sampler started"
        );

        loop {
            tokio::select! {
                biased;

                _ = wait_for_shutdown(&mut shutdown) => {
                    break;
                }

                _ = interval.tick() => {
                    ticks += 1;
                    match self.coordinator.tick().await {
                        Ok(report) if !report.failed.is_empty() => {
                            error!(failed = ?report.failed, "Clock sampler could not update some projects");
                        }
                        Ok(_) => {}
                        Err(e) => {
                            error!(error = %e, "Clock sampler tick failed");
                        }
                    }
                }
            }
        }

        info!(ticks, "Clock sampler stopped");
        ticks
    }

    /// Like `run`, but refuses to start while another sampler holds `lock_path`.
    pub async fn run_exclusive(
        &self,
        lock_path: &Path,
        shutdown: watch::Receiver<bool>,
    ) -> Result<u64> {
        if let Some(parent) = lock_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut lock = RwLock::new(open_lock_file(lock_path)?);
        let _guard = lock.try_write().map_err(|_| {
            anyhow!(
                "Another clock sampler is already running (lock held on {}).",
                lock_path.display()
            )
        })?;

        Ok(self.run(shutdown).await)
    }
}

fn open_lock_file(path: &Path) -> std::io::Result<File> {
    OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shutdown::ShutdownCoordinator;
    use crate::store::InMemoryProjectStore;
    use tempfile::TempDir;

    fn sampler(interval: Duration) -> ClockSampler {
        let coordinator = PodCoordinator::new(Arc::new(InMemoryProjectStore::new()));
        ClockSampler::new(Arc::new(coordinator), interval)
    }

    #[tokio::test(start_paused = true)]
    async fn test_sampler_ticks_until_shutdown() {
        let shutdown = ShutdownCoordinator::new();
        let receiver = shutdown.subscribe();
        let sampler = sampler(Duration::from_secs(60));

        let handle = tokio::spawn(async move { sampler.run(receiver).await });

        tokio::time::sleep(Duration::from_secs(150)).await;
        shutdown.trigger();

        let ticks = handle.await.unwrap();
        assert_eq!(ticks, 3);
    }

    #[tokio::test]
    async fn test_second_sampler_is_refused() {
        let temp_dir = TempDir::new().unwrap();
        let lock_path = temp_dir.path().join("sampler.lock");

        let mut held = RwLock::new(open_lock_file(&lock_path).unwrap());
        let _guard = held.try_write().unwrap();

        let shutdown = ShutdownCoordinator::new();
        let result = sampler(Duration::from_secs(60))
            .run_exclusive(&lock_path, shutdown.subscribe())
            .await;

        let err = result.unwrap_err();
        assert!(err.to_string().contains("already running"));
    }

    #[tokio::test]
    async fn test_exclusive_run_stops_on_shutdown() {
        let temp_dir = TempDir::new().unwrap();
        let lock_path = temp_dir.path().join("nested/sampler.lock");

        let shutdown = ShutdownCoordinator::new();
        shutdown.trigger();

        let ticks = sampler(Duration::from_secs(60))
            .run_exclusive(&lock_path, shutdown.subscribe())
            .await
            .unwrap();
        assert_eq!(ticks, 0);
        assert!(lock_path.exists());
    }
}
