use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use crate::config::BatonConfig;
use crate::coordinator::PodCoordinator;
use crate::observability::engine_metrics;
use crate::progression::round_days;
use crate::scheduler::ClockSampler;
use crate::shutdown::ShutdownCoordinator;

pub async fn tick(coordinator: &PodCoordinator) -> Result<()> {
    let report = coordinator.tick().await?;

    println!(
        "⏱️  Sampled {} active project(s), updated {}",
        report.sampled,
        report.updated.len()
    );
    for (project_id, update) in &report.updated {
        println!(
            "   {} {}: {} days",
            project_id,
            update.member_id,
            round_days(update.current)
        );
    }
    if !report.skipped_locked.is_empty() {
        println!("   Skipped (busy): {}", report.skipped_locked.join(", "));
    }
    if !report.failed.is_empty() {
        println!("   ⚠️  Failed: {}", report.failed.join(", "));
    }
    Ok(())
}

pub async fn run(
    coordinator: Arc<PodCoordinator>,
    config: &BatonConfig,
    interval: Option<u64>,
) -> Result<()> {
    let seconds = interval.unwrap_or(config.sampler.tick_interval_seconds).max(1);

    let shutdown = ShutdownCoordinator::new();
    shutdown.install_signal_handlers()?;

    println!("⏱️  Clock sampler running every {}s (Ctrl-C to stop)", seconds);
    let sampler = ClockSampler::new(coordinator, Duration::from_secs(seconds));
    let ticks = sampler
        .run_exclusive(&config.sampler.lock_file, shutdown.subscribe())
        .await?;

    engine_metrics().log_stats();
    println!("👋 Clock sampler stopped after {} tick(s)", ticks);
    Ok(())
}
