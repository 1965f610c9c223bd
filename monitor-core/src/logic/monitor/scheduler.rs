//! Scheduler - supervised periodic monitoring
//!
//! Owns the background task running `Monitor::run_cycle` on an interval.
//! Lifecycle is explicit (`start` / `stop` / `status`); the loop observes a
//! `CancellationToken` instead of polling a shared flag. A cycle that is
//! already running is allowed to finish before the task exits.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::{CycleReport, Monitor};
use crate::logic::dataset::DatasetSource;

// ============================================================================
// STATUS
// ============================================================================

#[derive(Debug, Clone, Default, Serialize)]
pub struct SchedulerStatus {
    pub running: bool,
    pub interval_secs: Option<u64>,
    pub started_at: Option<DateTime<Utc>>,
    pub cycles_completed: u64,
    pub last_report: Option<CycleReport>,
}

impl SchedulerStatus {
    fn record(&mut self, report: CycleReport) {
        self.cycles_completed += 1;
        self.last_report = Some(report);
    }
}

struct RunningTask {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

// ============================================================================
// SCHEDULER
// ============================================================================

pub struct Scheduler<S> {
    monitor: Arc<Monitor<S>>,
    status: Arc<RwLock<SchedulerStatus>>,
    task: Mutex<Option<RunningTask>>,
}

impl<S: DatasetSource + 'static> Scheduler<S> {
    pub fn new(monitor: Arc<Monitor<S>>) -> Self {
        Self {
            monitor,
            status: Arc::new(RwLock::new(SchedulerStatus::default())),
            task: Mutex::new(None),
        }
    }

    pub fn monitor(&self) -> &Arc<Monitor<S>> {
        &self.monitor
    }

    /// Spawn the periodic loop. The first cycle runs immediately.
    /// Returns `false` if a loop is already running.
    pub fn start(&self, interval: Duration) -> bool {
        let mut task = self.task.lock();
        if task.as_ref().is_some_and(|t| !t.handle.is_finished()) {
            log::warn!("Scheduler already running");
            return false;
        }

        {
            let mut status = self.status.write();
            status.running = true;
            status.interval_secs = Some(interval.as_secs());
            status.started_at = Some(Utc::now());
        }

        let token = CancellationToken::new();
        let handle = tokio::spawn(run_loop(
            self.monitor.clone(),
            self.status.clone(),
            interval,
            token.clone(),
        ));

        *task = Some(RunningTask { token, handle });
        true
    }

    /// Cancel the loop and wait for it to exit.
    /// Returns `false` if nothing was running.
    pub async fn stop(&self) -> bool {
        let task = self.task.lock().take();
        let Some(task) = task else {
            return false;
        };

        task.token.cancel();
        if let Err(e) = task.handle.await {
            log::error!("Scheduler task ended abnormally: {}", e);
        }

        let mut status = self.status.write();
        status.running = false;
        status.started_at = None;
        true
    }

    pub fn status(&self) -> SchedulerStatus {
        self.status.read().clone()
    }

    pub fn is_running(&self) -> bool {
        self.status.read().running
    }

    /// Run one cycle right now, outside the schedule
    pub async fn run_now(&self) -> CycleReport {
        let report = self.monitor.run_cycle().await;
        self.status.write().record(report.clone());
        report
    }
}

impl<S> Drop for Scheduler<S> {
    fn drop(&mut self) {
        if let Some(task) = self.task.get_mut().take() {
            task.token.cancel();
        }
    }
}

async fn run_loop<S: DatasetSource>(
    monitor: Arc<Monitor<S>>,
    status: Arc<RwLock<SchedulerStatus>>,
    interval: Duration,
    token: CancellationToken,
) {
    log::info!("Scheduler started (every {}s)", interval.as_secs_f64());

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = ticker.tick() => {
                let report = monitor.run_cycle().await;
                status.write().record(report);
            }
        }
    }

    status.write().running = false;
    log::info!("Scheduler stopped");
}
