//! Background loop that runs sync cycles while the persisted run flag is set.
//!
//! Stopping only clears the flag: the loop keeps ticking and skips work, and
//! an in-flight cycle always runs to completion. Shutdown is only observed
//! between cycles.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::constants::{SCHEDULER_ERROR_BACKOFF, SCHEDULER_MIN_SLEEP};
use crate::cycle::Syncer;
use crate::error::{CoreError, CoreResult};
use crate::reconcile::CycleReport;

pub struct Scheduler {
    syncer: Arc<Syncer>,
    task: Mutex<Option<JoinHandle<()>>>,
    shutdown_tx: watch::Sender<bool>,
}

impl Scheduler {
    pub fn new(syncer: Arc<Syncer>) -> Self {
        Scheduler {
            syncer,
            task: Mutex::new(None),
            shutdown_tx: watch::Sender::new(false),
        }
    }

    /// Set the run flag and make sure the loop is alive.
    pub async fn start(&self) -> CoreResult<()> {
        self.syncer.store().update(|d| d.state.running = true).await?;
        self.ensure_running();
        Ok(())
    }

    /// Clear the run flag. The loop stays alive but performs no cycles.
    pub async fn stop(&self) -> CoreResult<()> {
        self.syncer.store().update(|d| d.state.running = false).await
    }

    /// Spawn the loop unless one is already alive. Returns whether it spawned.
    pub fn ensure_running(&self) -> bool {
        let mut task = self.task.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        if task.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return false;
        }

        self.shutdown_tx.send_replace(false);
        let shutdown = self.shutdown_tx.subscribe();
        *task = Some(tokio::spawn(run_loop(self.syncer.clone(), shutdown)));
        info!("Scheduler loop started");
        true
    }

    pub fn is_alive(&self) -> bool {
        self.task
            .lock()
            .map(|task| task.as_ref().is_some_and(|handle| !handle.is_finished()))
            .unwrap_or(false)
    }

    /// Run one cycle now, regardless of the run flag.
    pub async fn run_once(&self) -> CoreResult<CycleReport> {
        run_isolated(&self.syncer).await
    }

    /// Stop the loop, e.g. on process shutdown. Waits for an in-flight
    /// cycle to commit before returning.
    pub async fn shutdown(&self) {
        self.shutdown_tx.send_replace(true);

        let handle = self
            .task
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                error!(error = %e, "Scheduler loop ended abnormally");
            }
            info!("Scheduler loop stopped");
        }
    }
}

async fn run_loop(syncer: Arc<Syncer>, mut shutdown: watch::Receiver<bool>) {
    while !*shutdown.borrow_and_update() {
        let pause = match tick(&syncer).await {
            Ok(interval) => interval.max(SCHEDULER_MIN_SLEEP),
            Err(e) => {
                error!(error = %e, "Scheduler cycle failed, backing off");
                SCHEDULER_ERROR_BACKOFF
            }
        };

        tokio::select! {
            _ = tokio::time::sleep(pause) => {}
            changed = shutdown.changed() => {
                // Sender gone means the scheduler itself was dropped.
                if changed.is_err() {
                    break;
                }
            }
        }
    }
}

/// One loop iteration. Returns how long to sleep before the next one.
async fn tick(syncer: &Arc<Syncer>) -> CoreResult<Duration> {
    // Interval is re-read every tick so settings changes apply on the next one.
    let document = syncer.store().read().await?;
    let interval = Duration::from_secs(document.settings.interval_sec);

    if document.state.running {
        let report = run_isolated(syncer).await?;
        info!(%report, "Cycle complete");
    }

    Ok(interval)
}

/// Run a cycle in its own task so a panic surfaces as an error here.
async fn run_isolated(syncer: &Arc<Syncer>) -> CoreResult<CycleReport> {
    let syncer = syncer.clone();
    tokio::spawn(async move { syncer.run_cycle().await })
        .await
        .map_err(|e| CoreError::Cycle(e.to_string()))?
}
