//! One full sync cycle: fetch, reconcile, persist.

use std::sync::Arc;

use chrono::Utc;
use tracing::warn;

use crate::constants::DEFAULT_FETCH_LIMIT;
use crate::error::CoreResult;
use crate::reconcile::{CycleReport, Reconciler};
use crate::source::{EventSource, FetchWindow};
use crate::store::Store;

/// Everything a cycle needs, shared by the scheduler and the `cycle` command.
pub struct Syncer {
    store: Arc<Store>,
    source: Arc<dyn EventSource>,
    reconciler: Reconciler,
    fetch_limit: u32,
}

impl Syncer {
    pub fn new(store: Arc<Store>, source: Arc<dyn EventSource>, reconciler: Reconciler) -> Self {
        Syncer {
            store,
            source,
            reconciler,
            fetch_limit: DEFAULT_FETCH_LIMIT,
        }
    }

    pub fn with_fetch_limit(mut self, limit: u32) -> Self {
        self.fetch_limit = limit;
        self
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// Run one cycle while holding the store lock for its whole duration.
    ///
    /// A failed fetch counts as "no events this cycle"; the only errors
    /// returned are store failures.
    pub async fn run_cycle(&self) -> CoreResult<CycleReport> {
        let mut tx = self.store.begin().await?;
        let now = Utc::now();

        let window = FetchWindow::ahead(now, tx.document.settings.horizon_days, self.fetch_limit);
        let raw_events = match self.source.fetch(&window).await {
            Ok(events) => events,
            Err(e) => {
                warn!(error = %e, "Event fetch failed, treating as no events");
                Vec::new()
            }
        };

        let report = self
            .reconciler
            .reconcile(&mut tx.document, raw_events, now)
            .await;

        tx.commit().await?;
        Ok(report)
    }
}
