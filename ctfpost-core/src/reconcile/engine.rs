use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use tracing::{debug, error, info, warn};

use crate::constants::PUBLISH_TIMEOUT;
use crate::document::{Document, EventSyncState};
use crate::event::{Event, RawEvent};
use crate::publisher::{ChannelPublisher, PublishError};
use crate::reconcile::plan::{ChannelAction, EventPlan, plan_event};
use crate::reconcile::report::CycleReport;
use crate::render::{RenderOptions, render};

/// Applies event plans through a channel publisher.
#[derive(Clone)]
pub struct Reconciler {
    publisher: Arc<dyn ChannelPublisher>,
    publish_timeout: Duration,
}

impl Reconciler {
    pub fn new(publisher: Arc<dyn ChannelPublisher>) -> Self {
        Reconciler {
            publisher,
            publish_timeout: PUBLISH_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.publish_timeout = timeout;
        self
    }

    /// Run one cycle over `raw_events`, all compared against the same `now`.
    ///
    /// Never fails: a bad record or a failing channel is logged and counted,
    /// and the remaining events are still processed.
    pub async fn reconcile(
        &self,
        document: &mut Document,
        raw_events: Vec<RawEvent>,
        now: DateTime<Utc>,
    ) -> CycleReport {
        let mut report = CycleReport {
            fetched: raw_events.len(),
            ..CycleReport::default()
        };
        let min_weight = document.settings.min_weight;

        for raw in raw_events {
            let event = match Event::try_from(raw) {
                Ok(event) => event,
                Err(e) => {
                    warn!(error = %e, "Skipping event");
                    report.invalid += 1;
                    continue;
                }
            };

            if event.weight < min_weight {
                debug!(event = %event, weight = event.weight, "Below minimum weight");
                report.filtered += 1;
                continue;
            }

            let Some(plan) = plan_event(document, &event, now) else {
                continue;
            };

            if plan.is_new() {
                report.tracked += 1;
            } else if plan.status_changed() {
                report.transitions += 1;
            }

            // Handles recorded before a panic stay in the document, so the
            // cycle still commits them.
            let applied = AssertUnwindSafe(self.apply(document, &event, plan, now, &mut report))
                .catch_unwind()
                .await;
            if let Err(panic) = applied {
                error!(event = %event, panic = panic_message(&*panic), "Event apply panicked");
                report.failed += 1;
            }
        }

        document.state.last_run = Some(now);
        report
    }

    async fn apply(
        &self,
        document: &mut Document,
        event: &Event,
        plan: EventPlan,
        now: DateTime<Utc>,
        report: &mut CycleReport,
    ) {
        let options = RenderOptions {
            disable_preview: document.settings.disable_web_preview,
        };
        let post = render(event, plan.status, now, options);

        let sync = document
            .state
            .events
            .entry(event.id.clone())
            .or_insert_with(|| EventSyncState::new(event, plan.status));

        let mut edit_pending = false;

        for (channel, action) in plan.actions {
            match action {
                ChannelAction::Post => {
                    match self.bounded(self.publisher.post(&channel, &post)).await {
                        Ok(handle) => {
                            info!(
                                event = %event,
                                %channel,
                                message = %handle,
                                status = %plan.status,
                                "Posted event"
                            );
                            sync.messages.insert(channel, handle);
                            report.posted += 1;
                        }
                        Err(e) => {
                            warn!(event = %event, %channel, error = %e, "Failed to post event");
                            report.failed += 1;
                        }
                    }
                }
                ChannelAction::Edit(handle) => {
                    match self.bounded(self.publisher.edit(&channel, handle, &post)).await {
                        Ok(()) => {
                            info!(
                                event = %event,
                                %channel,
                                message = %handle,
                                status = %plan.status,
                                "Edited event"
                            );
                            report.edited += 1;
                        }
                        Err(e) if e.is_permanent() => {
                            warn!(
                                event = %event,
                                %channel,
                                message = %handle,
                                "Message is gone, forgetting handle"
                            );
                            sync.messages.remove(&channel);
                            report.forgotten += 1;
                        }
                        Err(e) => {
                            warn!(
                                event = %event,
                                %channel,
                                message = %handle,
                                error = %e,
                                "Failed to edit event"
                            );
                            edit_pending = true;
                            report.failed += 1;
                        }
                    }
                }
            }
        }

        if edit_pending {
            // Keep the old status so the edit is attempted again next cycle.
            let previous = sync.status;
            sync.record(event, previous);
        } else {
            sync.record(event, plan.status);
        }
    }

    /// Time-limit a publisher call and turn a panic inside it into a
    /// transient failure.
    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, PublishError>>,
    ) -> Result<T, PublishError> {
        let guarded = AssertUnwindSafe(call).catch_unwind();
        match tokio::time::timeout(self.publish_timeout, guarded).await {
            Ok(Ok(result)) => result,
            Ok(Err(panic)) => Err(PublishError::Transport(format!(
                "publisher panicked: {}",
                panic_message(&*panic)
            ))),
            Err(_) => Err(PublishError::Timeout(self.publish_timeout.as_secs())),
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
