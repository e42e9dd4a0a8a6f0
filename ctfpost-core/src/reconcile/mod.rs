//! Reconciliation of fetched events against what channels already show.
//!
//! Each cycle is computed in two steps: `plan_event` decides, purely from
//! the document and the clock, which channels need a post or an edit, and
//! `Reconciler` carries those actions out against a `ChannelPublisher` and
//! records the outcome in the document.

mod engine;
mod plan;
mod report;

pub use engine::Reconciler;
pub use plan::{ChannelAction, EventPlan, plan_event};
pub use report::CycleReport;
