//! Core types for ctfpost.
//!
//! This crate holds everything the CLI and the channel transports share:
//! - `event` and `status` for CTFtime events and their lifecycle
//! - `document` and `store` for the durable sync state
//! - `reconcile` for the engine that mirrors events into channels
//! - `scheduler` for the background loop that drives it

pub mod config;
pub mod constants;
pub mod cycle;
pub mod document;
pub mod error;
pub mod event;
pub mod publisher;
pub mod reconcile;
pub mod render;
pub mod scheduler;
pub mod setting;
pub mod source;
pub mod status;
pub mod store;

pub use error::{CoreError, CoreResult};
pub use event::Event;
pub use status::EventStatus;
