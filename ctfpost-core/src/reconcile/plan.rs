use chrono::{DateTime, Utc};

use crate::document::{ChannelId, Document, MessageHandle};
use crate::event::Event;
use crate::status::EventStatus;

/// What to do for one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelAction {
    Post,
    Edit(MessageHandle),
}

/// The actions one event needs this cycle.
///
/// A channel appears at most once: channels holding a handle can only be
/// edited, channels without one can only be posted to.
#[derive(Debug, Clone, PartialEq)]
pub struct EventPlan {
    pub event_id: String,
    pub status: EventStatus,
    /// Status last communicated, `None` when the event is not tracked yet.
    pub previous: Option<EventStatus>,
    pub actions: Vec<(ChannelId, ChannelAction)>,
}

impl EventPlan {
    pub fn is_new(&self) -> bool {
        self.previous.is_none()
    }

    pub fn status_changed(&self) -> bool {
        self.previous.is_some_and(|prev| prev != self.status)
    }

    #[cfg(test)]
    fn posts(&self) -> impl Iterator<Item = &ChannelId> {
        self.actions
            .iter()
            .filter(|(_, a)| *a == ChannelAction::Post)
            .map(|(c, _)| c)
    }

    #[cfg(test)]
    fn edits(&self) -> impl Iterator<Item = (&ChannelId, MessageHandle)> {
        self.actions.iter().filter_map(|(c, a)| match a {
            ChannelAction::Edit(handle) => Some((c, *handle)),
            ChannelAction::Post => None,
        })
    }
}

/// Decide what `event` needs at `now`, or `None` when nothing changes.
///
/// Untracked events are only picked up while upcoming or running; ended
/// events are never backfilled. For tracked events a status change edits
/// every channel holding a handle, and while the event is live any
/// registered channel still missing a handle gets a post. That second rule
/// covers channels added later and channels whose earlier post failed.
pub fn plan_event(document: &Document, event: &Event, now: DateTime<Utc>) -> Option<EventPlan> {
    let status = EventStatus::resolve(event.start, event.end, now);

    let Some(sync) = document.state.events.get(&event.id) else {
        if !status.is_live() {
            return None;
        }
        return Some(EventPlan {
            event_id: event.id.clone(),
            status,
            previous: None,
            actions: document
                .channels
                .iter()
                .map(|c| (c.clone(), ChannelAction::Post))
                .collect(),
        });
    };

    let changed = sync.status != status;
    let mut actions = Vec::new();

    for channel in &document.channels {
        match sync.messages.get(channel) {
            Some(handle) if changed => {
                actions.push((channel.clone(), ChannelAction::Edit(*handle)));
            }
            Some(_) => {}
            None if status.is_live() => actions.push((channel.clone(), ChannelAction::Post)),
            None => {}
        }
    }

    if !changed && actions.is_empty() {
        return None;
    }

    Some(EventPlan {
        event_id: event.id.clone(),
        status,
        previous: Some(sync.status),
        actions,
    })
}
