#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ctfpost_core::CoreResult;
use ctfpost_core::document::{ChannelId, MessageHandle};
use ctfpost_core::error::CoreError;
use ctfpost_core::event::{RawEvent, RawId};
use ctfpost_core::publisher::{ChannelPublisher, PublishError};
use ctfpost_core::render::RenderedPost;
use ctfpost_core::source::{EventSource, FetchWindow};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Post(ChannelId),
    Edit(ChannelId, MessageHandle),
}

#[derive(Default)]
struct State {
    next_id: i64,
    calls: Vec<Call>,
    texts: Vec<String>,
    failing_posts: HashSet<ChannelId>,
    failing_edits: HashSet<ChannelId>,
    gone: HashSet<ChannelId>,
    delay: Option<Duration>,
    panic_on: Option<String>,
}

/// Records every call; failures are scripted per channel.
#[derive(Default)]
pub struct FakePublisher {
    state: Mutex<State>,
}

impl FakePublisher {
    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.state.lock().unwrap().texts.clone()
    }

    pub fn clear(&self) {
        let mut state = self.state.lock().unwrap();
        state.calls.clear();
        state.texts.clear();
    }

    pub fn fail_posts_to(&self, channel: &str, failing: bool) {
        let mut state = self.state.lock().unwrap();
        if failing {
            state.failing_posts.insert(channel.into());
        } else {
            state.failing_posts.remove(&ChannelId::from(channel));
        }
    }

    pub fn fail_edits_in(&self, channel: &str, failing: bool) {
        let mut state = self.state.lock().unwrap();
        if failing {
            state.failing_edits.insert(channel.into());
        } else {
            state.failing_edits.remove(&ChannelId::from(channel));
        }
    }

    pub fn delete_messages_in(&self, channel: &str) {
        self.state.lock().unwrap().gone.insert(channel.into());
    }

    pub fn set_delay(&self, delay: Duration) {
        self.state.lock().unwrap().delay = Some(delay);
    }

    /// Panic on any call whose rendered text contains `needle`.
    pub fn panic_on(&self, needle: Option<&str>) {
        self.state.lock().unwrap().panic_on = needle.map(str::to_string);
    }

    fn delay(&self) -> Option<Duration> {
        self.state.lock().unwrap().delay
    }

    fn maybe_panic(&self, post: &RenderedPost) {
        let trigger = self.state.lock().unwrap().panic_on.clone();
        if let Some(needle) = trigger {
            if post.text.contains(&needle) {
                panic!("publisher exploded on {needle}");
            }
        }
    }
}

#[async_trait]
impl ChannelPublisher for FakePublisher {
    async fn post(
        &self,
        channel: &ChannelId,
        post: &RenderedPost,
    ) -> Result<MessageHandle, PublishError> {
        if let Some(delay) = self.delay() {
            tokio::time::sleep(delay).await;
        }
        self.maybe_panic(post);

        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Post(channel.clone()));
        state.texts.push(post.text.clone());
        if state.failing_posts.contains(channel) {
            return Err(PublishError::Transport("connection reset".into()));
        }
        state.gone.remove(channel);
        state.next_id += 1;
        Ok(MessageHandle(state.next_id))
    }

    async fn edit(
        &self,
        channel: &ChannelId,
        handle: MessageHandle,
        post: &RenderedPost,
    ) -> Result<(), PublishError> {
        self.maybe_panic(post);
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Edit(channel.clone(), handle));
        state.texts.push(post.text.clone());
        if state.gone.contains(channel) {
            return Err(PublishError::MessageGone);
        }
        if state.failing_edits.contains(channel) {
            return Err(PublishError::RateLimited {
                retry_after: Some(Duration::from_secs(3)),
            });
        }
        Ok(())
    }
}

/// Serves a fixed batch; can be told to fail or panic.
#[derive(Default)]
pub struct FakeSource {
    events: Mutex<Vec<RawEvent>>,
    fetches: AtomicUsize,
    failing: Mutex<bool>,
    panics_left: AtomicUsize,
}

impl FakeSource {
    pub fn with_events(events: Vec<RawEvent>) -> Self {
        let source = FakeSource::default();
        *source.events.lock().unwrap() = events;
        source
    }

    pub fn set_events(&self, events: Vec<RawEvent>) {
        *self.events.lock().unwrap() = events;
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }

    pub fn panic_next(&self, times: usize) {
        self.panics_left.store(times, Ordering::SeqCst);
    }
}

#[async_trait]
impl EventSource for FakeSource {
    async fn fetch(&self, _window: &FetchWindow) -> CoreResult<Vec<RawEvent>> {
        if self
            .panics_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            panic!("source exploded");
        }

        self.fetches.fetch_add(1, Ordering::SeqCst);
        if *self.failing.lock().unwrap() {
            return Err(CoreError::Source("503 Service Unavailable".into()));
        }
        Ok(self.events.lock().unwrap().clone())
    }
}

pub fn raw_event(id: i64, start: DateTime<Utc>, end: DateTime<Utc>, weight: f64) -> RawEvent {
    RawEvent {
        id: Some(RawId::Number(id)),
        title: Some(format!("CTF {id}")),
        start: Some(start.to_rfc3339()),
        finish: Some(end.to_rfc3339()),
        weight: Some(weight),
        ctftime_url: Some(format!("https://ctftime.org/event/{id}/")),
        ..RawEvent::default()
    }
}
