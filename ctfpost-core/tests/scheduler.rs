mod common;

use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use common::{Call, FakePublisher, FakeSource, raw_event};
use ctfpost_core::cycle::Syncer;
use ctfpost_core::document::ChannelId;
use ctfpost_core::reconcile::Reconciler;
use ctfpost_core::scheduler::Scheduler;
use ctfpost_core::store::Store;

struct Harness {
    _dir: tempfile::TempDir,
    store: Arc<Store>,
    source: Arc<FakeSource>,
    publisher: Arc<FakePublisher>,
    scheduler: Scheduler,
}

async fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(Store::open(dir.path().join("data.json")));
    store
        .update(|d| {
            d.add_channel("-100".into());
            d.settings.interval_sec = 30;
        })
        .await
        .unwrap();

    let now = Utc::now();
    let source = Arc::new(FakeSource::with_events(vec![raw_event(
        7,
        now + ChronoDuration::days(1),
        now + ChronoDuration::days(2),
        10.0,
    )]));
    let publisher = Arc::new(FakePublisher::default());
    let syncer = Syncer::new(
        store.clone(),
        source.clone(),
        Reconciler::new(publisher.clone()),
    );

    Harness {
        _dir: dir,
        store,
        source,
        publisher,
        scheduler: Scheduler::new(Arc::new(syncer)),
    }
}

#[tokio::test(start_paused = true)]
async fn cycles_follow_the_interval() {
    let h = harness().await;

    h.scheduler.start().await.unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(h.source.fetches(), 1);
    assert_eq!(h.publisher.calls(), vec![Call::Post("-100".into())]);

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(h.source.fetches(), 2);
    // Already posted: the second cycle is quiet.
    assert_eq!(h.publisher.calls().len(), 1);

    let document = h.store.read().await.unwrap();
    assert!(document.state.running);
    assert!(document.state.last_run.is_some());
    assert!(document.state.events.contains_key("7"));

    h.scheduler.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn interval_change_applies_on_next_tick() {
    let h = harness().await;

    h.scheduler.start().await.unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(h.source.fetches(), 1);

    h.store.update(|d| d.settings.interval_sec = 120).await.unwrap();

    // The sleep already in progress still uses the old 30s interval.
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(h.source.fetches(), 2);

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(h.source.fetches(), 2);

    tokio::time::sleep(Duration::from_secs(61)).await;
    assert_eq!(h.source.fetches(), 3);

    h.scheduler.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn stop_keeps_loop_alive_but_idle() {
    let h = harness().await;

    h.scheduler.start().await.unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(h.source.fetches(), 1);

    h.scheduler.stop().await.unwrap();
    tokio::time::sleep(Duration::from_secs(300)).await;

    assert_eq!(h.source.fetches(), 1);
    assert!(h.scheduler.is_alive());
    assert!(!h.store.read().await.unwrap().state.running);

    // Restarting reuses the live loop and resumes work.
    h.scheduler.start().await.unwrap();
    tokio::time::sleep(Duration::from_secs(31)).await;
    assert_eq!(h.source.fetches(), 2);

    h.scheduler.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn start_is_idempotent() {
    let h = harness().await;

    h.scheduler.start().await.unwrap();
    assert!(!h.scheduler.ensure_running());
    h.scheduler.start().await.unwrap();

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(h.source.fetches(), 1);

    h.scheduler.shutdown().await;
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(!h.scheduler.is_alive());
}

#[tokio::test(start_paused = true)]
async fn panicking_cycle_does_not_kill_the_loop() {
    let h = harness().await;
    h.source.panic_next(1);

    h.scheduler.start().await.unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(h.source.fetches(), 0);
    assert!(h.scheduler.is_alive());
    assert!(h.store.read().await.unwrap().state.last_run.is_none());

    // Error backoff is 10s, shorter than the 30s interval.
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(h.source.fetches(), 1);
    assert_eq!(h.publisher.calls().len(), 1);

    h.scheduler.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn sleep_floor_applies_to_tiny_intervals() {
    let h = harness().await;
    h.store.update(|d| d.settings.interval_sec = 0).await.unwrap();

    h.scheduler.start().await.unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(h.source.fetches(), 1);

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(h.source.fetches(), 1);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(h.source.fetches(), 2);

    h.scheduler.shutdown().await;
}

#[tokio::test]
async fn failed_fetch_counts_as_no_events() {
    let h = harness().await;
    h.source.set_failing(true);

    let report = h.scheduler.run_once().await.unwrap();

    assert_eq!(report.fetched, 0);
    assert!(h.publisher.calls().is_empty());
    let document = h.store.read().await.unwrap();
    assert!(document.state.last_run.is_some());
    assert!(document.state.events.is_empty());
    assert_eq!(document.channels.len(), 1);
}

#[tokio::test]
async fn run_once_ignores_the_run_flag() {
    let h = harness().await;
    assert!(!h.store.read().await.unwrap().state.running);

    let report = h.scheduler.run_once().await.unwrap();

    assert_eq!(report.posted, 1);
    let document = h.store.read().await.unwrap();
    assert!(document.state.events["7"].messages.contains_key(&ChannelId::from("-100")));
}

#[tokio::test(start_paused = true)]
async fn shutdown_waits_for_the_cycle_in_flight() {
    let h = harness().await;
    h.publisher.set_delay(Duration::from_secs(5));

    h.scheduler.start().await.unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(h.source.fetches(), 1);
    assert!(h.publisher.calls().is_empty());

    h.scheduler.shutdown().await;

    assert!(!h.scheduler.is_alive());
    assert_eq!(h.publisher.calls(), vec![Call::Post("-100".into())]);
    let document = h.store.read().await.unwrap();
    assert!(document.state.events["7"].messages.contains_key(&ChannelId::from("-100")));

    // No further cycles once shut down.
    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(h.source.fetches(), 1);
}

#[tokio::test]
async fn panic_in_one_event_still_commits_the_others() {
    let h = harness().await;
    let now = Utc::now();
    h.source.set_events(vec![
        raw_event(1, now + ChronoDuration::days(1), now + ChronoDuration::days(2), 10.0),
        raw_event(2, now + ChronoDuration::days(1), now + ChronoDuration::days(2), 10.0),
    ]);
    h.publisher.panic_on(Some("CTF 2"));

    let report = h.scheduler.run_once().await.unwrap();
    assert_eq!(report.posted, 1);
    assert_eq!(report.failed, 1);

    h.publisher.panic_on(None);
    h.scheduler.run_once().await.unwrap();

    let ctf1_posts = h
        .publisher
        .texts()
        .iter()
        .filter(|text| text.contains("CTF 1"))
        .count();
    assert_eq!(ctf1_posts, 1);

    let document = h.store.read().await.unwrap();
    let channel = ChannelId::from("-100");
    assert!(document.state.events["1"].messages.contains_key(&channel));
    assert!(document.state.events["2"].messages.contains_key(&channel));
}
