use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use portfolio_gantt::model::{EntityId, ExpansionCache, RowState, TimelineEntity, Toggle};
use portfolio_gantt::source::{FetchDriver, TaskSource};
use portfolio_gantt::{TimelineError, TimelineResult};

/// Counts calls; optionally fails the first `fail_first` of them.
#[derive(Default)]
struct CountingSource {
    calls: AtomicUsize,
    fail_first: usize,
}

#[async_trait]
impl TaskSource for CountingSource {
    async fn fetch_tasks(&self, project_id: &EntityId) -> TimelineResult<Vec<TimelineEntity>> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(5)).await;
        if n < self.fail_first {
            return Err(TimelineError::ApiStatus {
                status: 503,
                body: "unavailable".into(),
            });
        }
        Ok(vec![TimelineEntity::new(
            format!("{}-t1", project_id),
            "Task",
            None,
            None,
        )])
    }

    fn describe(&self) -> String {
        "counting".into()
    }
}

/// Never finishes; flags when its future is dropped.
struct HangingSource {
    dropped: Arc<AtomicBool>,
}

struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl TaskSource for HangingSource {
    async fn fetch_tasks(&self, _project_id: &EntityId) -> TimelineResult<Vec<TimelineEntity>> {
        let _flag = DropFlag(Arc::clone(&self.dropped));
        std::future::pending::<()>().await;
        Ok(Vec::new())
    }

    fn describe(&self) -> String {
        "hanging".into()
    }
}

fn dispatch(driver: &FetchDriver, toggle: Toggle) {
    if let Toggle::Fetch(request) = toggle {
        driver.dispatch(request);
    }
}

async fn settle(driver: &mut FetchDriver, cache: &mut ExpansionCache) {
    let completion = tokio::time::timeout(Duration::from_secs(5), driver.next_completion())
        .await
        .expect("fetch did not complete")
        .expect("channel closed");
    cache.complete(&completion.project_id, completion.result);
}

#[tokio::test]
async fn expand_collapse_expand_hits_the_source_once() {
    let source = Arc::new(CountingSource::default());
    let mut driver = FetchDriver::new(tokio::runtime::Handle::current(), source.clone());
    let mut cache = ExpansionCache::new();
    let id = EntityId::from("p1");

    dispatch(&driver, cache.toggle_expand(&id));
    // Double toggle while the fetch is in flight.
    dispatch(&driver, cache.toggle_expand(&id));
    dispatch(&driver, cache.toggle_expand(&id));
    settle(&mut driver, &mut cache).await;

    dispatch(&driver, cache.toggle_expand(&id));
    dispatch(&driver, cache.toggle_expand(&id));
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    assert!(matches!(cache.row_state(&id), RowState::Loaded(tasks) if tasks.len() == 1));
}

#[tokio::test]
async fn failed_fetch_surfaces_and_retries() {
    let source = Arc::new(CountingSource {
        fail_first: 1,
        ..Default::default()
    });
    let mut driver = FetchDriver::new(tokio::runtime::Handle::current(), source.clone());
    let mut cache = ExpansionCache::new();
    let id = EntityId::from("p1");

    dispatch(&driver, cache.toggle_expand(&id));
    settle(&mut driver, &mut cache).await;
    assert!(matches!(cache.row_state(&id), RowState::Failed(msg) if msg.contains("503")));

    let request = cache.retry(&id).expect("retry should request a fetch");
    driver.dispatch(request);
    settle(&mut driver, &mut cache).await;

    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    assert!(matches!(cache.row_state(&id), RowState::Loaded(_)));
}

#[tokio::test]
async fn pump_applies_everything_available() {
    let source = Arc::new(CountingSource::default());
    let mut driver = FetchDriver::new(tokio::runtime::Handle::current(), source);
    let mut cache = ExpansionCache::new();
    let ids = [EntityId::from("a"), EntityId::from("b"), EntityId::from("c")];

    for id in &ids {
        dispatch(&driver, cache.toggle_expand(id));
    }
    let mut landed = 0;
    for _ in 0..100 {
        landed += driver.pump(&mut cache);
        if landed == ids.len() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    assert_eq!(landed, 3);
    for id in &ids {
        assert!(!cache.is_loading(id));
        assert_eq!(cache.tasks(id).map(<[_]>::len), Some(1));
    }
}

#[tokio::test]
async fn notify_fires_per_completion() {
    let source = Arc::new(CountingSource::default());
    let pings = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&pings);
    let mut driver = FetchDriver::new(tokio::runtime::Handle::current(), source)
        .with_notify(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
    let mut cache = ExpansionCache::new();

    dispatch(&driver, cache.toggle_expand(&EntityId::from("p1")));
    settle(&mut driver, &mut cache).await;
    assert_eq!(pings.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn dropping_the_driver_cancels_in_flight_fetches() {
    let dropped = Arc::new(AtomicBool::new(false));
    let source = Arc::new(HangingSource {
        dropped: Arc::clone(&dropped),
    });
    let driver = FetchDriver::new(tokio::runtime::Handle::current(), source);
    let mut cache = ExpansionCache::new();

    dispatch(&driver, cache.toggle_expand(&EntityId::from("p1")));
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(!dropped.load(Ordering::SeqCst));

    drop(driver);
    for _ in 0..50 {
        if dropped.load(Ordering::SeqCst) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(dropped.load(Ordering::SeqCst), "fetch future was not cancelled");
}

#[tokio::test]
async fn cancelled_driver_delivers_nothing() {
    let source = Arc::new(CountingSource::default());
    let mut driver = FetchDriver::new(tokio::runtime::Handle::current(), source);
    let mut cache = ExpansionCache::new();

    dispatch(&driver, cache.toggle_expand(&EntityId::from("p1")));
    driver.cancel();
    assert!(driver.is_cancelled());
    tokio::time::sleep(Duration::from_millis(30)).await;

    assert_eq!(driver.pump(&mut cache), 0);
    assert!(cache.is_loading(&EntityId::from("p1")));
}
