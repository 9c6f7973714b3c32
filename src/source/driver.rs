//! Runs the cache's fetch requests on a tokio runtime and hands the results
//! back to the UI thread.
//!
//! The UI never awaits: it calls [`FetchDriver::dispatch`] for each
//! [`FetchRequest`] and [`FetchDriver::pump`] once per frame. Dropping the
//! driver cancels every fetch still running, so nothing lands in a view that
//! is gone.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::TaskSource;
use crate::error::TimelineResult;
use crate::model::{EntityId, ExpansionCache, FetchRequest, TimelineEntity};

/// Result of one project fetch.
#[derive(Debug)]
pub struct FetchCompletion {
    pub project_id: EntityId,
    pub result: TimelineResult<Vec<TimelineEntity>>,
}

type Notify = Arc<dyn Fn() + Send + Sync>;

pub struct FetchDriver {
    handle: Handle,
    source: Arc<dyn TaskSource>,
    cancel: CancellationToken,
    tx: mpsc::UnboundedSender<FetchCompletion>,
    rx: mpsc::UnboundedReceiver<FetchCompletion>,
    notify: Option<Notify>,
}

impl FetchDriver {
    pub fn new(handle: Handle, source: Arc<dyn TaskSource>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            handle,
            source,
            cancel: CancellationToken::new(),
            tx,
            rx,
            notify: None,
        }
    }

    /// Called from the worker after each delivered completion, e.g. to wake
    /// the UI for a repaint.
    pub fn with_notify(mut self, notify: impl Fn() + Send + Sync + 'static) -> Self {
        self.notify = Some(Arc::new(notify));
        self
    }

    pub fn source(&self) -> &dyn TaskSource {
        self.source.as_ref()
    }

    /// Start a fetch in the background.
    pub fn dispatch(&self, request: FetchRequest) {
        let source = Arc::clone(&self.source);
        let cancel = self.cancel.clone();
        let tx = self.tx.clone();
        let notify = self.notify.clone();
        let project_id = request.project_id;

        tracing::debug!(project = %project_id, "dispatching task fetch");
        self.handle.spawn(async move {
            let fetch_id = project_id.clone();
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!(project = %project_id, "task fetch cancelled");
                }
                result = source.fetch_tasks(&fetch_id) => {
                    if cancel.is_cancelled() {
                        return;
                    }
                    if tx.send(FetchCompletion { project_id, result }).is_ok() {
                        if let Some(notify) = notify {
                            notify();
                        }
                    }
                }
            }
        });
    }

    /// Every completion available right now, without waiting.
    pub fn drain(&mut self) -> Vec<FetchCompletion> {
        let mut completions = Vec::new();
        while let Ok(completion) = self.rx.try_recv() {
            completions.push(completion);
        }
        completions
    }

    /// Feed every available completion into `cache`. Returns how many landed.
    pub fn pump(&mut self, cache: &mut ExpansionCache) -> usize {
        let completions = self.drain();
        let count = completions.len();
        for FetchCompletion { project_id, result } in completions {
            cache.complete(&project_id, result);
        }
        count
    }

    /// Wait for the next completion. For async callers and tests; the UI
    /// uses [`FetchDriver::pump`].
    pub async fn next_completion(&mut self) -> Option<FetchCompletion> {
        self.rx.recv().await
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for FetchDriver {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
