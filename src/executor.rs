//! # SerialExecutor: single-worker FIFO task queue with front insertion.
//!
//! [`SerialExecutor`] serializes every state-mutating job of the arbiter
//! onto one worker task:
//!
//! - [`SerialExecutor::submit`] appends; jobs run in submission order.
//! - [`SerialExecutor::submit_to_front`] prepends ahead of every job that
//!   has not started yet; the running job is never preempted.
//!
//! ## What it guarantees
//! - At most one job runs at a time.
//! - Each job runs to completion before the next begins (happens-before
//!   between consecutive jobs).
//! - A panicking job is caught and logged; the worker keeps draining.
//! - [`SerialExecutor::shutdown`] stops intake, drains the remaining queue,
//!   then joins the worker.
//!
//! ## What it does **not** guarantee
//! - No job runs after the executor is dropped without `shutdown`; pending
//!   jobs are discarded (any reply channels they carried resolve as closed).
//! - Jobs submitted after shutdown began are rejected (`submit` returns
//!   `false`) and logged.
//!
//! ## Diagram
//! ```text
//!  submit ───────────► ┌──────────────────────┐
//!                      │ back   …   front     │ ─► worker ─► job.await
//!  submit_to_front ──► └──────────────────────┘    (one at a time)
//! ```

use std::{
    collections::VecDeque,
    future::Future,
    pin::Pin,
    sync::{Arc, Mutex},
};

use futures::FutureExt;
use tokio::{sync::Notify, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

/// Boxed job executed by the worker.
type Job = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

struct QueueState {
    jobs: VecDeque<Job>,
    closed: bool,
}

struct Shared {
    queue: Mutex<QueueState>,
    notify: Notify,
}

/// Single-worker FIFO queue of boxed futures.
///
/// Must be created inside a Tokio runtime: construction spawns the worker.
pub struct SerialExecutor {
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
    token: CancellationToken,
}

impl SerialExecutor {
    /// Creates the queue and spawns its worker task.
    #[must_use]
    pub fn new() -> Self {
        let shared = Arc::new(Shared {
            queue: Mutex::new(QueueState {
                jobs: VecDeque::new(),
                closed: false,
            }),
            notify: Notify::new(),
        });
        let token = CancellationToken::new();
        let worker = tokio::spawn(Self::worker_loop(Arc::clone(&shared), token.clone()));

        Self {
            shared,
            worker: Mutex::new(Some(worker)),
            token,
        }
    }

    /// Appends a job; jobs run in submission order.
    ///
    /// Returns `false` (and drops the job) if shutdown has begun.
    pub fn submit<F>(&self, job: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.enqueue(Box::pin(job), false)
    }

    /// Prepends a job ahead of every not-yet-started job.
    ///
    /// The running job is never preempted. Returns `false` (and drops the
    /// job) if shutdown has begun.
    pub fn submit_to_front<F>(&self, job: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.enqueue(Box::pin(job), true)
    }

    /// Stops intake, drains every queued job, then joins the worker.
    pub async fn shutdown(&self) {
        {
            let mut queue = self.shared.queue.lock().unwrap();
            queue.closed = true;
        }
        self.shared.notify.notify_one();

        let worker = self.worker.lock().unwrap().take();
        if let Some(handle) = worker {
            let _ = handle.await;
        }
    }

    fn enqueue(&self, job: Job, front: bool) -> bool {
        {
            let mut queue = self.shared.queue.lock().unwrap();
            if queue.closed {
                drop(queue);
                warn!(front, "executor rejected job: shutdown in progress");
                return false;
            }
            if front {
                queue.jobs.push_front(job);
            } else {
                queue.jobs.push_back(job);
            }
        }
        self.shared.notify.notify_one();
        true
    }

    async fn worker_loop(shared: Arc<Shared>, token: CancellationToken) {
        loop {
            if token.is_cancelled() {
                return;
            }
            let next = {
                let mut queue = shared.queue.lock().unwrap();
                match queue.jobs.pop_front() {
                    Some(job) => Some(job),
                    None if queue.closed => return,
                    None => None,
                }
            };
            match next {
                Some(job) => {
                    if let Err(panic) = std::panic::AssertUnwindSafe(job).catch_unwind().await {
                        error!(panic = ?panic, "executor job panicked");
                    }
                }
                None => {
                    tokio::select! {
                        _ = shared.notify.notified() => {}
                        _ = token.cancelled() => return,
                    }
                }
            }
        }
    }

    /// Barrier for tests: resolves once every job queued before it has run.
    #[cfg(test)]
    pub(crate) async fn settle(&self) {
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        self.submit(async move {
            let _ = tx.send(());
        });
        let _ = rx.await;
    }
}

impl Default for SerialExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SerialExecutor {
    /// Abrupt teardown: the worker exits at its next idle point and pending
    /// jobs are discarded. Call [`SerialExecutor::shutdown`] for a drain.
    fn drop(&mut self) {
        self.token.cancel();
    }
}
