//! Worker pool for handler invocations.
//!
//! Every invocation is its own task in a `JoinSet`. Concurrency is bounded
//! by a semaphore whose permit is acquired inside the task, so spawning
//! never waits and the read loop is never held up by slow handlers.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use parking_lot::Mutex;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{Instrument, error, warn};

use super::traits::HandlerFuture;
use crate::telemetry::{HandlerTimer, spans};

pub(crate) struct WorkerPool {
    tasks: Mutex<JoinSet<()>>,
    permits: Arc<Semaphore>,
}

impl WorkerPool {
    pub(crate) fn new(max_concurrent: usize) -> Self {
        Self {
            tasks: Mutex::new(JoinSet::new()),
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    /// Run `future` as a pooled task. Errors are logged at `warn`, panics
    /// at `error`; neither reaches the caller.
    pub(crate) fn spawn(&self, handler: &str, command: &str, future: HandlerFuture) {
        let permits = Arc::clone(&self.permits);
        let span = spans::handler(handler, command);
        let handler = handler.to_owned();
        let command = command.to_owned();

        let task = async move {
            let Ok(_permit) = permits.acquire_owned().await else {
                return;
            };
            let _timer = HandlerTimer::new(&handler, &command);
            match AssertUnwindSafe(future).catch_unwind().await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(error = %e, code = e.error_code(), "handler failed"),
                Err(panic) => error!(panic = panic_message(&*panic), "handler panicked"),
            }
        }
        .instrument(span);

        let mut tasks = self.tasks.lock();
        while tasks.try_join_next().is_some() {}
        tasks.spawn(task);
    }

    /// Tasks spawned and not yet finished.
    pub(crate) fn in_flight(&self) -> usize {
        let mut tasks = self.tasks.lock();
        while tasks.try_join_next().is_some() {}
        tasks.len()
    }

    /// Abort every running invocation.
    pub(crate) fn abort_all(&self) {
        self.tasks.lock().abort_all();
    }

    /// Wait for every invocation spawned so far to finish.
    pub(crate) async fn wait_idle(&self) {
        let mut tasks = std::mem::take(&mut *self.tasks.lock());
        while tasks.join_next().await.is_some() {}
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{HandlerError, HandlerResult};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_runs_and_reports_idle() {
        let pool = WorkerPool::new(4);
        let count = Arc::new(AtomicUsize::new(0));

        for _ in 0..10 {
            let count = Arc::clone(&count);
            pool.spawn(
                "counter",
                "PING",
                Box::pin(async move {
                    count.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }),
            );
        }
        pool.wait_idle().await;

        assert_eq!(count.load(Ordering::SeqCst), 10);
        assert_eq!(pool.in_flight(), 0);
    }

    async fn explode() -> HandlerResult {
        panic!("boom")
    }

    #[tokio::test]
    async fn test_errors_and_panics_are_contained() {
        let pool = WorkerPool::new(1);
        pool.spawn(
            "failing",
            "PING",
            Box::pin(async { Err(HandlerError::Internal("boom".into())) }),
        );
        pool.spawn("panicking", "PING", Box::pin(explode()));

        let done = Arc::new(AtomicUsize::new(0));
        let flag = Arc::clone(&done);
        pool.spawn(
            "after",
            "PING",
            Box::pin(async move {
                flag.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
        );
        pool.wait_idle().await;

        assert_eq!(done.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_permits_bound_concurrency() {
        let pool = WorkerPool::new(2);
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        for _ in 0..6 {
            let running = Arc::clone(&running);
            let peak = Arc::clone(&peak);
            pool.spawn(
                "slow",
                "PRIVMSG",
                Box::pin(async move {
                    let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_secs(1)).await;
                    running.fetch_sub(1, Ordering::SeqCst);
                    Ok(())
                }),
            );
        }
        pool.wait_idle().await;

        assert_eq!(peak.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abort_all_stops_running_work() {
        let pool = WorkerPool::new(4);
        let finished = Arc::new(AtomicUsize::new(0));
        let flag = Arc::clone(&finished);
        pool.spawn(
            "forever",
            "PRIVMSG",
            Box::pin(async move {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                flag.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
        );
        tokio::task::yield_now().await;

        pool.abort_all();
        pool.wait_idle().await;
        assert_eq!(finished.load(Ordering::SeqCst), 0);
    }
}
