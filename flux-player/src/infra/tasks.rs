//! Fire-and-forget background work
//!
//! Controllers run synchronously on the UI thread. Requests they do not wait
//! for (position reports, settings writes, content fetches) are spawned onto
//! the ambient tokio runtime and tracked so a host or test can wait for them
//! to drain.

use std::future::Future;

use tokio::runtime::Handle;
use tokio_util::task::TaskTracker;

/// Spawn `future` on the current runtime; without one the work is dropped
/// and `false` returned.
pub fn spawn_tracked<F>(tasks: &TaskTracker, label: &str, future: F) -> bool
where
    F: Future<Output = ()> + Send + 'static,
{
    match Handle::try_current() {
        Ok(handle) => {
            tasks.spawn_on(future, &handle);
            true
        }
        Err(_) => {
            log::warn!("[Tasks] No async runtime, dropping {}", label);
            false
        }
    }
}

/// Wait until every tracked task has finished, then accept new ones again
pub async fn drain(tasks: &TaskTracker) {
    tasks.close();
    tasks.wait().await;
    tasks.reopen();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn without_runtime_work_is_dropped() {
        let tasks = TaskTracker::new();
        assert!(!spawn_tracked(&tasks, "noop", async {}));
        assert!(tasks.is_empty());
    }

    #[tokio::test]
    async fn drain_waits_for_spawned_work() {
        let tasks = TaskTracker::new();
        let done = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&done);
        assert!(spawn_tracked(&tasks, "flag", async move {
            tokio::task::yield_now().await;
            flag.store(true, Ordering::SeqCst);
        }));

        drain(&tasks).await;
        assert!(done.load(Ordering::SeqCst));
        assert!(!tasks.is_closed());
    }
}
