use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Single-shot timer running on the tokio runtime. Expiry is observed by
/// polling `has_expired` from the owning thread.
///
/// Dropping the handle aborts the sleeping task and closes its channel, so
/// a replaced or canceled timer can never be observed as expired.
pub struct IdleTimer {
    task: JoinHandle<()>,
    expired: oneshot::Receiver<()>,
}

impl IdleTimer {
    pub fn start(runtime: &Handle, delay: Duration) -> Self {
        let (tx, rx) = oneshot::channel();
        let task = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(());
        });
        Self { task, expired: rx }
    }

    pub fn has_expired(&mut self) -> bool {
        self.expired.try_recv().is_ok()
    }
}

impl Drop for IdleTimer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn elapse(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
        tokio::task::yield_now().await;
    }

    #[tokio::test(start_paused = true)]
    async fn expires_after_delay() {
        let mut timer = IdleTimer::start(&Handle::current(), Duration::from_millis(100));
        elapse(99).await;
        assert!(!timer.has_expired());
        elapse(1).await;
        assert!(timer.has_expired());
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_timer_task_is_aborted() {
        let timer = IdleTimer::start(&Handle::current(), Duration::from_millis(100));
        let task = timer.task.abort_handle();
        drop(timer);
        elapse(200).await;
        assert!(task.is_finished());
    }
}
