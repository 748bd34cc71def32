// Scheduler trait - Periodic ticks with a cancellation handle
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub type TickCallback = Box<dyn FnMut() + Send + 'static>;

pub trait Scheduler: Send + Sync {
    /// Invoke `callback` every `period` until the returned handle is cancelled
    /// or dropped. The first tick fires one period after scheduling.
    fn on_tick(&self, period: Duration, callback: TickCallback) -> TickHandle;
}

/// Cancels its schedule when cancelled explicitly or dropped.
pub struct TickHandle {
    task: Option<JoinHandle<()>>,
}

impl TickHandle {
    pub fn new(task: JoinHandle<()>) -> Self {
        Self { task: Some(task) }
    }

    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for TickHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Runs each schedule on its own tokio task. Callbacks are synchronous, so a
/// tick always completes before the next one starts.
#[derive(Debug, Clone, Default)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    fn on_tick(&self, period: Duration, mut callback: TickCallback) -> TickHandle {
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                callback();
            }
        });
        TickHandle::new(task)
    }
}
