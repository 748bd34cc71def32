// Sampling loop - Drives MonitorService::tick from a Scheduler
use crate::application::monitor_service::MonitorService;
use crate::application::scheduler::{Scheduler, TickHandle};
use chrono::Utc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub struct SamplingLoop {
    monitor: Arc<MonitorService>,
    scheduler: Arc<dyn Scheduler>,
    handle: Mutex<Option<(Duration, TickHandle)>>,
}

impl SamplingLoop {
    pub fn new(monitor: Arc<MonitorService>, scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            monitor,
            scheduler,
            handle: Mutex::new(None),
        }
    }

    /// Start ticking every `period`, replacing any running schedule.
    pub fn start(&self, period: Duration) {
        let monitor = self.monitor.clone();
        let handle = self.scheduler.on_tick(
            period,
            Box::new(move || {
                monitor.tick(Utc::now());
            }),
        );

        let mut slot = self.handle.lock().unwrap_or_else(|p| p.into_inner());
        if let Some((_, mut previous)) = slot.replace((period, handle)) {
            previous.cancel();
        }
        tracing::info!("Sampling every {:?}", period);
    }

    pub fn stop(&self) {
        let mut slot = self.handle.lock().unwrap_or_else(|p| p.into_inner());
        if let Some((_, mut handle)) = slot.take() {
            handle.cancel();
            tracing::info!("Sampling stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .as_ref()
            .is_some_and(|(_, handle)| handle.is_active())
    }

    /// Period of the running schedule, if any.
    pub fn period(&self) -> Option<Duration> {
        self.handle
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .as_ref()
            .filter(|(_, handle)| handle.is_active())
            .map(|(period, _)| *period)
    }
}
