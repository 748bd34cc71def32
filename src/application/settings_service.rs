// Settings service - Use case for saving monitor settings
use crate::application::monitor_service::MonitorService;
use crate::application::sampling_loop::SamplingLoop;
use crate::domain::settings::{Settings, SettingsError};
use std::sync::{Arc, Mutex};

/// Raw form values as submitted by the settings page.
#[derive(Debug, Clone, Copy)]
pub struct SettingsForm {
    pub notifications_enabled: bool,
    pub sampling_interval_secs: f64,
    pub theft_threshold_amps: f64,
}

#[derive(Clone)]
pub struct SettingsService {
    monitor: Arc<MonitorService>,
    sampling: Arc<SamplingLoop>,
    // Serializes saves so the stored interval and the running timer agree.
    save_lock: Arc<Mutex<()>>,
}

impl SettingsService {
    pub fn new(monitor: Arc<MonitorService>, sampling: Arc<SamplingLoop>) -> Self {
        Self {
            monitor,
            sampling,
            save_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn current(&self) -> Settings {
        self.monitor.settings()
    }

    /// Validate and apply the form, restarting the sampler when the interval
    /// changed. Returns the settings now in effect.
    pub fn save(&self, form: SettingsForm) -> Result<Settings, SettingsError> {
        let _guard = self.save_lock.lock().unwrap_or_else(|p| p.into_inner());
        let settings = Settings::validated(
            form.notifications_enabled,
            form.sampling_interval_secs,
            form.theft_threshold_amps,
        )
        .inspect_err(|e| tracing::warn!("Rejected settings: {}", e))?;

        let change = self.monitor.apply_settings(settings);
        if change.interval_changed() && self.sampling.is_running() {
            self.sampling.start(settings.sampling_interval());
        }

        tracing::info!(
            "Settings saved: notifications={} interval={}s threshold={:.3} A",
            settings.notifications_enabled,
            settings.sampling_interval_secs,
            settings.theft_threshold_amps
        );
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::monitor_service::tests::seeded_service;
    use crate::application::scheduler::TokioScheduler;
    use crate::domain::filter::SampleFilter;
    use chrono::Utc;
    use std::time::Duration;

    fn service() -> (SettingsService, Arc<MonitorService>, Arc<SamplingLoop>) {
        let monitor = Arc::new(seeded_service(21));
        let sampling = Arc::new(SamplingLoop::new(monitor.clone(), Arc::new(TokioScheduler)));
        (
            SettingsService::new(monitor.clone(), sampling.clone()),
            monitor,
            sampling,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_applies_and_reschedules() {
        let (settings, monitor, sampling) = service();
        sampling.start(Duration::from_secs(3));

        let saved = settings
            .save(SettingsForm {
                notifications_enabled: false,
                sampling_interval_secs: 10.0,
                theft_threshold_amps: 0.55,
            })
            .unwrap();
        assert_eq!(saved.sampling_interval_secs, 10);
        assert_eq!(settings.current(), saved);

        tokio::time::sleep(Duration::from_millis(9_000)).await;
        let rows = monitor.filtered_rows(&SampleFilter::default(), Utc::now());
        assert!(rows.is_empty());
        tokio::time::sleep(Duration::from_millis(1_500)).await;
        let rows = monitor.filtered_rows(&SampleFilter::default(), Utc::now());
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_saves_keep_timer_in_sync() {
        let (settings, _, sampling) = service();
        sampling.start(Duration::from_secs(3));

        for round in 0..20 {
            let saves: Vec<_> = [5.0, 10.0, 7.0, 12.0]
                .into_iter()
                .map(|interval| {
                    let settings = settings.clone();
                    tokio::task::spawn_blocking(move || {
                        settings.save(SettingsForm {
                            notifications_enabled: true,
                            sampling_interval_secs: interval + round as f64,
                            theft_threshold_amps: 0.6,
                        })
                    })
                })
                .collect();
            for save in saves {
                save.await.unwrap().unwrap();
            }

            assert_eq!(
                sampling.period(),
                Some(settings.current().sampling_interval()),
                "round {}",
                round
            );
        }
        sampling.stop();
    }

    #[tokio::test]
    async fn test_invalid_form_leaves_settings_unchanged() {
        let (settings, _, _) = service();
        let before = settings.current();

        let err = settings
            .save(SettingsForm {
                notifications_enabled: true,
                sampling_interval_secs: 3.0,
                theft_threshold_amps: -2.0,
            })
            .unwrap_err();
        assert!(matches!(err, SettingsError::TheftThreshold(_)));
        assert_eq!(settings.current(), before);
    }
}
