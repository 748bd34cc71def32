// Monitor service - Tick pipeline and read models for the dashboard views
use crate::application::aggregator::RollingAggregator;
use crate::application::sample_generator::SampleGenerator;
use crate::domain::dashboard::{LiveDashboard, ReportDashboard};
use crate::domain::filter::SampleFilter;
use crate::domain::sample::Sample;
use crate::domain::settings::Settings;
use crate::domain::summary::Alert;
use chrono::{DateTime, TimeZone, Utc};
use std::sync::{Mutex, MutexGuard};
use tokio::sync::broadcast;

const LIVE_CHANNEL_CAPACITY: usize = 64;
pub const TREND_POINTS: usize = 24;

struct MonitorState {
    generator: SampleGenerator,
    aggregator: RollingAggregator,
    settings: Settings,
}

/// What changed when settings were applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SettingsChange {
    pub previous: Settings,
    pub current: Settings,
}

impl SettingsChange {
    pub fn interval_changed(&self) -> bool {
        self.previous.sampling_interval_secs != self.current.sampling_interval_secs
    }
}

pub struct MonitorService {
    state: Mutex<MonitorState>,
    live_tx: broadcast::Sender<Sample>,
}

impl MonitorService {
    /// The generator's rule takes its load threshold from `settings`.
    pub fn new(mut generator: SampleGenerator, aggregator: RollingAggregator, settings: Settings) -> Self {
        generator.set_rule(
            generator
                .rule()
                .with_load_threshold(settings.theft_threshold_amps),
        );
        let (live_tx, _) = broadcast::channel(LIVE_CHANNEL_CAPACITY);
        Self {
            state: Mutex::new(MonitorState {
                generator,
                aggregator,
                settings,
            }),
            live_tx,
        }
    }

    fn lock(&self) -> MutexGuard<'_, MonitorState> {
        // State stays consistent across a panicked holder: every mutation is a
        // single push or assignment.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Generate one reading, record it and publish it to live subscribers.
    pub fn tick(&self, now: DateTime<Utc>) -> Sample {
        let (sample, notify) = {
            let mut state = self.lock();
            let sample = state.generator.generate(now);
            state.aggregator.record(sample.clone());
            (sample, state.settings.notifications_enabled)
        };
        log_sample("Tick", &sample, notify);

        // No subscribers is fine
        let _ = self.live_tx.send(sample.clone());
        sample
    }

    /// Generate one reading into the report log only. The live chart and
    /// `/live` subscribers only see scheduled ticks.
    pub fn add_report_row(&self, now: DateTime<Utc>) -> Sample {
        let (sample, notify) = {
            let mut state = self.lock();
            let sample = state.generator.generate(now);
            state.aggregator.record_report(sample.clone());
            (sample, state.settings.notifications_enabled)
        };
        log_sample("Manual row", &sample, notify);
        sample
    }

    /// Prefill the report log with `count` readings `spacing` apart.
    pub fn seed_reports(&self, count: usize, spacing: chrono::Duration, now: DateTime<Utc>) {
        let mut state = self.lock();
        let rows = state.generator.seed_history(count, spacing, now);
        state.aggregator.seed_reports(rows);
        tracing::info!("Seeded report log with {} readings", count);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Sample> {
        self.live_tx.subscribe()
    }

    pub fn live_dashboard(&self) -> LiveDashboard {
        let state = self.lock();
        let latest = state.aggregator.latest().cloned();
        LiveDashboard {
            last_update: latest.as_ref().map(Sample::timestamp),
            latest,
            series: state.aggregator.live_series(),
            device_online: true,
        }
    }

    pub fn report_dashboard<Tz: TimeZone>(
        &self,
        filter: &SampleFilter,
        days: usize,
        tz: &Tz,
        now: DateTime<Utc>,
    ) -> ReportDashboard {
        let state = self.lock();
        let aggregator = &state.aggregator;
        ReportDashboard {
            summary: aggregator.report_summary(),
            incidents: aggregator.report_incidents(days, tz),
            trend: aggregator.report_trend(TREND_POINTS),
            devices: aggregator.devices(),
            rows: aggregator.filter(filter, now),
        }
    }

    pub fn filtered_rows(&self, filter: &SampleFilter, now: DateTime<Utc>) -> Vec<Sample> {
        self.lock().aggregator.filter(filter, now)
    }

    pub fn alerts(&self, limit: usize) -> Vec<Alert> {
        self.lock().aggregator.recent_alerts(limit)
    }

    pub fn settings(&self) -> Settings {
        self.lock().settings
    }

    /// Store `settings` and point the classifier at the new theft threshold.
    /// Readings already recorded keep their flags.
    pub fn apply_settings(&self, settings: Settings) -> SettingsChange {
        let mut state = self.lock();
        let previous = state.settings;
        let rule = state
            .generator
            .rule()
            .with_load_threshold(settings.theft_threshold_amps);
        state.generator.set_rule(rule);
        state.settings = settings;
        SettingsChange {
            previous,
            current: settings,
        }
    }
}

fn log_sample(origin: &str, sample: &Sample, notify: bool) {
    tracing::debug!(
        "{} {}: device={} source={:.3} load={:.3} theft={}",
        origin,
        sample.id(),
        sample.device_id(),
        sample.source_current(),
        sample.load_current(),
        sample.theft_flag()
    );
    if sample.theft_flag() && notify {
        tracing::warn!(
            "Possible theft on {}: load {:.3} A, source {:.3} A, severity {}",
            sample.device_id(),
            sample.load_current(),
            sample.source_current(),
            sample.severity()
        );
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::application::random_source::{ScriptedRandom, SeededRandom};
    use crate::application::sample_generator::GeneratorProfile;
    use crate::domain::sample::TheftRule;
    use chrono::{Duration, TimeZone};

    pub(crate) fn default_settings() -> Settings {
        Settings::validated(true, 3.0, 0.6).unwrap()
    }

    pub(crate) fn seeded_service(seed: u64) -> MonitorService {
        let generator = SampleGenerator::new(
            Box::new(SeededRandom::new(Some(seed))),
            GeneratorProfile::default(),
            TheftRule::default(),
        );
        MonitorService::new(generator, RollingAggregator::default(), default_settings())
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_tick_records_into_both_views() {
        let service = seeded_service(3);
        let sample = service.tick(now());

        let live = service.live_dashboard();
        assert_eq!(live.latest.as_ref(), Some(&sample));
        assert_eq!(live.last_update, Some(now()));
        assert_eq!(live.series.len(), 1);

        let rows = service.filtered_rows(&SampleFilter::default(), now());
        assert_eq!(rows, vec![sample]);
    }

    #[test]
    fn test_live_view_is_capped_at_24() {
        let service = seeded_service(4);
        for i in 0..30 {
            service.tick(now() + Duration::seconds(3 * i));
        }
        assert_eq!(service.live_dashboard().series.len(), 24);
        let report = service.report_dashboard(&SampleFilter::default(), 14, &Utc, now());
        assert_eq!(report.summary.sample_count, 30);
        assert_eq!(report.trend.len(), TREND_POINTS);
    }

    #[test]
    fn test_seed_reports_does_not_touch_live_view() {
        let service = seeded_service(5);
        service.seed_reports(30, Duration::minutes(15), now());

        assert!(service.live_dashboard().latest.is_none());
        let report = service.report_dashboard(&SampleFilter::default(), 14, &Utc, now());
        assert_eq!(report.rows.len(), 30);
        assert!(!report.devices.is_empty());
    }

    #[test]
    fn test_apply_settings_changes_threshold_for_new_samples() {
        // source 0.2 spiking to 0.585: five draws while safe, six once flagged
        let draws = vec![0.5, 0.01, 0.1, 0.0, 0.0, 0.5, 0.01, 0.1, 0.9, 0.0, 0.0];
        let generator = SampleGenerator::new(
            Box::new(ScriptedRandom::new(draws)),
            GeneratorProfile::default(),
            TheftRule::new(0.6, 1.0),
        );
        let service = MonitorService::new(generator, RollingAggregator::default(), default_settings());

        assert!(!service.tick(now()).theft_flag());

        let change = service.apply_settings(Settings::validated(true, 5.0, 0.5).unwrap());
        assert!(change.interval_changed());
        assert_eq!(service.settings().theft_threshold_amps, 0.5);
        assert!(service.tick(now()).theft_flag());

        let flags: Vec<bool> = service
            .filtered_rows(&SampleFilter::default(), now())
            .iter()
            .map(Sample::theft_flag)
            .collect();
        assert_eq!(flags, vec![true, false]);
    }

    #[test]
    fn test_manual_row_goes_to_report_log_only() {
        let service = seeded_service(7);
        let mut rx = service.subscribe();
        let sample = service.add_report_row(now());

        assert!(service.live_dashboard().latest.is_none());
        assert_eq!(service.filtered_rows(&SampleFilter::default(), now()), vec![sample]);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_subscribers_receive_ticks() {
        let service = seeded_service(6);
        let mut rx = service.subscribe();
        let sample = service.tick(now());
        assert_eq!(rx.recv().await.unwrap(), sample);
    }
}
