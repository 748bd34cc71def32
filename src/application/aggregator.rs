// Rolling aggregator - Owns the bounded histories and derives display views
use crate::domain::filter::SampleFilter;
use crate::domain::history::HistoryBuffer;
use crate::domain::sample::Sample;
use crate::domain::summary::{
    Alert, DailyIncidents, FlowPoint, ReportSummary, SeverityDistribution, ENERGY_PER_SAMPLE_FACTOR,
};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use std::collections::{BTreeMap, BTreeSet};

pub const LIVE_CAPACITY: usize = 24;
pub const REPORT_CAPACITY: usize = 500;

#[derive(Debug, Clone)]
pub struct RollingAggregator {
    live: HistoryBuffer,
    reports: HistoryBuffer,
}

impl Default for RollingAggregator {
    fn default() -> Self {
        Self::new(LIVE_CAPACITY, REPORT_CAPACITY)
    }
}

impl RollingAggregator {
    pub fn new(live_capacity: usize, report_capacity: usize) -> Self {
        Self {
            live: HistoryBuffer::new(live_capacity),
            reports: HistoryBuffer::new(report_capacity),
        }
    }

    /// Append a fresh reading to both the live chart and the report log.
    pub fn record(&mut self, sample: Sample) {
        self.live.push(sample.clone());
        self.reports.push(sample);
    }

    /// Append a reading to the report log only.
    pub fn record_report(&mut self, sample: Sample) {
        self.reports.push(sample);
    }

    /// Prefill the report log with back-dated readings, oldest first.
    pub fn seed_reports(&mut self, samples: impl IntoIterator<Item = Sample>) {
        for sample in samples {
            self.record_report(sample);
        }
    }

    pub fn live(&self) -> &HistoryBuffer {
        &self.live
    }

    pub fn reports(&self) -> &HistoryBuffer {
        &self.reports
    }

    pub fn latest(&self) -> Option<&Sample> {
        self.live.newest()
    }

    /// Live chart points, oldest first.
    pub fn live_series(&self) -> Vec<FlowPoint> {
        self.live.oldest_first().map(flow_point).collect()
    }

    /// The newest `points` report rows as a chart series, oldest first.
    pub fn report_trend(&self, points: usize) -> Vec<FlowPoint> {
        let mut trend: Vec<FlowPoint> = self.reports.newest_first().take(points).map(flow_point).collect();
        trend.reverse();
        trend
    }

    pub fn report_summary(&self) -> ReportSummary {
        summarize(self.reports.oldest_first())
    }

    pub fn report_incidents<Tz: TimeZone>(&self, days: usize, tz: &Tz) -> Vec<DailyIncidents> {
        incidents_by_day(self.reports.oldest_first(), days, tz)
    }

    /// Report rows passing `filter`, newest first.
    pub fn filter(&self, filter: &SampleFilter, now: DateTime<Utc>) -> Vec<Sample> {
        self.reports
            .newest_first()
            .filter(|s| filter.matches(s, now))
            .cloned()
            .collect()
    }

    /// Distinct devices seen in the report log.
    pub fn devices(&self) -> Vec<String> {
        self.reports
            .oldest_first()
            .map(|s| s.device_id().to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Flagged readings as alerts, newest first.
    pub fn recent_alerts(&self, limit: usize) -> Vec<Alert> {
        self.reports
            .newest_first()
            .filter(|s| s.theft_flag())
            .take(limit)
            .map(|s| Alert {
                sample_id: s.id().to_string(),
                device_id: s.device_id().to_string(),
                severity: s.severity(),
                timestamp: s.timestamp(),
                message: format!(
                    "Meter {} reported abnormal drift: load {:.3} A against source {:.3} A",
                    s.device_id(),
                    s.load_current(),
                    s.source_current()
                ),
            })
            .collect()
    }
}

fn flow_point(sample: &Sample) -> FlowPoint {
    FlowPoint {
        timestamp: sample.timestamp(),
        source_current: sample.source_current(),
        load_current: sample.load_current(),
    }
}

/// Counts, mean load and mock energy over `samples`. Empty input yields zeros.
pub fn summarize<'a>(samples: impl IntoIterator<Item = &'a Sample>) -> ReportSummary {
    let mut summary = ReportSummary::default();
    let mut load_total = 0.0;
    let mut severity_distribution = SeverityDistribution::default();

    for sample in samples {
        summary.sample_count += 1;
        if sample.theft_flag() {
            summary.total_theft_count += 1;
        } else {
            summary.safe_count += 1;
        }
        load_total += sample.load_current();
        summary.estimated_energy +=
            (sample.source_current() + sample.load_current()) / 2.0 * ENERGY_PER_SAMPLE_FACTOR;
        severity_distribution.add(sample.severity());
    }

    if summary.sample_count > 0 {
        summary.average_load = load_total / summary.sample_count as f64;
    }
    summary.severity_distribution = severity_distribution;
    summary
}

/// Theft counts per calendar day in `tz`, limited to the `days` most recent
/// days that have samples, ascending by date.
pub fn incidents_by_day<'a, Tz: TimeZone>(
    samples: impl IntoIterator<Item = &'a Sample>,
    days: usize,
    tz: &Tz,
) -> Vec<DailyIncidents> {
    let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for sample in samples {
        let date = sample.timestamp().with_timezone(tz).date_naive();
        *counts.entry(date).or_default() += usize::from(sample.theft_flag());
    }

    let skip = counts.len().saturating_sub(days);
    counts
        .into_iter()
        .skip(skip)
        .map(|(date, thefts)| DailyIncidents { date, thefts })
        .collect()
}
