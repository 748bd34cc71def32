// Derived views over the sample history
use super::sample::Severity;
use chrono::{DateTime, NaiveDate, Utc};

/// Mock energy unit credited per sample.
pub const ENERGY_PER_SAMPLE_FACTOR: f64 = 0.25;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeverityDistribution {
    pub safe: usize,
    pub medium: usize,
    pub high: usize,
}

impl SeverityDistribution {
    pub fn add(&mut self, severity: Severity) {
        match severity {
            Severity::Safe => self.safe += 1,
            Severity::Medium => self.medium += 1,
            Severity::High => self.high += 1,
        }
    }

    pub fn count(&self, severity: Severity) -> usize {
        match severity {
            Severity::Safe => self.safe,
            Severity::Medium => self.medium,
            Severity::High => self.high,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyIncidents {
    pub date: NaiveDate,
    pub thefts: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportSummary {
    pub sample_count: usize,
    pub total_theft_count: usize,
    pub safe_count: usize,
    pub average_load: f64,
    pub estimated_energy: f64,
    pub severity_distribution: SeverityDistribution,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub sample_id: String,
    pub device_id: String,
    pub severity: Severity,
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

/// One point of the real-time current chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowPoint {
    pub timestamp: DateTime<Utc>,
    pub source_current: f64,
    pub load_current: f64,
}
