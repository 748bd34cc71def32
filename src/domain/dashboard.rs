// Dashboard domain models
use super::sample::Sample;
use super::summary::{DailyIncidents, FlowPoint, ReportSummary};
use chrono::{DateTime, Utc};

/// Operations dashboard: the latest reading and the real-time flow chart.
#[derive(Debug, Clone)]
pub struct LiveDashboard {
    pub latest: Option<Sample>,
    pub series: Vec<FlowPoint>,
    pub last_update: Option<DateTime<Utc>>,
    pub device_online: bool,
}

/// Reports page: summary cards, charts and the filtered table.
#[derive(Debug, Clone)]
pub struct ReportDashboard {
    pub summary: ReportSummary,
    pub incidents: Vec<DailyIncidents>,
    pub trend: Vec<FlowPoint>,
    pub devices: Vec<String>,
    pub rows: Vec<Sample>,
}
