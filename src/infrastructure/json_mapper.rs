// Mapper to convert domain models to JSON wire types
use crate::domain::dashboard::{LiveDashboard, ReportDashboard};
use crate::domain::sample::{round_current, Sample, Severity};
use crate::domain::settings::Settings;
use crate::domain::summary::{Alert, DailyIncidents, FlowPoint, ReportSummary, SeverityDistribution};
use crate::domain::view::View;
use crate::infrastructure::csv_export::theft_label;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleJson {
    pub id: String,
    pub time: String,
    pub device: String,
    pub source: f64,
    pub load: f64,
    pub difference: f64,
    pub theft: bool,
    pub status: &'static str,
    pub severity: Severity,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowPointJson {
    pub time: String,
    pub source: f64,
    pub load: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveDashboardJson {
    pub latest: Option<SampleJson>,
    pub series: Vec<FlowPointJson>,
    pub last_update: Option<String>,
    pub device_status: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryJson {
    pub entries: usize,
    pub total_theft_cases: usize,
    pub safe_cases: usize,
    pub total_energy: f64,
    pub average_load: f64,
    pub severity_distribution: SeverityDistributionJson,
}

#[derive(Debug, Serialize)]
pub struct SeverityDistributionJson {
    #[serde(rename = "Safe")]
    pub safe: usize,
    #[serde(rename = "Medium")]
    pub medium: usize,
    #[serde(rename = "High")]
    pub high: usize,
}

#[derive(Debug, Serialize)]
pub struct IncidentsJson {
    pub labels: Vec<String>,
    pub values: Vec<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDashboardJson {
    pub summary: SummaryJson,
    pub incidents: IncidentsJson,
    pub trend: Vec<FlowPointJson>,
    pub devices: Vec<String>,
    pub rows: Vec<SampleJson>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertJson {
    pub id: String,
    pub device: String,
    pub level: Severity,
    pub time: String,
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsJson {
    pub notifications: bool,
    pub sampling_interval: u64,
    pub theft_threshold: f64,
}

#[derive(Debug, Serialize)]
pub struct ViewJson {
    pub id: &'static str,
    pub label: &'static str,
    pub path: String,
}

impl Serialize for Severity {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

fn format_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn sample_to_json(sample: &Sample) -> SampleJson {
    SampleJson {
        id: sample.id().to_string(),
        time: sample.formatted_timestamp(),
        device: sample.device_id().to_string(),
        source: sample.source_current(),
        load: sample.load_current(),
        difference: round_current(sample.differential()),
        theft: sample.theft_flag(),
        status: theft_label(sample.theft_flag()),
        severity: sample.severity(),
    }
}

fn flow_point_to_json(point: &FlowPoint) -> FlowPointJson {
    FlowPointJson {
        time: format_time(point.timestamp),
        source: point.source_current,
        load: point.load_current,
    }
}

pub fn live_dashboard_to_json(dashboard: &LiveDashboard) -> LiveDashboardJson {
    LiveDashboardJson {
        latest: dashboard.latest.as_ref().map(sample_to_json),
        series: dashboard.series.iter().map(flow_point_to_json).collect(),
        last_update: dashboard.last_update.map(format_time),
        device_status: if dashboard.device_online { "ONLINE" } else { "OFFLINE" },
    }
}

fn summary_to_json(summary: &ReportSummary) -> SummaryJson {
    SummaryJson {
        entries: summary.sample_count,
        total_theft_cases: summary.total_theft_count,
        safe_cases: summary.safe_count,
        total_energy: (summary.estimated_energy * 100.0).round() / 100.0,
        average_load: round_current(summary.average_load),
        severity_distribution: distribution_to_json(&summary.severity_distribution),
    }
}

fn distribution_to_json(distribution: &SeverityDistribution) -> SeverityDistributionJson {
    SeverityDistributionJson {
        safe: distribution.count(Severity::Safe),
        medium: distribution.count(Severity::Medium),
        high: distribution.count(Severity::High),
    }
}

fn incidents_to_json(incidents: &[DailyIncidents]) -> IncidentsJson {
    IncidentsJson {
        labels: incidents
            .iter()
            .map(|d| d.date.format("%Y-%m-%d").to_string())
            .collect(),
        values: incidents.iter().map(|d| d.thefts).collect(),
    }
}

pub fn report_dashboard_to_json(dashboard: &ReportDashboard) -> ReportDashboardJson {
    ReportDashboardJson {
        summary: summary_to_json(&dashboard.summary),
        incidents: incidents_to_json(&dashboard.incidents),
        trend: dashboard.trend.iter().map(flow_point_to_json).collect(),
        devices: dashboard.devices.clone(),
        rows: dashboard.rows.iter().map(sample_to_json).collect(),
    }
}

pub fn alert_to_json(alert: &Alert) -> AlertJson {
    AlertJson {
        id: alert.sample_id.clone(),
        device: alert.device_id.clone(),
        level: alert.severity,
        time: format_time(alert.timestamp),
        text: alert.message.clone(),
    }
}

pub fn settings_to_json(settings: &Settings) -> SettingsJson {
    SettingsJson {
        notifications: settings.notifications_enabled,
        sampling_interval: settings.sampling_interval_secs,
        theft_threshold: settings.theft_threshold_amps,
    }
}

pub fn view_to_json(view: View) -> ViewJson {
    ViewJson {
        id: view.id(),
        label: view.label(),
        path: view.path(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sample::TheftRule;
    use chrono::{NaiveDate, TimeZone};
    use serde_json::json;

    #[test]
    fn test_sample_json_shape() {
        let sample = Sample::classified(
            "1740817800000-7".to_string(),
            Utc.with_ymd_and_hms(2025, 3, 1, 8, 30, 0).unwrap(),
            0.2,
            0.61,
            "MTR-120".to_string(),
            &TheftRule::default(),
            Severity::High,
        );

        let value = serde_json::to_value(sample_to_json(&sample)).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "1740817800000-7",
                "time": "2025-03-01T08:30:00.000Z",
                "device": "MTR-120",
                "source": 0.2,
                "load": 0.61,
                "difference": -0.41,
                "theft": true,
                "status": "THEFT",
                "severity": "High"
            })
        );
    }

    #[test]
    fn test_incidents_json_is_parallel_arrays() {
        let incidents = [
            DailyIncidents {
                date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
                thefts: 2,
            },
            DailyIncidents {
                date: NaiveDate::from_ymd_opt(2025, 3, 2).unwrap(),
                thefts: 0,
            },
        ];
        let value = serde_json::to_value(incidents_to_json(&incidents)).unwrap();
        assert_eq!(
            value,
            json!({ "labels": ["2025-03-01", "2025-03-02"], "values": [2, 0] })
        );
    }

    #[test]
    fn test_settings_json_names() {
        let settings = Settings::validated(false, 4.0, 0.6).unwrap();
        let value = serde_json::to_value(settings_to_json(&settings)).unwrap();
        assert_eq!(
            value,
            json!({ "notifications": false, "samplingInterval": 4, "theftThreshold": 0.6 })
        );
    }
}
