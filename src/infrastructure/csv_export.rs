// CSV export of report rows
use crate::domain::sample::Sample;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const CSV_HEADER: [&str; 6] = ["time", "device", "source", "load", "theft", "severity"];

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(test)]
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// One exported table row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub time: String,
    pub device: String,
    pub source: String,
    pub load: String,
    pub theft: String,
    pub severity: String,
}

impl From<&Sample> for ReportRow {
    fn from(sample: &Sample) -> Self {
        Self {
            time: sample.formatted_timestamp(),
            device: sample.device_id().to_string(),
            source: format!("{:.3}", sample.source_current()),
            load: format!("{:.3}", sample.load_current()),
            theft: theft_label(sample.theft_flag()).to_string(),
            severity: sample.severity().to_string(),
        }
    }
}

// Reading exports back is only needed to check them.
#[cfg(test)]
impl ReportRow {
    pub fn is_theft(&self) -> Result<bool, ExportError> {
        match self.theft.as_str() {
            "THEFT" => Ok(true),
            "SAFE" => Ok(false),
            other => Err(ExportError::InvalidFormat(format!("theft column '{}'", other))),
        }
    }

    pub fn severity(&self) -> Result<crate::domain::sample::Severity, ExportError> {
        self.severity.parse().map_err(ExportError::InvalidFormat)
    }
}

pub fn theft_label(theft: bool) -> &'static str {
    if theft { "THEFT" } else { "SAFE" }
}

/// Serialize rows in table order under the `time,device,source,load,theft,severity` header.
pub fn export_csv<'a>(samples: impl IntoIterator<Item = &'a Sample>) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;
    for sample in samples {
        let row = ReportRow::from(sample);
        writer.write_record([
            &row.time,
            &row.device,
            &row.source,
            &row.load,
            &row.theft,
            &row.severity,
        ])?;
    }
    writer
        .into_inner()
        .map_err(|e| ExportError::Io(e.into_error()))
}

/// Parse an exported file back into rows.
#[cfg(test)]
pub fn parse_csv(data: &[u8]) -> Result<Vec<ReportRow>, ExportError> {
    let mut reader = csv::Reader::from_reader(data);

    let headers = reader.headers()?.clone();
    let header_strs: Vec<&str> = headers.iter().collect();
    if header_strs != CSV_HEADER {
        return Err(ExportError::InvalidFormat(format!(
            "unexpected header '{}'",
            header_strs.join(",")
        )));
    }

    let mut rows = Vec::new();
    for result in reader.deserialize() {
        rows.push(result?);
    }
    Ok(rows)
}

pub fn export_file_name(now: DateTime<Utc>) -> String {
    format!("reports_{}.csv", now.format("%Y-%m-%dT%H-%M-%SZ"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::monitor_service::tests::seeded_service;
    use crate::domain::filter::SampleFilter;
    use crate::domain::sample::{Severity, TheftRule};
    use chrono::{Duration, TimeZone};

    fn sample(device: &str, load: f64) -> Sample {
        Sample::classified(
            "1-1".to_string(),
            Utc.with_ymd_and_hms(2025, 3, 1, 8, 30, 0).unwrap(),
            0.2,
            load,
            device.to_string(),
            &TheftRule::default(),
            Severity::High,
        )
    }

    #[test]
    fn test_export_layout() {
        let rows = [sample("MTR-105", 0.18), sample("MTR-120", 0.61)];
        let data = export_csv(rows.iter()).unwrap();
        let text = String::from_utf8(data).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "time,device,source,load,theft,severity");
        assert_eq!(lines[1], "2025-03-01T08:30:00.000Z,MTR-105,0.200,0.180,SAFE,Safe");
        assert_eq!(lines[2], "2025-03-01T08:30:00.000Z,MTR-120,0.200,0.610,THEFT,High");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_export_empty_has_header_only() {
        let data = export_csv(std::iter::empty::<&Sample>()).unwrap();
        assert_eq!(String::from_utf8(data).unwrap(), "time,device,source,load,theft,severity\n");
        assert!(parse_csv(b"time,device,source,load,theft,severity\n").unwrap().is_empty());
    }

    #[test]
    fn test_round_trip_keeps_rows() {
        let service = seeded_service(31);
        let now = Utc::now();
        service.seed_reports(120, Duration::minutes(15), now);
        let filter = SampleFilter::parse(None, None, None, Some("7")).unwrap();
        let filtered = service.filtered_rows(&filter, now);

        let parsed = parse_csv(&export_csv(filtered.iter()).unwrap()).unwrap();
        assert_eq!(parsed.len(), filtered.len());
        for (row, sample) in parsed.iter().zip(&filtered) {
            assert_eq!(row.device, sample.device_id());
            assert_eq!(row.is_theft().unwrap(), sample.theft_flag());
            assert_eq!(row.severity().unwrap(), sample.severity());
        }
    }

    #[test]
    fn test_parse_rejects_foreign_header() {
        assert!(matches!(
            parse_csv(b"timestamp_ms,temp\n1000,25.0\n"),
            Err(ExportError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_file_name() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 8, 30, 5).unwrap();
        assert_eq!(export_file_name(now), "reports_2025-03-01T08-30-05Z.csv");
    }
}
