// Report filtering - search, severity, device and time window
use super::sample::{Sample, Severity};
use chrono::{DateTime, Duration, Utc};
use std::str::FromStr;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum FilterError {
    #[error("unknown time range '{0}', expected 1, 7 or 30 days")]
    UnknownRange(String),
    #[error("{0}")]
    UnknownSeverity(String),
}

/// Relative time window applied to report rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeRange {
    Last24h,
    Last7d,
    #[default]
    Last30d,
}

impl TimeRange {
    pub fn duration(&self) -> Duration {
        match self {
            TimeRange::Last24h => Duration::hours(24),
            TimeRange::Last7d => Duration::days(7),
            TimeRange::Last30d => Duration::days(30),
        }
    }

    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.duration()
    }
}

impl FromStr for TimeRange {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "24h" | "1d" => Ok(TimeRange::Last24h),
            "7" | "7d" => Ok(TimeRange::Last7d),
            "30" | "30d" => Ok(TimeRange::Last30d),
            other => Err(FilterError::UnknownRange(other.to_string())),
        }
    }
}

/// Conjunction of the report table filters. `None` means "All".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleFilter {
    pub search: Option<String>,
    pub severity: Option<Severity>,
    pub device: Option<String>,
    pub range: TimeRange,
}

impl SampleFilter {
    /// Build a filter from raw form values, treating empty and "All" as unset.
    pub fn parse(
        search: Option<&str>,
        severity: Option<&str>,
        device: Option<&str>,
        range: Option<&str>,
    ) -> Result<Self, FilterError> {
        let severity = match selection(severity) {
            Some(s) => Some(s.parse::<Severity>().map_err(FilterError::UnknownSeverity)?),
            None => None,
        };
        let range = match range.map(str::trim).filter(|r| !r.is_empty()) {
            Some(r) => r.parse()?,
            None => TimeRange::default(),
        };

        Ok(Self {
            search: search
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty()),
            severity,
            device: selection(device).map(str::to_string),
            range,
        })
    }

    pub fn matches(&self, sample: &Sample, now: DateTime<Utc>) -> bool {
        if let Some(device) = &self.device {
            if sample.device_id() != device {
                return false;
            }
        }
        if let Some(severity) = self.severity {
            if sample.severity() != severity {
                return false;
            }
        }
        if let Some(needle) = &self.search {
            let device_hit = sample.device_id().to_lowercase().contains(needle.as_str());
            let time_hit = sample
                .formatted_timestamp()
                .to_lowercase()
                .contains(needle.as_str());
            if !device_hit && !time_hit {
                return false;
            }
        }
        sample.timestamp() >= self.range.cutoff(now)
    }
}

fn selection(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}
