// Sample domain model - one synthetic source/load reading
use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt;
use std::str::FromStr;

/// Triage label attached to a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Safe,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Safe => "Safe",
            Severity::Medium => "Medium",
            Severity::High => "High",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "safe" => Ok(Severity::Safe),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            other => Err(format!("unknown severity '{}'", other)),
        }
    }
}

/// Threshold rule deciding whether a reading looks like tapping.
///
/// A reading is flagged when the load reaches `load_threshold` or exceeds the
/// source by at least `differential_threshold`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TheftRule {
    pub load_threshold: f64,
    pub differential_threshold: f64,
}

impl TheftRule {
    pub const DEFAULT_LOAD_THRESHOLD: f64 = 0.6;
    pub const DEFAULT_DIFFERENTIAL_THRESHOLD: f64 = 0.25;

    pub fn new(load_threshold: f64, differential_threshold: f64) -> Self {
        Self {
            load_threshold,
            differential_threshold,
        }
    }

    pub fn with_load_threshold(self, load_threshold: f64) -> Self {
        Self {
            load_threshold,
            ..self
        }
    }

    pub fn is_theft(&self, source_current: f64, load_current: f64) -> bool {
        load_current >= self.load_threshold
            || (load_current - source_current) >= self.differential_threshold
    }
}

impl Default for TheftRule {
    fn default() -> Self {
        Self::new(
            Self::DEFAULT_LOAD_THRESHOLD,
            Self::DEFAULT_DIFFERENTIAL_THRESHOLD,
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    id: String,
    timestamp: DateTime<Utc>,
    source_current: f64,
    load_current: f64,
    device_id: String,
    theft_flag: bool,
    severity: Severity,
}

impl Sample {
    /// Build a sample whose theft flag is derived from `rule`.
    ///
    /// Negative currents are floored at zero. `flagged_severity` is only used
    /// when the rule flags the reading; otherwise the severity is `Safe`.
    pub fn classified(
        id: String,
        timestamp: DateTime<Utc>,
        source_current: f64,
        load_current: f64,
        device_id: String,
        rule: &TheftRule,
        flagged_severity: Severity,
    ) -> Self {
        let source_current = source_current.max(0.0);
        let load_current = load_current.max(0.0);
        let theft_flag = rule.is_theft(source_current, load_current);
        let severity = if theft_flag {
            flagged_severity
        } else {
            Severity::Safe
        };

        Self {
            id,
            timestamp,
            source_current,
            load_current,
            device_id,
            theft_flag,
            severity,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Timestamp as shown in tables and exports, also used for free-text search.
    pub fn formatted_timestamp(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn source_current(&self) -> f64 {
        self.source_current
    }

    pub fn load_current(&self) -> f64 {
        self.load_current
    }

    /// Source minus load, as displayed on the theft status card.
    pub fn differential(&self) -> f64 {
        self.source_current - self.load_current
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn theft_flag(&self) -> bool {
        self.theft_flag
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }
}

/// Round a current to milliamp precision.
pub fn round_current(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
