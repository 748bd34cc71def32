// User-adjustable monitor settings
use std::time::Duration;

pub const MIN_SAMPLING_INTERVAL_SECS: u64 = 1;
pub const MAX_SAMPLING_INTERVAL_SECS: u64 = 3600;
pub const MAX_THEFT_THRESHOLD_AMPS: f64 = 10.0;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SettingsError {
    #[error("sampling interval must be a whole number of seconds between 1 and 3600, got {0}")]
    SamplingInterval(String),
    #[error("theft threshold must be above 0 and at most 10 A, got {0}")]
    TheftThreshold(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    pub notifications_enabled: bool,
    pub sampling_interval_secs: u64,
    pub theft_threshold_amps: f64,
}

impl Settings {
    /// Validate raw values. Out-of-range input is rejected, never clamped.
    pub fn validated(
        notifications_enabled: bool,
        sampling_interval_secs: f64,
        theft_threshold_amps: f64,
    ) -> Result<Self, SettingsError> {
        let interval_ok = sampling_interval_secs.is_finite()
            && sampling_interval_secs.fract() == 0.0
            && sampling_interval_secs >= MIN_SAMPLING_INTERVAL_SECS as f64
            && sampling_interval_secs <= MAX_SAMPLING_INTERVAL_SECS as f64;
        if !interval_ok {
            return Err(SettingsError::SamplingInterval(
                sampling_interval_secs.to_string(),
            ));
        }

        let threshold_ok = theft_threshold_amps.is_finite()
            && theft_threshold_amps > 0.0
            && theft_threshold_amps <= MAX_THEFT_THRESHOLD_AMPS;
        if !threshold_ok {
            return Err(SettingsError::TheftThreshold(
                theft_threshold_amps.to_string(),
            ));
        }

        Ok(Self {
            notifications_enabled,
            sampling_interval_secs: sampling_interval_secs as u64,
            theft_threshold_amps,
        })
    }

    pub fn sampling_interval(&self) -> Duration {
        Duration::from_secs(self.sampling_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_valid_values() {
        let settings = Settings::validated(true, 5.0, 0.55).unwrap();
        assert_eq!(settings.sampling_interval(), Duration::from_secs(5));
        assert_eq!(settings.theft_threshold_amps, 0.55);
    }

    #[test]
    fn test_rejects_fractional_or_out_of_range_interval() {
        assert!(matches!(
            Settings::validated(true, 2.5, 0.6),
            Err(SettingsError::SamplingInterval(_))
        ));
        assert!(Settings::validated(true, 0.0, 0.6).is_err());
        assert!(Settings::validated(true, 3601.0, 0.6).is_err());
        assert!(Settings::validated(true, f64::NAN, 0.6).is_err());
    }

    #[test]
    fn test_rejects_bad_threshold() {
        assert!(matches!(
            Settings::validated(false, 3.0, 0.0),
            Err(SettingsError::TheftThreshold(_))
        ));
        assert!(Settings::validated(false, 3.0, -1.0).is_err());
        assert!(Settings::validated(false, 3.0, f64::INFINITY).is_err());
        assert!(Settings::validated(false, 3.0, 10.5).is_err());
    }
}
