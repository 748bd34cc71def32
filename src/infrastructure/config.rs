use crate::application::sample_generator::GeneratorProfile;
use crate::domain::sample::TheftRule;
use crate::domain::settings::Settings;
use anyhow::{ensure, Context};
use serde::Deserialize;

const MAX_SEED_ROWS: usize = 10_000;
const MAX_SEED_SPACING_MINUTES: i64 = 24 * 60;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct MonitorConfig {
    pub server: ServerSettings,
    pub sampling: SamplingSettings,
    pub classification: ClassificationSettings,
    pub history: HistorySettings,
    pub devices: DeviceSettings,
    pub auth: AuthSettings,
    pub alerts: AlertSettings,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SamplingSettings {
    pub interval_secs: u64,
    pub seed: Option<u64>,
    pub notifications: bool,
    pub spike_probability: f64,
    pub high_severity_probability: f64,
    pub seed_rows: usize,
    pub seed_spacing_minutes: i64,
}

impl Default for SamplingSettings {
    fn default() -> Self {
        Self {
            interval_secs: 3,
            seed: None,
            notifications: true,
            spike_probability: 0.07,
            high_severity_probability: 0.6,
            seed_rows: 30,
            seed_spacing_minutes: 15,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ClassificationSettings {
    pub load_threshold_amps: f64,
    pub differential_threshold_amps: f64,
}

impl Default for ClassificationSettings {
    fn default() -> Self {
        Self {
            load_threshold_amps: TheftRule::DEFAULT_LOAD_THRESHOLD,
            differential_threshold_amps: TheftRule::DEFAULT_DIFFERENTIAL_THRESHOLD,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HistorySettings {
    pub live_capacity: usize,
    pub report_capacity: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            live_capacity: 24,
            report_capacity: 500,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DeviceSettings {
    pub prefix: String,
    pub first: u32,
    pub count: u32,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            prefix: "MTR".to_string(),
            first: 100,
            count: 50,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AuthSettings {
    pub email: String,
    pub password: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            email: "admin@gmail.com".to_string(),
            password: "admin123".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AlertSettings {
    pub limit: usize,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self { limit: 50 }
    }
}

impl MonitorConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.history.live_capacity >= 1, "history.live_capacity must be at least 1");
        ensure!(self.history.report_capacity >= 1, "history.report_capacity must be at least 1");
        ensure!(
            (0.0..=1.0).contains(&self.sampling.spike_probability),
            "sampling.spike_probability must be within [0, 1]"
        );
        ensure!(
            (0.0..=1.0).contains(&self.sampling.high_severity_probability),
            "sampling.high_severity_probability must be within [0, 1]"
        );
        ensure!(
            (1..=MAX_SEED_SPACING_MINUTES).contains(&self.sampling.seed_spacing_minutes),
            "sampling.seed_spacing_minutes must be between 1 and {}",
            MAX_SEED_SPACING_MINUTES
        );
        ensure!(
            self.sampling.seed_rows <= MAX_SEED_ROWS,
            "sampling.seed_rows must be at most {}",
            MAX_SEED_ROWS
        );
        ensure!(self.devices.count >= 1, "devices.count must be at least 1");
        ensure!(
            self.classification.differential_threshold_amps.is_finite()
                && self.classification.differential_threshold_amps > 0.0,
            "classification.differential_threshold_amps must be positive"
        );
        self.initial_settings()
            .context("invalid sampling.interval_secs or classification.load_threshold_amps")?;
        Ok(())
    }

    pub fn initial_settings(&self) -> anyhow::Result<Settings> {
        Ok(Settings::validated(
            self.sampling.notifications,
            self.sampling.interval_secs as f64,
            self.classification.load_threshold_amps,
        )?)
    }

    /// Gap between back-dated report rows seeded at startup.
    pub fn seed_spacing(&self) -> anyhow::Result<chrono::Duration> {
        chrono::Duration::try_minutes(self.sampling.seed_spacing_minutes).with_context(|| {
            format!(
                "sampling.seed_spacing_minutes {} is out of range",
                self.sampling.seed_spacing_minutes
            )
        })
    }

    pub fn theft_rule(&self) -> TheftRule {
        TheftRule::new(
            self.classification.load_threshold_amps,
            self.classification.differential_threshold_amps,
        )
    }

    pub fn generator_profile(&self) -> GeneratorProfile {
        GeneratorProfile {
            spike_probability: self.sampling.spike_probability,
            high_severity_probability: self.sampling.high_severity_probability,
            device_prefix: self.devices.prefix.clone(),
            device_first: self.devices.first,
            device_count: self.devices.count,
        }
    }
}

/// Defaults, then `config/monitor.toml` if present, then `MONITOR_*` variables
/// (`MONITOR_SERVER__BIND=127.0.0.1:9000`).
pub fn load_monitor_config() -> anyhow::Result<MonitorConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/monitor").required(false))
        .add_source(
            config::Environment::with_prefix("MONITOR")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    finish(settings)
}

fn finish(settings: config::Config) -> anyhow::Result<MonitorConfig> {
    let config: MonitorConfig = settings
        .try_deserialize()
        .context("Failed to parse monitor configuration")?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn from_toml(source: &str) -> anyhow::Result<MonitorConfig> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(source, FileFormat::Toml))
            .build()?;
        finish(settings)
    }

    #[test]
    fn test_defaults() {
        let config = from_toml("").unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.history.live_capacity, 24);
        assert_eq!(config.history.report_capacity, 500);
        assert_eq!(config.theft_rule(), TheftRule::default());
        assert_eq!(config.initial_settings().unwrap().sampling_interval_secs, 3);
        assert_eq!(config.generator_profile().device_prefix, "MTR");
    }

    #[test]
    fn test_overrides() {
        let config = from_toml(
            r#"
            [sampling]
            interval_secs = 5
            seed = 42

            [classification]
            load_threshold_amps = 0.55

            [devices]
            prefix = "FDR"
            "#,
        )
        .unwrap();

        assert_eq!(config.sampling.seed, Some(42));
        assert_eq!(config.initial_settings().unwrap().theft_threshold_amps, 0.55);
        assert_eq!(config.generator_profile().device_prefix, "FDR");
        assert_eq!(config.generator_profile().device_count, 50);
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(from_toml("[history]\nlive_capacity = 0").is_err());
        assert!(from_toml("[sampling]\nspike_probability = 1.5").is_err());
        assert!(from_toml("[sampling]\ninterval_secs = 0").is_err());
        assert!(from_toml("[classification]\nload_threshold_amps = -1.0").is_err());
    }

    #[test]
    fn test_seed_bounds() {
        assert!(from_toml("[sampling]\nseed_spacing_minutes = 0").is_err());
        assert!(from_toml("[sampling]\nseed_spacing_minutes = 9223372036854775807").is_err());
        assert!(from_toml("[sampling]\nseed_rows = 1000000").is_err());

        let config = from_toml("[sampling]\nseed_spacing_minutes = 1440\nseed_rows = 10000").unwrap();
        assert_eq!(config.seed_spacing().unwrap(), chrono::Duration::days(1));
    }
}
