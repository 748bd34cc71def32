// Sample generator - Synthetic source/load readings
use crate::application::random_source::RandomSource;
use crate::domain::sample::{round_current, Sample, Severity, TheftRule};
use chrono::{DateTime, Duration, Utc};

const SOURCE_RANGE: (f64, f64) = (0.100, 0.300);
const LOSS_RANGE: (f64, f64) = (0.005, 0.025);
const SPIKE_RANGE: (f64, f64) = (0.58, 0.63);
const ID_SUFFIX_SPAN: u32 = 1000;

#[derive(Debug, Clone)]
pub struct GeneratorProfile {
    pub spike_probability: f64,
    pub high_severity_probability: f64,
    pub device_prefix: String,
    pub device_first: u32,
    pub device_count: u32,
}

impl Default for GeneratorProfile {
    fn default() -> Self {
        Self {
            spike_probability: 0.07,
            high_severity_probability: 0.6,
            device_prefix: "MTR".to_string(),
            device_first: 100,
            device_count: 50,
        }
    }
}

pub struct SampleGenerator {
    random: Box<dyn RandomSource>,
    profile: GeneratorProfile,
    rule: TheftRule,
}

impl SampleGenerator {
    pub fn new(random: Box<dyn RandomSource>, profile: GeneratorProfile, rule: TheftRule) -> Self {
        Self {
            random,
            profile,
            rule,
        }
    }

    pub fn rule(&self) -> TheftRule {
        self.rule
    }

    /// Rule applied to samples generated from now on.
    pub fn set_rule(&mut self, rule: TheftRule) {
        self.rule = rule;
    }

    /// Produce one reading stamped with `reference_time`.
    ///
    /// Draw order: source, spike event, spike load or line loss, severity
    /// (flagged readings only), device, id suffix.
    pub fn generate(&mut self, reference_time: DateTime<Utc>) -> Sample {
        let source = self.random.uniform(SOURCE_RANGE.0, SOURCE_RANGE.1);
        let load = if self.random.bernoulli(self.profile.spike_probability) {
            self.random.uniform(SPIKE_RANGE.0, SPIKE_RANGE.1)
        } else {
            let loss = self.random.uniform(LOSS_RANGE.0, LOSS_RANGE.1);
            (source - loss).max(0.0)
        };

        let source = round_current(source);
        let load = round_current(load);

        let severity = if self.rule.is_theft(source, load) {
            if self.random.bernoulli(self.profile.high_severity_probability) {
                Severity::High
            } else {
                Severity::Medium
            }
        } else {
            Severity::Safe
        };

        let device = self
            .random
            .pick(self.profile.device_first, self.profile.device_count.max(1));
        let suffix = self.random.pick(0, ID_SUFFIX_SPAN);

        Sample::classified(
            format!("{}-{}", reference_time.timestamp_millis(), suffix),
            reference_time,
            source,
            load,
            format!("{}-{}", self.profile.device_prefix, device),
            &self.rule,
            severity,
        )
    }

    /// Back-dated readings `spacing` apart ending just before `now`, oldest first.
    pub fn seed_history(&mut self, count: usize, spacing: Duration, now: DateTime<Utc>) -> Vec<Sample> {
        (0..count)
            .map(|i| {
                let steps_back = (count - i) as i32;
                self.generate(now - spacing * steps_back)
            })
            .collect()
    }
}
