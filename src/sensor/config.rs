// src/sensor/config.rs

use super::driver::{ReadingPolicy, SensorDriver};

/// Per-sensor measurement settings.
///
/// Anything left as `None` falls back to the driver's defaults.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SensorConfig {
    /// Successful readings averaged into one result. Values below 1 are
    /// treated as 1.
    pub measurements_to_average: Option<u8>,
    /// Extra attempts allowed, beyond `measurements_to_average`, to make up
    /// for failed readings.
    pub retry_budget: u8,
    /// Minimum successful readings for an averaged result to count.
    pub quorum: u8,
    /// Overrides the driver's reading policy.
    pub reading_policy: Option<ReadingPolicy>,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            measurements_to_average: None,
            retry_budget: 0,
            quorum: 1,
            reading_policy: None,
        }
    }
}

impl SensorConfig {
    pub fn with_measurements_to_average(mut self, count: u8) -> Self {
        self.measurements_to_average = Some(count);
        self
    }

    pub fn with_retry_budget(mut self, retries: u8) -> Self {
        self.retry_budget = retries;
        self
    }

    pub fn with_quorum(mut self, quorum: u8) -> Self {
        self.quorum = quorum;
        self
    }

    pub fn with_reading_policy(mut self, policy: ReadingPolicy) -> Self {
        self.reading_policy = Some(policy);
        self
    }

    pub(crate) fn measurements_to_average_for<D: SensorDriver>(&self) -> u8 {
        self.measurements_to_average
            .unwrap_or(D::DEFAULT_MEASUREMENTS_TO_AVERAGE)
            .max(1)
    }

    pub(crate) fn reading_policy_for<D: SensorDriver>(&self) -> ReadingPolicy {
        self.reading_policy.unwrap_or(D::DEFAULT_READING_POLICY)
    }
}
