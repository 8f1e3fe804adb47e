use serde::{Deserialize, Serialize};

use crate::util::floor_at;

/// Window length used until the host configures one.
pub const DEFAULT_OBSERVATION_TIME: f64 = 5.0;
/// Shortest accepted window length, in seconds.
pub const MIN_OBSERVATION_TIME: f64 = 0.001;

/// Settings of a burst analysis block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawBurstConfig")]
pub struct BurstConfig {
    observation_time: f64,
}

/// Stored form of [`BurstConfig`], clamped on the way in.
#[derive(Deserialize)]
struct RawBurstConfig {
    observation_time: f64,
}

impl From<RawBurstConfig> for BurstConfig {
    fn from(raw: RawBurstConfig) -> Self {
        Self::new(raw.observation_time)
    }
}

impl BurstConfig {
    pub fn new(observation_time: f64) -> Self {
        Self {
            observation_time: floor_at(observation_time, MIN_OBSERVATION_TIME),
        }
    }

    /// Window length in seconds, never below [`MIN_OBSERVATION_TIME`].
    pub fn observation_time(&self) -> f64 {
        self.observation_time
    }

    pub fn set_observation_time(&mut self, seconds: f64) {
        self.observation_time = floor_at(seconds, MIN_OBSERVATION_TIME);
    }

    /// Variables the host seeds a freshly created block with.
    pub fn default_vars() -> Vec<(&'static str, f64)> {
        vec![("observation_time", DEFAULT_OBSERVATION_TIME)]
    }
}

impl Default for BurstConfig {
    fn default() -> Self {
        Self {
            observation_time: DEFAULT_OBSERVATION_TIME,
        }
    }
}

/// Latest sample fed by the host.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BurstInputs {
    vm: f64,
}

impl BurstInputs {
    pub fn vm(&self) -> f64 {
        self.vm
    }

    /// Non-finite samples are dropped and the previous value kept.
    pub fn set_vm(&mut self, value: f64) -> bool {
        crate::util::store_if_finite(&mut self.vm, value)
    }
}
