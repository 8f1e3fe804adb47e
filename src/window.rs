use serde::{Deserialize, Serialize};

/// Starting value of the in-progress minimum. Any finite sample replaces it.
pub const TEMP_MIN_SENTINEL: f64 = 999_999.0;
/// Starting value of the in-progress maximum. Any finite sample replaces it.
pub const TEMP_MAX_SENTINEL: f64 = -999_999.0;

const LOWER_FRACTION: f64 = 0.1;
const UPPER_FRACTION: f64 = 0.9;

/// Hysteresis band derived from the previous window's extrema.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Thresholds {
    pub down: f64,
    pub up: f64,
    pub range: f64,
}

impl Thresholds {
    /// 10% / 90% band over `[min, max]`.
    pub fn from_extrema(min: f64, max: f64) -> Self {
        let range = max - min;
        Self {
            down: min + range * LOWER_FRACTION,
            up: min + range * UPPER_FRACTION,
            range,
        }
    }
}

/// Rolling min/max over fixed-length observation windows.
///
/// Two sets of extrema are kept: the running pair for the window being
/// filled and the pair published when the last window closed. Thresholds are
/// always computed from the published pair, so they stay fixed for the whole
/// window under analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowTracker {
    min: f64,
    max: f64,
    temp_min: f64,
    temp_max: f64,
    count: u64,
    thresholds: Thresholds,
}

impl WindowTracker {
    pub fn new() -> Self {
        Self {
            min: 0.0,
            max: 0.0,
            temp_min: TEMP_MIN_SENTINEL,
            temp_max: TEMP_MAX_SENTINEL,
            count: 0,
            thresholds: Thresholds::default(),
        }
    }

    /// Elapsed time of the current window for the given sample period.
    pub fn elapsed(&self, period_seconds: f64) -> f64 {
        self.count as f64 * period_seconds
    }

    /// True once the elapsed time strictly exceeds the observation time.
    pub fn is_due(&self, period_seconds: f64, observation_time: f64) -> bool {
        self.elapsed(period_seconds) > observation_time
    }

    /// Closes the current window, publishing its extrema and starting a new
    /// one. Returns the published `(min, max)`.
    pub fn roll(&mut self) -> (f64, f64) {
        self.min = self.temp_min;
        self.max = self.temp_max;
        self.temp_min = TEMP_MIN_SENTINEL;
        self.temp_max = TEMP_MAX_SENTINEL;
        self.count = 0;
        (self.min, self.max)
    }

    pub fn accumulate(&mut self, vm: f64) {
        if vm < self.temp_min {
            self.temp_min = vm;
        }
        if vm > self.temp_max {
            self.temp_max = vm;
        }
    }

    pub fn refresh_thresholds(&mut self) -> Thresholds {
        self.thresholds = Thresholds::from_extrema(self.min, self.max);
        self.thresholds
    }

    pub fn advance(&mut self) {
        self.count += 1;
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn temp_min(&self) -> f64 {
        self.temp_min
    }

    pub fn temp_max(&self) -> f64 {
        self.temp_max
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }
}

impl Default for WindowTracker {
    fn default() -> Self {
        Self::new()
    }
}
