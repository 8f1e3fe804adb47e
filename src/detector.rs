use serde::{Deserialize, Serialize};

use crate::window::Thresholds;

/// Which side of the hysteresis band the signal was last seen on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BurstPhase {
    /// Below the lower threshold since the last burst ended.
    Outside,
    /// Crossed the upper threshold and has not yet dropped below the lower one.
    Inside,
}

impl BurstPhase {
    pub fn as_f64(self) -> f64 {
        match self {
            BurstPhase::Outside => 0.0,
            BurstPhase::Inside => 1.0,
        }
    }
}

/// Burst statistics of a closed window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BurstSummary {
    /// Onsets seen in the window, `None` for the window that was open at
    /// startup.
    pub onsets: Option<u32>,
    /// Mean inter-onset gap in seconds, zero when there were no onsets.
    pub sec_per_burst: f64,
}

/// Schmitt-trigger burst detector.
///
/// Onsets are upward crossings of `thresholds.up` from the outside phase; a
/// burst ends on a downward crossing of `thresholds.down`. Between the two
/// thresholds the phase never changes.
///
/// Onset times are measured in samples since the start of the current
/// window. The gap from the previous onset (or from the window start for the
/// first one) is summed so the window mean can be reported on close.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BurstDetector {
    phase: BurstPhase,
    pts_counter: u64,
    onsets: Option<u32>,
    gap_sum: u64,
    last_onset: u64,
}

impl BurstDetector {
    pub fn new() -> Self {
        Self {
            phase: BurstPhase::Inside,
            pts_counter: 0,
            onsets: None,
            gap_sum: 0,
            last_onset: 0,
        }
    }

    /// Feeds one sample. Returns true if it started a burst.
    pub fn observe(&mut self, vm: f64, thresholds: &Thresholds) -> bool {
        match self.phase {
            BurstPhase::Outside if vm > thresholds.up => {
                self.phase = BurstPhase::Inside;
                self.onsets = self.onsets.map(|n| n.saturating_add(1));
                // a restored snapshot may carry an onset ahead of the counter
                self.gap_sum += self.pts_counter.saturating_sub(self.last_onset);
                self.last_onset = self.pts_counter;
                true
            }
            BurstPhase::Inside if vm < thresholds.down => {
                self.phase = BurstPhase::Outside;
                false
            }
            _ => false,
        }
    }

    pub fn advance(&mut self) {
        self.pts_counter += 1;
    }

    /// Summarizes the current window and starts counting a new one.
    ///
    /// `freq` is the sampling frequency of the tick that closes the window;
    /// the mean gap in samples is divided by it to get seconds.
    pub fn close_window(&mut self, freq: f64) -> BurstSummary {
        let sec_per_burst = match self.onsets {
            Some(n) if n > 0 => (self.gap_sum as f64 / n as f64) / freq,
            _ => 0.0,
        };
        let summary = BurstSummary {
            onsets: self.onsets,
            sec_per_burst,
        };

        self.pts_counter = 0;
        self.onsets = Some(0);
        self.gap_sum = 0;
        self.last_onset = 0;
        summary
    }

    pub fn phase(&self) -> BurstPhase {
        self.phase
    }

    pub fn onsets(&self) -> Option<u32> {
        self.onsets
    }

    pub fn pts_counter(&self) -> u64 {
        self.pts_counter
    }

    pub fn gap_sum(&self) -> u64 {
        self.gap_sum
    }

    pub fn last_onset(&self) -> u64 {
        self.last_onset
    }
}

impl Default for BurstDetector {
    fn default() -> Self {
        Self::new()
    }
}
