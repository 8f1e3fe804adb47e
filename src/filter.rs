use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::api::config::{BurstConfig, BurstInputs};
use crate::api::keys;
use crate::detector::{BurstDetector, BurstPhase};
use crate::util::{is_valid_period, store_if_finite, store_pair_if_finite};
use crate::window::{Thresholds, WindowTracker};

/// Values visible to the host. Each only changes to a finite value.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BurstOutputs {
    pub min: f64,
    pub max: f64,
    pub burst_duration: f64,
}

/// What a window rollover computed, published or not.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowReport {
    pub min: f64,
    pub max: f64,
    /// Onsets in the closed window, `None` for the startup window.
    pub onsets: Option<u32>,
    pub sec_per_burst: f64,
}

/// Online burst analysis of a single voltage trace.
///
/// The host drives one call of [`process`](Self::process) per sample. Each
/// observation window is summarized when it closes: its extrema become the
/// thresholds for the next window and the mean time between burst onsets is
/// published as the burst duration.
///
/// # Example
/// ```
/// # use burst_analysis::BurstFilter;
/// let mut filter = BurstFilter::new();
/// filter.set_config("observation_time", 1.0);
///
/// for i in 0..100 {
///     filter.set_input("Vm (V)", if i % 10 < 3 { -0.02 } else { -0.06 });
///     filter.process(0.01);
/// }
/// let burst_duration = filter.get_output("Burst duration (s)");
/// assert!(burst_duration >= 0.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BurstFilter {
    config: BurstConfig,
    inputs: BurstInputs,
    window: WindowTracker,
    detector: BurstDetector,
    sec_per_burst: f64,
    outputs: BurstOutputs,
}

impl BurstFilter {
    pub fn new() -> Self {
        Self::with_config(BurstConfig::default())
    }

    pub fn with_config(config: BurstConfig) -> Self {
        Self {
            config,
            inputs: BurstInputs::default(),
            window: WindowTracker::new(),
            detector: BurstDetector::new(),
            sec_per_burst: 0.0,
            outputs: BurstOutputs::default(),
        }
    }

    /// Resets every field, configuration included, to its startup value.
    pub fn init(&mut self) {
        *self = Self::new();
    }

    /// Resets the analysis state but keeps the configured window length.
    pub fn restart(&mut self) {
        *self = Self::with_config(self.config);
    }

    /// Applies a named configuration value. Unknown keys are ignored.
    pub fn set_config(&mut self, key: &str, value: f64) {
        match keys::config_setter(key) {
            Some(apply) => apply(&mut self.config, value),
            None => trace!("Ignoring unknown config key {:?}", key),
        }
    }

    /// Feeds a named input. Unknown keys and non-finite values are ignored.
    pub fn set_input(&mut self, key: &str, value: f64) {
        if let Some(apply) = keys::input_setter(key) {
            if !apply(&mut self.inputs, value) {
                trace!("Dropping non-finite {} sample {}", key, value);
            }
        }
    }

    /// Reads a named output, 0 for unknown keys.
    pub fn get_output(&self, key: &str) -> f64 {
        keys::output_getter(key).map_or(0.0, |get| get(&self.outputs))
    }

    /// Reads a named internal variable for host inspection.
    pub fn get_internal(&self, key: &str) -> Option<f64> {
        keys::internal_getter(key).map(|get| get(self))
    }

    /// Advances the analysis by one sample.
    ///
    /// `period_seconds` is the time between samples for this tick. Ticks
    /// with a non-positive or non-finite period are skipped entirely.
    /// Returns a report on the tick that closed an observation window.
    pub fn process(&mut self, period_seconds: f64) -> Option<WindowReport> {
        if !is_valid_period(period_seconds) {
            trace!("Skipping tick with period {}", period_seconds);
            return None;
        }
        let freq = 1.0 / period_seconds;
        let vm = self.inputs.vm();

        let report = if self.window.is_due(period_seconds, self.config.observation_time()) {
            Some(self.close_window(freq))
        } else {
            None
        };

        self.window.accumulate(vm);
        let thresholds = self.window.refresh_thresholds();
        self.detector.observe(vm, &thresholds);

        self.detector.advance();
        self.window.advance();
        report
    }

    fn close_window(&mut self, freq: f64) -> WindowReport {
        let (min, max) = self.window.roll();
        store_pair_if_finite((&mut self.outputs.min, &mut self.outputs.max), (min, max));

        let summary = self.detector.close_window(freq);
        self.sec_per_burst = summary.sec_per_burst;
        store_if_finite(&mut self.outputs.burst_duration, self.sec_per_burst);

        debug!(
            "Window closed: min={}, max={}, onsets={:?}, sec_per_burst={}",
            min, max, summary.onsets, summary.sec_per_burst
        );

        WindowReport {
            min,
            max,
            onsets: summary.onsets,
            sec_per_burst: summary.sec_per_burst,
        }
    }

    pub fn config(&self) -> &BurstConfig {
        &self.config
    }

    pub fn observation_time(&self) -> f64 {
        self.config.observation_time()
    }

    pub fn set_observation_time(&mut self, seconds: f64) {
        self.config.set_observation_time(seconds);
    }

    pub fn vm(&self) -> f64 {
        self.inputs.vm()
    }

    pub fn set_vm(&mut self, value: f64) -> bool {
        self.inputs.set_vm(value)
    }

    pub fn outputs(&self) -> BurstOutputs {
        self.outputs
    }

    pub fn thresholds(&self) -> Thresholds {
        self.window.thresholds()
    }

    pub fn phase(&self) -> BurstPhase {
        self.detector.phase()
    }

    /// Onsets in the current window, `None` before the first rollover.
    pub fn burst_count(&self) -> Option<u32> {
        self.detector.onsets()
    }

    pub fn sec_per_burst(&self) -> f64 {
        self.sec_per_burst
    }

    pub fn window(&self) -> &WindowTracker {
        &self.window
    }

    pub fn detector(&self) -> &BurstDetector {
        &self.detector
    }
}

impl Default for BurstFilter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};

    const VM: &str = "Vm (V)";

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn filter_with_window(seconds: f64) -> BurstFilter {
        let mut f = BurstFilter::new();
        f.set_config("observation_time", seconds);
        f
    }

    fn feed(f: &mut BurstFilter, samples: &[f64], period: f64) -> Vec<WindowReport> {
        let mut reports = Vec::new();
        for &v in samples {
            f.set_input(VM, v);
            if let Some(r) = f.process(period) {
                reports.push(r);
            }
        }
        reports
    }

    #[test]
    fn test_initial_state() {
        let f = BurstFilter::new();
        assert_eq!(f.observation_time(), 5.0);
        assert_eq!(f.vm(), 0.0);
        assert_eq!(f.phase(), BurstPhase::Inside);
        assert_eq!(f.burst_count(), None);
        assert_eq!(f.outputs(), BurstOutputs::default());
        assert_eq!(f.get_internal("temp_min"), Some(999_999.0));
        assert_eq!(f.get_internal("temp_max"), Some(-999_999.0));
        assert_eq!(f.get_internal("bogus"), None);
    }

    #[test]
    fn test_rollover_timing() {
        init_logger();
        // ceil(1.0 / 0.3) = 4 samples per window
        let mut f = filter_with_window(1.0);
        let mut closed_at = Vec::new();
        for tick in 0..13 {
            f.set_input(VM, tick as f64);
            if f.process(0.3).is_some() {
                closed_at.push(tick);
            }
        }
        assert_eq!(closed_at, vec![4, 8, 12]);
    }

    #[test]
    fn test_exact_boundary_does_not_roll() {
        let mut f = filter_with_window(1.0);
        let reports = feed(&mut f, &[0.0; 5], 0.25);
        assert!(reports.is_empty());
        assert_eq!(f.window().count(), 5);
        assert!(f.process(0.25).is_some());
    }

    #[test]
    fn test_one_window_latency() {
        let mut f = filter_with_window(1.0);
        // 10 * 0.1 does not exceed 1.0, so a window holds 11 samples
        let ramp: Vec<f64> = (1..=11).map(|i| i as f64).collect();
        assert!(feed(&mut f, &ramp, 0.1).is_empty());
        // still the startup band
        assert_eq!(f.thresholds(), Thresholds::from_extrema(0.0, 0.0));
        assert_eq!(f.get_output("Max (V)"), 0.0);

        let reports = feed(&mut f, &[20.0], 0.1);
        assert_eq!(reports.len(), 1);
        assert_eq!((reports[0].min, reports[0].max), (1.0, 11.0));
        assert_eq!(f.get_output("Min (V)"), 1.0);
        assert_eq!(f.get_output("Max (V)"), 11.0);
        // the 20.0 that opened the new window does not move the band
        assert_eq!(f.thresholds(), Thresholds::from_extrema(1.0, 11.0));
        assert_eq!(f.window().temp_max(), 20.0);
    }

    #[test]
    fn test_burst_duration_scenario() {
        init_logger();
        let mut f = filter_with_window(1.0);
        let mut window = vec![0.0, 0.0, 0.0, 0.0, 0.0, 10.0, 10.0, 0.0, 0.0, 0.0];
        window.push(0.0);

        // startup window establishes min 0 / max 10
        assert!(feed(&mut f, &window, 0.1).is_empty());

        // its first sample closes the startup window
        let reports = feed(&mut f, &window, 0.1);
        assert_eq!(reports.len(), 1);
        assert_eq!((reports[0].min, reports[0].max), (0.0, 10.0));
        assert_eq!(reports[0].onsets, None);
        assert_eq!(reports[0].sec_per_burst, 0.0);
        assert_eq!(f.get_output("Burst duration (s)"), 0.0);
        assert_eq!(f.thresholds().up, 9.0);
        assert_eq!(f.burst_count(), Some(1));

        let reports = feed(&mut f, &[0.0], 0.1);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].onsets, Some(1));
        assert!((reports[0].sec_per_burst - 0.5).abs() < 1e-9);
        assert!((f.get_output("Burst duration (s)") - 0.5).abs() < 1e-9);
        assert_eq!(f.burst_count(), Some(0));
    }

    #[test]
    fn test_startup_onsets_report_zero() {
        let mut f = filter_with_window(1.0);
        // the startup band is 0 / 0, so each swing through zero is an onset
        let startup = [-1.0, 1.0, -1.0, 1.0, -1.0, 1.0, -1.0, 1.0, 0.0, 0.0, 0.0];
        assert!(feed(&mut f, &startup, 0.1).is_empty());
        assert_eq!(f.phase(), BurstPhase::Inside);
        assert_eq!(f.burst_count(), None);

        let reports = feed(&mut f, &[0.0], 0.1);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].onsets, None);
        assert_eq!(reports[0].sec_per_burst, 0.0);
        assert_eq!(f.get_output("Burst duration (s)"), 0.0);
        assert_eq!(f.get_output("Min (V)"), -1.0);
        assert_eq!(f.get_output("Max (V)"), 1.0);
    }

    #[test]
    fn test_restored_config_clamps_window() {
        let bytes = bincode::serialize(&0.0f64).unwrap();
        let config: BurstConfig = bincode::deserialize(&bytes).unwrap();
        let mut f = BurstFilter::with_config(config);
        assert_eq!(f.observation_time(), 0.001);

        // at 0.0005 s per sample a 0.001 s window closes every third tick
        let reports = feed(&mut f, &[1.0; 5], 0.0005);
        assert_eq!(reports.len(), 1);
    }

    #[test]
    fn test_square_wave_counts_onsets() {
        let mut f = filter_with_window(2.0);
        let period = 0.1;
        // 21 samples per window
        let seed: Vec<f64> = (0..21).map(|i| if i == 3 { 10.0 } else { 0.0 }).collect();
        assert!(feed(&mut f, &seed, period).is_empty());
        feed(&mut f, &seed, period);

        for k in 1..=4u32 {
            let mut window = vec![0.0; 21];
            for b in 0..k as usize {
                window[2 + b * 4] = 10.0;
                window[3 + b * 4] = 10.0;
            }
            let reports = feed(&mut f, &window, period);
            assert_eq!(reports.len(), 1);
            assert_eq!(f.burst_count(), Some(k));
        }
        let reports = feed(&mut f, &[0.0], period);
        assert_eq!(reports[0].onsets, Some(4));
        // onsets at 2, 6, 10, 14 samples into the window
        assert!((reports[0].sec_per_burst - 0.35).abs() < 1e-9);
    }

    #[test]
    fn test_dead_band_never_chatters() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let mut f = filter_with_window(1.0);
        let mut seed = vec![0.0; 11];
        seed[5] = 10.0;
        feed(&mut f, &seed, 0.1);
        // closes the startup window: band is 1.0 .. 9.0
        assert_eq!(feed(&mut f, &[10.0], 0.1).len(), 1);
        f.set_config("observation_time", 1000.0);
        assert_eq!(f.phase(), BurstPhase::Inside);
        let onsets = f.burst_count();

        for _ in 0..200 {
            f.set_input(VM, rng.gen_range(1.01..8.99));
            assert!(f.process(0.1).is_none());
            assert_eq!(f.phase(), BurstPhase::Inside);
        }
        feed(&mut f, &[0.0], 0.1);
        assert_eq!(f.phase(), BurstPhase::Outside);
        for _ in 0..200 {
            f.set_input(VM, rng.gen_range(1.01..8.99));
            assert!(f.process(0.1).is_none());
            assert_eq!(f.phase(), BurstPhase::Outside);
        }
        assert_eq!(f.burst_count(), onsets);
    }

    #[test]
    fn test_threshold_ordering_after_rollover() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        let mut f = filter_with_window(0.5);
        for _ in 0..500 {
            f.set_input(VM, rng.gen_range(-0.08..0.03));
            if let Some(r) = f.process(0.01) {
                let t = f.thresholds();
                if r.max > r.min {
                    assert!(t.down < t.up);
                    assert!(t.down >= r.min && t.up <= r.max);
                }
            }
        }
    }

    #[test]
    fn test_non_finite_input_holds_outputs() {
        let mut f = filter_with_window(1.0);
        feed(&mut f, &[3.0; 12], 0.1);
        let before = f.outputs();
        assert_eq!(before.min, 3.0);
        assert_eq!(before.max, 3.0);

        let mut junk = vec![f64::NAN; 9];
        junk.push(f64::INFINITY);
        junk.push(f64::NEG_INFINITY);
        let reports = feed(&mut f, &junk, 0.1);
        assert_eq!(reports.len(), 1);
        assert_eq!(f.vm(), 3.0);
        assert_eq!(f.outputs(), before);
    }

    #[test]
    fn test_invalid_period_is_noop() {
        let mut f = filter_with_window(1.0);
        feed(&mut f, &[1.0, 2.0], 0.1);
        let count = f.window().count();
        let pts = f.detector().pts_counter();

        for period in [0.0, -0.1, f64::NAN, f64::NEG_INFINITY] {
            assert!(f.process(period).is_none());
        }
        assert_eq!(f.window().count(), count);
        assert_eq!(f.detector().pts_counter(), pts);
    }

    #[test]
    fn test_config_clamp_and_labels() {
        let mut f = BurstFilter::new();
        f.set_config("observation_time", 0.0);
        assert_eq!(f.observation_time(), 0.001);
        f.set_config("Observation time (s)", 3.0);
        assert_eq!(f.observation_time(), 3.0);
        f.set_config("window", 9.0);
        assert_eq!(f.observation_time(), 3.0);
    }

    #[test]
    fn test_unknown_keys() {
        let mut f = filter_with_window(1.0);
        feed(&mut f, &[2.0; 12], 0.1);
        f.set_input("Vm", 7.0);
        assert_eq!(f.vm(), 2.0);
        assert_eq!(f.get_output("Vm (V)"), 0.0);
        assert_eq!(f.get_output("min (v)"), 0.0);
        assert_eq!(f.get_output("Min (V)"), 2.0);
    }

    #[test]
    fn test_reads_are_idempotent() {
        let mut f = filter_with_window(0.2);
        feed(&mut f, &[0.0, 5.0, 1.0, 4.0, 0.0, 5.0], 0.1);
        let first: Vec<f64> = keys::OUTPUTS.iter().map(|k| f.get_output(k)).collect();
        let second: Vec<f64> = keys::OUTPUTS.iter().map(|k| f.get_output(k)).collect();
        assert_eq!(first, second);
        assert_eq!(f.get_output("Min (V)"), f.outputs().min);
    }

    #[test]
    fn test_restart_keeps_config() {
        let mut f = filter_with_window(0.5);
        feed(&mut f, &[1.0; 20], 0.1);
        f.restart();
        assert_eq!(f.observation_time(), 0.5);
        assert_eq!(f.burst_count(), None);
        assert_eq!(f.outputs(), BurstOutputs::default());

        f.init();
        assert_eq!(f.observation_time(), 5.0);
    }

    #[test]
    fn test_period_change_uses_closing_tick_frequency() {
        let mut f = filter_with_window(1.0);
        let mut seed = vec![0.0; 11];
        seed[4] = 10.0;
        assert!(feed(&mut f, &seed, 0.1).is_empty());
        assert_eq!(feed(&mut f, &seed, 0.1).len(), 1);

        // closes on a tick with twice the period: 4 samples * 0.2 s
        f.set_input(VM, 0.0);
        let report = f.process(0.2).unwrap();
        assert_eq!(report.onsets, Some(1));
        assert!((report.sec_per_burst - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_snapshot_resumes_identically() {
        let mut f = filter_with_window(0.3);
        let signal: Vec<f64> = (0..40).map(|i| ((i as f64) * 0.7).sin()).collect();
        feed(&mut f, &signal[..25], 0.05);

        let bytes = bincode::serialize(&f).unwrap();
        let mut restored: BurstFilter = bincode::deserialize(&bytes).unwrap();

        let a = feed(&mut f, &signal[25..], 0.05);
        let b = feed(&mut restored, &signal[25..], 0.05);
        assert_eq!(a, b);
        assert_eq!(f.outputs(), restored.outputs());
    }

    #[test]
    fn test_instances_are_independent_across_threads() {
        let handles: Vec<_> = (1..=4)
            .map(|n| {
                std::thread::spawn(move || {
                    let mut f = filter_with_window(0.1);
                    let samples: Vec<f64> = (0..50).map(|i| (i % 5) as f64 * n as f64).collect();
                    feed(&mut f, &samples, 0.01);
                    f.get_output("Max (V)")
                })
            })
            .collect();
        let maxima: Vec<f64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(maxima, vec![4.0, 8.0, 12.0, 16.0]);
    }
}
