//! Name tables for the host's string-keyed protocol.
//!
//! Hosts address signals by their display names. Each table maps an exact
//! name to an accessor on the typed structs; lookups are case-sensitive and
//! names not listed here resolve to `None`.

use super::config::{BurstConfig, BurstInputs};
use crate::filter::{BurstFilter, BurstOutputs};

pub const OBSERVATION_TIME: &str = "observation_time";
pub const OBSERVATION_TIME_LABEL: &str = "Observation time (s)";

pub const VM: &str = "Vm (V)";

pub const MIN: &str = "Min (V)";
pub const MAX: &str = "Max (V)";
pub const BURST_DURATION: &str = "Burst duration (s)";

pub type ConfigSetter = fn(&mut BurstConfig, f64);
pub type InputSetter = fn(&mut BurstInputs, f64) -> bool;
pub type OutputGetter = fn(&BurstOutputs) -> f64;
pub type InternalGetter = fn(&BurstFilter) -> f64;

pub const INPUTS: &[&str] = &[VM];
pub const OUTPUTS: &[&str] = &[MIN, MAX, BURST_DURATION];
pub const INTERNAL_VARIABLES: &[&str] = &["out_min", "out_max", "min", "max", "temp_min", "temp_max"];

static CONFIG_KEYS: [(&str, ConfigSetter); 2] = [
    (OBSERVATION_TIME, BurstConfig::set_observation_time),
    (OBSERVATION_TIME_LABEL, BurstConfig::set_observation_time),
];

static INPUT_KEYS: [(&str, InputSetter); 1] = [(VM, BurstInputs::set_vm)];

static OUTPUT_KEYS: [(&str, OutputGetter); 3] = [
    (MIN, out_min),
    (MAX, out_max),
    (BURST_DURATION, out_burst_duration),
];

static INTERNAL_KEYS: [(&str, InternalGetter); 6] = [
    ("out_min", internal_out_min),
    ("out_max", internal_out_max),
    ("min", internal_min),
    ("max", internal_max),
    ("temp_min", internal_temp_min),
    ("temp_max", internal_temp_max),
];

fn lookup<F: Copy>(table: &[(&'static str, F)], key: &str) -> Option<F> {
    table.iter().find(|(name, _)| *name == key).map(|(_, f)| *f)
}

pub fn config_setter(key: &str) -> Option<ConfigSetter> {
    lookup(&CONFIG_KEYS, key)
}

pub fn input_setter(key: &str) -> Option<InputSetter> {
    lookup(&INPUT_KEYS, key)
}

pub fn output_getter(key: &str) -> Option<OutputGetter> {
    lookup(&OUTPUT_KEYS, key)
}

pub fn internal_getter(key: &str) -> Option<InternalGetter> {
    lookup(&INTERNAL_KEYS, key)
}

fn out_min(o: &BurstOutputs) -> f64 {
    o.min
}

fn out_max(o: &BurstOutputs) -> f64 {
    o.max
}

fn out_burst_duration(o: &BurstOutputs) -> f64 {
    o.burst_duration
}

fn internal_out_min(f: &BurstFilter) -> f64 {
    f.outputs().min
}

fn internal_out_max(f: &BurstFilter) -> f64 {
    f.outputs().max
}

fn internal_min(f: &BurstFilter) -> f64 {
    f.window().min()
}

fn internal_max(f: &BurstFilter) -> f64 {
    f.window().max()
}

fn internal_temp_min(f: &BurstFilter) -> f64 {
    f.window().temp_min()
}

fn internal_temp_max(f: &BurstFilter) -> f64 {
    f.window().temp_max()
}
