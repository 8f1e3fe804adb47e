use serde::{Deserialize, Serialize};

use super::config::BurstConfig;
use super::keys;
use crate::filter::BurstFilter;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginMetadata {
    pub name: String,
    pub kind: String,
    pub version: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PluginType {
    Standard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtendableInputs {
    None,
}

/// How the host should treat a block in its UI and scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginBehavior {
    pub supports_start_stop: bool,
    pub supports_restart: bool,
    pub supports_apply: bool,
    pub extendable_inputs: ExtendableInputs,
    pub loads_started: bool,
    pub external_window: bool,
    pub starts_expanded: bool,
    pub start_requires_connected_inputs: Vec<String>,
    pub start_requires_connected_outputs: Vec<String>,
}

/// Static description of a block type.
pub trait PluginDescriptor {
    fn name() -> &'static str;
    fn kind() -> &'static str;
    fn plugin_type() -> PluginType;
    fn inputs() -> &'static [&'static str];
    fn outputs() -> &'static [&'static str];
    fn internal_variables() -> &'static [&'static str] {
        &[]
    }
    fn default_vars() -> Vec<(&'static str, f64)> {
        Vec::new()
    }
    fn behavior() -> PluginBehavior;
}

/// Runtime side of a block as driven by the host's tick loop.
///
/// Setters never fail: values the block cannot use are dropped. Lifecycle
/// hooks may fail and the host decides what to do with the error.
pub trait HostPlugin: Send + Sync {
    fn metadata(&self) -> PluginMetadata;
    fn on_start(&mut self) -> anyhow::Result<()> { Ok(()) }
    fn on_stop(&mut self) -> anyhow::Result<()> { Ok(()) }
    fn on_restart(&mut self) -> anyhow::Result<()> { Ok(()) }

    fn set_config_value(&mut self, key: &str, value: f64);
    fn set_input_value(&mut self, key: &str, value: f64);
    fn process_tick(&mut self, tick: u64, period_seconds: f64);
    fn get_output_value(&self, key: &str) -> f64;
    fn get_internal_value(&self, _key: &str) -> Option<f64> {
        None
    }
}

impl PluginDescriptor for BurstFilter {
    fn name() -> &'static str {
        "RTHybrid Burst Analysis"
    }

    fn kind() -> &'static str {
        "rthybrid_burst_analysis"
    }

    fn plugin_type() -> PluginType {
        PluginType::Standard
    }

    fn inputs() -> &'static [&'static str] {
        keys::INPUTS
    }

    fn outputs() -> &'static [&'static str] {
        keys::OUTPUTS
    }

    fn internal_variables() -> &'static [&'static str] {
        keys::INTERNAL_VARIABLES
    }

    fn default_vars() -> Vec<(&'static str, f64)> {
        BurstConfig::default_vars()
    }

    fn behavior() -> PluginBehavior {
        PluginBehavior {
            supports_start_stop: true,
            supports_restart: true,
            supports_apply: false,
            extendable_inputs: ExtendableInputs::None,
            loads_started: false,
            external_window: false,
            starts_expanded: true,
            start_requires_connected_inputs: Vec::new(),
            start_requires_connected_outputs: Vec::new(),
        }
    }
}

impl HostPlugin for BurstFilter {
    fn metadata(&self) -> PluginMetadata {
        PluginMetadata {
            name: <Self as PluginDescriptor>::name().to_string(),
            kind: <Self as PluginDescriptor>::kind().to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: "Adaptive min/max thresholds and mean burst period of a membrane voltage".to_string(),
        }
    }

    fn on_restart(&mut self) -> anyhow::Result<()> {
        log::info!("Restarting {} (observation time {} s)", <Self as PluginDescriptor>::name(), self.observation_time());
        self.restart();
        Ok(())
    }

    fn set_config_value(&mut self, key: &str, value: f64) {
        self.set_config(key, value);
    }

    fn set_input_value(&mut self, key: &str, value: f64) {
        self.set_input(key, value);
    }

    fn process_tick(&mut self, _tick: u64, period_seconds: f64) {
        self.process(period_seconds);
    }

    fn get_output_value(&self, key: &str) -> f64 {
        self.get_output(key)
    }

    fn get_internal_value(&self, key: &str) -> Option<f64> {
        self.get_internal(key)
    }
}
