pub mod plugin;
pub mod keys;
pub mod config;

pub use plugin::{HostPlugin, PluginBehavior, PluginDescriptor, PluginMetadata};
pub use config::{BurstConfig, BurstInputs};
