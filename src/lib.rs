pub mod api;
pub mod detector;
pub mod ffi;
pub mod filter;
pub mod util;
pub mod window;

pub use api::{BurstConfig, HostPlugin, PluginDescriptor, PluginMetadata};
pub use detector::{BurstDetector, BurstPhase};
pub use filter::{BurstFilter, BurstOutputs, WindowReport};
pub use window::{Thresholds, WindowTracker};
