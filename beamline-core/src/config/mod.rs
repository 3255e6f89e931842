//! Configuration for propagation passes and puzzle stages

pub mod stage_desc;
pub mod trace_config;

pub use stage_desc::{FixedElement, SensorDesc, StageDesc};
pub use trace_config::{SensorResolution, SplitPolicy, TraceConfig};
