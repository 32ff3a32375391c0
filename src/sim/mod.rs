//! Simulation layer: configuration and the driver-facing simulator.

pub mod config;
pub mod simulator;

pub use config::{LabeledCell, SensorConfig, SimConfig, StartConfig};
pub use simulator::{create_shared, GridSimulator, SharedSimulator, Snapshot, StepResult};
