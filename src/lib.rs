//! disha-grid - HMM-style grid localization simulator.
//!
//! A robot moves on a 2-D grid containing blocked cells ("aisles") with a
//! noisy actuator; an external observer maintains a probability
//! distribution ("belief") over the robot's true location with a
//! recursive Bayesian filter.
//!
//! # Architecture
//!
//! The crate is organized in dependency layers:
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 sim/                        │  ← Driver surface
//! │        (config, simulator, snapshots)       │
//! └─────────────────────────────────────────────┘
//!                      │
//! ┌─────────────────────────────────────────────┐
//! │                filter/                      │  ← Bayesian recursion
//! │        (belief, predict/update, sensor)     │
//! └─────────────────────────────────────────────┘
//!                      │
//! ┌─────────────────────────────────────────────┐
//! │                motion/                      │  ← Transition rule
//! │      (action errors, deflection resolve)    │
//! └─────────────────────────────────────────────┘
//!                      │
//! ┌─────────────────────────────────────────────┐
//! │                 core/                       │  ← Foundation
//! │          (Cell, Action, Grid)               │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use disha_grid::{Action, Cell, GridSimulator, SimConfig};
//!
//! let mut sim = GridSimulator::new(SimConfig::open(3, 3, Cell::new(1, 1)))?;
//!
//! // Drive east twice; the second move deflects at the boundary.
//! sim.step(Action::East);
//! let result = sim.step(Action::East);
//! assert_eq!(result.robot, Cell::new(1, 2));
//!
//! // The observer's belief tracked the same path.
//! let snapshot = sim.snapshot();
//! assert!(snapshot.belief.get(Cell::new(1, 2)) > 0.999);
//! # Ok::<(), disha_grid::ConfigError>(())
//! ```
//!
//! # Invariants
//!
//! - The belief always sums to 1.0 (within [`SUM_TOLERANCE`]): blocked
//!   destinations fold probability back onto the source cell, so mass is
//!   conserved even at edges and against aisles.
//! - The same deflection rule governs ground-truth movement and belief
//!   propagation.
//! - Readers never share mutable state with the simulator; snapshots are
//!   copies.

pub mod core;
pub mod error;
pub mod filter;
pub mod motion;
pub mod sim;

// Re-export main types at crate root
pub use crate::core::{Action, Cell, Grid, Observation};
pub use error::ConfigError;
pub use filter::{AdjacencySensor, Belief, BeliefFilter, SensorModel, SUM_TOLERANCE};
pub use motion::{ErrorPolicy, MotionModel};
pub use sim::{
    create_shared, GridSimulator, LabeledCell, SensorConfig, SharedSimulator, SimConfig, Snapshot,
    StartConfig, StepResult,
};
