//! Foundation layer: cells, actions, observations, and grid geometry.

pub mod grid;
pub mod types;

pub use grid::Grid;
pub use types::{Action, Cell, Observation};
