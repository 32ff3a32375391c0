//! Filter layer: the belief distribution, the Bayesian recursion, and the
//! sensor model feeding its correction step.

pub mod bayes;
pub mod belief;
pub mod sensor;

pub use bayes::BeliefFilter;
pub use belief::{Belief, SUM_TOLERANCE};
pub use sensor::{AdjacencySensor, SensorModel};
