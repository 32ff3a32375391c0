//! Motion layer: the legal action set, error substitution policy, and the
//! single-step transition rule.

pub mod model;

pub use model::{ErrorPolicy, MotionModel};
