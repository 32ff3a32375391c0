//! Recursive Bayesian belief filter over grid cells.
//!
//! The filter owns the distribution and exposes the two halves of the
//! classic HMM recursion:
//!
//! - [`BeliefFilter::predict`] - transition step: propagate the belief
//!   through the noisy motion model (exact convolution, no sampling);
//! - [`BeliefFilter::update`] - correction step: reweight the belief by
//!   an observation likelihood and renormalize.
//!
//! Probability mass is conserved by construction: blocked destinations
//! fold mass back onto the source cell, so the transition matrix is
//! stochastic even at grid edges and against aisles.

use crate::core::{Action, Cell, Grid, Observation};
use crate::filter::belief::{Belief, SUM_TOLERANCE};
use crate::filter::sensor::SensorModel;
use crate::motion::MotionModel;
use crate::error::ConfigError;

/// Bayesian filter tracking a distribution over robot locations.
#[derive(Debug, Clone)]
pub struct BeliefFilter {
    grid: Grid,
    motion: MotionModel,
    p_error: f64,
    belief: Belief,
}

impl BeliefFilter {
    /// Create a filter from validated parts.
    ///
    /// # Errors
    /// `p_error` must lie in `[0, 1]` and the belief must have been built
    /// for a grid of the same dimensions.
    pub fn new(
        grid: Grid,
        motion: MotionModel,
        p_error: f64,
        belief: Belief,
    ) -> Result<Self, ConfigError> {
        if !(0.0..=1.0).contains(&p_error) {
            return Err(ConfigError::ProbabilityOutOfRange {
                name: "p_error",
                value: p_error,
            });
        }
        if belief.height() != grid.height() || belief.width() != grid.width() {
            return Err(ConfigError::MalformedBelief {
                reason: format!(
                    "belief is {}x{} but grid is {}x{}",
                    belief.height(),
                    belief.width(),
                    grid.height(),
                    grid.width()
                ),
            });
        }
        Ok(Self {
            grid,
            motion,
            p_error,
            belief,
        })
    }

    /// The grid this filter runs on.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The motion model in use.
    pub fn motion(&self) -> &MotionModel {
        &self.motion
    }

    /// Actuation error probability.
    pub fn p_error(&self) -> f64 {
        self.p_error
    }

    /// Current distribution.
    pub fn belief(&self) -> &Belief {
        &self.belief
    }

    /// Transition step: advance the belief one time step under the
    /// intended action.
    ///
    /// Every source cell spreads its mass `m` to:
    /// - `resolve(cell, intended)`: `(1 - p_error) * m`;
    /// - `resolve(cell, a)` for each error alternative `a`:
    ///   `p_error / |errors| * m`.
    ///
    /// The replacement array is fully computed before it becomes visible.
    /// This is an exact O(H*W*(1+|errors|)) convolution; zero-mass cells
    /// are skipped purely as a shortcut.
    pub fn predict(&mut self, intended: Action) {
        let errors = self.motion.error_actions(intended);
        let error_share = self.p_error / errors.len() as f64;
        let survive = 1.0 - self.p_error;

        let mut next = vec![0.0; self.grid.cell_count()];
        for (cell, mass) in self.belief.iter() {
            if mass == 0.0 {
                continue;
            }
            let dest = self.motion.resolve(&self.grid, cell, intended);
            next[self.grid.index(dest)] += survive * mass;
            for &alt in &errors {
                let dest = self.motion.resolve(&self.grid, cell, alt);
                next[self.grid.index(dest)] += error_share * mass;
            }
        }
        self.belief.replace(next);
        self.check_drift("predict");
    }

    /// Correction step: multiply each cell's prior mass by the likelihood
    /// of `observation` at that cell and renormalize.
    ///
    /// If the observation has zero likelihood everywhere the prior is kept
    /// unchanged and a warning is logged; silently zeroing the belief
    /// would poison every later step.
    pub fn update<S: SensorModel + ?Sized>(&mut self, observation: &Observation, sensor: &S) {
        let mut next = vec![0.0; self.grid.cell_count()];
        let mut total = 0.0;
        for (cell, prior) in self.belief.iter() {
            if prior == 0.0 {
                continue;
            }
            let weighted = prior * sensor.likelihood(&self.grid, cell, observation);
            next[self.grid.index(cell)] = weighted;
            total += weighted;
        }
        if total <= 0.0 {
            log::warn!("observation has zero likelihood everywhere, keeping prior belief");
            return;
        }
        for v in &mut next {
            *v /= total;
        }
        self.belief.replace(next);
        self.check_drift("update");
    }

    /// Probability mass currently at `cell`.
    pub fn mass_at(&self, cell: Cell) -> f64 {
        self.belief.get(cell)
    }

    fn check_drift(&mut self, stage: &str) {
        let drift = (self.belief.sum() - 1.0).abs();
        if drift > SUM_TOLERANCE {
            let corrected = self.belief.renormalize();
            log::warn!("belief drifted by {corrected:e} after {stage}, renormalized");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::ErrorPolicy;
    use approx::assert_relative_eq;

    fn point_filter(grid: Grid, cell: Cell, p_error: f64, policy: ErrorPolicy) -> BeliefFilter {
        let belief = Belief::point_mass(&grid, cell).unwrap();
        BeliefFilter::new(grid, MotionModel::new(policy), p_error, belief).unwrap()
    }

    #[test]
    fn test_p_error_validation() {
        let grid = Grid::open(2, 2).unwrap();
        let belief = Belief::point_mass(&grid, Cell::new(0, 0)).unwrap();
        let err = BeliefFilter::new(grid, MotionModel::default(), 1.5, belief).unwrap_err();
        assert!(matches!(err, ConfigError::ProbabilityOutOfRange { .. }));
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let grid = Grid::open(2, 2).unwrap();
        let other = Grid::open(3, 3).unwrap();
        let belief = Belief::point_mass(&other, Cell::new(0, 0)).unwrap();
        let err = BeliefFilter::new(grid, MotionModel::default(), 0.1, belief).unwrap_err();
        assert!(matches!(err, ConfigError::MalformedBelief { .. }));
    }

    #[test]
    fn test_no_error_predict_is_deterministic_shift() {
        let grid = Grid::open(3, 3).unwrap();
        let mut filter = point_filter(grid, Cell::new(1, 1), 0.0, ErrorPolicy::Exact);
        filter.predict(Action::East);
        assert_relative_eq!(filter.mass_at(Cell::new(1, 2)), 1.0, epsilon = 1e-12);
        assert_relative_eq!(filter.belief().sum(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_predict_conserves_mass_with_errors() {
        let grid = Grid::new(5, 5, [Cell::new(2, 3), Cell::new(0, 1)]).unwrap();
        let belief = Belief::uniform_over(
            &grid,
            [Cell::new(0, 0), Cell::new(4, 4), Cell::new(2, 2)],
        )
        .unwrap();
        let mut filter =
            BeliefFilter::new(grid, MotionModel::new(ErrorPolicy::Adjacent), 0.2, belief).unwrap();
        for action in [Action::East, Action::North, Action::West, Action::South] {
            filter.predict(action);
            assert_relative_eq!(filter.belief().sum(), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_adjacent_error_split() {
        // Point mass away from any edge: east keeps 1-p, the
        // perpendicular neighbors split p.
        let grid = Grid::open(5, 5).unwrap();
        let mut filter = point_filter(grid, Cell::new(2, 2), 0.2, ErrorPolicy::Adjacent);
        filter.predict(Action::East);
        assert_relative_eq!(filter.mass_at(Cell::new(2, 3)), 0.8, epsilon = 1e-12);
        assert_relative_eq!(filter.mass_at(Cell::new(3, 2)), 0.1, epsilon = 1e-12);
        assert_relative_eq!(filter.mass_at(Cell::new(1, 2)), 0.1, epsilon = 1e-12);
        assert_relative_eq!(filter.mass_at(Cell::new(2, 2)), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_boundary_deflection_returns_mass_to_source() {
        let grid = Grid::open(3, 3).unwrap();
        let mut filter = point_filter(grid, Cell::new(0, 0), 0.2, ErrorPolicy::Adjacent);
        filter.predict(Action::West);
        // Intended west deflects at the edge; the north error does too.
        // Only the south error actually moves mass.
        assert_relative_eq!(filter.mass_at(Cell::new(0, 0)), 0.9, epsilon = 1e-12);
        assert_relative_eq!(filter.mass_at(Cell::new(1, 0)), 0.1, epsilon = 1e-12);
        assert_relative_eq!(filter.belief().sum(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_obstacle_deflection_matches_boundary() {
        // An aisle east of the robot behaves like the grid edge.
        let walled = Grid::new(3, 3, [Cell::new(1, 2)]).unwrap();
        let mut against_aisle = point_filter(walled, Cell::new(1, 1), 0.0, ErrorPolicy::Exact);
        against_aisle.predict(Action::East);
        assert_relative_eq!(against_aisle.mass_at(Cell::new(1, 1)), 1.0, epsilon = 1e-12);

        let edge = Grid::open(3, 2).unwrap();
        let mut against_edge = point_filter(edge, Cell::new(1, 1), 0.0, ErrorPolicy::Exact);
        against_edge.predict(Action::East);
        assert_relative_eq!(against_edge.mass_at(Cell::new(1, 1)), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_update_sharpens_belief() {
        use crate::filter::sensor::AdjacencySensor;
        use std::collections::HashMap;

        let grid = Grid::new(3, 3, [Cell::new(1, 2)]).unwrap();
        let mut labels = HashMap::new();
        labels.insert(Cell::new(1, 2), "milk".to_string());
        let sensor = AdjacencySensor::new(labels, 0.9).unwrap();

        let belief = Belief::uniform_over(&grid, [Cell::new(1, 1), Cell::new(0, 0)]).unwrap();
        let mut filter =
            BeliefFilter::new(grid, MotionModel::default(), 0.0, belief).unwrap();

        // Seeing "milk" to the east singles out (1,1) over (0,0).
        let obs = Observation::new([None, None, Some("milk".to_string()), None]);
        filter.update(&obs, &sensor);

        assert!(filter.mass_at(Cell::new(1, 1)) > filter.mass_at(Cell::new(0, 0)));
        assert_relative_eq!(filter.belief().sum(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_update_with_impossible_observation_keeps_prior() {
        use crate::filter::sensor::AdjacencySensor;
        use std::collections::HashMap;

        let grid = Grid::new(3, 3, [Cell::new(1, 2)]).unwrap();
        let mut labels = HashMap::new();
        labels.insert(Cell::new(1, 2), "milk".to_string());
        // Noise-free sensor: a wrong reading has zero likelihood.
        let sensor = AdjacencySensor::new(labels, 1.0).unwrap();

        let belief = Belief::point_mass(&grid, Cell::new(0, 0)).unwrap();
        let mut filter =
            BeliefFilter::new(grid, MotionModel::default(), 0.0, belief.clone()).unwrap();

        // (0,0) has no labeled neighbor to the west, so under a
        // noise-free channel this observation is impossible.
        let obs = Observation::new([Some("milk".to_string()), None, None, None]);
        filter.update(&obs, &sensor);
        assert_eq!(filter.belief(), &belief);
    }
}
