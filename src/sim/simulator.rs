//! Simulation driver surface.
//!
//! [`GridSimulator`] owns everything: the belief filter, the ground-truth
//! robot cell, the RNG, and the optional sensor. External readers never
//! share mutable state with it; [`GridSimulator::snapshot`] hands out
//! copies. Drivers that do run a concurrent renderer wrap the simulator
//! in the [`SharedSimulator`] handle and read under a lock they hold only
//! long enough to copy.

use std::sync::{Arc, RwLock};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::{Action, Cell, Grid, Observation};
use crate::error::ConfigError;
use crate::filter::{AdjacencySensor, Belief, BeliefFilter, SensorModel};
use crate::motion::MotionModel;
use crate::sim::config::{SimConfig, StartConfig};

/// Result of one simulation step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// The action the actuator actually executed. Equals the intended
    /// action when it was absorbed as illegal (no state changed).
    pub actual: Action,
    /// Ground-truth robot cell after the step.
    pub robot: Cell,
    /// Belief after the prediction step (copy).
    pub belief: Belief,
}

/// A consistent read-only view of the simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Ground-truth robot cell.
    pub robot: Cell,
    /// Belief copy.
    pub belief: Belief,
}

/// The localization simulator: noisy robot plus external observer.
#[derive(Debug)]
pub struct GridSimulator {
    filter: BeliefFilter,
    robot: Cell,
    sensor: Option<AdjacencySensor>,
    rng: StdRng,
}

impl GridSimulator {
    /// Build a simulator from a validated configuration.
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let grid = Grid::new(config.height, config.width, config.aisles.iter().copied())?;
        let motion = MotionModel::with_actions(config.actions.clone(), config.error_policy)?;

        let seed = if config.seed == 0 {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(12345)
        } else {
            config.seed
        };
        let mut rng = StdRng::seed_from_u64(seed);

        let (robot, belief) = match &config.start {
            StartConfig::Known(cell) => (*cell, Belief::point_mass(&grid, *cell)?),
            StartConfig::Uniform(cells) => {
                let robot = cells[rng.gen_range(0..cells.len())];
                (robot, Belief::uniform_over(&grid, cells.iter().copied())?)
            }
        };

        let sensor = match &config.sensor {
            Some(sensor_config) => {
                let labels = sensor_config
                    .labels
                    .iter()
                    .map(|l| (l.cell, l.label.clone()))
                    .collect();
                Some(AdjacencySensor::new(labels, sensor_config.p_hit)?)
            }
            None => None,
        };

        let filter = BeliefFilter::new(grid, motion, config.p_error, belief)?;

        Ok(Self {
            filter,
            robot,
            sensor,
            rng,
        })
    }

    /// The belief filter (read-only).
    pub fn filter(&self) -> &BeliefFilter {
        &self.filter
    }

    /// Ground-truth robot cell.
    pub fn robot(&self) -> Cell {
        self.robot
    }

    /// Advance the simulation one step.
    ///
    /// In order: the belief is propagated through the motion model under
    /// the intended action, then the actual action is sampled (with
    /// probability `p_error` a uniform choice among the error
    /// alternatives), and finally the robot moves with the same
    /// deflection rule the belief used.
    ///
    /// An action outside the legal set is absorbed: logged at debug
    /// level, no state change, current state echoed back.
    pub fn step(&mut self, intended: Action) -> StepResult {
        if !self.filter.motion().is_legal(intended) {
            log::debug!("ignoring illegal action {intended}");
            return StepResult {
                actual: intended,
                robot: self.robot,
                belief: self.filter.belief().clone(),
            };
        }

        self.filter.predict(intended);

        let actual = if self.rng.gen::<f64>() < self.filter.p_error() {
            let errors = self.filter.motion().error_actions(intended);
            errors[self.rng.gen_range(0..errors.len())]
        } else {
            intended
        };

        let grid = self.filter.grid();
        self.robot = self.filter.motion().resolve(grid, self.robot, actual);
        log::debug!("step: intended {intended}, actual {actual}, robot at {}", self.robot);

        StepResult {
            actual,
            robot: self.robot,
            belief: self.filter.belief().clone(),
        }
    }

    /// Consistent copy of robot cell and belief. Two snapshots with no
    /// step in between are equal.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            robot: self.robot,
            belief: self.filter.belief().clone(),
        }
    }

    /// Sample a noisy observation of the robot's four neighbors, or
    /// `None` when no sensor is configured.
    pub fn observe(&mut self) -> Option<Observation> {
        let sensor = self.sensor.as_ref()?;
        Some(sensor.sample(self.filter.grid(), self.robot, &mut self.rng))
    }

    /// Fold an observation into the belief.
    ///
    /// Without a configured sensor model this is a documented no-op: the
    /// belief is left untouched rather than reweighted by a guessed
    /// likelihood.
    pub fn incorporate(&mut self, observation: &Observation) {
        match &self.sensor {
            Some(sensor) => self.filter.update(observation, sensor),
            None => log::debug!("no sensor model configured, observation ignored"),
        }
    }

    /// Likelihood of an observation at a candidate cell, if a sensor is
    /// configured. Exposed for diagnostics and tests.
    pub fn likelihood(&self, cell: Cell, observation: &Observation) -> Option<f64> {
        let sensor = self.sensor.as_ref()?;
        Some(sensor.likelihood(self.filter.grid(), cell, observation))
    }
}

/// Handle type for drivers with a concurrent renderer thread.
///
/// The renderer takes `read()` and copies a [`Snapshot`]; the driver
/// takes `write()` around [`GridSimulator::step`]. Critical sections
/// stay as short as the copy.
pub type SharedSimulator = Arc<RwLock<GridSimulator>>;

/// Create a simulator wrapped in the shared handle.
pub fn create_shared(config: SimConfig) -> Result<SharedSimulator, ConfigError> {
    Ok(Arc::new(RwLock::new(GridSimulator::new(config)?)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::ErrorPolicy;
    use crate::sim::config::{LabeledCell, SensorConfig};
    use approx::assert_relative_eq;

    #[test]
    fn test_known_start_is_point_mass() {
        let sim = GridSimulator::new(SimConfig::open(3, 3, Cell::new(1, 1))).unwrap();
        assert_eq!(sim.robot(), Cell::new(1, 1));
        assert_relative_eq!(sim.filter().mass_at(Cell::new(1, 1)), 1.0);
    }

    #[test]
    fn test_uniform_start_samples_candidate() {
        let mut config = SimConfig::open(7, 7, Cell::new(0, 0));
        config.start = StartConfig::Uniform(vec![Cell::new(0, 0), Cell::new(6, 6)]);
        config.seed = 42;
        let sim = GridSimulator::new(config).unwrap();
        assert!(sim.robot() == Cell::new(0, 0) || sim.robot() == Cell::new(6, 6));
        assert_relative_eq!(sim.filter().mass_at(sim.robot()), 0.5);
    }

    #[test]
    fn test_deterministic_with_seed() {
        let mut config = SimConfig::open(5, 5, Cell::new(2, 2));
        config.p_error = 0.3;
        config.error_policy = ErrorPolicy::Adjacent;
        config.seed = 7;

        let mut a = GridSimulator::new(config.clone()).unwrap();
        let mut b = GridSimulator::new(config).unwrap();
        for _ in 0..20 {
            assert_eq!(a.step(Action::East), b.step(Action::East));
        }
    }

    #[test]
    fn test_step_without_noise_tracks_robot() {
        let mut sim = GridSimulator::new(SimConfig::open(3, 3, Cell::new(1, 1))).unwrap();
        let result = sim.step(Action::East);
        assert_eq!(result.actual, Action::East);
        assert_eq!(result.robot, Cell::new(1, 2));
        assert_relative_eq!(result.belief.get(Cell::new(1, 2)), 1.0);
    }

    #[test]
    fn test_illegal_action_is_absorbed() {
        let mut config = SimConfig::open(3, 3, Cell::new(1, 1));
        config.actions = vec![Action::East, Action::West];
        let mut sim = GridSimulator::new(config).unwrap();
        let before = sim.snapshot();
        let result = sim.step(Action::North);
        assert_eq!(result.robot, before.robot);
        assert_eq!(result.belief, before.belief);
        assert_eq!(sim.snapshot(), before);
    }

    #[test]
    fn test_snapshot_is_idempotent() {
        let mut config = SimConfig::open(4, 4, Cell::new(0, 0));
        config.p_error = 0.2;
        config.error_policy = ErrorPolicy::Adjacent;
        config.seed = 9;
        let mut sim = GridSimulator::new(config).unwrap();
        sim.step(Action::South);
        assert_eq!(sim.snapshot(), sim.snapshot());
    }

    #[test]
    fn test_observe_and_incorporate() {
        let mut config = SimConfig::open(3, 3, Cell::new(1, 1));
        config.aisles = vec![Cell::new(1, 2)];
        config.sensor = Some(SensorConfig {
            labels: vec![LabeledCell {
                cell: Cell::new(1, 2),
                label: "milk".to_string(),
            }],
            p_hit: 1.0,
        });
        config.seed = 3;
        let mut sim = GridSimulator::new(config).unwrap();

        let obs = sim.observe().expect("sensor configured");
        assert_eq!(obs.label(Action::East), Some("milk"));
        sim.incorporate(&obs);
        assert_relative_eq!(sim.filter().belief().sum(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_incorporate_without_sensor_is_noop() {
        let mut sim = GridSimulator::new(SimConfig::open(3, 3, Cell::new(1, 1))).unwrap();
        assert!(sim.observe().is_none());
        let before = sim.snapshot();
        sim.incorporate(&Observation::new([None, None, None, None]));
        assert_eq!(sim.snapshot(), before);
    }

    #[test]
    fn test_shared_handle_snapshot() {
        let handle = create_shared(SimConfig::open(3, 3, Cell::new(0, 0))).unwrap();
        {
            let mut sim = handle.write().unwrap();
            sim.step(Action::South);
        }
        let snapshot = handle.read().unwrap().snapshot();
        assert_eq!(snapshot.robot, Cell::new(1, 0));
    }
}
