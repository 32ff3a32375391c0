//! Sensor model for the Bayesian correction step.
//!
//! The robot cannot see its own cell; it reads the labels of the four
//! adjacent cells (in canonical action order) through a noisy channel.
//! [`AdjacencySensor`] models that channel: each neighbor label is
//! reported correctly with probability `p_hit`, otherwise it is replaced
//! by a symbol drawn uniformly from the rest of the alphabet (the
//! distinct labels plus the "no label" symbol).
//!
//! The likelihood of a full observation is the product of the four
//! per-neighbor channel probabilities, which makes the posterior an exact
//! Bayesian update for this channel.

use std::collections::HashMap;

use rand::Rng;

use crate::core::{Action, Cell, Grid, Observation};
use crate::error::ConfigError;

/// Likelihood function for observations, evaluated per candidate cell.
pub trait SensorModel {
    /// `p(observation | robot at cell)` under this model.
    fn likelihood(&self, grid: &Grid, cell: Cell, observation: &Observation) -> f64;
}

/// Noisy reader of the four neighboring cell labels.
#[derive(Debug, Clone)]
pub struct AdjacencySensor {
    labels: HashMap<Cell, String>,
    /// Distinct label values, used as the mislabel alphabet together with
    /// the implicit "no label" symbol.
    alphabet: Vec<Option<String>>,
    p_hit: f64,
}

impl AdjacencySensor {
    /// Create a sensor over a cell-label map.
    ///
    /// # Arguments
    /// * `labels` - Labels carried by (typically blocked) cells.
    /// * `p_hit` - Probability in `(0, 1]` that a neighbor label is read
    ///   correctly. `1.0` gives a noise-free sensor.
    pub fn new(labels: HashMap<Cell, String>, p_hit: f64) -> Result<Self, ConfigError> {
        if !(p_hit > 0.0 && p_hit <= 1.0) {
            return Err(ConfigError::ProbabilityOutOfRange {
                name: "p_hit",
                value: p_hit,
            });
        }
        let mut alphabet: Vec<Option<String>> = vec![None];
        for label in labels.values() {
            if !alphabet.iter().any(|l| l.as_deref() == Some(label)) {
                alphabet.push(Some(label.clone()));
            }
        }
        Ok(Self {
            labels,
            alphabet,
            p_hit,
        })
    }

    /// The configured hit probability.
    pub fn p_hit(&self) -> f64 {
        self.p_hit
    }

    /// True label of the cell adjacent to `cell` in direction `action`
    /// (`None` for unlabeled or out-of-bounds neighbors).
    fn true_label(&self, grid: &Grid, cell: Cell, action: Action) -> Option<&str> {
        grid.neighbor(cell, action)
            .and_then(|n| self.labels.get(&n))
            .map(String::as_str)
    }

    /// Probability that the channel reports `observed` when the true
    /// symbol is `truth`.
    fn channel(&self, truth: Option<&str>, observed: Option<&str>) -> f64 {
        if truth == observed {
            self.p_hit
        } else {
            let others = self.alphabet.len().saturating_sub(1);
            if others == 0 {
                // Single-symbol alphabet: a mismatch cannot occur.
                0.0
            } else {
                (1.0 - self.p_hit) / others as f64
            }
        }
    }

    /// Sample a noisy observation of the four neighbors of `cell`.
    pub fn sample<R: Rng>(&self, grid: &Grid, cell: Cell, rng: &mut R) -> Observation {
        let mut labels: [Option<String>; 4] = [None, None, None, None];
        for action in Action::ALL {
            let truth = self.true_label(grid, cell, action).map(str::to_owned);
            let reported = if rng.gen::<f64>() < self.p_hit || self.alphabet.len() < 2 {
                truth
            } else {
                // Uniform draw among the other symbols.
                loop {
                    let pick = &self.alphabet[rng.gen_range(0..self.alphabet.len())];
                    if pick.as_deref() != truth.as_deref() {
                        break pick.clone();
                    }
                }
            };
            labels[action.canonical_index()] = reported;
        }
        Observation::new(labels)
    }
}

impl SensorModel for AdjacencySensor {
    fn likelihood(&self, grid: &Grid, cell: Cell, observation: &Observation) -> f64 {
        Action::ALL
            .iter()
            .map(|&action| {
                let truth = self.true_label(grid, cell, action);
                self.channel(truth, observation.label(action))
            })
            .product()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn labeled_grid() -> (Grid, AdjacencySensor) {
        // A 3x3 grid with a labeled aisle cell east of the center.
        let grid = Grid::new(3, 3, [Cell::new(1, 2)]).unwrap();
        let mut labels = HashMap::new();
        labels.insert(Cell::new(1, 2), "milk".to_string());
        let sensor = AdjacencySensor::new(labels, 0.9).unwrap();
        (grid, sensor)
    }

    #[test]
    fn test_p_hit_validation() {
        assert!(AdjacencySensor::new(HashMap::new(), 0.0).is_err());
        assert!(AdjacencySensor::new(HashMap::new(), 1.5).is_err());
        assert!(AdjacencySensor::new(HashMap::new(), 1.0).is_ok());
    }

    #[test]
    fn test_exact_observation_likelihood() {
        let (grid, sensor) = labeled_grid();
        let obs = Observation::new([None, None, Some("milk".to_string()), None]);
        // From (1,1): all four neighbor symbols match the truth.
        let l_match = sensor.likelihood(&grid, Cell::new(1, 1), &obs);
        assert_relative_eq!(l_match, 0.9f64.powi(4), epsilon = 1e-12);
        // From (0,0): no neighbor carries "milk", so the east reading is
        // a miss against a two-symbol alphabet.
        let l_miss = sensor.likelihood(&grid, Cell::new(0, 0), &obs);
        assert_relative_eq!(l_miss, 0.9f64.powi(3) * 0.1, epsilon = 1e-12);
        assert!(l_match > l_miss);
    }

    #[test]
    fn test_noise_free_sensor_reports_truth() {
        let grid = Grid::new(3, 3, [Cell::new(1, 2)]).unwrap();
        let mut labels = HashMap::new();
        labels.insert(Cell::new(1, 2), "milk".to_string());
        let sensor = AdjacencySensor::new(labels, 1.0).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let obs = sensor.sample(&grid, Cell::new(1, 1), &mut rng);
        assert_eq!(obs.label(Action::East), Some("milk"));
        assert_eq!(obs.label(Action::West), None);
    }

    #[test]
    fn test_sampled_observation_has_positive_likelihood() {
        let (grid, sensor) = labeled_grid();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let obs = sensor.sample(&grid, Cell::new(1, 1), &mut rng);
            assert!(sensor.likelihood(&grid, Cell::new(1, 1), &obs) > 0.0);
        }
    }
}
