//! Dense probability distribution over grid cells.
//!
//! Stored as a flat row-major `Vec<f64>`, one entry per cell. All
//! constructors validate that the result is a probability distribution:
//! non-negative entries summing to 1.0 within [`SUM_TOLERANCE`].

use crate::core::{Cell, Grid};
use crate::error::ConfigError;

/// Tolerance on the total mass of a valid distribution.
pub const SUM_TOLERANCE: f64 = 1e-9;

/// A probability distribution over the cells of a grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Belief {
    values: Vec<f64>,
    height: usize,
    width: usize,
}

impl Belief {
    /// A point mass at a known start cell.
    ///
    /// # Errors
    /// The cell must be in bounds and free.
    pub fn point_mass(grid: &Grid, cell: Cell) -> Result<Self, ConfigError> {
        if cell.row >= grid.height() || cell.col >= grid.width() {
            return Err(ConfigError::CellOutOfBounds {
                cell,
                height: grid.height(),
                width: grid.width(),
            });
        }
        if !grid.is_free(cell) {
            return Err(ConfigError::BlockedStartCell { cell });
        }
        let mut values = vec![0.0; grid.cell_count()];
        values[grid.index(cell)] = 1.0;
        Ok(Self {
            values,
            height: grid.height(),
            width: grid.width(),
        })
    }

    /// Uniform mass over a non-empty candidate set.
    ///
    /// Duplicate candidates are counted once.
    pub fn uniform_over(
        grid: &Grid,
        cells: impl IntoIterator<Item = Cell>,
    ) -> Result<Self, ConfigError> {
        let mut values = vec![0.0; grid.cell_count()];
        let mut count = 0usize;
        for cell in cells {
            if cell.row >= grid.height() || cell.col >= grid.width() {
                return Err(ConfigError::CellOutOfBounds {
                    cell,
                    height: grid.height(),
                    width: grid.width(),
                });
            }
            if !grid.is_free(cell) {
                return Err(ConfigError::BlockedStartCell { cell });
            }
            let idx = grid.index(cell);
            if values[idx] == 0.0 {
                count += 1;
                values[idx] = 1.0;
            }
        }
        if count == 0 {
            return Err(ConfigError::EmptyCandidateSet);
        }
        let mass = 1.0 / count as f64;
        for v in &mut values {
            if *v > 0.0 {
                *v = mass;
            }
        }
        Ok(Self {
            values,
            height: grid.height(),
            width: grid.width(),
        })
    }

    /// Build a belief from raw row-major values.
    ///
    /// # Errors
    /// Rejects wrong length, negative mass, and totals off 1.0 beyond
    /// [`SUM_TOLERANCE`].
    pub fn from_raw(grid: &Grid, values: Vec<f64>) -> Result<Self, ConfigError> {
        if values.len() != grid.cell_count() {
            return Err(ConfigError::MalformedBelief {
                reason: format!(
                    "expected {} entries, got {}",
                    grid.cell_count(),
                    values.len()
                ),
            });
        }
        if let Some(v) = values.iter().find(|v| **v < 0.0 || !v.is_finite()) {
            return Err(ConfigError::MalformedBelief {
                reason: format!("negative or non-finite mass {v}"),
            });
        }
        let sum: f64 = values.iter().sum();
        if (sum - 1.0).abs() > SUM_TOLERANCE {
            return Err(ConfigError::MalformedBelief {
                reason: format!("total mass {sum} is not 1.0"),
            });
        }
        Ok(Self {
            values,
            height: grid.height(),
            width: grid.width(),
        })
    }

    /// Grid height this belief was built for.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Grid width this belief was built for.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Probability mass at a cell. Out-of-bounds cells carry no mass.
    #[inline]
    pub fn get(&self, cell: Cell) -> f64 {
        if cell.row >= self.height || cell.col >= self.width {
            return 0.0;
        }
        self.values[cell.row * self.width + cell.col]
    }

    /// Total mass (1.0 up to floating-point drift).
    pub fn sum(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Iterate over `(cell, mass)` pairs in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Cell, f64)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(move |(i, &v)| (Cell::new(i / self.width, i % self.width), v))
    }

    /// The cell carrying the most mass (first one in row-major order on
    /// ties), with its mass.
    pub fn argmax(&self) -> (Cell, f64) {
        let mut best = 0usize;
        for (i, v) in self.values.iter().enumerate() {
            if *v > self.values[best] {
                best = i;
            }
        }
        (
            Cell::new(best / self.width, best % self.width),
            self.values[best],
        )
    }

    /// Rescale so the total mass is exactly 1.0 and return the drift
    /// `|sum - 1|` that was corrected.
    ///
    /// Numeric drift is advisory: callers log it, nothing crashes. A
    /// zero-mass belief is left untouched (drift 1.0 is returned).
    pub fn renormalize(&mut self) -> f64 {
        let sum = self.sum();
        let drift = (sum - 1.0).abs();
        if sum > 0.0 && drift > 0.0 {
            for v in &mut self.values {
                *v /= sum;
            }
        }
        drift
    }

    /// Replace the whole distribution at once. No partial-update state is
    /// ever observable: the caller computes the full replacement first.
    pub(crate) fn replace(&mut self, values: Vec<f64>) {
        debug_assert_eq!(values.len(), self.values.len());
        self.values = values;
    }

    /// Raw row-major values (for rendering and tests).
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}
