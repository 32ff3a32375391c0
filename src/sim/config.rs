//! Simulation configuration.
//!
//! Serde-backed, loadable from YAML, validated up front: a config that
//! passes [`SimConfig::validate`] always builds a working simulator.

use serde::{Deserialize, Serialize};

use crate::core::{Action, Cell};
use crate::error::ConfigError;
use crate::motion::ErrorPolicy;

/// Where the robot starts and what the initial belief looks like.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartConfig {
    /// The start cell is known exactly: robot placed there, belief is a
    /// point mass.
    Known(Cell),
    /// The start cell is one of several candidates: robot sampled
    /// uniformly among them, belief uniform over the set.
    Uniform(Vec<Cell>),
}

/// Sensor configuration: labeled cells plus read noise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorConfig {
    /// Labels attached to cells (typically the aisle cells).
    pub labels: Vec<LabeledCell>,
    /// Probability in `(0, 1]` of reading a neighbor label correctly.
    pub p_hit: f64,
}

/// A single cell-label pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledCell {
    /// Labeled cell.
    pub cell: Cell,
    /// Label value.
    pub label: String,
}

/// Full simulator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Grid height in cells.
    pub height: usize,

    /// Grid width in cells.
    pub width: usize,

    /// Blocked cells.
    #[serde(default)]
    pub aisles: Vec<Cell>,

    /// Robot start / initial belief.
    pub start: StartConfig,

    /// Actuation error probability in `[0, 1]`.
    #[serde(default)]
    pub p_error: f64,

    /// How error alternatives are chosen.
    #[serde(default)]
    pub error_policy: ErrorPolicy,

    /// Ordered legal action set. Defaults to the canonical four.
    #[serde(default = "default_actions")]
    pub actions: Vec<Action>,

    /// Optional sensor. Without one, `observe`/`incorporate` are
    /// documented no-ops.
    #[serde(default)]
    pub sensor: Option<SensorConfig>,

    /// RNG seed for deterministic runs (0 = seed from the clock).
    #[serde(default)]
    pub seed: u64,
}

fn default_actions() -> Vec<Action> {
    Action::ALL.to_vec()
}

impl SimConfig {
    /// Config for an obstacle-free grid with a known start and no
    /// actuation noise.
    pub fn open(height: usize, width: usize, start: Cell) -> Self {
        Self {
            height,
            width,
            aisles: Vec::new(),
            start: StartConfig::Known(start),
            p_error: 0.0,
            error_policy: ErrorPolicy::Exact,
            actions: default_actions(),
            sensor: None,
            seed: 0,
        }
    }

    /// Validate every field; cheap enough to run unconditionally at
    /// construction.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.height == 0 || self.width == 0 {
            return Err(ConfigError::InvalidDimensions {
                height: self.height,
                width: self.width,
            });
        }
        if !(0.0..=1.0).contains(&self.p_error) {
            return Err(ConfigError::ProbabilityOutOfRange {
                name: "p_error",
                value: self.p_error,
            });
        }
        if self.actions.is_empty() {
            return Err(ConfigError::EmptyActionSet);
        }
        for &cell in &self.aisles {
            self.check_bounds(cell)?;
        }
        match &self.start {
            StartConfig::Known(cell) => self.check_start(*cell)?,
            StartConfig::Uniform(cells) => {
                if cells.is_empty() {
                    return Err(ConfigError::EmptyCandidateSet);
                }
                for &cell in cells {
                    self.check_start(cell)?;
                }
            }
        }
        if let Some(sensor) = &self.sensor {
            if !(sensor.p_hit > 0.0 && sensor.p_hit <= 1.0) {
                return Err(ConfigError::ProbabilityOutOfRange {
                    name: "p_hit",
                    value: sensor.p_hit,
                });
            }
            for labeled in &sensor.labels {
                self.check_bounds(labeled.cell)?;
            }
        }
        Ok(())
    }

    fn check_bounds(&self, cell: Cell) -> Result<(), ConfigError> {
        if cell.row >= self.height || cell.col >= self.width {
            return Err(ConfigError::CellOutOfBounds {
                cell,
                height: self.height,
                width: self.width,
            });
        }
        Ok(())
    }

    fn check_start(&self, cell: Cell) -> Result<(), ConfigError> {
        self.check_bounds(cell)?;
        if self.aisles.contains(&cell) {
            return Err(ConfigError::BlockedStartCell { cell });
        }
        Ok(())
    }

    /// Load configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_yaml(&contents)
    }

    /// Serialize to a YAML string.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}
