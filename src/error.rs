//! Error types.
//!
//! Configuration problems are fatal at construction time. Invalid actions
//! are not errors: the simulator absorbs them as documented no-ops.
//! Numeric drift is corrected transparently and only logged.

use thiserror::Error;

use crate::core::Cell;

/// Fatal construction/validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Grid dimensions must both be positive.
    #[error("invalid grid dimensions {height}x{width}")]
    InvalidDimensions {
        /// Requested height.
        height: usize,
        /// Requested width.
        width: usize,
    },

    /// A probability parameter is outside its valid range.
    #[error("{name} = {value} is out of range")]
    ProbabilityOutOfRange {
        /// Parameter name (e.g. `p_error`, `p_hit`).
        name: &'static str,
        /// Offending value.
        value: f64,
    },

    /// The motion model's action set must be non-empty.
    #[error("empty action set")]
    EmptyActionSet,

    /// The initial candidate set must contain at least one cell.
    #[error("empty start candidate set")]
    EmptyCandidateSet,

    /// A cell lies outside the grid.
    #[error("cell {cell} is outside the {height}x{width} grid")]
    CellOutOfBounds {
        /// Offending cell.
        cell: Cell,
        /// Grid height.
        height: usize,
        /// Grid width.
        width: usize,
    },

    /// The robot cannot start on a blocked cell.
    #[error("start cell {cell} is blocked")]
    BlockedStartCell {
        /// Offending cell.
        cell: Cell,
    },

    /// An initial distribution failed validation.
    #[error("malformed belief: {reason}")]
    MalformedBelief {
        /// What was wrong with it.
        reason: String,
    },

    /// Config file I/O error.
    #[error("IO error: {0}")]
    Io(String),

    /// Config parse error.
    #[error("parse error: {0}")]
    Parse(String),
}
