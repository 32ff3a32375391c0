//! Stochastic motion model: legal actions, error substitution, and the
//! boundary/obstacle deflection rule.
//!
//! The actuator is noisy: with probability `p_error` (owned by the filter
//! and the simulator, not by this model) the intended action is replaced
//! by one of its error alternatives. Which alternatives exist is the
//! [`ErrorPolicy`]'s decision; where a move actually lands is
//! [`MotionModel::resolve`]'s.

use serde::{Deserialize, Serialize};

use crate::core::{Action, Cell, Grid};
use crate::error::ConfigError;

/// Policy choosing the error alternatives for an intended action.
///
/// Expressed as a value object rather than trait inheritance: the two
/// behaviors differ only in this single computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// The only "alternative" is the intended action itself, so actuation
    /// noise cannot change the outcome.
    #[default]
    Exact,
    /// The two actions angularly adjacent to the intended one in the
    /// model's ordered action set (wrap-around predecessor and
    /// successor). With the canonical four-action set these are exactly
    /// the perpendicular moves; the intended action and its opposite are
    /// never substituted.
    Adjacent,
}

/// The legal action set and single-step transition rule.
#[derive(Debug, Clone)]
pub struct MotionModel {
    actions: Vec<Action>,
    policy: ErrorPolicy,
}

impl MotionModel {
    /// Create a model over the canonical four actions.
    pub fn new(policy: ErrorPolicy) -> Self {
        Self {
            actions: Action::ALL.to_vec(),
            policy,
        }
    }

    /// Create a model over a restricted ordered action set.
    ///
    /// # Errors
    /// Returns [`ConfigError::EmptyActionSet`] for an empty set.
    pub fn with_actions(actions: Vec<Action>, policy: ErrorPolicy) -> Result<Self, ConfigError> {
        if actions.is_empty() {
            return Err(ConfigError::EmptyActionSet);
        }
        Ok(Self { actions, policy })
    }

    /// The ordered legal action set. Order matters: the `Adjacent` policy
    /// indexes error neighbors by position in this slice.
    pub fn legal_actions(&self) -> &[Action] {
        &self.actions
    }

    /// The error policy in use.
    pub fn policy(&self) -> ErrorPolicy {
        self.policy
    }

    /// Whether `action` is a member of the legal action set.
    pub fn is_legal(&self, action: Action) -> bool {
        self.actions.contains(&action)
    }

    /// The non-empty ordered set of actions a noisy actuator may
    /// substitute for `intended`.
    ///
    /// Callers must pass a legal action; an unknown action falls back to
    /// the intended action alone, which keeps the result non-empty.
    pub fn error_actions(&self, intended: Action) -> Vec<Action> {
        match self.policy {
            ErrorPolicy::Exact => vec![intended],
            ErrorPolicy::Adjacent => {
                let len = self.actions.len();
                let Some(i) = self.actions.iter().position(|&a| a == intended) else {
                    return vec![intended];
                };
                let prev = self.actions[(i + len - 1) % len];
                let next = self.actions[(i + 1) % len];
                if prev == next {
                    // Degenerate sets (one or two actions) collapse the
                    // neighbors onto a single alternative.
                    vec![prev]
                } else {
                    vec![prev, next]
                }
            }
        }
    }

    /// Apply `action` to `cell` on `grid`.
    ///
    /// If the destination is out of bounds or blocked, the move deflects
    /// and the robot stays put. This rule is applied identically during
    /// ground-truth movement and belief propagation, which is what makes
    /// probability mass fold back onto the source instead of leaking.
    pub fn resolve(&self, grid: &Grid, cell: Cell, action: Action) -> Cell {
        let (dr, dc) = action.delta();
        let row = cell.row as i32 + dr;
        let col = cell.col as i32 + dc;
        if grid.blocked(row, col) {
            cell
        } else {
            Cell::new(row as usize, col as usize)
        }
    }
}

impl Default for MotionModel {
    fn default() -> Self {
        Self::new(ErrorPolicy::Exact)
    }
}
