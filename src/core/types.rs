//! Fundamental types for grid localization.
//!
//! Coordinates are `(row, col)` pairs with row 0 at the top of the grid,
//! matching the convention of the action displacement vectors:
//! West `(0,-1)`, South `(1,0)`, East `(0,1)`, North `(-1,0)`.

use serde::{Deserialize, Serialize};

/// A grid cell addressed by row and column.
///
/// Always refers to an in-bounds cell once constructed through a validated
/// path; raw `(i32, i32)` arithmetic is confined to motion resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    /// Row index (0 at the top).
    pub row: usize,
    /// Column index (0 at the left).
    pub col: usize,
}

impl Cell {
    /// Create a new cell.
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// One of the four unit moves available to the robot.
///
/// The declaration order `West, South, East, North` is the canonical
/// ordering: angular neighbors for error substitution are looked up by
/// wrap-around index in this sequence. Adjacent entries are always
/// perpendicular, so the predecessor/successor of an action are exactly
/// the two moves orthogonal to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Column minus one: `(0, -1)`.
    West,
    /// Row plus one: `(1, 0)`.
    South,
    /// Column plus one: `(0, 1)`.
    East,
    /// Row minus one: `(-1, 0)`.
    North,
}

impl Action {
    /// All actions in canonical order.
    pub const ALL: [Action; 4] = [Action::West, Action::South, Action::East, Action::North];

    /// Unit displacement `(d_row, d_col)` for this action.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Action::West => (0, -1),
            Action::South => (1, 0),
            Action::East => (0, 1),
            Action::North => (-1, 0),
        }
    }

    /// The action pointing the opposite way.
    pub fn opposite(self) -> Action {
        match self {
            Action::West => Action::East,
            Action::South => Action::North,
            Action::East => Action::West,
            Action::North => Action::South,
        }
    }

    /// Index of this action in the canonical ordering.
    pub fn canonical_index(self) -> usize {
        match self {
            Action::West => 0,
            Action::South => 1,
            Action::East => 2,
            Action::North => 3,
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Action::West => "west",
            Action::South => "south",
            Action::East => "east",
            Action::North => "north",
        };
        f.write_str(name)
    }
}

/// A noisy local observation: the labels of the four neighboring cells in
/// canonical action order (west, south, east, north).
///
/// `None` means the neighbor carries no label (free cell, or out of
/// bounds). Produced by the simulator's sensor and consumed by the
/// Bayesian update step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    /// Neighbor labels indexed by [`Action::canonical_index`].
    pub labels: [Option<String>; 4],
}

impl Observation {
    /// Create an observation from the four neighbor labels in canonical
    /// action order.
    pub fn new(labels: [Option<String>; 4]) -> Self {
        Self { labels }
    }

    /// Label observed in the direction of `action`.
    pub fn label(&self, action: Action) -> Option<&str> {
        self.labels[action.canonical_index()].as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_order() {
        for (i, action) in Action::ALL.iter().enumerate() {
            assert_eq!(action.canonical_index(), i);
        }
    }

    #[test]
    fn test_deltas_are_unit_moves() {
        for action in Action::ALL {
            let (dr, dc) = action.delta();
            assert_eq!(dr.abs() + dc.abs(), 1);
        }
    }

    #[test]
    fn test_opposite_is_involution() {
        for action in Action::ALL {
            assert_eq!(action.opposite().opposite(), action);
            let (dr, dc) = action.delta();
            let (or, oc) = action.opposite().delta();
            assert_eq!((dr + or, dc + oc), (0, 0));
        }
    }

    #[test]
    fn test_canonical_neighbors_are_perpendicular() {
        // Wrap-around neighbors in the canonical ordering must be
        // orthogonal to the action itself.
        for action in Action::ALL {
            let i = action.canonical_index();
            let prev = Action::ALL[(i + 3) % 4];
            let next = Action::ALL[(i + 1) % 4];
            for neighbor in [prev, next] {
                let (dr, dc) = action.delta();
                let (nr, nc) = neighbor.delta();
                assert_eq!(dr * nr + dc * nc, 0, "{action} vs {neighbor}");
            }
        }
    }

    #[test]
    fn test_observation_lookup() {
        let obs = Observation::new([None, Some("milk".to_string()), None, None]);
        assert_eq!(obs.label(Action::South), Some("milk"));
        assert_eq!(obs.label(Action::North), None);
    }
}
