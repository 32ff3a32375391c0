//! Grid geometry: dimensions and blocked cells.
//!
//! The grid is immutable for the lifetime of a session. A cell is either
//! free or blocked ("aisle"); blocked-ness never changes at runtime.

use std::collections::HashSet;

use crate::core::types::{Action, Cell};
use crate::error::ConfigError;

/// An immutable 2-D grid with blocked cells.
#[derive(Debug, Clone)]
pub struct Grid {
    height: usize,
    width: usize,
    aisles: HashSet<Cell>,
}

impl Grid {
    /// Create a grid with the given dimensions and blocked cells.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidDimensions`] for a zero-sized grid and
    /// [`ConfigError::CellOutOfBounds`] for an aisle outside the grid.
    pub fn new(
        height: usize,
        width: usize,
        aisles: impl IntoIterator<Item = Cell>,
    ) -> Result<Self, ConfigError> {
        if height == 0 || width == 0 {
            return Err(ConfigError::InvalidDimensions { height, width });
        }
        let mut set = HashSet::new();
        for cell in aisles {
            if cell.row >= height || cell.col >= width {
                return Err(ConfigError::CellOutOfBounds {
                    cell,
                    height,
                    width,
                });
            }
            set.insert(cell);
        }
        Ok(Self {
            height,
            width,
            aisles: set,
        })
    }

    /// Create an obstacle-free grid.
    pub fn open(height: usize, width: usize) -> Result<Self, ConfigError> {
        Self::new(height, width, [])
    }

    /// Grid height in cells.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Grid width in cells.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Total number of cells.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.height * self.width
    }

    /// The blocked cells.
    pub fn aisles(&self) -> &HashSet<Cell> {
        &self.aisles
    }

    /// Whether the signed coordinates refer to an out-of-bounds or blocked
    /// position. This is the single deflection predicate used both for
    /// ground-truth movement and belief propagation.
    #[inline]
    pub fn blocked(&self, row: i32, col: i32) -> bool {
        if row < 0 || col < 0 || row as usize >= self.height || col as usize >= self.width {
            return true;
        }
        self.aisles.contains(&Cell::new(row as usize, col as usize))
    }

    /// Whether an in-bounds cell is free (not an aisle).
    #[inline]
    pub fn is_free(&self, cell: Cell) -> bool {
        cell.row < self.height && cell.col < self.width && !self.aisles.contains(&cell)
    }

    /// The in-bounds neighbor of `cell` in the direction of `action`,
    /// or `None` when the move leaves the grid. Blocked neighbors are
    /// still returned; deflection is the motion model's concern.
    pub fn neighbor(&self, cell: Cell, action: Action) -> Option<Cell> {
        let (dr, dc) = action.delta();
        let row = cell.row as i32 + dr;
        let col = cell.col as i32 + dc;
        if row < 0 || col < 0 || row as usize >= self.height || col as usize >= self.width {
            None
        } else {
            Some(Cell::new(row as usize, col as usize))
        }
    }

    /// Flat array index for a cell (row-major).
    #[inline]
    pub fn index(&self, cell: Cell) -> usize {
        cell.row * self.width + cell.col
    }

    /// Cell for a flat array index (row-major).
    #[inline]
    pub fn cell_at(&self, index: usize) -> Cell {
        Cell::new(index / self.width, index % self.width)
    }

    /// Iterate over all cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.cell_count()).map(move |i| self.cell_at(i))
    }
}
