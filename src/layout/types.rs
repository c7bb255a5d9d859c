//! Core types for the layout engine

use serde::{Deserialize, Serialize};

use crate::geometry::{Direction, Vec2};

/// Pairwise directional constraints between `n` displays.
///
/// Only the upper triangle is stored (one cell per unordered pair);
/// queries with the indexes swapped invert the stored direction on the
/// fly. The inversion symmetry `C[i][j] == inv(C[j][i])` is therefore a
/// structural property rather than something callers must maintain, and
/// `C[i][i]` is always `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintMatrix {
    size: usize,
    cells: Vec<Option<Direction>>,
}

/// Triangle buffer length for `n` displays
fn triangle_len(n: usize) -> usize {
    n * n.saturating_sub(1) / 2
}

impl ConstraintMatrix {
    /// Create a matrix with no constraints between any pair
    pub fn unconstrained(size: usize) -> Self {
        Self {
            size,
            cells: vec![None; triangle_len(size)],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Cell index for `low < high`
    fn cell_index(&self, low: usize, high: usize) -> usize {
        debug_assert!(low < high && high < self.size);
        high * (high - 1) / 2 + low
    }

    /// The constraint on the ordered pair `(a, b)`, `None` when
    /// unconstrained or when `a == b`.
    pub fn get(&self, a: usize, b: usize) -> Option<Direction> {
        if a < b {
            self.cells[self.cell_index(a, b)]
        } else if b < a {
            self.cells[self.cell_index(b, a)].map(Direction::invert)
        } else {
            None
        }
    }

    /// Constrain the ordered pair `(a, b)`; the symmetric entry follows.
    /// Setting `None` removes the constraint. Self-pairs are ignored.
    pub fn set(&mut self, a: usize, b: usize, relation: Option<Direction>) {
        if a < b {
            let index = self.cell_index(a, b);
            self.cells[index] = relation;
        } else if b < a {
            let index = self.cell_index(b, a);
            self.cells[index] = relation.map(Direction::invert);
        }
    }

    /// True when no pair carries a constraint
    pub fn is_unconstrained(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }
}

/// Size limits for the virtual screen, as reported by the windowing system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenBounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Default for ScreenBounds {
    /// Unbounded above, zero below; what a backend reports overrides this
    fn default() -> Self {
        Self {
            min: Vec2::new(0, 0),
            max: Vec2::new(i32::MAX, i32::MAX),
        }
    }
}

impl ScreenBounds {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Bounds with a zero minimum, the common case outside X servers
    pub fn up_to(max: Vec2) -> Self {
        Self {
            min: Vec2::new(0, 0),
            max,
        }
    }
}

/// A solved display arrangement: the virtual-screen size, one top-left
/// position per display (in input order), and the objective value the
/// packer reached. Lower objectives mean tighter, better aligned layouts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arrangement {
    pub screen: Vec2,
    pub positions: Vec<Vec2>,
    pub objective: i64,
}
