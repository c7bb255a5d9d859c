//! Error types for the layout engine

use thiserror::Error;

use crate::geometry::Vec2;

/// Precondition failures observable at the layout-engine boundary.
///
/// "No layout exists" is not an error; [`crate::layout::compute_layout`]
/// reports it as `Ok(None)`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    /// The size list was empty
    #[error("no displays to arrange")]
    NoDisplays,

    /// A display size was zero or negative in some component
    #[error("display {index} has non-positive size {size}")]
    InvalidSize { index: usize, size: Vec2 },

    /// Virtual-screen bounds are inverted or negative
    #[error("invalid virtual-screen bounds: min {min}, max {max}")]
    InvalidBounds { min: Vec2, max: Vec2 },

    /// The constraint matrix is not sized for the display list
    #[error("constraint matrix is {actual}x{actual}, expected {expected}x{expected}")]
    ConstraintSizeMismatch { expected: usize, actual: usize },
}

impl LayoutError {
    pub fn invalid_size(index: usize, size: Vec2) -> Self {
        Self::InvalidSize { index, size }
    }

    pub fn invalid_bounds(min: Vec2, max: Vec2) -> Self {
        Self::InvalidBounds { min, max }
    }
}
