//! Layout search: enumerate templates, filter, pack, keep the best
//!
//! This is the outer driver of the layout engine. It walks every
//! sequence-pair template, skips those contradicting the user constraint
//! matrix, packs the survivors, and keeps the arrangement with the
//! smallest objective, breaking ties toward the lexicographically
//! smallest virtual-screen size. The walk order and tie-breaks are fixed,
//! so identical inputs always produce the identical arrangement.

use crate::geometry::Vec2;

use super::config::LayoutConfig;
use super::error::LayoutError;
use super::solver::Packer;
use super::template::SequencePair;
use super::types::{Arrangement, ConstraintMatrix, ScreenBounds};

/// Check the layout-engine preconditions.
///
/// Callers constructing inputs by hand can validate early; `compute_layout`
/// also validates, so going through it alone is safe.
pub fn validate_inputs(
    bounds: &ScreenBounds,
    sizes: &[Vec2],
    constraints: &ConstraintMatrix,
) -> Result<(), LayoutError> {
    if sizes.is_empty() {
        return Err(LayoutError::NoDisplays);
    }
    for (index, &size) in sizes.iter().enumerate() {
        if size.x <= 0 || size.y <= 0 {
            return Err(LayoutError::invalid_size(index, size));
        }
    }
    if bounds.min.x < 0 || bounds.min.y < 0 || bounds.min.x > bounds.max.x || bounds.min.y > bounds.max.y
    {
        return Err(LayoutError::invalid_bounds(bounds.min, bounds.max));
    }
    if constraints.size() != sizes.len() {
        return Err(LayoutError::ConstraintSizeMismatch {
            expected: sizes.len(),
            actual: constraints.size(),
        });
    }
    Ok(())
}

/// Compute the best arrangement of `sizes` inside `bounds` subject to
/// `constraints`.
///
/// Returns `Ok(None)` when every template is either rejected by the
/// constraints or cannot fit inside the bounds; this is an expected
/// outcome for contradictory or oversized inputs, not a fault.
///
/// The search is exhaustive over all `(n!)^2` templates, which is the
/// price of completeness; it is comfortable up to five displays and
/// degrades sharply beyond six.
pub fn compute_layout(
    bounds: &ScreenBounds,
    sizes: &[Vec2],
    constraints: &ConstraintMatrix,
    config: &LayoutConfig,
) -> Result<Option<Arrangement>, LayoutError> {
    validate_inputs(bounds, sizes, constraints)?;

    let mut best: Option<Arrangement> = None;
    let mut template = SequencePair::identity(sizes.len());
    loop {
        if template.admits(constraints) {
            if let Some(candidate) = Packer::new(sizes, bounds, &template, config).solve() {
                let replace = match &best {
                    None => true,
                    Some(current) => {
                        candidate.objective < current.objective
                            || (candidate.objective == current.objective
                                && candidate.screen < current.screen)
                    }
                };
                if replace {
                    best = Some(candidate);
                }
            }
        }
        if !template.advance() {
            break;
        }
    }
    Ok(best)
}
