//! Sequence-pair enumeration of layout templates
//!
//! A sequence pair is a pair of permutations of the display indexes. The
//! relative order of two displays across the two permutations induces a
//! direction between them, so a sequence pair encodes the topology of a
//! non-overlapping packing without fixing coordinates. Iterating every
//! pair of permutations enumerates every packing topology of `n` labeled
//! rectangles, which is what makes the layout search complete.

use crate::geometry::Direction;

use super::types::ConstraintMatrix;

/// One layout template: two permutations of `{0..n-1}`.
///
/// Enumeration starts from the identity pair and visits all `(n!)^2`
/// templates through [`SequencePair::advance`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequencePair {
    a: Vec<usize>,
    b: Vec<usize>,
}

impl SequencePair {
    /// The first template: both permutations are the identity
    pub fn identity(n: usize) -> Self {
        Self {
            a: (0..n).collect(),
            b: (0..n).collect(),
        }
    }

    /// Step to the next template.
    ///
    /// Advances `a` to its next lexicographic permutation; when `a` wraps
    /// back to the identity, advances `b` instead. Returns `false` exactly
    /// once, when both permutations wrap and enumeration is complete.
    pub fn advance(&mut self) -> bool {
        next_permutation(&mut self.a) || next_permutation(&mut self.b)
    }

    /// The direction this template induces for display `i` relative to
    /// display `j`. Defined for every `i != j`; a template never leaves a
    /// pair unordered.
    pub fn relation(&self, i: usize, j: usize) -> Direction {
        debug_assert_ne!(i, j);
        match (self.a[j] > self.a[i], self.b[j] > self.b[i]) {
            (true, true) => Direction::LeftOf,
            (true, false) => Direction::Above,
            (false, true) => Direction::Below,
            (false, false) => Direction::RightOf,
        }
    }

    /// The constraint filter: a template is admissible when every
    /// user-pinned direction matches the direction it induces.
    pub fn admits(&self, constraints: &ConstraintMatrix) -> bool {
        let n = self.a.len();
        for high in 1..n {
            for low in 0..high {
                if let Some(required) = constraints.get(low, high) {
                    if required != self.relation(low, high) {
                        return false;
                    }
                }
            }
        }
        true
    }
}

/// Rearrange `perm` into its next lexicographic permutation.
///
/// Returns `false` when `perm` was the last permutation, leaving it sorted
/// ascending again (the wrap-around that drives [`SequencePair::advance`]).
fn next_permutation(perm: &mut [usize]) -> bool {
    if perm.len() < 2 {
        return false;
    }
    // Longest non-increasing suffix; the element before it is the pivot.
    let mut pivot = perm.len() - 1;
    while pivot > 0 && perm[pivot - 1] >= perm[pivot] {
        pivot -= 1;
    }
    if pivot == 0 {
        perm.reverse();
        return false;
    }
    let pivot = pivot - 1;
    // Smallest suffix element greater than the pivot, from the right
    let mut successor = perm.len() - 1;
    while perm[successor] <= perm[pivot] {
        successor -= 1;
    }
    perm.swap(pivot, successor);
    perm[pivot + 1..].reverse();
    true
}
