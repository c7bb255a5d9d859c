//! The packer: instantiates one layout template as integer coordinates
//!
//! Given display sizes, virtual-screen bounds, and a sequence-pair
//! template, this module finds the integer packing that minimizes the
//! layout objective, or reports that the template cannot fit. The
//! objective sums, over every related pair, the gap between the two
//! adjacent edges along the ordering axis and the distance between the
//! two centers on the orthogonal axis, so minimizing it prefers tight,
//! visually aligned layouts.
//!
//! The template decomposes the problem per axis: each pair contributes
//! its separating inequality and gap term to the axis it is ordered
//! along, and its center-distance term to the other axis. Per axis the
//! objective is a sum of linear gap terms and absolute values of
//! position differences under box and difference constraints, a discrete
//! convex (L-natural-convex) function on the integer lattice. For such
//! functions a point with no improving `+1`/`-1` step over any subset of
//! variables is a global minimum, which is what the descent below relies
//! on. Candidates are compared by the key `(cost, extent, positions...)`,
//! so the point reached is also the lexicographically smallest minimizer:
//! height is minimized before width (the vertical axis owns the first key
//! components), and equally good displays settle by index order.

use crate::geometry::Vec2;

use super::config::LayoutConfig;
use super::template::SequencePair;
use super::types::{Arrangement, ScreenBounds};

/// One packing attempt for a fixed template.
///
/// All state is scoped to the attempt; nothing survives the call to
/// [`Packer::solve`].
pub(crate) struct Packer {
    horizontal: AxisProblem,
    vertical: AxisProblem,
}

impl Packer {
    pub fn new(
        sizes: &[Vec2],
        bounds: &ScreenBounds,
        template: &SequencePair,
        config: &LayoutConfig,
    ) -> Self {
        let mut horizontal = AxisProblem::new(
            sizes.iter().map(|size| i64::from(size.x)).collect(),
            i64::from(bounds.min.x),
            i64::from(bounds.max.x),
            config,
        );
        let mut vertical = AxisProblem::new(
            sizes.iter().map(|size| i64::from(size.y)).collect(),
            i64::from(bounds.min.y),
            i64::from(bounds.max.y),
            config,
        );

        use crate::geometry::Direction::*;
        for high in 1..sizes.len() {
            for low in 0..high {
                match template.relation(low, high) {
                    LeftOf => {
                        horizontal.order(low, high);
                        vertical.align(low, high);
                    }
                    RightOf => {
                        horizontal.order(high, low);
                        vertical.align(high, low);
                    }
                    Above => {
                        vertical.order(low, high);
                        horizontal.align(low, high);
                    }
                    Below => {
                        vertical.order(high, low);
                        horizontal.align(high, low);
                    }
                }
            }
        }

        Self {
            horizontal,
            vertical,
        }
    }

    /// The optimal packing for this template, or `None` when the template
    /// cannot fit inside the bounds. Infeasibility is an expected outcome,
    /// not an error.
    pub fn solve(&self) -> Option<Arrangement> {
        let vertical = self.vertical.solve()?;
        let horizontal = self.horizontal.solve()?;
        let positions = horizontal
            .positions
            .iter()
            .zip(&vertical.positions)
            .map(|(&x, &y)| Vec2::new(x as i32, y as i32))
            .collect();
        Some(Arrangement {
            screen: Vec2::new(horizontal.extent as i32, vertical.extent as i32),
            positions,
            objective: horizontal.cost + vertical.cost,
        })
    }
}

/// The one-dimensional slice of a packing problem along a single axis.
///
/// Variables are `extent` (the virtual-screen size on this axis) followed
/// by one position per display. Ordering constraints come from pairs the
/// template orders along this axis; alignment terms come from pairs
/// ordered along the other axis.
struct AxisProblem {
    sizes: Vec<i64>,
    min: i64,
    max: i64,
    gap_weight: i64,
    align_weight: i64,
    /// `(near, far)`: `pos[near] + size[near] <= pos[far]`, with the gap
    /// `pos[far] - pos[near] - size[near]` entering the objective
    orderings: Vec<(usize, usize)>,
    /// `(a, b, offset)`: `|pos[a] - pos[b] + offset|` enters the objective
    alignments: Vec<(usize, usize, i64)>,
}

struct AxisSolution {
    cost: i64,
    extent: i64,
    positions: Vec<i64>,
}

impl AxisProblem {
    fn new(sizes: Vec<i64>, min: i64, max: i64, config: &LayoutConfig) -> Self {
        Self {
            sizes,
            min,
            max,
            gap_weight: i64::from(config.gap_weight),
            align_weight: i64::from(config.alignment_weight),
            orderings: Vec::new(),
            alignments: Vec::new(),
        }
    }

    fn order(&mut self, near: usize, far: usize) {
        self.orderings.push((near, far));
    }

    /// Center-distance term for a pair ordered along the other axis.
    /// Centers are corner plus half size; the truncating division keeps
    /// everything integral, and truncation toward zero makes the term
    /// symmetric in its two displays.
    fn align(&mut self, a: usize, b: usize) {
        let offset = (self.sizes[a] - self.sizes[b]) / 2;
        self.alignments.push((a, b, offset));
    }

    fn cost(&self, point: &[i64]) -> i64 {
        let positions = &point[1..];
        let mut cost = 0;
        for &(near, far) in &self.orderings {
            cost += self.gap_weight * (positions[far] - positions[near] - self.sizes[near]);
        }
        for &(a, b, offset) in &self.alignments {
            cost += self.align_weight * (positions[a] - positions[b] + offset).abs();
        }
        cost
    }

    fn feasible(&self, point: &[i64]) -> bool {
        let extent = point[0];
        let positions = &point[1..];
        if extent < self.min || extent > self.max {
            return false;
        }
        if positions
            .iter()
            .zip(&self.sizes)
            .any(|(&pos, &size)| pos < 0 || pos + size > extent)
        {
            return false;
        }
        self.orderings
            .iter()
            .all(|&(near, far)| positions[near] + self.sizes[near] <= positions[far])
    }

    /// Comparison key: objective first, then the variable vector itself,
    /// extent before positions. Comparing keys is comparing the objective
    /// perturbed by an infinitesimal lexicographic preference, so the
    /// descent lands on the lexicographically smallest minimizer.
    fn lex_key<'p>(&self, point: &'p [i64]) -> Option<(i64, &'p [i64])> {
        if !self.feasible(point) {
            return None;
        }
        Some((self.cost(point), point))
    }

    fn improves(&self, candidate: &[i64], current: &[i64]) -> bool {
        match (self.lex_key(candidate), self.lex_key(current)) {
            (Some(next), Some(prev)) => next < prev,
            _ => false,
        }
    }

    fn solve(&self) -> Option<AxisSolution> {
        debug_assert!(self.min <= self.max);
        let n = self.sizes.len();

        // Start from the tightest packing: longest-path relaxation over the
        // ordering constraints (acyclic, so n passes reach a fixed point).
        let mut positions = vec![0i64; n];
        for _ in 0..n {
            let mut changed = false;
            for &(near, far) in &self.orderings {
                let lower = positions[near] + self.sizes[near];
                if positions[far] < lower {
                    positions[far] = lower;
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
        if positions
            .iter()
            .zip(&self.sizes)
            .any(|(&pos, &size)| pos + size > self.max)
        {
            return None;
        }

        let mut point: Vec<i64> = std::iter::once(self.max).chain(positions).collect();
        self.descend(&mut point);

        Some(AxisSolution {
            cost: self.cost(&point),
            extent: point[0],
            positions: point[1..].to_vec(),
        })
    }

    /// Descend until no `+1`/`-1` step over any subset of variables
    /// improves the key. Each accepted move strictly decreases the key and
    /// the domain is finite, so this terminates; by discrete convexity the
    /// terminal point is the global lexicographic minimum.
    fn descend(&self, point: &mut Vec<i64>) {
        let dim = point.len();
        loop {
            let mut moved = false;
            for mask in 1u32..(1 << dim) {
                for sign in [-1i64, 1] {
                    if self.advance_along(point, mask, sign) {
                        moved = true;
                    }
                }
            }
            if !moved {
                return;
            }
        }
    }

    /// Move along one subset direction as far as unit steps keep improving.
    ///
    /// The cost is convex along the ray and the tie-break part of the key
    /// changes by the same vector every step, so "this unit step improves"
    /// flips from true to false exactly once; exponential probing followed
    /// by a binary search finds the last improving step.
    fn advance_along(&self, point: &mut Vec<i64>, mask: u32, sign: i64) -> bool {
        let stepped = |lambda: i64| -> Vec<i64> {
            point
                .iter()
                .enumerate()
                .map(|(i, &value)| {
                    if mask & (1 << i) != 0 {
                        value + sign * lambda
                    } else {
                        value
                    }
                })
                .collect()
        };
        let unit_improves =
            |lambda: i64| -> bool { self.improves(&stepped(lambda), &stepped(lambda - 1)) };

        if !unit_improves(1) {
            return false;
        }
        let mut last_good = 1i64;
        let mut probe = 2i64;
        while unit_improves(probe) {
            last_good = probe;
            probe *= 2;
        }
        while probe - last_good > 1 {
            let mid = last_good + (probe - last_good) / 2;
            if unit_improves(mid) {
                last_good = mid;
            } else {
                probe = mid;
            }
        }
        let advanced = stepped(last_good);
        *point = advanced;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Direction;
    use crate::layout::types::ConstraintMatrix;

    fn packer(sizes: &[Vec2], max: Vec2, template: &SequencePair) -> Packer {
        Packer::new(
            sizes,
            &ScreenBounds::up_to(max),
            template,
            &LayoutConfig::default(),
        )
    }

    /// The template for n = 2 displays inducing the given relation of 0
    /// relative to 1.
    fn two_display_template(relation: Direction) -> SequencePair {
        let mut constraints = ConstraintMatrix::unconstrained(2);
        constraints.set(0, 1, Some(relation));
        let mut template = SequencePair::identity(2);
        loop {
            if template.admits(&constraints) {
                return template;
            }
            assert!(template.advance(), "no template induces {:?}", relation);
        }
    }

    #[test]
    fn test_single_display_shrinks_to_fit() {
        let template = SequencePair::identity(1);
        let solved = packer(&[Vec2::new(1920, 1080)], Vec2::new(4000, 2000), &template)
            .solve()
            .expect("single display always fits");
        assert_eq!(solved.screen, Vec2::new(1920, 1080));
        assert_eq!(solved.positions, vec![Vec2::new(0, 0)]);
        assert_eq!(solved.objective, 0);
    }

    #[test]
    fn test_extent_respects_minimum_bound() {
        let template = SequencePair::identity(1);
        let bounds = ScreenBounds::new(Vec2::new(3000, 1500), Vec2::new(4000, 2000));
        let solved = Packer::new(
            &[Vec2::new(1920, 1080)],
            &bounds,
            &template,
            &LayoutConfig::default(),
        )
        .solve()
        .expect("fits");
        assert_eq!(solved.screen, Vec2::new(3000, 1500));
        assert_eq!(solved.positions, vec![Vec2::new(0, 0)]);
    }

    #[test]
    fn test_equal_displays_pack_side_by_side() {
        let sizes = [Vec2::new(1920, 1080), Vec2::new(1920, 1080)];
        let template = two_display_template(Direction::LeftOf);
        let solved = packer(&sizes, Vec2::new(4000, 2000), &template)
            .solve()
            .expect("fits");
        assert_eq!(solved.screen, Vec2::new(3840, 1080));
        assert_eq!(solved.positions, vec![Vec2::new(0, 0), Vec2::new(1920, 0)]);
        assert_eq!(solved.objective, 0);
    }

    #[test]
    fn test_smaller_neighbor_is_center_aligned() {
        // 1280x1024 next to 1920x1080: centers match at y = 28, and the
        // center distance reaches zero there.
        let sizes = [Vec2::new(1920, 1080), Vec2::new(1280, 1024)];
        let template = two_display_template(Direction::LeftOf);
        let solved = packer(&sizes, Vec2::new(4000, 2000), &template)
            .solve()
            .expect("fits");
        assert_eq!(solved.screen, Vec2::new(3200, 1080));
        assert_eq!(solved.positions, vec![Vec2::new(0, 0), Vec2::new(1920, 28)]);
        assert_eq!(solved.objective, 0);
    }

    #[test]
    fn test_stacked_displays() {
        let sizes = [Vec2::new(1920, 1080), Vec2::new(1920, 1080)];
        let template = two_display_template(Direction::Above);
        let solved = packer(&sizes, Vec2::new(4000, 4000), &template)
            .solve()
            .expect("fits");
        assert_eq!(solved.screen, Vec2::new(1920, 2160));
        assert_eq!(solved.positions, vec![Vec2::new(0, 0), Vec2::new(0, 1080)]);
    }

    #[test]
    fn test_infeasible_when_row_exceeds_bounds() {
        let sizes = [Vec2::new(1920, 1080), Vec2::new(1920, 1080)];
        let template = two_display_template(Direction::LeftOf);
        assert!(packer(&sizes, Vec2::new(2000, 2000), &template)
            .solve()
            .is_none());
    }

    #[test]
    fn test_equal_cost_freedom_settles_at_lexicographic_minimum() {
        // Sliding both displays down together keeps the cost at zero;
        // the lexicographic key pins everything at the origin anyway.
        let sizes = [Vec2::new(1000, 1000), Vec2::new(1000, 1000)];
        let template = two_display_template(Direction::LeftOf);
        let solved = packer(&sizes, Vec2::new(4000, 4000), &template)
            .solve()
            .expect("fits");
        assert_eq!(solved.positions, vec![Vec2::new(0, 0), Vec2::new(1000, 0)]);
        assert_eq!(solved.screen, Vec2::new(2000, 1000));
    }

    #[test]
    fn test_gap_weight_zero_still_packs_tight() {
        // With no gap pressure the lexicographic tie-break alone pulls
        // positions and extent down.
        let sizes = [Vec2::new(800, 600), Vec2::new(800, 600)];
        let template = two_display_template(Direction::LeftOf);
        let config = LayoutConfig::default().with_gap_weight(0);
        let solved = Packer::new(
            &sizes,
            &ScreenBounds::up_to(Vec2::new(4000, 2000)),
            &template,
            &config,
        )
        .solve()
        .expect("fits");
        assert_eq!(solved.screen, Vec2::new(1600, 600));
        assert_eq!(solved.positions, vec![Vec2::new(0, 0), Vec2::new(800, 0)]);
    }

    #[test]
    fn test_three_display_row_is_tight() {
        let sizes = [
            Vec2::new(1920, 1080),
            Vec2::new(1920, 1080),
            Vec2::new(1920, 1080),
        ];
        // Identity template: every pair ordered left to right
        let template = SequencePair::identity(3);
        let solved = packer(&sizes, Vec2::new(6000, 2000), &template)
            .solve()
            .expect("fits");
        assert_eq!(solved.screen, Vec2::new(5760, 1080));
        assert_eq!(
            solved.positions,
            vec![Vec2::new(0, 0), Vec2::new(1920, 0), Vec2::new(3840, 0)]
        );
        // Adjacent gaps are zero; the transitive pair (0, 2) still spans
        // the middle display, which is the whole objective
        assert_eq!(solved.objective, 1920);
    }
}
