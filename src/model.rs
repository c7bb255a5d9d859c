//! Output models on either side of the layout engine
//!
//! Two representations of a multi-display setup exist in the daemon. The
//! [`RelativeLayout`] is what gets remembered: which displays were
//! present, how each was transformed, and how they sat relative to each
//! other. The [`PhysicalLayout`] is what the backend speaks: absolute
//! pixel positions, modes, and the virtual-screen size. The conversions
//! between them live here; relations to positions goes through the layout
//! engine, positions to relations is the normalizer at the bottom of this
//! file.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::{Direction, Transform, Vec2};
use crate::layout::{compute_layout, ConstraintMatrix, LayoutConfig, LayoutError, ScreenBounds};

/// Stable identity of a physical display: a hash of its EDID when the
/// display provides one, the output name otherwise.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputId(pub String);

impl fmt::Display for OutputId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OutputId {
    fn from(value: &str) -> Self {
        OutputId(value.to_string())
    }
}

/// Identity of a set of connected displays: their ids, sorted.
///
/// This is the key the database stores arrangements under; the same
/// displays plugged into different connectors keep the same fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(Vec<OutputId>);

impl Fingerprint {
    pub fn from_ids<I: IntoIterator<Item = OutputId>>(ids: I) -> Self {
        let sorted: BTreeSet<OutputId> = ids.into_iter().collect();
        Fingerprint(sorted.into_iter().collect())
    }

    pub fn ids(&self) -> &[OutputId] {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut first = true;
        for id in &self.0 {
            if !first {
                f.write_str("+")?;
            }
            write!(f, "{}", id)?;
            first = false;
        }
        Ok(())
    }
}

/// Errors from converting between the two models
#[derive(Debug, Error)]
pub enum ModelError {
    /// The stored layout mentions a display that is not connected
    #[error("stored layout references unconnected display '{id}'")]
    UnknownOutput { id: OutputId },

    #[error(transparent)]
    Layout(#[from] LayoutError),
}

// ============================================================================
// Relational model (persisted)
// ============================================================================

/// One display in the relational model
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelativeOutput {
    #[serde(default)]
    pub transform: Transform,
    /// Directions toward the other displays of the set. Kept symmetric by
    /// [`RelativeLayout::set_relation`]; absent entries mean unconstrained.
    #[serde(default)]
    pub relations: BTreeMap<OutputId, Direction>,
}

/// A remembered arrangement: displays by id, their transforms, and the
/// pairwise directions between them. Carries no coordinates; those are
/// recomputed by the layout engine every time the set reappears.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelativeLayout {
    pub outputs: BTreeMap<OutputId, RelativeOutput>,
}

impl RelativeLayout {
    /// A layout over the given displays with no relations pinned
    pub fn unconstrained<I: IntoIterator<Item = OutputId>>(ids: I) -> Self {
        Self {
            outputs: ids
                .into_iter()
                .map(|id| (id, RelativeOutput::default()))
                .collect(),
        }
    }

    /// Pin (or clear, with `None`) the direction of `a` relative to `b`.
    /// The symmetric entry is kept in step. Unknown ids and self-pairs are
    /// ignored.
    pub fn set_relation(&mut self, a: &OutputId, relation: Option<Direction>, b: &OutputId) {
        if a == b || !self.outputs.contains_key(a) || !self.outputs.contains_key(b) {
            return;
        }
        match relation {
            Some(direction) => {
                if let Some(output) = self.outputs.get_mut(a) {
                    output.relations.insert(b.clone(), direction);
                }
                if let Some(output) = self.outputs.get_mut(b) {
                    output.relations.insert(a.clone(), direction.invert());
                }
            }
            None => {
                if let Some(output) = self.outputs.get_mut(a) {
                    output.relations.remove(b);
                }
                if let Some(output) = self.outputs.get_mut(b) {
                    output.relations.remove(a);
                }
            }
        }
    }

    /// The direction of `a` relative to `b`, if pinned
    pub fn relation(&self, a: &OutputId, b: &OutputId) -> Option<Direction> {
        self.outputs
            .get(a)
            .and_then(|output| output.relations.get(b).copied())
    }

    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::from_ids(self.outputs.keys().cloned())
    }
}

// ============================================================================
// Absolute model (backend boundary)
// ============================================================================

/// One output as the backend sees it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicalOutput {
    pub enabled: bool,
    #[serde(default)]
    pub transform: Transform,
    /// Active mode size, before the transform is applied
    pub mode_size: Vec2,
    /// The mode the daemon selects when it drives this output
    pub preferred_size: Vec2,
    /// Top-left corner in the virtual screen; meaningful when enabled
    #[serde(default)]
    pub position: Vec2,
    /// Stable identity; `None` when the display exposes no usable EDID
    #[serde(default)]
    pub id: Option<OutputId>,
}

impl PhysicalOutput {
    /// The rectangle footprint on the virtual screen
    pub fn effective_size(&self) -> Vec2 {
        self.transform.apply_to_size(self.mode_size)
    }
}

/// The backend's view of the current state: outputs by connector name,
/// the virtual-screen size, and the server's virtual-screen limits.
///
/// Equality is field equality and doubles as the self-move suppressor:
/// after the daemon applies a layout, the change event the backend echoes
/// back compares equal and is dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicalLayout {
    pub outputs: BTreeMap<String, PhysicalOutput>,
    #[serde(default)]
    pub screen_size: Vec2,
    #[serde(default)]
    pub bounds: ScreenBounds,
}

impl PhysicalLayout {
    /// Whether every connected output carries a distinct id.
    ///
    /// Without that, the set cannot be fingerprinted and nothing about it
    /// can be learned or recalled.
    pub fn ids_valid(&self) -> bool {
        let ids: Vec<&OutputId> = self.outputs.values().filter_map(|o| o.id.as_ref()).collect();
        if ids.len() != self.outputs.len() {
            return false;
        }
        let distinct: BTreeSet<&OutputId> = ids.iter().copied().collect();
        distinct.len() == ids.len()
    }

    /// Identity of the connected display set. Outputs without ids are
    /// skipped; call [`PhysicalLayout::ids_valid`] first when that matters.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::from_ids(self.outputs.values().filter_map(|o| o.id.clone()))
    }

    /// Whether this state is outside what the relational model expresses:
    /// disabled outputs, unusable ids, a non-preferred mode, or displays
    /// that overlap (mirroring included). Such states are observed but
    /// never learned.
    pub fn is_manual(&self) -> bool {
        if self.outputs.values().any(|o| !o.enabled) {
            return true;
        }
        if !self.ids_valid() {
            return true;
        }
        if self
            .outputs
            .values()
            .any(|o| o.mode_size != o.preferred_size)
        {
            return true;
        }
        self.pairs().any(|(a, b)| rectangles_overlap(a, b))
    }

    /// Unordered output pairs, in connector-name order
    fn pairs(&self) -> impl Iterator<Item = (&PhysicalOutput, &PhysicalOutput)> {
        let outputs: Vec<&PhysicalOutput> = self.outputs.values().collect();
        let mut result = Vec::new();
        for (index, &a) in outputs.iter().enumerate() {
            for &b in &outputs[index + 1..] {
                result.push((a, b));
            }
        }
        result.into_iter()
    }

    /// The normalizer: learn a relational layout from observed positions.
    ///
    /// Every pair of displays receives the direction of its widest
    /// separation. Returns `None` for states the relational model cannot
    /// express; the caller keeps its previous state in that case.
    pub fn to_relative(&self) -> Option<RelativeLayout> {
        if self.is_manual() {
            return None;
        }
        let mut relative = RelativeLayout {
            outputs: self
                .outputs
                .values()
                .map(|output| {
                    let id = output.id.clone()?;
                    Some((
                        id,
                        RelativeOutput {
                            transform: output.transform,
                            relations: BTreeMap::new(),
                        },
                    ))
                })
                .collect::<Option<BTreeMap<_, _>>>()?,
        };
        for (a, b) in self.pairs() {
            let direction = infer_relation(a, b)?;
            let (id_a, id_b) = (a.id.clone()?, b.id.clone()?);
            relative.set_relation(&id_a, Some(direction), &id_b);
        }
        Some(relative)
    }

    /// Realize a relational layout against this physical state: solve for
    /// positions and produce the layout to hand to the backend.
    ///
    /// Preferred modes and the stored transforms are applied; `Ok(None)`
    /// means the arrangement does not fit the virtual-screen bounds.
    pub fn realize(
        &self,
        relative: &RelativeLayout,
        config: &LayoutConfig,
    ) -> Result<Option<PhysicalLayout>, ModelError> {
        let mut name_of: BTreeMap<&OutputId, &str> = BTreeMap::new();
        for (name, output) in &self.outputs {
            if let Some(id) = &output.id {
                name_of.insert(id, name);
            }
        }

        // Display order is the sorted id order of the relational layout
        let mut sizes = Vec::with_capacity(relative.outputs.len());
        let mut names = Vec::with_capacity(relative.outputs.len());
        for (id, stored) in &relative.outputs {
            let name = name_of
                .get(id)
                .ok_or_else(|| ModelError::UnknownOutput { id: id.clone() })?;
            let physical = &self.outputs[*name];
            sizes.push(stored.transform.apply_to_size(physical.preferred_size));
            names.push(*name);
        }

        let ids: Vec<&OutputId> = relative.outputs.keys().collect();
        let mut constraints = ConstraintMatrix::unconstrained(ids.len());
        for (i, (_, stored)) in relative.outputs.iter().enumerate() {
            for (j, id_b) in ids.iter().enumerate().skip(i + 1) {
                if let Some(direction) = stored.relations.get(*id_b) {
                    constraints.set(i, j, Some(*direction));
                }
            }
        }

        let Some(arrangement) = compute_layout(&self.bounds, &sizes, &constraints, config)? else {
            return Ok(None);
        };

        let mut outputs = BTreeMap::new();
        for (((id, stored), name), position) in relative
            .outputs
            .iter()
            .zip(&names)
            .zip(&arrangement.positions)
        {
            let physical = &self.outputs[*name];
            outputs.insert(
                name.to_string(),
                PhysicalOutput {
                    enabled: true,
                    transform: stored.transform,
                    mode_size: physical.preferred_size,
                    preferred_size: physical.preferred_size,
                    position: *position,
                    id: Some(id.clone()),
                },
            );
        }
        Ok(Some(PhysicalLayout {
            outputs,
            screen_size: arrangement.screen,
            bounds: self.bounds,
        }))
    }
}

fn rectangles_overlap(a: &PhysicalOutput, b: &PhysicalOutput) -> bool {
    let a_end = a.position + a.effective_size();
    let b_end = b.position + b.effective_size();
    !(b.position.x >= a_end.x
        || b.position.y >= a_end.y
        || a.position.x >= b_end.x
        || a.position.y >= b_end.y)
}

/// Direction of `a` relative to `b` from their observed rectangles.
///
/// The pair is judged on each axis separately; a zero gap (touching)
/// counts as separated. When the rectangles are separated on both axes
/// the axis with the wider gap wins, X on ties. `None` means the pair
/// overlaps on both axes (mirrored or stacked displays) and cannot be
/// expressed as a direction.
pub fn infer_relation(a: &PhysicalOutput, b: &PhysicalOutput) -> Option<Direction> {
    let a_end = a.position + a.effective_size();
    let b_end = b.position + b.effective_size();
    let gap_x = (b.position.x - a_end.x).max(a.position.x - b_end.x);
    let gap_y = (b.position.y - a_end.y).max(a.position.y - b_end.y);
    if gap_x < 0 && gap_y < 0 {
        return None;
    }
    let direction = if gap_x >= gap_y {
        if a_end.x <= b.position.x {
            Direction::LeftOf
        } else {
            Direction::RightOf
        }
    } else if a_end.y <= b.position.y {
        Direction::Above
    } else {
        Direction::Below
    };
    Some(direction)
}
