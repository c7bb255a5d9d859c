//! Geometric primitives shared by the layout engine and the output models

use std::fmt;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// An integer 2D vector, used for pixel sizes and positions.
///
/// The derived `Ord` compares `x` before `y`, which is the lexicographic
/// ordering the layout search uses to break ties between equally good
/// virtual-screen sizes.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Vec2 {
    pub x: i32,
    pub y: i32,
}

impl Vec2 {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Swap the two components (width/height exchange under rotation)
    pub fn swapped(self) -> Self {
        Self {
            x: self.y,
            y: self.x,
        }
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl fmt::Display for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}x{}", self.x, self.y)
    }
}

/// Relative placement of one display with respect to another.
///
/// "No relation" is represented as `Option<Direction>::None` wherever a
/// relation may be absent; inversion maps absence to absence through
/// `Option::map`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    LeftOf,
    RightOf,
    Above,
    Below,
}

impl Direction {
    /// The same relation seen from the other display.
    ///
    /// For any stored pair, `rel(a, b) == rel(b, a).invert()`.
    pub fn invert(self) -> Self {
        match self {
            Direction::LeftOf => Direction::RightOf,
            Direction::RightOf => Direction::LeftOf,
            Direction::Above => Direction::Below,
            Direction::Below => Direction::Above,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Direction::LeftOf => "left-of",
            Direction::RightOf => "right-of",
            Direction::Above => "above",
            Direction::Below => "below",
        };
        f.write_str(name)
    }
}

/// Quarter-turn rotations, counter-clockwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    R0,
    R90,
    R180,
    R270,
}

impl Rotation {
    fn quarter_turns(self) -> u8 {
        match self {
            Rotation::R0 => 0,
            Rotation::R90 => 1,
            Rotation::R180 => 2,
            Rotation::R270 => 3,
        }
    }

    fn from_quarter_turns(turns: u8) -> Self {
        match turns % 4 {
            0 => Rotation::R0,
            1 => Rotation::R90,
            2 => Rotation::R180,
            _ => Rotation::R270,
        }
    }

    /// Compose with another rotation
    pub fn then(self, other: Rotation) -> Rotation {
        Rotation::from_quarter_turns(self.quarter_turns() + other.quarter_turns())
    }
}

/// An output transformation: a reflection along X followed by a rotation.
///
/// This canonical decomposition gives every combination of screen flips and
/// quarter turns a unique representation, so transform equality is plain
/// field equality.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transform {
    pub reflect: bool,
    pub rotation: Rotation,
}

impl Transform {
    /// Whether the transform exchanges the width and height of a rectangle
    pub fn swaps_axes(&self) -> bool {
        matches!(self.rotation, Rotation::R90 | Rotation::R270)
    }

    /// The size a rectangle occupies on screen after this transform
    pub fn apply_to_size(&self, size: Vec2) -> Vec2 {
        if self.swaps_axes() {
            size.swapped()
        } else {
            size
        }
    }

    /// Apply an additional rotation after the current transform
    pub fn rotate(&self, rotation: Rotation) -> Transform {
        Transform {
            reflect: self.reflect,
            rotation: self.rotation.then(rotation),
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let degrees = match self.rotation {
            Rotation::R0 => 0,
            Rotation::R90 => 90,
            Rotation::R180 => 180,
            Rotation::R270 => 270,
        };
        if self.reflect {
            write!(f, "R{}", degrees)
        } else {
            write!(f, "{}", degrees)
        }
    }
}
