//! Layout engine: from display sizes and pairwise relations to positions
//!
//! This module is the geometric core of the daemon. Given display sizes,
//! virtual-screen bounds, and a matrix of pairwise directional
//! constraints, it enumerates packing templates as sequence pairs, drops
//! the templates the constraints rule out, instantiates the rest as
//! integer packings, and returns the cheapest arrangement. It performs no
//! I/O and holds no state across calls; one call is a pure function of
//! its inputs.

pub mod config;
pub mod engine;
pub mod error;
mod solver;
pub mod template;
pub mod types;

pub use config::LayoutConfig;
pub use engine::{compute_layout, validate_inputs};
pub use error::LayoutError;
pub use template::SequencePair;
pub use types::{Arrangement, ConstraintMatrix, ScreenBounds};
