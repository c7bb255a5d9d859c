//! screenplan - remembers and restores multi-display arrangements
//!
//! This library watches a windowing system's output configuration through
//! a [`backend::Backend`], identifies each connected display set by a
//! stable fingerprint, and keeps a small database of how the user likes
//! each set arranged. Plug in a known combination of displays and the
//! remembered arrangement comes back; rearrange displays by hand and the
//! new arrangement is learned; plug in a never-seen combination and a
//! sensible arrangement is synthesized by the layout engine.
//!
//! The geometric core lives in [`layout`]: given display sizes and
//! pairwise directional constraints it enumerates packing topologies as
//! sequence pairs and picks the cheapest integer packing.
//!
//! # Example
//!
//! ```rust
//! use screenplan::geometry::{Direction, Vec2};
//! use screenplan::layout::{compute_layout, ConstraintMatrix, LayoutConfig, ScreenBounds};
//!
//! let mut constraints = ConstraintMatrix::unconstrained(2);
//! constraints.set(0, 1, Some(Direction::LeftOf));
//!
//! let arrangement = compute_layout(
//!     &ScreenBounds::up_to(Vec2::new(4000, 2000)),
//!     &[Vec2::new(1920, 1080), Vec2::new(1280, 1024)],
//!     &constraints,
//!     &LayoutConfig::default(),
//! )
//! .unwrap()
//! .expect("a row of two displays fits");
//!
//! assert_eq!(arrangement.screen, Vec2::new(3200, 1080));
//! assert_eq!(arrangement.positions[0], Vec2::new(0, 0));
//! ```

pub mod backend;
pub mod config;
pub mod database;
pub mod geometry;
pub mod layout;
pub mod manager;
pub mod model;

pub use backend::{Backend, BackendError, ScriptedBackend, StreamBackend};
pub use config::{Settings, SettingsError};
pub use database::{Database, DatabaseError};
pub use geometry::{Direction, Rotation, Transform, Vec2};
pub use layout::{
    compute_layout, Arrangement, ConstraintMatrix, LayoutConfig, LayoutError, ScreenBounds,
};
pub use manager::{Manager, ManagerError};
pub use model::{Fingerprint, OutputId, PhysicalLayout, PhysicalOutput, RelativeLayout};

use thiserror::Error;

/// Any error the daemon surfaces to its entry point
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Manager(#[from] ManagerError),
}
