//! The supervisor: classifies backend changes and drives the layout engine
//!
//! Every change event lands in [`Manager::handle_change`], which decides
//! between five actions: drop our own echoed update, fall back to manual
//! mode for states the daemon cannot express, recall a remembered
//! arrangement for a returning display set, synthesize a default for a
//! new set, or learn from an arrangement the user just made by hand.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::backend::{Backend, BackendError};
use crate::database::{Database, DatabaseError};
use crate::layout::LayoutConfig;
use crate::model::{ModelError, PhysicalLayout, RelativeLayout};

#[derive(Debug, Error)]
pub enum ManagerError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Owns the database and the last applied state, and reacts to events.
pub struct Manager {
    database: Database,
    config: LayoutConfig,
    current: PhysicalLayout,
}

impl Manager {
    pub fn new(database: Database, config: LayoutConfig) -> Self {
        Self {
            database,
            config,
            current: PhysicalLayout::default(),
        }
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Run until the backend closes.
    pub fn run<B: Backend>(&mut self, backend: &mut B) -> Result<(), ManagerError> {
        loop {
            match backend.wait_change() {
                Ok(observed) => self.handle_change(backend, observed)?,
                Err(BackendError::Closed) => {
                    info!("backend closed, shutting down");
                    return Ok(());
                }
                Err(error) => return Err(error.into()),
            }
        }
    }

    /// React to one observed output state.
    pub fn handle_change<B: Backend>(
        &mut self,
        backend: &mut B,
        observed: PhysicalLayout,
    ) -> Result<(), ManagerError> {
        debug!(?observed, "backend changed");

        if observed == self.current {
            // The notification for our own last apply
            debug!("ignoring echo of our own update");
            return Ok(());
        }

        if !observed.ids_valid() {
            warn!("outputs lack usable identities, entering manual mode");
            self.current = observed;
            return Ok(());
        }

        let fingerprint = observed.fingerprint();
        if fingerprint != self.current.fingerprint() {
            // A different display set was plugged in
            let stored = match self.database.get(&fingerprint) {
                Some(known) => {
                    info!(%fingerprint, "recalling remembered arrangement");
                    known.clone()
                }
                None => {
                    info!(%fingerprint, "new display set, synthesizing default arrangement");
                    self.database.default_layout(&fingerprint)
                }
            };
            self.apply_relative(backend, stored, observed)
        } else if observed.is_manual() {
            warn!(%fingerprint, "observed state is not representable, entering manual mode");
            self.current = observed;
            Ok(())
        } else {
            // The user rearranged the same set by hand: learn it
            match observed.to_relative() {
                Some(learned) => {
                    info!(%fingerprint, "learning user arrangement");
                    self.apply_relative(backend, learned, observed)
                }
                None => {
                    warn!(%fingerprint, "arrangement cannot be normalized, entering manual mode");
                    self.current = observed;
                    Ok(())
                }
            }
        }
    }

    /// Solve a relational layout against the observed state, apply it, and
    /// remember it. Remembering happens only after the backend accepted
    /// the arrangement.
    fn apply_relative<B: Backend>(
        &mut self,
        backend: &mut B,
        relative: RelativeLayout,
        observed: PhysicalLayout,
    ) -> Result<(), ManagerError> {
        match observed.realize(&relative, &self.config)? {
            Some(solved) => {
                debug!(?solved, "applying arrangement");
                backend.apply(&solved)?;
                self.current = solved;
                self.database.remember(relative);
                self.database.persist()?;
                Ok(())
            }
            None => {
                warn!("no feasible arrangement for this display set, leaving state as is");
                self.current = observed;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ScriptedBackend;
    use crate::geometry::{Direction, Vec2};
    use crate::layout::ScreenBounds;
    use crate::model::{OutputId, PhysicalOutput};
    use std::collections::BTreeMap;

    fn output(id: &str, position: Vec2, size: Vec2) -> PhysicalOutput {
        PhysicalOutput {
            enabled: true,
            mode_size: size,
            preferred_size: size,
            position,
            id: Some(OutputId::from(id)),
            ..Default::default()
        }
    }

    fn pair_layout(positions: [Vec2; 2]) -> PhysicalLayout {
        PhysicalLayout {
            outputs: BTreeMap::from([
                (
                    "DP-1".to_string(),
                    output("edid-a", positions[0], Vec2::new(1920, 1080)),
                ),
                (
                    "HDMI-1".to_string(),
                    output("edid-b", positions[1], Vec2::new(1920, 1080)),
                ),
            ]),
            screen_size: Vec2::new(3840, 1080),
            bounds: ScreenBounds::up_to(Vec2::new(8192, 8192)),
        }
    }

    fn manager(dir: &tempfile::TempDir) -> Manager {
        Manager::new(
            Database::empty(dir.path().join("layouts.json")),
            LayoutConfig::default(),
        )
    }

    #[test]
    fn test_new_set_gets_default_arrangement() {
        let dir = tempfile::tempdir().unwrap();
        let mut backend = ScriptedBackend::new([pair_layout([Vec2::new(0, 0), Vec2::new(0, 0)])]);
        let mut mgr = manager(&dir);
        mgr.run(&mut backend).unwrap();

        // One apply, and its echo was suppressed (otherwise a second
        // apply would have been recorded)
        assert_eq!(backend.applied.len(), 1);
        let applied = &backend.applied[0];
        assert!(!applied.is_manual());
        assert_eq!(mgr.database().len(), 1);
    }

    #[test]
    fn test_learns_manual_edit_and_recalls_it() {
        // The user puts edid-b left of edid-a
        let edited = pair_layout([Vec2::new(1920, 0), Vec2::new(0, 0)]);

        let dir = tempfile::tempdir().unwrap();
        let mut backend = ScriptedBackend::new([
            // Plug in: daemon applies some default
            pair_layout([Vec2::new(0, 0), Vec2::new(0, 0)]),
        ]);
        let mut mgr = manager(&dir);
        mgr.run(&mut backend).unwrap();

        // User edit arrives as a change for the same set
        backend.push_event(edited.clone());
        mgr.run(&mut backend).unwrap();

        let learned = mgr
            .database()
            .get(&edited.fingerprint())
            .expect("edit was learned");
        assert_eq!(
            learned.relation(&OutputId::from("edid-b"), &OutputId::from("edid-a")),
            Some(Direction::LeftOf)
        );

        // The re-applied arrangement keeps the user's left/right order
        let last = backend.applied.last().unwrap();
        assert_eq!(last.outputs["HDMI-1"].position, Vec2::new(0, 0));
        assert_eq!(last.outputs["DP-1"].position, Vec2::new(1920, 0));
    }

    #[test]
    fn test_mirrored_state_is_not_learned() {
        let dir = tempfile::tempdir().unwrap();
        let mut mgr = manager(&dir);
        let mut backend = ScriptedBackend::new([pair_layout([Vec2::new(0, 0), Vec2::new(0, 0)])]);
        mgr.run(&mut backend).unwrap();
        let applied_before = backend.applied.len();

        // Mirror both displays at the origin: same set, overlapping
        backend.push_event(pair_layout([Vec2::new(0, 0), Vec2::new(0, 0)]));
        mgr.run(&mut backend).unwrap();

        assert_eq!(backend.applied.len(), applied_before);
    }

    #[test]
    fn test_missing_ids_enter_manual_mode() {
        let mut state = pair_layout([Vec2::new(0, 0), Vec2::new(1920, 0)]);
        state.outputs.get_mut("DP-1").unwrap().id = None;

        let dir = tempfile::tempdir().unwrap();
        let mut backend = ScriptedBackend::new([state]);
        let mut mgr = manager(&dir);
        mgr.run(&mut backend).unwrap();

        assert!(backend.applied.is_empty());
        assert!(mgr.database().is_empty());
    }
}
