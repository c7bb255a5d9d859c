//! Persistent storage of remembered arrangements
//!
//! The database maps a display-set fingerprint to the relational layout
//! last applied for that set. On disk it is a small versioned JSON file
//! in the user's config directory; fingerprints are recomputed from the
//! entries on load rather than stored twice.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::model::{Fingerprint, RelativeLayout};

/// On-disk format version. Bump on incompatible schema changes; the
/// daemon refuses files from other versions instead of guessing.
const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("database io error: {0}")]
    Io(#[from] io::Error),

    #[error("database parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("database version {found} is not supported (expected {expected})")]
    Version { found: u32, expected: u32 },
}

#[derive(Serialize, Deserialize)]
struct FileFormat {
    version: u32,
    layouts: Vec<RelativeLayout>,
}

/// Remembered layouts, keyed by display-set fingerprint.
#[derive(Debug)]
pub struct Database {
    path: PathBuf,
    layouts: HashMap<Fingerprint, RelativeLayout>,
}

impl Database {
    /// Load the database at `path`, or start empty when the file does not
    /// exist yet. An unreadable or mismatched file is an error; the file
    /// is left untouched for inspection.
    pub fn load_or_empty(path: PathBuf) -> Result<Self, DatabaseError> {
        let layouts = match fs::read(&path) {
            Ok(content) => {
                let file: FileFormat = serde_json::from_slice(&content)?;
                if file.version != FORMAT_VERSION {
                    return Err(DatabaseError::Version {
                        found: file.version,
                        expected: FORMAT_VERSION,
                    });
                }
                file.layouts
                    .into_iter()
                    .map(|layout| (layout.fingerprint(), layout))
                    .collect()
            }
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "no layout database yet, starting empty");
                HashMap::new()
            }
            Err(error) => return Err(error.into()),
        };
        Ok(Self { path, layouts })
    }

    /// An in-memory database that persists to `path` on first store
    pub fn empty(path: PathBuf) -> Self {
        Self {
            path,
            layouts: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }

    /// The remembered layout for a display set, if any
    pub fn get(&self, fingerprint: &Fingerprint) -> Option<&RelativeLayout> {
        self.layouts.get(fingerprint)
    }

    /// A starting layout for a never-seen display set: every display with
    /// its default transform and no relations pinned. The layout engine
    /// then places them purely by the objective.
    pub fn default_layout(&self, fingerprint: &Fingerprint) -> RelativeLayout {
        RelativeLayout::unconstrained(fingerprint.ids().iter().cloned())
    }

    /// Remember a successfully applied layout, replacing any previous
    /// entry for the same display set.
    pub fn remember(&mut self, layout: RelativeLayout) {
        self.layouts.insert(layout.fingerprint(), layout);
    }

    /// Write the database to disk. The file is written to a sibling
    /// temporary path and renamed over the target, so a failed write never
    /// corrupts an existing database.
    pub fn persist(&self) -> Result<(), DatabaseError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = FileFormat {
            version: FORMAT_VERSION,
            layouts: {
                let mut layouts: Vec<&RelativeLayout> = self.layouts.values().collect();
                // Stable file content regardless of hash order
                layouts.sort_by_key(|layout| layout.fingerprint());
                layouts.into_iter().cloned().collect()
            },
        };
        let mut tmp_path = self.path.clone();
        tmp_path.set_extension("json.tmp");
        fs::write(&tmp_path, serde_json::to_vec_pretty(&file)?)?;
        fs::rename(&tmp_path, &self.path)?;
        debug!(path = %self.path.display(), layouts = self.layouts.len(), "database persisted");
        Ok(())
    }
}
