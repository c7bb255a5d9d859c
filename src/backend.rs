//! Backend boundary: the windowing-system side of the daemon
//!
//! The daemon only ever asks two things of a windowing system: tell me
//! when the output configuration changes (and what it looks like now),
//! and make it look like this. Real protocol adapters (RandR and
//! friends) implement [`Backend`] out of tree; this module provides the
//! trait plus two protocol-free implementations, a scripted one for tests
//! and a JSON-lines one the binary runs on.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use thiserror::Error;
use tracing::debug;

use crate::model::PhysicalLayout;

#[derive(Debug, Error)]
pub enum BackendError {
    /// The event source has no further events; a clean shutdown
    #[error("backend connection closed")]
    Closed,

    #[error("backend io error: {0}")]
    Io(#[from] io::Error),

    /// An event that could not be decoded into an output state
    #[error("malformed backend event: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// A windowing system, reduced to what the daemon needs.
pub trait Backend {
    /// Block until the output configuration changes and return the new
    /// state. Applying a layout also produces a change notification (the
    /// windowing system does not know it was us); the manager recognizes
    /// and drops those echoes by equality.
    fn wait_change(&mut self) -> Result<PhysicalLayout, BackendError>;

    /// Reconfigure the outputs to match `layout`
    fn apply(&mut self, layout: &PhysicalLayout) -> Result<(), BackendError>;
}

/// A backend driven by a prepared list of states.
///
/// `apply` records the layout and echoes it back as the next change
/// event, which is exactly how a real display server behaves. Useful for
/// tests and dry runs.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    pending: VecDeque<PhysicalLayout>,
    /// Every layout the daemon applied, in order
    pub applied: Vec<PhysicalLayout>,
}

impl ScriptedBackend {
    pub fn new<I: IntoIterator<Item = PhysicalLayout>>(events: I) -> Self {
        Self {
            pending: events.into_iter().collect(),
            applied: Vec::new(),
        }
    }

    /// Queue a further hotplug event
    pub fn push_event(&mut self, layout: PhysicalLayout) {
        self.pending.push_back(layout);
    }
}

impl Backend for ScriptedBackend {
    fn wait_change(&mut self) -> Result<PhysicalLayout, BackendError> {
        self.pending.pop_front().ok_or(BackendError::Closed)
    }

    fn apply(&mut self, layout: &PhysicalLayout) -> Result<(), BackendError> {
        self.applied.push(layout.clone());
        self.pending.push_front(layout.clone());
        Ok(())
    }
}

/// A backend speaking JSON lines over arbitrary reader/writer pairs.
///
/// Each input line is one observed [`PhysicalLayout`]; each applied
/// layout is written out as one JSON line. This is what the binary runs
/// on, which keeps the daemon drivable (and debuggable) without any
/// display server.
pub struct StreamBackend<R, W> {
    input: R,
    output: W,
    last_applied: Option<PhysicalLayout>,
}

impl<R: BufRead, W: Write> StreamBackend<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            last_applied: None,
        }
    }
}

impl<R: BufRead, W: Write> Backend for StreamBackend<R, W> {
    fn wait_change(&mut self) -> Result<PhysicalLayout, BackendError> {
        // Applying produced a state change; report it before reading on,
        // mirroring the notification a display server would send.
        if let Some(echo) = self.last_applied.take() {
            return Ok(echo);
        }
        loop {
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Err(BackendError::Closed);
            }
            if line.trim().is_empty() {
                continue;
            }
            let layout: PhysicalLayout = serde_json::from_str(line.trim())?;
            debug!(outputs = layout.outputs.len(), "observed state");
            return Ok(layout);
        }
    }

    fn apply(&mut self, layout: &PhysicalLayout) -> Result<(), BackendError> {
        let mut encoded = serde_json::to_string(layout)?;
        encoded.push('\n');
        self.output.write_all(encoded.as_bytes())?;
        self.output.flush()?;
        self.last_applied = Some(layout.clone());
        Ok(())
    }
}
