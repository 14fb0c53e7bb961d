//! Host-application collaborators.
//!
//! The pipelines never touch the note vault, the editor selection or the
//! screen directly. They go through these traits, which the binary backs
//! with a directory on disk and the terminal, and tests back with memory.

mod vault;

pub use vault::{FsVault, MemoryVault};

use crate::Result;
use crate::models::{DisplayPayload, Note};
use std::sync::Mutex;

/// Read-only access to the notes of a vault.
pub trait Vault: Send + Sync {
    /// Every file in the vault, attachments included, as notes.
    fn files(&self) -> Result<Vec<Note>>;

    /// The note currently open, if any.
    fn active_note(&self) -> Option<Note>;
}

/// The user's current text selection.
pub trait SelectionSource: Send + Sync {
    /// The selected text; empty when nothing is selected.
    fn selection_text(&self) -> String;
}

/// Renders results and notices for the user.
pub trait Display: Send + Sync {
    /// Shows `payload`.
    fn show(&self, payload: DisplayPayload);
}

/// A selection fixed at construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixedSelection(String);

impl FixedSelection {
    /// Creates a selection from text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// No selection.
    #[must_use]
    pub const fn empty() -> Self {
        Self(String::new())
    }
}

impl SelectionSource for FixedSelection {
    fn selection_text(&self) -> String {
        self.0.clone()
    }
}

/// Display that keeps every payload it was given.
#[derive(Debug, Default)]
pub struct RecordingDisplay {
    shown: Mutex<Vec<DisplayPayload>>,
}

impl RecordingDisplay {
    /// Creates an empty display.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Payloads shown so far, oldest first.
    #[must_use]
    pub fn shown(&self) -> Vec<DisplayPayload> {
        self.shown
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl Display for RecordingDisplay {
    fn show(&self, payload: DisplayPayload) {
        if let Ok(mut guard) = self.shown.lock() {
            guard.push(payload);
        }
    }
}

impl<T: Display + ?Sized> Display for &T {
    fn show(&self, payload: DisplayPayload) {
        (**self).show(payload);
    }
}
