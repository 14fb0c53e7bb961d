//! Note identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A note in the vault, identified by its display name.
///
/// The display name is the file name without its extension, so an attachment
/// such as `PNG image 3.png` is a note named `PNG image 3`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Note(String);

impl Note {
    /// Creates a note from its display name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Consumes the note, returning the display name.
    #[must_use]
    pub fn into_name(self) -> String {
        self.0
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Note {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Note {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for Note {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
