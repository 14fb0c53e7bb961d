//! Guess request and result.

use super::Note;
use serde::Serialize;

/// Highlighted text the service should turn into a single word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuessRequest {
    /// The selected fragment, as highlighted by the user.
    pub selected_text: String,
}

impl GuessRequest {
    /// Creates a guess request.
    #[must_use]
    pub fn new(selected_text: impl Into<String>) -> Self {
        Self {
            selected_text: selected_text.into(),
        }
    }
}

/// The service's guess next to the note the selection came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuessResult {
    /// Word returned by the service.
    pub guessed: String,
    /// Name of the active note.
    pub actual: Note,
}

impl GuessResult {
    /// Whether the guess matches the note name, ignoring case and surrounding
    /// whitespace.
    #[must_use]
    pub fn is_match(&self) -> bool {
        self.guessed.trim().to_lowercase() == self.actual.name().trim().to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_match_is_case_insensitive() {
        let result = GuessResult {
            guessed: "notebook ".to_string(),
            actual: Note::new("Notebook"),
        };
        assert!(result.is_match());

        let result = GuessResult {
            guessed: "Notebook".to_string(),
            actual: Note::new("Obsidian"),
        };
        assert!(!result.is_match());
    }
}
