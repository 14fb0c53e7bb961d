//! Payloads accepted by the display collaborator.

use super::{AssociationResult, GuessResult};

/// Something to show the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayPayload {
    /// Plain text under a title.
    Text {
        /// Popup title.
        title: String,
        /// Body text.
        body: String,
    },
    /// Candidate sentences under a title.
    Associations {
        /// Popup title.
        title: String,
        /// Sentences keyed by candidate.
        result: AssociationResult,
    },
    /// Guessed word next to the actual note name.
    Guess(GuessResult),
    /// Short status message, such as a rejection or an error.
    Notice(String),
}
