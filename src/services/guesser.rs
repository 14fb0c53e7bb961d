//! Guess pipeline.

use crate::llm::{GUESS_SYSTEM_PROMPT, LlmProvider, guess_user_prompt};
use crate::models::{GuessRequest, GuessResult, Note};
use crate::{Error, Result};
use std::sync::Arc;

/// Service asking which word a selected fragment describes.
pub struct GuesserService<P: LlmProvider> {
    /// LLM provider for the request.
    llm: Arc<P>,
}

impl<P: LlmProvider> GuesserService<P> {
    /// Creates a new guess service.
    #[must_use]
    pub const fn new(llm: Arc<P>) -> Self {
        Self { llm }
    }

    /// Guesses the word behind `selected_text`.
    ///
    /// The reply is used as plain text, trimmed of surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for a blank selection, the request
    /// error if the call fails, or [`Error::ResponseParseFailure`] if the
    /// reply is blank.
    pub fn guess(&self, selected_text: &str, actual: &Note) -> Result<GuessResult> {
        if selected_text.trim().is_empty() {
            return Err(Error::InvalidInput("selection is empty".to_string()));
        }

        let span = tracing::info_span!(
            "wordlink.guess",
            provider = self.llm.name(),
            actual = %actual,
            selection_chars = selected_text.len(),
        );
        let _enter = span.enter();

        let request = GuessRequest::new(selected_text);
        let content = self
            .llm
            .complete_with_system(GUESS_SYSTEM_PROMPT, &guess_user_prompt(&request))?;

        let guessed = content.trim();
        if guessed.is_empty() {
            return Err(Error::ResponseParseFailure {
                cause: "empty guess".to_string(),
                content,
            });
        }

        tracing::debug!(guessed, "Received guess");
        Ok(GuessResult {
            guessed: guessed.to_string(),
            actual: actual.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedReply(&'static str);

    impl LlmProvider for FixedReply {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn complete(&self, _prompt: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn test_guess_scenario() {
        let service = GuesserService::new(Arc::new(FixedReply("Notebook")));
        let result = service.guess("Obsidian", &Note::new("Apple")).unwrap();

        assert_eq!(
            result,
            GuessResult {
                guessed: "Notebook".to_string(),
                actual: Note::new("Apple"),
            }
        );
    }

    #[test]
    fn test_guess_trims_reply() {
        let service = GuesserService::new(Arc::new(FixedReply(" Notebook\n")));
        let result = service.guess("Obsidian", &Note::new("Notebook")).unwrap();
        assert_eq!(result.guessed, "Notebook");
        assert!(result.is_match());
    }

    #[test]
    fn test_blank_selection_is_rejected() {
        let service = GuesserService::new(Arc::new(FixedReply("Notebook")));
        let err = service.guess("  ", &Note::new("Apple")).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_blank_reply_is_reported() {
        let service = GuesserService::new(Arc::new(FixedReply("   ")));
        let err = service.guess("Obsidian", &Note::new("Apple")).unwrap_err();
        assert!(matches!(err, Error::ResponseParseFailure { .. }));
    }
}
