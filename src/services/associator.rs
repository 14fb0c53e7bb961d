//! Association pipeline.
//!
//! Samples candidates from the vault, asks the service to pair each of them
//! with the active note, and validates the reply.

use crate::config::AssociationMode;
use crate::llm::{
    ASSOCIATION_SYSTEM_PROMPT, LlmProvider, association_user_prompt, best_match_prompt,
};
use crate::models::{AssociationRequest, AssociationResult, DisplayPayload, Note};
use crate::sampler::Sampler;
use crate::{Error, Result};
use rand::Rng;
use std::sync::Arc;

/// Title shown above per-candidate sentences.
pub const ASSOCIATIONS_TITLE: &str = "Associations";

/// Title shown above a best-match sentence.
pub const BEST_MATCH_TITLE: &str = "Found an association";

/// Result of one association run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssociationOutcome {
    /// Sentences keyed by candidate.
    Sentences(AssociationResult),
    /// Free-text reply naming the best candidate.
    BestMatch(String),
}

impl AssociationOutcome {
    /// Converts the outcome into what the display collaborator shows.
    #[must_use]
    pub fn into_payload(self) -> DisplayPayload {
        match self {
            Self::Sentences(result) => DisplayPayload::Associations {
                title: ASSOCIATIONS_TITLE.to_string(),
                result,
            },
            Self::BestMatch(body) => DisplayPayload::Text {
                title: BEST_MATCH_TITLE.to_string(),
                body,
            },
        }
    }
}

/// Service pairing the active note with random candidates.
pub struct AssociatorService<P: LlmProvider> {
    /// LLM provider for the request.
    llm: Arc<P>,
    /// Candidate sampler.
    sampler: Sampler,
    /// Request and display mode.
    mode: AssociationMode,
}

impl<P: LlmProvider> AssociatorService<P> {
    /// Creates a new association service.
    #[must_use]
    pub const fn new(llm: Arc<P>, sampler: Sampler) -> Self {
        Self {
            llm,
            sampler,
            mode: AssociationMode::Sentences,
        }
    }

    /// Sets the association mode.
    #[must_use]
    pub const fn with_mode(mut self, mode: AssociationMode) -> Self {
        self.mode = mode;
        self
    }

    /// The configured mode.
    #[must_use]
    pub const fn mode(&self) -> AssociationMode {
        self.mode
    }

    /// Samples candidates and builds the request for `main`.
    ///
    /// The active note is never its own candidate.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SamplingImpossible`] if the pool is smaller than the
    /// sample size, or [`Error::InvalidInput`] if no candidate survives the
    /// exclusions.
    pub fn build_request<R>(
        &self,
        main: &Note,
        pool: &[Note],
        rng: &mut R,
    ) -> Result<AssociationRequest>
    where
        R: Rng + ?Sized,
    {
        let candidates: Vec<Note> = self
            .sampler
            .draw(pool, rng)?
            .into_iter()
            .filter(|note| note != main)
            .collect();

        if candidates.is_empty() {
            return Err(Error::InvalidInput(
                "no candidate notes remain after exclusions".to_string(),
            ));
        }
        Ok(AssociationRequest::new(main.clone(), candidates))
    }

    /// Runs one association for `main` against a random sample of `pool`.
    ///
    /// # Errors
    ///
    /// Returns an error if sampling fails, the request fails, or the reply
    /// cannot be parsed.
    pub fn associate(&self, main: &Note, pool: &[Note]) -> Result<AssociationOutcome> {
        self.associate_with_rng(main, pool, &mut rand::thread_rng())
    }

    /// Like [`Self::associate`] with an explicit randomness source.
    ///
    /// # Errors
    ///
    /// Returns an error if sampling fails, the request fails, or the reply
    /// cannot be parsed.
    pub fn associate_with_rng<R>(
        &self,
        main: &Note,
        pool: &[Note],
        rng: &mut R,
    ) -> Result<AssociationOutcome>
    where
        R: Rng + ?Sized,
    {
        let span = tracing::info_span!(
            "wordlink.associate",
            provider = self.llm.name(),
            mode = self.mode.as_str(),
            main = %main,
            candidates = tracing::field::Empty,
        );
        let _enter = span.enter();

        let request = self.build_request(main, pool, rng)?;
        span.record("candidates", request.candidates().len());

        match self.mode {
            AssociationMode::Sentences => {
                self.sentences(&request).map(AssociationOutcome::Sentences)
            },
            AssociationMode::BestMatch => {
                self.best_match(&request).map(AssociationOutcome::BestMatch)
            },
        }
    }

    /// Asks for one sentence per candidate.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the reply is not a JSON
    /// object of strings.
    pub fn sentences(&self, request: &AssociationRequest) -> Result<AssociationResult> {
        let user = association_user_prompt(request);
        let content = self.llm.complete_with_system(ASSOCIATION_SYSTEM_PROMPT, &user)?;
        let result = AssociationResult::parse(request, &content)?;

        let missing = result.missing(request).len();
        if missing > 0 {
            tracing::info!(
                answered = result.len(),
                missing,
                "Service skipped some candidates"
            );
        }
        Ok(result)
    }

    /// Asks for the single best-associated candidate, as plain text.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub fn best_match(&self, request: &AssociationRequest) -> Result<String> {
        let content = self.llm.complete(&best_match_prompt(request))?;
        Ok(content.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::sync::Mutex;

    struct ScriptedProvider {
        reply: String,
        prompts: Mutex<Vec<(Option<String>, String)>>,
    }

    impl ScriptedProvider {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    impl LlmProvider for ScriptedProvider {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn complete(&self, prompt: &str) -> Result<String> {
            self.prompts
                .lock()
                .unwrap()
                .push((None, prompt.to_string()));
            Ok(self.reply.clone())
        }

        fn complete_with_system(&self, system: &str, user: &str) -> Result<String> {
            self.prompts
                .lock()
                .unwrap()
                .push((Some(system.to_string()), user.to_string()));
            Ok(self.reply.clone())
        }
    }

    fn pool() -> Vec<Note> {
        ["Apple", "Banana", "PNG Screenshot 1", "Untitled 2", "Cherry"]
            .into_iter()
            .map(Note::from)
            .collect()
    }

    fn sampler() -> Sampler {
        Sampler::from_config(&crate::SamplerConfig::default().with_subset_size(3))
    }

    #[test]
    fn test_build_request_excludes_main_and_reserved_names() {
        let service = AssociatorService::new(Arc::new(ScriptedProvider::new("{}")), sampler());
        let main = Note::new("Apple");

        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            match service.build_request(&main, &pool(), &mut rng) {
                Ok(request) => {
                    assert!(request.candidates().len() <= 2);
                    for c in request.candidates() {
                        assert!(["Banana", "Cherry"].contains(&c.name()));
                    }
                },
                Err(Error::InvalidInput(_)) => {},
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn test_sentences_sends_system_and_user_messages() {
        let provider = Arc::new(ScriptedProvider::new(
            r#"{"Banana": "Apple and banana bread.", "Cherry": "Apple cherry pie."}"#,
        ));
        let service = AssociatorService::new(Arc::clone(&provider), Sampler::new(2));
        let request = AssociationRequest::new(
            Note::new("Apple"),
            vec![Note::new("Banana"), Note::new("Cherry")],
        );

        let result = service.sentences(&request).unwrap();
        assert_eq!(result.len(), 2);

        let prompts = provider.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].0.as_deref(), Some(ASSOCIATION_SYSTEM_PROMPT));
        assert!(prompts[0].1.contains("Main word: Apple"));
    }

    #[test]
    fn test_parse_failure_is_reported() {
        let provider = Arc::new(ScriptedProvider::new("not json"));
        let service = AssociatorService::new(provider, Sampler::new(2));
        let pool = vec![Note::new("Banana"), Note::new("Cherry")];
        let mut rng = StdRng::seed_from_u64(1);

        let err = service
            .associate_with_rng(&Note::new("Apple"), &pool, &mut rng)
            .unwrap_err();
        assert!(matches!(err, Error::ResponseParseFailure { .. }));
    }

    #[test]
    fn test_best_match_returns_plain_text() {
        let provider = Arc::new(ScriptedProvider::new("  Banana: an apple a day.\n"));
        let service = AssociatorService::new(Arc::clone(&provider), Sampler::new(2))
            .with_mode(AssociationMode::BestMatch);
        let pool = vec![Note::new("Banana"), Note::new("Cherry")];
        let mut rng = StdRng::seed_from_u64(1);

        let outcome = service
            .associate_with_rng(&Note::new("Apple"), &pool, &mut rng)
            .unwrap();
        assert_eq!(
            outcome.into_payload(),
            DisplayPayload::Text {
                title: BEST_MATCH_TITLE.to_string(),
                body: "Banana: an apple a day.".to_string(),
            }
        );
        assert!(provider.prompts.lock().unwrap()[0].0.is_none());
    }

    #[test]
    fn test_oversize_sample_fails_before_request() {
        let provider = Arc::new(ScriptedProvider::new("{}"));
        let service = AssociatorService::new(Arc::clone(&provider), Sampler::new(20));
        let mut rng = StdRng::seed_from_u64(1);

        let err = service
            .associate_with_rng(&Note::new("Apple"), &pool(), &mut rng)
            .unwrap_err();
        assert!(matches!(err, Error::SamplingImpossible { .. }));
        assert!(provider.prompts.lock().unwrap().is_empty());
    }
}
