//! Prompts sent to the text-generation service.
//!
//! Association runs send a system message describing the expected JSON
//! object and a user message naming the main word and the candidates. Guess
//! runs ask for exactly one word. The best-match prompt is a single user
//! message whose reply is shown verbatim.

use crate::models::{AssociationRequest, GuessRequest};

/// System prompt for association runs.
pub const ASSOCIATION_SYSTEM_PROMPT: &str = "You receive one main word and a list of candidate \
words. Permute the main word with every candidate. For each pair, write one short sentence that \
uses both words. Respond only with a JSON object: each key is a candidate exactly as given, each \
value is the sentence for that candidate. Do not add keys that are not candidates.";

/// System prompt for guess runs.
pub const GUESS_SYSTEM_PROMPT: &str = "You receive a fragment of text describing a single word. \
Guess the word. Answer with exactly one word and nothing else.";

/// Builds the user message for an association run.
#[must_use]
pub fn association_user_prompt(request: &AssociationRequest) -> String {
    let candidates = request
        .candidates()
        .iter()
        .map(|c| format!("- {}", c.name()))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Main word: {}\n\nCandidates:\n{candidates}",
        request.main().name()
    )
}

/// Builds the single prompt for a best-match run.
#[must_use]
pub fn best_match_prompt(request: &AssociationRequest) -> String {
    let candidates = request
        .candidates()
        .iter()
        .map(|c| c.name())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Among the words: {candidates}. Choose the one word that is best associated with {}. \
Use the chosen word together with {} in one short sentence.",
        request.main().name(),
        request.main().name()
    )
}

/// Builds the user message for a guess run.
#[must_use]
pub fn guess_user_prompt(request: &GuessRequest) -> String {
    format!("Which word is this?\n\n{}", request.selected_text)
}
