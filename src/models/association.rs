//! Association request and result.
//!
//! The service is asked for a JSON object keyed by candidate name. Its reply
//! is validated here: keys must be candidates that were actually sent and
//! every value must be a string. Candidates the service skipped are allowed
//! and can be listed with [`AssociationResult::missing`].

use super::Note;
use crate::llm::extract_json_from_response;
use crate::{Error, Result};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// The active note paired with the sampled candidates.
///
/// Built once per association run and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationRequest {
    main: Note,
    candidates: Vec<Note>,
}

impl AssociationRequest {
    /// Creates a request for `main` against `candidates`.
    #[must_use]
    pub const fn new(main: Note, candidates: Vec<Note>) -> Self {
        Self { main, candidates }
    }

    /// The active note.
    #[must_use]
    pub const fn main(&self) -> &Note {
        &self.main
    }

    /// The sampled candidates, in draw order.
    #[must_use]
    pub fn candidates(&self) -> &[Note] {
        &self.candidates
    }

    /// Whether `name` is one of the candidates.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.candidates.iter().any(|c| c.name() == name)
    }
}

/// One generated sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Association {
    /// Candidate the sentence was written for.
    pub candidate: Note,
    /// Sentence using both the main note and the candidate.
    pub sentence: String,
}

/// Sentences keyed by candidate.
///
/// Keys are always a subset of the request's candidates and keep the
/// request's order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AssociationResult {
    entries: Vec<Association>,
}

impl AssociationResult {
    /// Parses message content returned for `request`.
    ///
    /// Surrounding prose and markdown fences are tolerated. Keys that are not
    /// candidates of `request` are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResponseParseFailure`] if the content is not a JSON
    /// object, if any value is not a string, or if none of the candidates
    /// were answered.
    pub fn parse(request: &AssociationRequest, content: &str) -> Result<Self> {
        let json = extract_json_from_response(content);
        let value: Value = serde_json::from_str(json).map_err(|e| Error::ResponseParseFailure {
            cause: format!("invalid JSON: {e}"),
            content: content.to_string(),
        })?;

        let Value::Object(object) = value else {
            return Err(Error::ResponseParseFailure {
                cause: "expected a JSON object keyed by candidate".to_string(),
                content: content.to_string(),
            });
        };

        let mut sentences = BTreeMap::new();
        for (key, value) in object {
            let Value::String(sentence) = value else {
                return Err(Error::ResponseParseFailure {
                    cause: format!("value for '{key}' is not a string"),
                    content: content.to_string(),
                });
            };
            if request.contains(&key) {
                sentences.insert(key, sentence);
            } else {
                tracing::warn!(key = %key, "Dropping association for a note that was not sampled");
            }
        }

        let entries = request
            .candidates()
            .iter()
            .filter_map(|candidate| {
                sentences
                    .remove(candidate.name())
                    .map(|sentence| Association {
                        candidate: candidate.clone(),
                        sentence,
                    })
            })
            .collect::<Vec<_>>();

        if entries.is_empty() && !request.candidates().is_empty() {
            return Err(Error::ResponseParseFailure {
                cause: "no requested candidate was answered".to_string(),
                content: content.to_string(),
            });
        }
        Ok(Self { entries })
    }

    /// Returns the sentence for `candidate`.
    #[must_use]
    pub fn get(&self, candidate: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|a| a.candidate.name() == candidate)
            .map(|a| a.sentence.as_str())
    }

    /// Iterates over the associations in request order.
    pub fn iter(&self) -> impl Iterator<Item = &Association> {
        self.entries.iter()
    }

    /// Number of candidates the service answered for.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the service answered for no candidate at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Candidates of `request` without a sentence.
    #[must_use]
    pub fn missing<'a>(&self, request: &'a AssociationRequest) -> Vec<&'a Note> {
        request
            .candidates()
            .iter()
            .filter(|c| self.get(c.name()).is_none())
            .collect()
    }

    /// Converts into a plain name-to-sentence map.
    #[must_use]
    pub fn into_map(self) -> BTreeMap<String, String> {
        self.entries
            .into_iter()
            .map(|a| (a.candidate.into_name(), a.sentence))
            .collect()
    }
}

impl<'a> IntoIterator for &'a AssociationResult {
    type Item = &'a Association;
    type IntoIter = std::slice::Iter<'a, Association>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
