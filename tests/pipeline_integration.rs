//! End-to-end pipeline tests.
//!
//! Drives the dispatcher with in-memory host collaborators and a scripted
//! provider:
//! - Selection decides which pipeline runs
//! - Association replies are validated and shown in request order
//! - Failures are shown and release the guard
//! - Directory vaults feed the sampler

// Integration tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use std::sync::Mutex;
use tempfile::TempDir;
use test_case::test_case;
use wordlink::config::{AssociationMode, SamplerConfig, WordlinkConfig};
use wordlink::host::{FixedSelection, FsVault, MemoryVault, RecordingDisplay};
use wordlink::llm::{GUESS_SYSTEM_PROMPT, LlmProvider};
use wordlink::models::{DisplayPayload, GuessResult, Note};
use wordlink::sampler::Sampler;
use wordlink::services::{AssociationOutcome, AssociatorService};
use wordlink::{DispatchOutcome, Dispatcher, Error, Result};

/// Returns one canned reply and records every call.
struct ScriptedProvider {
    reply: String,
    calls: Mutex<Vec<(Option<String>, String)>>,
}

impl ScriptedProvider {
    fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<(Option<String>, String)> {
        self.calls.lock().unwrap().clone()
    }
}

impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn complete(&self, prompt: &str) -> Result<String> {
        self.calls.lock().unwrap().push((None, prompt.to_string()));
        Ok(self.reply.clone())
    }

    fn complete_with_system(&self, system: &str, user: &str) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((Some(system.to_string()), user.to_string()));
        Ok(self.reply.clone())
    }
}

fn fruit_vault() -> MemoryVault {
    MemoryVault::new([
        "Apple",
        "Banana",
        "PNG Screenshot 1",
        "Untitled 2",
        "Cherry",
    ])
    .with_active("Apple")
}

fn config(subset_size: usize) -> WordlinkConfig {
    let mut config = WordlinkConfig::default();
    config.sampler = SamplerConfig::default().with_subset_size(subset_size);
    config
}

#[test_case("Obsidian", "guess" ; "selection runs guess")]
#[test_case(" Obsidian ", "guess" ; "padded selection runs guess")]
#[test_case("", "associate" ; "empty selection runs association")]
fn test_selection_picks_pipeline(selection: &str, expected: &str) {
    let reply = if expected == "guess" {
        "Notebook"
    } else {
        r#"{"Banana": "Apple and banana.", "Cherry": "Apple and cherry."}"#
    };
    let dispatcher = Dispatcher::from_config(ScriptedProvider::new(reply), &config(5));
    let display = RecordingDisplay::new();

    let outcome = dispatcher
        .trigger(&fruit_vault(), &FixedSelection::new(selection), &display)
        .unwrap();

    assert_eq!(outcome.pipeline(), expected);
    let calls = dispatcher.provider().calls();
    assert_eq!(calls.len(), 1);
    let used_guess_prompt = calls[0].0.as_deref() == Some(GUESS_SYSTEM_PROMPT);
    assert_eq!(used_guess_prompt, expected == "guess");
    assert_eq!(display.shown().len(), 1);
}

#[test_case("   " ; "spaces")]
#[test_case("  \n\t" ; "mixed whitespace")]
fn test_whitespace_selection_goes_to_guesser(selection: &str) {
    let dispatcher = Dispatcher::from_config(ScriptedProvider::new("Notebook"), &config(5));
    let display = RecordingDisplay::new();

    let err = dispatcher
        .trigger(&fruit_vault(), &FixedSelection::new(selection), &display)
        .unwrap_err();

    assert!(matches!(err, Error::InvalidInput(ref msg) if msg.contains("selection is empty")));
    assert!(dispatcher.provider().calls().is_empty());
    assert!(!dispatcher.is_busy());
    assert!(matches!(
        display.shown().as_slice(),
        [DisplayPayload::Notice(text)] if text.contains("selection is empty")
    ));
}

#[test]
fn test_unanswered_association_is_reported() {
    let reply = r#"{"Durian": "Apple and durian."}"#;
    let dispatcher = Dispatcher::from_config(ScriptedProvider::new(reply), &config(5));
    let display = RecordingDisplay::new();

    let err = dispatcher
        .trigger(&fruit_vault(), &FixedSelection::empty(), &display)
        .unwrap_err();

    assert!(matches!(err, Error::ResponseParseFailure { .. }));
    assert!(matches!(
        display.shown().as_slice(),
        [DisplayPayload::Notice(_)]
    ));
}

#[test]
fn test_guess_scenario() {
    let dispatcher = Dispatcher::from_config(ScriptedProvider::new("Notebook\n"), &config(3));
    let display = RecordingDisplay::new();

    let outcome = dispatcher
        .trigger(&fruit_vault(), &FixedSelection::new("Obsidian"), &display)
        .unwrap();

    let expected = GuessResult {
        guessed: "Notebook".to_string(),
        actual: Note::new("Apple"),
    };
    assert_eq!(outcome, DispatchOutcome::Guessed(expected.clone()));
    assert_eq!(display.shown(), vec![DisplayPayload::Guess(expected)]);
    assert!(dispatcher.provider().calls()[0].1.contains("Obsidian"));
}

#[test]
fn test_parse_failure_is_reported() {
    let dispatcher = Dispatcher::from_config(ScriptedProvider::new("not json"), &config(5));
    let display = RecordingDisplay::new();

    let err = dispatcher
        .trigger(&fruit_vault(), &FixedSelection::empty(), &display)
        .unwrap_err();

    match &err {
        Error::ResponseParseFailure { content, .. } => assert_eq!(content, "not json"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!dispatcher.is_busy());
    assert!(matches!(
        display.shown().as_slice(),
        [DisplayPayload::Notice(text)] if text.contains("could not parse")
    ));
}

#[test]
fn test_full_pool_associations_in_vault_order() {
    let reply = r#"{"Cherry": "Cherry pie with apple.", "Banana": "Apple banana bread."}"#;
    let dispatcher = Dispatcher::from_config(ScriptedProvider::new(reply), &config(5));
    let display = RecordingDisplay::new();

    let outcome = dispatcher
        .trigger(&fruit_vault(), &FixedSelection::empty(), &display)
        .unwrap();

    let DispatchOutcome::Associated(AssociationOutcome::Sentences(result)) = outcome else {
        panic!("expected sentences");
    };
    let keys: Vec<&str> = result.iter().map(|a| a.candidate.name()).collect();
    assert_eq!(keys, vec!["Banana", "Cherry"]);

    let prompt = &dispatcher.provider().calls()[0].1;
    assert!(prompt.contains("Main word: Apple"));
    assert!(!prompt.contains("PNG Screenshot 1"));
    assert!(!prompt.contains("Untitled 2"));
    assert!(!prompt.contains("- Apple"));
}

#[test_case(0 ; "seed 0")]
#[test_case(1 ; "seed 1")]
#[test_case(7 ; "seed 7")]
#[test_case(42 ; "seed 42")]
#[test_case(1234 ; "seed 1234")]
fn test_round_trip_candidates_stay_eligible(seed: u64) {
    let vault = fruit_vault();
    let pool = wordlink::host::Vault::files(&vault).unwrap();
    let associator = AssociatorService::new(
        Arc::new(ScriptedProvider::new("{}")),
        Sampler::from_config(&SamplerConfig::default().with_subset_size(3)),
    );
    let mut rng = StdRng::seed_from_u64(seed);

    match associator.build_request(&Note::new("Apple"), &pool, &mut rng) {
        Ok(request) => {
            assert!(request.candidates().len() <= 2);
            for candidate in request.candidates() {
                assert!(["Banana", "Cherry"].contains(&candidate.name()));
            }
        },
        Err(Error::InvalidInput(_)) => {},
        Err(other) => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_oversize_sample_fails_fast() {
    let dispatcher = Dispatcher::from_config(ScriptedProvider::new("{}"), &config(50));
    let display = RecordingDisplay::new();

    let err = dispatcher
        .trigger(&fruit_vault(), &FixedSelection::empty(), &display)
        .unwrap_err();

    assert!(matches!(
        err,
        Error::SamplingImpossible {
            requested: 50,
            available: 5
        }
    ));
    assert!(dispatcher.provider().calls().is_empty());
    assert!(!dispatcher.is_busy());
}

#[test]
fn test_best_match_mode_shows_text() {
    let mut config = config(5);
    config.association.mode = AssociationMode::BestMatch;
    let dispatcher = Dispatcher::from_config(
        ScriptedProvider::new("  Banana: an apple a day, a banana at noon.  "),
        &config,
    );
    let display = RecordingDisplay::new();

    dispatcher
        .trigger(&fruit_vault(), &FixedSelection::empty(), &display)
        .unwrap();

    assert_eq!(
        display.shown(),
        vec![DisplayPayload::Text {
            title: "Found an association".to_string(),
            body: "Banana: an apple a day, a banana at noon.".to_string(),
        }]
    );
    let calls = dispatcher.provider().calls();
    assert_eq!(calls[0].0, None);
    assert!(calls[0].1.contains("best associated with Apple"));
}

#[test]
fn test_directory_vault_end_to_end() {
    let dir = TempDir::new().unwrap();
    for name in ["Apple.md", "Banana.md", "Screenshot 2024.png", "Cherry.md"] {
        std::fs::write(dir.path().join(name), "").unwrap();
    }
    std::fs::create_dir(dir.path().join(".obsidian")).unwrap();
    std::fs::write(dir.path().join(".obsidian").join("Durian.md"), "").unwrap();

    let vault = FsVault::open(dir.path()).unwrap().with_active("Apple");
    let reply = r#"{"Banana": "Apple banana bread.", "Cherry": "Cherry and apple pie."}"#;
    let dispatcher = Dispatcher::from_config(ScriptedProvider::new(reply), &config(4));
    let display = RecordingDisplay::new();

    dispatcher
        .trigger(&vault, &FixedSelection::empty(), &display)
        .unwrap();

    let prompt = &dispatcher.provider().calls()[0].1;
    assert!(prompt.contains("- Banana\n- Cherry"));
    assert!(!prompt.contains("Durian"));
    assert!(!prompt.contains("Screenshot"));
}

#[test]
fn test_guard_idle_after_every_outcome() {
    let dispatcher = Dispatcher::from_config(ScriptedProvider::new("not json"), &config(5));
    let display = RecordingDisplay::new();

    for selection in ["", "Obsidian", ""] {
        let _ = dispatcher.trigger(&fruit_vault(), &FixedSelection::new(selection), &display);
        assert!(!dispatcher.is_busy());
    }
    assert_eq!(dispatcher.provider().calls().len(), 3);
}
