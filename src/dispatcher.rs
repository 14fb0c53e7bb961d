//! Mode dispatch with a single-flight guard.
//!
//! One trigger runs exactly one pipeline: the guess pipeline when the user
//! has text selected, the association pipeline otherwise. While a pipeline
//! is in flight every other trigger is turned away with a notice. Nothing is
//! queued and nothing is retried.
//!
//! The guard is a one-permit semaphore acquired without waiting, before the
//! pipeline reaches its network call. The permit is released when it goes out
//! of scope, so a failed pipeline frees the guard just like a successful one.

use crate::config::WordlinkConfig;
use crate::host::{Display, SelectionSource, Vault};
use crate::llm::LlmProvider;
use crate::models::{DisplayPayload, GuessResult};
use crate::sampler::Sampler;
use crate::services::{AssociationOutcome, AssociatorService, GuesserService};
use crate::{Error, Result};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Notice shown when a trigger arrives while a pipeline is running.
pub const BUSY_NOTICE: &str = "An association is already in progress";

/// Single-flight guard shared by both pipelines.
///
/// `Idle` while a permit is available, `Busy` while it is held.
#[derive(Debug, Clone)]
pub struct InvocationGuard {
    semaphore: Arc<Semaphore>,
}

/// Proof that the holder is the only running pipeline.
///
/// Dropping it returns the guard to `Idle`.
#[derive(Debug)]
pub struct InvocationPermit {
    _permit: OwnedSemaphorePermit,
}

impl InvocationGuard {
    /// Creates an idle guard.
    #[must_use]
    pub fn new() -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(1)),
        }
    }

    /// Takes the guard without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Busy`] if a permit is already held.
    pub fn try_acquire(&self) -> Result<InvocationPermit> {
        Arc::clone(&self.semaphore)
            .try_acquire_owned()
            .map(|permit| InvocationPermit { _permit: permit })
            .map_err(|_| Error::Busy)
    }

    /// Whether a pipeline currently holds the guard.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.semaphore.available_permits() == 0
    }
}

impl Default for InvocationGuard {
    fn default() -> Self {
        Self::new()
    }
}

/// What a successful trigger ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The guess pipeline ran.
    Guessed(GuessResult),
    /// The association pipeline ran.
    Associated(AssociationOutcome),
}

impl DispatchOutcome {
    /// Name of the pipeline that ran.
    #[must_use]
    pub const fn pipeline(&self) -> &'static str {
        match self {
            Self::Guessed(_) => "guess",
            Self::Associated(_) => "associate",
        }
    }

    /// Converts the outcome into what the display collaborator shows.
    #[must_use]
    pub fn into_payload(self) -> DisplayPayload {
        match self {
            Self::Guessed(result) => DisplayPayload::Guess(result),
            Self::Associated(outcome) => outcome.into_payload(),
        }
    }
}

/// Chooses and runs one pipeline per trigger.
pub struct Dispatcher<P: LlmProvider> {
    llm: Arc<P>,
    associator: AssociatorService<P>,
    guesser: GuesserService<P>,
    guard: InvocationGuard,
}

impl<P: LlmProvider> Dispatcher<P> {
    /// Creates a dispatcher around `llm`.
    #[must_use]
    pub fn new(llm: P, sampler: Sampler) -> Self {
        let llm = Arc::new(llm);
        Self {
            associator: AssociatorService::new(Arc::clone(&llm), sampler),
            guesser: GuesserService::new(Arc::clone(&llm)),
            llm,
            guard: InvocationGuard::new(),
        }
    }

    /// Creates a dispatcher using the sampler and mode from `config`.
    #[must_use]
    pub fn from_config(llm: P, config: &WordlinkConfig) -> Self {
        let mut dispatcher = Self::new(llm, Sampler::from_config(&config.sampler));
        dispatcher.associator = dispatcher.associator.with_mode(config.association.mode);
        dispatcher
    }

    /// The provider both pipelines call.
    #[must_use]
    pub fn provider(&self) -> &P {
        &self.llm
    }

    /// Whether a pipeline is running.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.guard.is_busy()
    }

    /// Handles one user trigger.
    ///
    /// Any non-empty selection runs the guess pipeline, whitespace included;
    /// the guesser then rejects blank text. Results and failures are both
    /// shown through `display`; the rejection notice is the only thing shown
    /// for a trigger that arrives while busy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Busy`] if another pipeline is running, otherwise the
    /// error of the pipeline that ran.
    pub fn trigger<V, S, D>(&self, vault: &V, selection: &S, display: &D) -> Result<DispatchOutcome>
    where
        V: Vault + ?Sized,
        S: SelectionSource + ?Sized,
        D: Display + ?Sized,
    {
        let _permit = match self.guard.try_acquire() {
            Ok(permit) => permit,
            Err(err) => {
                metrics::counter!("wordlink_dispatch_rejections_total").increment(1);
                tracing::info!("Rejected trigger while a pipeline is running");
                display.show(DisplayPayload::Notice(BUSY_NOTICE.to_string()));
                return Err(err);
            },
        };

        let selected = selection.selection_text();
        let pipeline = if selected.is_empty() {
            "associate"
        } else {
            "guess"
        };

        let span = tracing::info_span!("wordlink.dispatch", pipeline, provider = self.llm.name());
        let _enter = span.enter();
        metrics::counter!("wordlink_dispatch_total", "pipeline" => pipeline).increment(1);

        let result = if pipeline == "guess" {
            self.run_guess(vault, &selected)
        } else {
            self.run_associate(vault)
        };

        match result {
            Ok(outcome) => {
                display.show(outcome.clone().into_payload());
                Ok(outcome)
            },
            Err(err) => {
                metrics::counter!("wordlink_pipeline_failures_total", "pipeline" => pipeline)
                    .increment(1);
                tracing::warn!(error = %err, "Pipeline failed");
                display.show(DisplayPayload::Notice(format!("Wordlink failed: {err}")));
                Err(err)
            },
        }
    }

    fn run_guess<V>(&self, vault: &V, selected: &str) -> Result<DispatchOutcome>
    where
        V: Vault + ?Sized,
    {
        let actual = vault
            .active_note()
            .ok_or_else(|| Error::InvalidInput("no active note".to_string()))?;
        self.guesser
            .guess(selected, &actual)
            .map(DispatchOutcome::Guessed)
    }

    fn run_associate<V>(&self, vault: &V) -> Result<DispatchOutcome>
    where
        V: Vault + ?Sized,
    {
        let main = vault
            .active_note()
            .ok_or_else(|| Error::InvalidInput("no active note".to_string()))?;
        let pool = vault.files()?;
        self.associator
            .associate(&main, &pool)
            .map(DispatchOutcome::Associated)
    }
}
