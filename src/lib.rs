//! # Wordlink
//!
//! Word-association prompts built from a note vault.
//!
//! One user action draws a random handful of note titles from the vault and
//! asks a chat-completion service to pair each of them with the title of the
//! note currently open. When the user has text selected instead, the service
//! is asked to guess which word the selection describes.
//!
//! ## Pipeline
//!
//! - [`sampler`]: bounded random subset of the vault, minus reserved names
//! - [`services::AssociatorService`]: candidate sentences keyed by note title
//! - [`services::GuesserService`]: one-word guess for a selection
//! - [`dispatcher::Dispatcher`]: picks a pipeline and allows one run at a time
//!
//! The host application (vault listing, selection, rendering) is reached only
//! through the traits in [`host`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use wordlink::dispatcher::Dispatcher;
//! use wordlink::llm::OpenAiClient;
//!
//! let client = OpenAiClient::new().with_api_key("sk-...");
//! let dispatcher = Dispatcher::from_config(client, &config);
//! dispatcher.trigger(&vault, &selection, &display)?;
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod host;
pub mod llm;
pub mod models;
pub mod observability;
pub mod sampler;
pub mod services;

pub use config::{AssociationMode, SamplerConfig, Settings, WordlinkConfig};
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use llm::LlmProvider;
pub use models::{
    Association, AssociationRequest, AssociationResult, DisplayPayload, GuessRequest, GuessResult,
    Note,
};

/// Error type for wordlink operations.
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Missing active note, empty arguments, unreadable vault path |
/// | `OperationFailed` | Config I/O, TOML errors, logging initialization |
/// | `SamplingImpossible` | Requested sample is larger than the candidate pool |
/// | `NetworkFailure` | Transport error, non-2xx status, missing token, empty choices |
/// | `ResponseParseFailure` | Association content is not a JSON object of strings |
/// | `Busy` | A pipeline is already running |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation failed.
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// The sample cannot be drawn without replacement.
    ///
    /// Raised instead of looping forever when `requested` exceeds the number
    /// of notes in the pool.
    #[error("cannot sample {requested} notes from a pool of {available}")]
    SamplingImpossible {
        /// Requested sample size.
        requested: usize,
        /// Pool size.
        available: usize,
    },

    /// The text-generation request did not produce a usable response.
    ///
    /// Missing credentials are reported through this variant as well.
    #[error("request '{operation}' failed: {cause}")]
    NetworkFailure {
        /// The request stage that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// The service answered, but not with the expected shape.
    #[error("could not parse service response: {cause}")]
    ResponseParseFailure {
        /// Why parsing failed.
        cause: String,
        /// The raw message content.
        content: String,
    },

    /// Another pipeline is still in flight.
    #[error("an association is already in progress")]
    Busy,
}

/// Result type alias for wordlink operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidInput("no active note".to_string());
        assert_eq!(err.to_string(), "invalid input: no active note");

        let err = Error::SamplingImpossible {
            requested: 20,
            available: 3,
        };
        assert_eq!(err.to_string(), "cannot sample 20 notes from a pool of 3");

        let err = Error::NetworkFailure {
            operation: "openai_request".to_string(),
            cause: "timed out".to_string(),
        };
        assert_eq!(err.to_string(), "request 'openai_request' failed: timed out");

        assert_eq!(
            Error::Busy.to_string(),
            "an association is already in progress"
        );
    }
}
