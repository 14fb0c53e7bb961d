//! Pipelines run by the dispatcher.
//!
//! Each service performs exactly one request per call and never retries.

mod associator;
mod guesser;

pub use associator::{AssociationOutcome, AssociatorService};
pub use guesser::GuesserService;
