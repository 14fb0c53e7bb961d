//! Data models for wordlink.
//!
//! Notes, the requests built from them, and the results handed to the
//! display collaborator.

mod association;
mod display;
mod guess;
mod note;

pub use association::{Association, AssociationRequest, AssociationResult};
pub use display::DisplayPayload;
pub use guess::{GuessRequest, GuessResult};
pub use note::Note;
