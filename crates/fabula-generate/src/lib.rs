#![forbid(unsafe_code)]

//! Generation progress poller.
//!
//! Starts a backend generation job and polls the book's status until it
//! completes, fails, or the poll budget runs out, translating per-scene
//! statuses into [`fabula_events::GenerationEvent`] progress.

mod error;
mod poller;

pub use error::{GenerateError, GenerateResult};
pub use poller::{Generator, PollOptions};
