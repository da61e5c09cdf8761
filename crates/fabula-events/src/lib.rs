#![forbid(unsafe_code)]

//! Observability events for the fabula pipeline.
//!
//! Components publish onto a shared [`EventBus`]; any number of subscribers
//! (UI progress bars, loggers, tests) receive every event independently.

mod bus;
mod event;
mod generation;
mod upload;

pub use bus::EventBus;
pub use event::Event;
pub use generation::GenerationEvent;
pub use upload::UploadEvent;
