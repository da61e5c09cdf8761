#![forbid(unsafe_code)]

//! Shared resource identity and storage-key conventions for the fabula
//! workspace.

mod key;
mod resource;

pub use key::{StorageKey, unique_unix_millis};
pub use resource::{ResourceId, ResourceKind};
