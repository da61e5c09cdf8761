#![forbid(unsafe_code)]

//! # Fabula
//!
//! Facade crate for the storybook client pipeline: durable relocation of
//! generated scene assets to object storage, and generation progress
//! tracking.
//!
//! ## Quick start
//!
//! ```ignore
//! use fabula::{FabulaConfig, Pipeline, ResourceKind};
//!
//! let config = FabulaConfig::new("https://api.example.com".parse()?)
//!     .with_auth_token(token);
//! let pipeline = Pipeline::new(config);
//!
//! let mut events = pipeline.subscribe();
//! pipeline.generate_and_wait("book-1", Default::default()).await?;
//! let url = pipeline
//!     .upload_scene_resource("book-1", 1, &source_url, ResourceKind::Image)
//!     .await?;
//! ```

// ── Re-export sub-crates ────────────────────────────────────────────────

pub mod api {
    pub use fabula_api::*;
}

pub mod events {
    pub use fabula_events::*;
}

pub mod generate {
    pub use fabula_generate::*;
}

pub mod net {
    pub use fabula_net::*;
}

pub mod upload {
    pub use fabula_upload::*;
}

// ── Pipeline ────────────────────────────────────────────────────────────

mod config;
mod pipeline;

pub use config::FabulaConfig;
pub use fabula_core::{ResourceId, ResourceKind, StorageKey};
pub use fabula_events::{Event, EventBus, GenerationEvent, UploadEvent};
pub use pipeline::Pipeline;
