#![forbid(unsafe_code)]

use std::time::Duration;

use fabula_core::ResourceKind;
use url::Url;

/// Events emitted while relocating one scene asset to object storage.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadEvent {
    /// A client-side upload started for this resource.
    Started {
        scene_number: u32,
        kind: ResourceKind,
    },

    /// Bytes handed to the transport during the presigned PUT.
    ///
    /// `total` is always the full blob length; `percent` is `loaded / total`
    /// scaled to 0–100.
    Progress {
        scene_number: u32,
        kind: ResourceKind,
        loaded: u64,
        total: u64,
        percent: f32,
    },

    /// An attempt failed and the pipeline is waiting out a backoff delay.
    Retrying {
        scene_number: u32,
        kind: ResourceKind,
        /// Attempt that just failed, 1-based.
        attempt: u32,
        delay: Duration,
    },

    /// Client-side retries are exhausted; escalating to the server-side
    /// compensating upload.
    FallingBack {
        scene_number: u32,
        kind: ResourceKind,
    },

    /// The resource is durable at `storage_url`.
    Completed {
        scene_number: u32,
        kind: ResourceKind,
        storage_url: Url,
    },
}
