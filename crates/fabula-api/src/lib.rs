#![forbid(unsafe_code)]

//! Typed client for the storybook generator backend.
//!
//! One method per REST endpoint, no retry at this layer — reliability policy
//! lives in `fabula-upload` and `fabula-generate`.

mod client;
mod error;
mod models;
mod traits;

pub use crate::{
    client::{ApiClient, ApiOptions},
    error::{ApiError, ApiResult},
    models::{
        Book, BookScene, BookStatus, GenerateAck, GenerateOptions, PresignedTarget,
        RegenerateTarget, SceneResourceStatus,
    },
    traits::Api,
};

#[cfg(any(test, feature = "test-utils"))]
pub use crate::traits::ApiMock;
