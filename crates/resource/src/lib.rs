//! EHR resource records and their JSON wire form.
//!
//! This crate provides the **data model** shown by the dashboard and the helpers used to move it
//! across the record source boundary:
//! - domain types for resource records and their processing metadata
//! - JSON (de)serialisation matching the record source endpoint
//! - a small fixed sample set for demos and tests
//!
//! Records are immutable once built. Consumers filter, sort and page *views* over a collection;
//! nothing in the workspace edits a record in place.

pub mod resource;
pub mod sample;

// Re-export facade
pub use resource::Resources;

// Re-export public domain-level types
pub use resource::{
    EhrResource, FhirVersion, ProcessingState, ResourceIdentifier, ResourceMetadata,
    ResourceWrapper,
};
pub use sample::sample_resources;

/// Errors returned by the `ehr-resource` boundary crate.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("translation error: {0}")]
    Translation(String),
}

/// Type alias for Results that can fail with a [`ResourceError`].
pub type ResourceResult<T> = Result<T, ResourceError>;
