//! Error types for the provenance registry.

use thiserror::Error;

/// Closed taxonomy of registry failures. Every mutating operation either
/// fully commits or reports exactly one of these with no side effect.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Principal already registered: {principal}")]
    AlreadyRegistered { principal: String },

    #[error("Handle cannot be empty")]
    EmptyHandle,

    #[error("Handle already taken: {handle}")]
    HandleTaken { handle: String },

    #[error("Identity not found: {principal}")]
    IdentityNotFound { principal: String },

    #[error("Content id already exists: {content_id}")]
    DuplicateContentId { content_id: String },

    #[error("Uploader has no identity: {principal}")]
    UnknownUploader { principal: String },

    #[error("Requester has no identity: {principal}")]
    UnknownRequester { principal: String },

    #[error("Content not found: {content_id}")]
    ContentNotFound { content_id: String },

    #[error("Cannot request reuse of own content: {content_id}")]
    CannotRequestOwnContent { content_id: String },

    #[error("Cannot request reuse of a deepfake record: {content_id}")]
    CannotReuseDeepfake { content_id: String },

    #[error("Invalid fingerprints: {reason}")]
    InvalidFingerprints { reason: String },

    #[error("Reuse already requested for {content_id} by {requester}")]
    AlreadyRequested {
        content_id: String,
        requester: String,
    },

    #[error("No pending reuse request for {content_id} by {requester}")]
    RequestNotPending {
        content_id: String,
        requester: String,
    },

    #[error("Not authorized: {principal} does not own {content_id}")]
    NotAuthorized {
        principal: String,
        content_id: String,
    },
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
