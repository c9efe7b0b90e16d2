//! Core domain types for the Verity provenance registry.
//!
//! Everything the ledger records is defined here: principal and content
//! identifiers, the four-part fingerprint set, identity records, content
//! records, and permission requests. The registry itself lives in
//! `verity-registry`; this crate carries no behavior beyond construction
//! and field validation.

pub mod ids;
pub mod records;

pub use ids::{ContentId, Handle, PrincipalId};
pub use records::{
    Classification, ContentRecord, FingerprintSet, Identity, PermissionRequest, RequestStatus,
};
