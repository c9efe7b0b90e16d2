//! Verity content-provenance and identity registry.
//!
//! An append-mostly ledger with two namespaces: user identities (unique
//! handle, reputation counter) and content records (four opaque
//! fingerprints, genuine/deepfake classification, provenance chain). A
//! request/grant workflow lets one identity create sanctioned derivatives
//! of another identity's content.
//!
//! All state lives behind a single [`Ledger`] handle; every mutating
//! operation commits atomically and appends exactly one event to an
//! ordered feed. External collaborators go through [`Registry`], the
//! facade over the three stores.

pub mod config;
pub mod content;
pub mod errors;
pub mod events;
pub mod facade;
pub mod identity;
pub mod ledger;
pub mod provenance;

pub use config::{RegistryConfig, ReputationPolicy};
pub use content::ContentStore;
pub use errors::{RegistryError, Result};
pub use events::{EventLog, EventObserver, RegistryEvent, SequencedEvent};
pub use facade::{Profile, Registry, RegistryStats};
pub use identity::IdentityStore;
pub use ledger::Ledger;
pub use provenance::ProvenanceWorkflow;
