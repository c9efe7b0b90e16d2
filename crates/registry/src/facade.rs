//! The registry facade: the single entry point external collaborators call.

use crate::config::RegistryConfig;
use crate::content::ContentStore;
use crate::errors::Result;
use crate::events::{EventObserver, SequencedEvent};
use crate::identity::IdentityStore;
use crate::ledger::Ledger;
use crate::provenance::ProvenanceWorkflow;
use serde::Serialize;
use std::sync::Arc;
use verity_types::{
    ContentId, ContentRecord, FingerprintSet, Handle, Identity, PermissionRequest, PrincipalId,
};

/// An identity together with a page of its content records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    pub identity: Identity,
    pub contents: Vec<ContentRecord>,
}

/// Ledger counters for health reporting.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RegistryStats {
    pub identities: u64,
    pub contents: u64,
    pub pending_requests: u64,
    pub events: u64,
}

/// Wraps the three stores over one shared ledger. Performs no business
/// logic of its own beyond request shaping and aggregation; every call
/// delegates to a store and reports the store's typed outcome.
pub struct Registry {
    ledger: Ledger,
    identities: IdentityStore,
    contents: ContentStore,
    provenance: ProvenanceWorkflow,
    config: RegistryConfig,
}

impl Registry {
    pub fn new(config: RegistryConfig) -> Self {
        let ledger = Ledger::new();
        let identities = IdentityStore::new(ledger.clone(), config.reputation.clone());
        let contents = ContentStore::new(ledger.clone(), config.reputation.clone());
        let provenance = ProvenanceWorkflow::new(ledger.clone(), config.reputation.clone());
        Self {
            ledger,
            identities,
            contents,
            provenance,
            config,
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    // --- identity namespace -------------------------------------------

    pub fn register(
        &self,
        principal_id: PrincipalId,
        handle: &str,
        bio: &str,
        avatar_ref: &str,
    ) -> Result<Identity> {
        self.identities.register(
            principal_id,
            Handle::new(handle),
            bio.to_string(),
            avatar_ref.to_string(),
        )
    }

    pub fn get_identity(&self, principal_id: &PrincipalId) -> Result<Identity> {
        self.identities.lookup(principal_id)
    }

    pub fn update_profile(
        &self,
        principal_id: &PrincipalId,
        bio: Option<String>,
        avatar_ref: Option<String>,
    ) -> Result<Identity> {
        self.identities.update_profile(principal_id, bio, avatar_ref)
    }

    pub fn get_reputation(&self, principal_id: &PrincipalId) -> Result<u32> {
        self.identities.reputation(principal_id)
    }

    /// Identity plus a caller-supplied page of their content records.
    pub fn get_profile(
        &self,
        principal_id: &PrincipalId,
        offset: usize,
        limit: usize,
    ) -> Result<Profile> {
        let identity = self.identities.lookup(principal_id)?;
        let contents = self.contents.list_by_uploader(principal_id, offset, limit);
        Ok(Profile { identity, contents })
    }

    // --- content namespace --------------------------------------------

    pub fn submit_genuine(
        &self,
        content_id: ContentId,
        uploader_id: PrincipalId,
        fingerprints: FingerprintSet,
    ) -> Result<ContentRecord> {
        self.contents
            .submit_genuine(content_id, uploader_id, fingerprints)
    }

    pub fn submit_deepfake_report(
        &self,
        content_id: ContentId,
        reporter_id: PrincipalId,
        fingerprints: FingerprintSet,
    ) -> Result<ContentRecord> {
        self.contents
            .submit_deepfake_report(content_id, reporter_id, fingerprints)
    }

    pub fn get_content(&self, content_id: &ContentId) -> Result<ContentRecord> {
        self.contents.get(content_id)
    }

    // --- provenance namespace -----------------------------------------

    pub fn request_reuse(
        &self,
        content_id: &ContentId,
        requester_id: &PrincipalId,
    ) -> Result<PermissionRequest> {
        self.provenance.request_reuse(content_id, requester_id)
    }

    pub fn grant_reuse(
        &self,
        content_id: &ContentId,
        requester_id: &PrincipalId,
        new_content_id: ContentId,
        caller_id: &PrincipalId,
    ) -> Result<ContentRecord> {
        self.provenance
            .grant_reuse(content_id, requester_id, new_content_id, caller_id)
    }

    pub fn reject_reuse(
        &self,
        content_id: &ContentId,
        requester_id: &PrincipalId,
        caller_id: &PrincipalId,
    ) -> Result<PermissionRequest> {
        self.provenance
            .reject_reuse(content_id, requester_id, caller_id)
    }

    pub fn get_request(
        &self,
        content_id: &ContentId,
        requester_id: &PrincipalId,
    ) -> Option<PermissionRequest> {
        self.provenance.get_request(content_id, requester_id)
    }

    // --- events and introspection -------------------------------------

    /// Register an observer for future commits.
    pub fn subscribe(&self, observer: Arc<dyn EventObserver>) {
        self.ledger.subscribe(observer);
    }

    /// Replay the ordered feed from a sequence number (exclusive).
    pub fn events_since(&self, since: u64) -> Vec<SequencedEvent> {
        self.ledger.events_since(since)
    }

    pub fn stats(&self) -> RegistryStats {
        self.ledger.read(|state| RegistryStats {
            identities: state.identities.len() as u64,
            contents: state.contents.len() as u64,
            pending_requests: state
                .requests
                .values()
                .filter(|r| r.status == verity_types::RequestStatus::Pending)
                .count() as u64,
            events: state.events.len() as u64,
        })
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}
