//! Permissioned-reuse workflow: request, grant, reject.

use crate::config::ReputationPolicy;
use crate::errors::{RegistryError, Result};
use crate::events::RegistryEvent;
use crate::identity::adjust_reputation_in;
use crate::ledger::{Ledger, LedgerState};
use tracing::info;
use verity_types::{
    Classification, ContentId, ContentRecord, PermissionRequest, PrincipalId, RequestStatus,
};

/// Coordinates reuse requests and grants between two identities. Grants
/// create derivative content records whose provenance chain points at the
/// original uploader.
pub struct ProvenanceWorkflow {
    ledger: Ledger,
    policy: ReputationPolicy,
}

impl ProvenanceWorkflow {
    pub(crate) fn new(ledger: Ledger, policy: ReputationPolicy) -> Self {
        Self { ledger, policy }
    }

    /// Ask for permission to create a derivative of someone else's content.
    ///
    /// A new request may be filed after an earlier one for the same pair
    /// reached a terminal state; the terminal request itself is never
    /// mutated, it is superseded by a fresh pending one.
    pub fn request_reuse(
        &self,
        content_id: &ContentId,
        requester_id: &PrincipalId,
    ) -> Result<PermissionRequest> {
        self.ledger.commit(|state| {
            let record =
                state
                    .contents
                    .get(content_id)
                    .ok_or_else(|| RegistryError::ContentNotFound {
                        content_id: content_id.to_string(),
                    })?;
            if !state.identities.contains_key(requester_id) {
                return Err(RegistryError::UnknownRequester {
                    principal: requester_id.to_string(),
                });
            }

            let key = (content_id.clone(), requester_id.clone());
            if matches!(state.requests.get(&key), Some(r) if r.status == RequestStatus::Pending) {
                return Err(RegistryError::AlreadyRequested {
                    content_id: content_id.to_string(),
                    requester: requester_id.to_string(),
                });
            }
            if record.uploader_id == *requester_id {
                return Err(RegistryError::CannotRequestOwnContent {
                    content_id: content_id.to_string(),
                });
            }
            if record.is_deepfake() {
                return Err(RegistryError::CannotReuseDeepfake {
                    content_id: content_id.to_string(),
                });
            }

            let request = PermissionRequest {
                content_id: content_id.clone(),
                requester_id: requester_id.clone(),
                status: RequestStatus::Pending,
                requested_at_us: state.next_timestamp_us(),
            };
            state.requests.insert(key, request.clone());

            info!(content = %content_id, requester = %requester_id, "reuse requested");
            Ok((
                request,
                RegistryEvent::ReuseRequested {
                    content_id: content_id.clone(),
                    requester_id: requester_id.clone(),
                },
            ))
        })
    }

    /// Grant a pending request, creating the derivative record under
    /// `new_content_id`. Only the uploader of the original record may
    /// grant; the grant transitions the request Pending -> Granted exactly
    /// once. Fingerprints are copied from the source record: a sanctioned
    /// reuse is the same content.
    pub fn grant_reuse(
        &self,
        content_id: &ContentId,
        requester_id: &PrincipalId,
        new_content_id: ContentId,
        caller_id: &PrincipalId,
    ) -> Result<ContentRecord> {
        let reward = i64::from(self.policy.reuse_grant_reward);
        self.ledger.commit(move |state| {
            let original = authorize_owner(state, content_id, caller_id)?.clone();

            let key = (content_id.clone(), requester_id.clone());
            match state.requests.get(&key) {
                Some(r) if r.status == RequestStatus::Pending => {}
                _ => {
                    return Err(RegistryError::RequestNotPending {
                        content_id: content_id.to_string(),
                        requester: requester_id.to_string(),
                    });
                }
            }
            if state.contents.contains_key(&new_content_id) {
                return Err(RegistryError::DuplicateContentId {
                    content_id: new_content_id.to_string(),
                });
            }

            let derivative = ContentRecord {
                content_id: new_content_id.clone(),
                uploader_id: requester_id.clone(),
                fingerprints: original.fingerprints.clone(),
                classification: Classification::Genuine,
                timestamp_us: state.next_timestamp_us(),
                original_owner_id: original.uploader_id.clone(),
                is_permissioned_derivative: true,
            };

            if let Some(request) = state.requests.get_mut(&key) {
                request.status = RequestStatus::Granted;
            }
            state
                .uploads
                .entry(requester_id.clone())
                .or_default()
                .push(new_content_id.clone());
            state
                .contents
                .insert(new_content_id.clone(), derivative.clone());

            adjust_reputation_in(state, caller_id, reward)?;

            info!(
                content = %content_id,
                requester = %requester_id,
                derivative = %new_content_id,
                "reuse granted"
            );
            Ok((
                derivative,
                RegistryEvent::ReuseGranted {
                    content_id: content_id.clone(),
                    requester_id: requester_id.clone(),
                    new_content_id,
                },
            ))
        })
    }

    /// Reject a pending request. Owner-authorized, symmetrical to grant;
    /// Rejected is terminal.
    pub fn reject_reuse(
        &self,
        content_id: &ContentId,
        requester_id: &PrincipalId,
        caller_id: &PrincipalId,
    ) -> Result<PermissionRequest> {
        self.ledger.commit(|state| {
            authorize_owner(state, content_id, caller_id)?;

            let key = (content_id.clone(), requester_id.clone());
            let request = match state.requests.get_mut(&key) {
                Some(r) if r.status == RequestStatus::Pending => r,
                _ => {
                    return Err(RegistryError::RequestNotPending {
                        content_id: content_id.to_string(),
                        requester: requester_id.to_string(),
                    });
                }
            };
            request.status = RequestStatus::Rejected;
            let request = request.clone();

            info!(content = %content_id, requester = %requester_id, "reuse rejected");
            Ok((
                request,
                RegistryEvent::ReuseRejected {
                    content_id: content_id.clone(),
                    requester_id: requester_id.clone(),
                },
            ))
        })
    }

    /// Latest request for a pair, if any.
    pub fn get_request(
        &self,
        content_id: &ContentId,
        requester_id: &PrincipalId,
    ) -> Option<PermissionRequest> {
        self.ledger.read(|state| {
            state
                .requests
                .get(&(content_id.clone(), requester_id.clone()))
                .cloned()
        })
    }
}

/// The caller must be the uploader of the referenced record.
fn authorize_owner<'a>(
    state: &'a LedgerState,
    content_id: &ContentId,
    caller_id: &PrincipalId,
) -> Result<&'a ContentRecord> {
    let record = state
        .contents
        .get(content_id)
        .ok_or_else(|| RegistryError::ContentNotFound {
            content_id: content_id.to_string(),
        })?;
    if record.uploader_id != *caller_id {
        return Err(RegistryError::NotAuthorized {
            principal: caller_id.to_string(),
            content_id: content_id.to_string(),
        });
    }
    Ok(record)
}
