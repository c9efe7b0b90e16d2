//! Identity registration and reputation accounting.

use crate::config::ReputationPolicy;
use crate::errors::{RegistryError, Result};
use crate::events::RegistryEvent;
use crate::ledger::{Ledger, LedgerState};
use tracing::{debug, info};
use verity_types::{Handle, Identity, PrincipalId};

/// Owns user registration records; enforces uniqueness of handle and of
/// owning principal.
pub struct IdentityStore {
    ledger: Ledger,
    policy: ReputationPolicy,
}

impl IdentityStore {
    pub(crate) fn new(ledger: Ledger, policy: ReputationPolicy) -> Self {
        Self { ledger, policy }
    }

    /// Register a new identity.
    ///
    /// Check order is part of the observable contract: an empty handle is
    /// rejected before any uniqueness check runs, and a second registration
    /// attempt by the same principal is rejected even if it carries a
    /// different, otherwise-available handle.
    pub fn register(
        &self,
        principal_id: PrincipalId,
        handle: Handle,
        bio: String,
        avatar_ref: String,
    ) -> Result<Identity> {
        if !handle.is_valid() {
            return Err(RegistryError::EmptyHandle);
        }

        let initial_score = self.policy.initial_score;
        self.ledger.commit(move |state| {
            if state.identities.contains_key(&principal_id) {
                return Err(RegistryError::AlreadyRegistered {
                    principal: principal_id.to_string(),
                });
            }
            if state.handle_owners.contains_key(handle.as_str()) {
                return Err(RegistryError::HandleTaken {
                    handle: handle.to_string(),
                });
            }

            let identity = Identity {
                principal_id: principal_id.clone(),
                handle: handle.clone(),
                bio,
                avatar_ref,
                reputation_score: initial_score,
            };

            state
                .handle_owners
                .insert(handle.to_string(), principal_id.clone());
            state
                .identities
                .insert(principal_id.clone(), identity.clone());

            info!(principal = %principal_id, handle = %handle, "identity registered");
            Ok((
                identity,
                RegistryEvent::IdentityRegistered {
                    principal_id,
                    handle,
                },
            ))
        })
    }

    /// Look up an identity by principal.
    pub fn lookup(&self, principal_id: &PrincipalId) -> Result<Identity> {
        self.ledger.read(|state| {
            state
                .identities
                .get(principal_id)
                .cloned()
                .ok_or_else(|| RegistryError::IdentityNotFound {
                    principal: principal_id.to_string(),
                })
        })
    }

    /// Update the mutable profile fields. The identity key, handle, and
    /// reputation score are untouched.
    pub fn update_profile(
        &self,
        principal_id: &PrincipalId,
        bio: Option<String>,
        avatar_ref: Option<String>,
    ) -> Result<Identity> {
        self.ledger.commit(|state| {
            let identity = state.identities.get_mut(principal_id).ok_or_else(|| {
                RegistryError::IdentityNotFound {
                    principal: principal_id.to_string(),
                }
            })?;

            if let Some(bio) = bio {
                identity.bio = bio;
            }
            if let Some(avatar_ref) = avatar_ref {
                identity.avatar_ref = avatar_ref;
            }

            debug!(principal = %principal_id, "profile updated");
            Ok((
                identity.clone(),
                RegistryEvent::ProfileUpdated {
                    principal_id: principal_id.clone(),
                },
            ))
        })
    }

    /// Current reputation score.
    pub fn reputation(&self, principal_id: &PrincipalId) -> Result<u32> {
        self.lookup(principal_id).map(|i| i.reputation_score)
    }
}

/// Apply a reputation delta inside an open transaction, flooring at zero.
/// Used by the content store and the provenance workflow so the adjustment
/// commits atomically with its triggering operation.
pub(crate) fn adjust_reputation_in(
    state: &mut LedgerState,
    principal_id: &PrincipalId,
    delta: i64,
) -> Result<u32> {
    let identity =
        state
            .identities
            .get_mut(principal_id)
            .ok_or_else(|| RegistryError::IdentityNotFound {
                principal: principal_id.to_string(),
            })?;

    let next = (i64::from(identity.reputation_score) + delta).max(0);
    identity.reputation_score = next as u32;
    debug!(principal = %principal_id, delta, score = identity.reputation_score, "reputation adjusted");
    Ok(identity.reputation_score)
}
