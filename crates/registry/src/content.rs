//! Content record storage: genuine submissions and deepfake reports.

use crate::config::ReputationPolicy;
use crate::errors::{RegistryError, Result};
use crate::events::RegistryEvent;
use crate::identity::adjust_reputation_in;
use crate::ledger::{Ledger, LedgerState};
use tracing::{info, warn};
use verity_types::{Classification, ContentId, ContentRecord, FingerprintSet, PrincipalId};

/// Owns content records; enforces uniqueness of content identifier.
/// Records are append-only and never mutated after insertion.
pub struct ContentStore {
    ledger: Ledger,
    policy: ReputationPolicy,
}

impl ContentStore {
    pub(crate) fn new(ledger: Ledger, policy: ReputationPolicy) -> Self {
        Self { ledger, policy }
    }

    /// Record an originally-submitted genuine piece of content. The
    /// uploader earns the configured genuine-upload reward in the same
    /// transaction.
    pub fn submit_genuine(
        &self,
        content_id: ContentId,
        uploader_id: PrincipalId,
        fingerprints: FingerprintSet,
    ) -> Result<ContentRecord> {
        let reward = i64::from(self.policy.genuine_upload_reward);
        self.ledger.commit(move |state| {
            let record = insert_original(
                state,
                content_id,
                uploader_id,
                fingerprints,
                Classification::Genuine,
            )?;

            adjust_reputation_in(state, &record.uploader_id, reward)?;

            info!(content = %record.content_id, uploader = %record.uploader_id, "genuine content recorded");
            let event = RegistryEvent::GenuineContentRecorded {
                content_id: record.content_id.clone(),
                uploader_id: record.uploader_id.clone(),
            };
            Ok((record, event))
        })
    }

    /// Record a deepfake report. If the reported fingerprint set exactly
    /// matches an existing genuine record owned by a different principal,
    /// that uploader takes the configured penalty in the same transaction.
    pub fn submit_deepfake_report(
        &self,
        content_id: ContentId,
        reporter_id: PrincipalId,
        fingerprints: FingerprintSet,
    ) -> Result<ContentRecord> {
        let penalty = i64::from(self.policy.deepfake_match_penalty);
        self.ledger.commit(move |state| {
            let matched_uploader = state
                .genuine_fingerprints
                .get(&fingerprints)
                .and_then(|id| state.contents.get(id))
                .map(|record| record.uploader_id.clone());

            let record = insert_original(
                state,
                content_id,
                reporter_id,
                fingerprints,
                Classification::Deepfake,
            )?;

            if let Some(uploader) = matched_uploader {
                if uploader != record.uploader_id {
                    let score = adjust_reputation_in(state, &uploader, -penalty)?;
                    warn!(
                        content = %record.content_id,
                        matched_uploader = %uploader,
                        score,
                        "deepfake report matched an existing genuine record"
                    );
                }
            }

            info!(content = %record.content_id, reporter = %record.uploader_id, "deepfake recorded");
            let event = RegistryEvent::DeepfakeRecorded {
                content_id: record.content_id.clone(),
                reporter_id: record.uploader_id.clone(),
            };
            Ok((record, event))
        })
    }

    /// Fetch a content record by id.
    pub fn get(&self, content_id: &ContentId) -> Result<ContentRecord> {
        self.ledger.read(|state| {
            state
                .contents
                .get(content_id)
                .cloned()
                .ok_or_else(|| RegistryError::ContentNotFound {
                    content_id: content_id.to_string(),
                })
        })
    }

    /// Page of a principal's content records, newest first.
    pub fn list_by_uploader(
        &self,
        uploader_id: &PrincipalId,
        offset: usize,
        limit: usize,
    ) -> Vec<ContentRecord> {
        self.ledger.read(|state| {
            let ids = match state.uploads.get(uploader_id) {
                Some(ids) => ids,
                None => return Vec::new(),
            };

            ids.iter()
                .rev()
                .skip(offset)
                .take(limit)
                .filter_map(|id| state.contents.get(id).cloned())
                .collect()
        })
    }
}

/// Insert a non-derivative record, enforcing the duplicate-id, known
/// uploader, and fingerprint checks in that order.
fn insert_original(
    state: &mut LedgerState,
    content_id: ContentId,
    uploader_id: PrincipalId,
    fingerprints: FingerprintSet,
    classification: Classification,
) -> Result<ContentRecord> {
    if state.contents.contains_key(&content_id) {
        return Err(RegistryError::DuplicateContentId {
            content_id: content_id.to_string(),
        });
    }
    if !state.identities.contains_key(&uploader_id) {
        return Err(RegistryError::UnknownUploader {
            principal: uploader_id.to_string(),
        });
    }
    fingerprints
        .validate()
        .map_err(|reason| RegistryError::InvalidFingerprints { reason })?;

    let record = ContentRecord {
        content_id: content_id.clone(),
        uploader_id: uploader_id.clone(),
        fingerprints: fingerprints.clone(),
        classification,
        timestamp_us: state.next_timestamp_us(),
        original_owner_id: uploader_id.clone(),
        is_permissioned_derivative: false,
    };

    if classification == Classification::Genuine {
        state
            .genuine_fingerprints
            .entry(fingerprints)
            .or_insert_with(|| content_id.clone());
    }
    state.uploads.entry(uploader_id).or_default().push(content_id.clone());
    state.contents.insert(content_id, record.clone());

    Ok(record)
}
