//! Ledger record types: identities, content records, permission requests.

use crate::ids::{ContentId, Handle, PrincipalId};
use serde::{Deserialize, Serialize};

/// The four parallel opaque fingerprints carried per content record.
///
/// The registry does not compute or compare these perceptually; they are
/// caller-supplied hash strings and only exact string equality is ever used.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FingerprintSet {
    /// Perceptual hash.
    pub perceptual: String,
    /// DCT/transform-domain hash.
    pub transform: String,
    /// Color-histogram hash.
    pub histogram: String,
    /// AI-model-derived feature hash.
    pub model_derived: String,
}

impl FingerprintSet {
    pub fn new(
        perceptual: impl Into<String>,
        transform: impl Into<String>,
        histogram: impl Into<String>,
        model_derived: impl Into<String>,
    ) -> Self {
        Self {
            perceptual: perceptual.into(),
            transform: transform.into(),
            histogram: histogram.into(),
            model_derived: model_derived.into(),
        }
    }

    /// Validate that all four fingerprints are present and non-empty.
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("perceptual", &self.perceptual),
            ("transform", &self.transform),
            ("histogram", &self.histogram),
            ("model_derived", &self.model_derived),
        ] {
            if value.is_empty() {
                return Err(format!("{name} fingerprint must be non-empty"));
            }
        }
        Ok(())
    }
}

/// Genuine/deepfake classification of a content record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Classification {
    Genuine,
    Deepfake,
}

/// Lifecycle state of a permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    Pending,
    Granted,
    Rejected,
}

impl RequestStatus {
    /// Granted and Rejected are terminal; no transition leaves them.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestStatus::Granted | RequestStatus::Rejected)
    }
}

/// A registered principal with a unique handle and reputation counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Primary key; immutable after registration.
    pub principal_id: PrincipalId,
    /// Globally unique human-readable name.
    pub handle: Handle,
    /// Free-text biography, unconstrained.
    pub bio: String,
    /// Opaque content reference for the avatar; may be empty.
    pub avatar_ref: String,
    /// Trustworthiness counter, never negative. Mutated only through
    /// registry policy.
    pub reputation_score: u32,
}

/// An immutable ledger entry for one piece of content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRecord {
    /// Primary key; caller-supplied, globally unique.
    pub content_id: ContentId,
    /// Principal that submitted this record.
    pub uploader_id: PrincipalId,
    /// Four opaque fingerprints, all required.
    pub fingerprints: FingerprintSet,
    /// Genuine or Deepfake.
    pub classification: Classification,
    /// Insertion time in microseconds, assigned by the ledger, strictly
    /// increasing across records.
    pub timestamp_us: u64,
    /// Provenance root. Equals `uploader_id` for original submissions,
    /// and the source record's uploader for permissioned derivatives.
    pub original_owner_id: PrincipalId,
    /// True only for records created through a granted reuse request.
    pub is_permissioned_derivative: bool,
}

impl ContentRecord {
    pub fn is_deepfake(&self) -> bool {
        self.classification == Classification::Deepfake
    }
}

/// A pending ask by one identity to create a sanctioned derivative of
/// another identity's content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRequest {
    pub content_id: ContentId,
    pub requester_id: PrincipalId,
    pub status: RequestStatus,
    /// Request time in microseconds, assigned by the ledger.
    pub requested_at_us: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fingerprints() -> FingerprintSet {
        FingerprintSet::new("phash123", "dct123", "hist123", "ai123")
    }

    #[test]
    fn test_fingerprint_validation() {
        assert!(fingerprints().validate().is_ok());

        let mut missing = fingerprints();
        missing.histogram.clear();
        let err = missing.validate().unwrap_err();
        assert!(err.contains("histogram"));
    }

    #[test]
    fn test_request_status_terminality() {
        assert!(!RequestStatus::Pending.is_terminal());
        assert!(RequestStatus::Granted.is_terminal());
        assert!(RequestStatus::Rejected.is_terminal());
    }

    #[test]
    fn test_content_record_json_round_trip() {
        let record = ContentRecord {
            content_id: ContentId::new("video123"),
            uploader_id: PrincipalId::new("addrA"),
            fingerprints: fingerprints(),
            classification: Classification::Genuine,
            timestamp_us: 1_000_000,
            original_owner_id: PrincipalId::new("addrA"),
            is_permissioned_derivative: false,
        };

        let json = serde_json::to_string(&record).unwrap();
        let back: ContentRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
        assert!(!back.is_deepfake());
    }
}
