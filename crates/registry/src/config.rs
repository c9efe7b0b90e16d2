//! Registry configuration.

use serde::{Deserialize, Serialize};

/// Named reputation-policy values. The specified behavior only pins the
/// initial score; the deltas are deployment policy, so they live here
/// instead of being hardcoded at call sites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReputationPolicy {
    /// Score assigned to every identity at registration.
    pub initial_score: u32,
    /// Awarded to the uploader on a successful genuine submission.
    pub genuine_upload_reward: u32,
    /// Awarded to the granting owner when a reuse request is granted.
    pub reuse_grant_reward: u32,
    /// Deducted (floored at zero) from the uploader of a genuine record
    /// whose fingerprint set is exactly matched by a deepfake report from
    /// a different principal.
    pub deepfake_match_penalty: u32,
}

impl Default for ReputationPolicy {
    fn default() -> Self {
        Self {
            initial_score: 100,
            genuine_upload_reward: 5,
            reuse_grant_reward: 10,
            deepfake_match_penalty: 20,
        }
    }
}

/// Top-level registry configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub reputation: ReputationPolicy,
}
