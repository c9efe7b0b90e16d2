//! Identity endpoints: registration, lookup, reputation, profile.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use verity_registry::Profile;
use verity_types::{Identity, PrincipalId};

use crate::content::ContentRecordResponse;
use crate::server::{ApiError, SharedState};

/// Request to register a new identity.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub principal_id: String,
    pub handle: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub avatar_ref: String,
}

/// Request to update the mutable profile fields.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar_ref: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct IdentityResponse {
    pub principal_id: String,
    pub handle: String,
    pub bio: String,
    pub avatar_ref: String,
    pub reputation_score: u32,
}

impl From<Identity> for IdentityResponse {
    fn from(identity: Identity) -> Self {
        Self {
            principal_id: identity.principal_id.to_string(),
            handle: identity.handle.to_string(),
            bio: identity.bio,
            avatar_ref: identity.avatar_ref,
            reputation_score: identity.reputation_score,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReputationResponse {
    pub principal_id: String,
    pub reputation_score: u32,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub identity: IdentityResponse,
    pub contents: Vec<ContentRecordResponse>,
}

impl From<Profile> for ProfileResponse {
    fn from(profile: Profile) -> Self {
        Self {
            identity: profile.identity.into(),
            contents: profile
                .contents
                .into_iter()
                .map(ContentRecordResponse::from)
                .collect(),
        }
    }
}

/// Page selector shared by the listing endpoints.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub offset: usize,
    #[serde(default = "default_page_limit")]
    pub limit: usize,
}

fn default_page_limit() -> usize {
    20
}

/// POST /identity/register
pub async fn handle_register(
    State(state): State<SharedState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<IdentityResponse>, ApiError> {
    state.record_request();
    let identity = state.registry.register(
        PrincipalId::new(request.principal_id),
        &request.handle,
        &request.bio,
        &request.avatar_ref,
    )?;
    Ok(Json(identity.into()))
}

/// GET /identity/:principal
pub async fn handle_get_identity(
    State(state): State<SharedState>,
    Path(principal): Path<String>,
) -> Result<Json<IdentityResponse>, ApiError> {
    state.record_request();
    let identity = state.registry.get_identity(&PrincipalId::new(principal))?;
    Ok(Json(identity.into()))
}

/// GET /identity/:principal/reputation
pub async fn handle_get_reputation(
    State(state): State<SharedState>,
    Path(principal): Path<String>,
) -> Result<Json<ReputationResponse>, ApiError> {
    state.record_request();
    let principal_id = PrincipalId::new(principal);
    let reputation_score = state.registry.get_reputation(&principal_id)?;
    Ok(Json(ReputationResponse {
        principal_id: principal_id.to_string(),
        reputation_score,
    }))
}

/// GET /identity/:principal/profile
pub async fn handle_get_profile(
    State(state): State<SharedState>,
    Path(principal): Path<String>,
    Query(page): Query<PageQuery>,
) -> Result<Json<ProfileResponse>, ApiError> {
    state.record_request();
    let profile =
        state
            .registry
            .get_profile(&PrincipalId::new(principal), page.offset, page.limit)?;
    Ok(Json(profile.into()))
}

/// POST /identity/:principal/profile
pub async fn handle_update_profile(
    State(state): State<SharedState>,
    Path(principal): Path<String>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<IdentityResponse>, ApiError> {
    state.record_request();
    let identity = state.registry.update_profile(
        &PrincipalId::new(principal),
        request.bio,
        request.avatar_ref,
    )?;
    Ok(Json(identity.into()))
}
