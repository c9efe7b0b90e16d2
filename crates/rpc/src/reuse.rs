//! Permissioned-reuse endpoints: request, grant, reject.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use verity_types::{ContentId, PermissionRequest, PrincipalId, RequestStatus};

use crate::content::ContentRecordResponse;
use crate::server::{ApiError, SharedState};

/// Request to open a reuse ask against a content record.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReuseRequestBody {
    pub requester_id: String,
}

/// Request by the content owner to grant a pending ask.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GrantRequest {
    pub requester_id: String,
    pub new_content_id: String,
    pub caller_id: String,
}

/// Request by the content owner to reject a pending ask.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RejectRequest {
    pub requester_id: String,
    pub caller_id: String,
}

#[derive(Debug, Serialize)]
pub struct PermissionRequestResponse {
    pub content_id: String,
    pub requester_id: String,
    pub status: String,
    pub requested_at_us: u64,
}

impl From<PermissionRequest> for PermissionRequestResponse {
    fn from(request: PermissionRequest) -> Self {
        Self {
            content_id: request.content_id.to_string(),
            requester_id: request.requester_id.to_string(),
            status: match request.status {
                RequestStatus::Pending => "pending".to_string(),
                RequestStatus::Granted => "granted".to_string(),
                RequestStatus::Rejected => "rejected".to_string(),
            },
            requested_at_us: request.requested_at_us,
        }
    }
}

/// POST /content/:content_id/reuse/request
pub async fn handle_request_reuse(
    State(state): State<SharedState>,
    Path(content_id): Path<String>,
    Json(body): Json<ReuseRequestBody>,
) -> Result<Json<PermissionRequestResponse>, ApiError> {
    state.record_request();
    let request = state.registry.request_reuse(
        &ContentId::new(content_id),
        &PrincipalId::new(body.requester_id),
    )?;
    Ok(Json(request.into()))
}

/// POST /content/:content_id/reuse/grant
pub async fn handle_grant_reuse(
    State(state): State<SharedState>,
    Path(content_id): Path<String>,
    Json(body): Json<GrantRequest>,
) -> Result<Json<ContentRecordResponse>, ApiError> {
    state.record_request();
    let record = state.registry.grant_reuse(
        &ContentId::new(content_id),
        &PrincipalId::new(body.requester_id),
        ContentId::new(body.new_content_id),
        &PrincipalId::new(body.caller_id),
    )?;
    Ok(Json(record.into()))
}

/// POST /content/:content_id/reuse/reject
pub async fn handle_reject_reuse(
    State(state): State<SharedState>,
    Path(content_id): Path<String>,
    Json(body): Json<RejectRequest>,
) -> Result<Json<PermissionRequestResponse>, ApiError> {
    state.record_request();
    let request = state.registry.reject_reuse(
        &ContentId::new(content_id),
        &PrincipalId::new(body.requester_id),
        &PrincipalId::new(body.caller_id),
    )?;
    Ok(Json(request.into()))
}
