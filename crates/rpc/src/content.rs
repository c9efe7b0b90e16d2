//! Content endpoints: genuine submissions, deepfake reports, lookup.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use verity_types::{Classification, ContentId, ContentRecord, FingerprintSet, PrincipalId};

use crate::server::{ApiError, SharedState};

/// Wire form of the four-fingerprint set.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FingerprintsBody {
    pub perceptual: String,
    pub transform: String,
    pub histogram: String,
    pub model_derived: String,
}

impl From<FingerprintsBody> for FingerprintSet {
    fn from(body: FingerprintsBody) -> Self {
        FingerprintSet::new(
            body.perceptual,
            body.transform,
            body.histogram,
            body.model_derived,
        )
    }
}

/// Request to record a genuine upload.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubmitContentRequest {
    pub content_id: String,
    pub uploader_id: String,
    pub fingerprints: FingerprintsBody,
}

/// Request to log a detected deepfake.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubmitReportRequest {
    pub content_id: String,
    pub reporter_id: String,
    pub fingerprints: FingerprintsBody,
}

#[derive(Debug, Serialize)]
pub struct ContentRecordResponse {
    pub content_id: String,
    pub uploader_id: String,
    pub fingerprints: FingerprintSet,
    pub classification: String,
    pub timestamp_us: u64,
    pub original_owner_id: String,
    pub is_permissioned_derivative: bool,
}

impl From<ContentRecord> for ContentRecordResponse {
    fn from(record: ContentRecord) -> Self {
        Self {
            content_id: record.content_id.to_string(),
            uploader_id: record.uploader_id.to_string(),
            fingerprints: record.fingerprints,
            classification: match record.classification {
                Classification::Genuine => "genuine".to_string(),
                Classification::Deepfake => "deepfake".to_string(),
            },
            timestamp_us: record.timestamp_us,
            original_owner_id: record.original_owner_id.to_string(),
            is_permissioned_derivative: record.is_permissioned_derivative,
        }
    }
}

/// POST /content/genuine
pub async fn handle_submit_genuine(
    State(state): State<SharedState>,
    Json(request): Json<SubmitContentRequest>,
) -> Result<Json<ContentRecordResponse>, ApiError> {
    state.record_request();
    let record = state.registry.submit_genuine(
        ContentId::new(request.content_id),
        PrincipalId::new(request.uploader_id),
        request.fingerprints.into(),
    )?;
    Ok(Json(record.into()))
}

/// POST /content/deepfake
pub async fn handle_submit_deepfake(
    State(state): State<SharedState>,
    Json(request): Json<SubmitReportRequest>,
) -> Result<Json<ContentRecordResponse>, ApiError> {
    state.record_request();
    let record = state.registry.submit_deepfake_report(
        ContentId::new(request.content_id),
        PrincipalId::new(request.reporter_id),
        request.fingerprints.into(),
    )?;
    Ok(Json(record.into()))
}

/// GET /content/:content_id
pub async fn handle_get_content(
    State(state): State<SharedState>,
    Path(content_id): Path<String>,
) -> Result<Json<ContentRecordResponse>, ApiError> {
    state.record_request();
    let record = state.registry.get_content(&ContentId::new(content_id))?;
    Ok(Json(record.into()))
}
