use crate::error::{ApiError, ErrorResponse};
use crate::extract::ValidatedJson;
use crate::keys;
use crate::models::{ValidationRequestPayload, ValidationRequestRecord, ValidationRequestResponse};
use crate::routes;
use crate::state::AppState;
use anyhow::Context;
use axum::{extract::Path, extract::State, http::StatusCode, Json};
use chrono::Utc;
use futures::future::try_join_all;

/// POST /api/:org/req-validate handler - Store a validation request
///
/// Every call writes a new record keyed by capture time, so repeated ids
/// accumulate history rather than overwrite.
#[utoipa::path(
    post,
    path = routes::REQ_VALIDATE,
    params(
        ("org" = String, Path, description = "Owning organization")
    ),
    request_body = ValidationRequestPayload,
    responses(
        (status = 200, description = "Validation request stored", body = ValidationRequestResponse),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 500, description = "Storage error", body = ErrorResponse)
    ),
    tag = "req-validate"
)]
pub async fn create_request_handler(
    State(state): State<AppState>,
    Path(org): Path<String>,
    ValidatedJson(payload): ValidatedJson<ValidationRequestPayload>,
) -> Result<(StatusCode, Json<ValidationRequestResponse>), ApiError> {
    let timestamp = keys::iso_timestamp(Utc::now());
    let key = keys::record_key(&org, &payload.id, &timestamp);

    let record = ValidationRequestRecord {
        organization: org,
        id: payload.id,
        salt: payload.salt,
        timestamp,
    };
    let value = serde_json::to_string(&record)
        .context("Failed to serialize validation request")
        .map_err(ApiError::Internal)?;

    state.requests.put(&key, &value).await?;

    tracing::info!(
        "Stored validation request {} for organization {}",
        record.id,
        record.organization
    );
    Ok((StatusCode::OK, Json(record.into())))
}

/// GET /api/:org/req-validate handler - Fetch the latest validation request
///
/// Picks the greatest key under the organization prefix. A key whose value is
/// missing or unreadable is reported the same as an empty organization.
#[utoipa::path(
    get,
    path = routes::REQ_VALIDATE,
    params(
        ("org" = String, Path, description = "Owning organization")
    ),
    responses(
        (status = 200, description = "Latest validation request", body = ValidationRequestResponse),
        (status = 404, description = "Organization has no validation requests", body = ErrorResponse),
        (status = 500, description = "Storage error", body = ErrorResponse)
    ),
    tag = "req-validate"
)]
pub async fn latest_request_handler(
    State(state): State<AppState>,
    Path(org): Path<String>,
) -> Result<(StatusCode, Json<ValidationRequestResponse>), ApiError> {
    let listed = state
        .requests
        .list(&keys::organization_prefix(&org))
        .await?;

    let Some(key) = keys::latest(listed) else {
        tracing::info!("No validation requests for organization {}", org);
        return Err(ApiError::OrganizationNotFound(org));
    };

    let record = state
        .requests
        .get(&key)
        .await?
        .and_then(|value| serde_json::from_str::<ValidationRequestRecord>(&value).ok());

    match record {
        Some(record) => {
            tracing::info!("Fetched validation request {} for organization {}", record.id, org);
            Ok((StatusCode::OK, Json(record.into())))
        }
        None => {
            tracing::warn!("Missing or unreadable value for key {}", key);
            Err(ApiError::OrganizationNotFound(org))
        }
    }
}

/// DELETE /api/:org/req-validate handler - Delete all records for an id
///
/// Deletes run concurrently; if one fails the others may already have been
/// applied. The response echoes the request payload, not the deleted records.
#[utoipa::path(
    delete,
    path = routes::REQ_VALIDATE,
    params(
        ("org" = String, Path, description = "Owning organization")
    ),
    request_body = ValidationRequestPayload,
    responses(
        (status = 200, description = "Matching validation requests deleted", body = ValidationRequestResponse),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 404, description = "No validation requests for this id", body = ErrorResponse),
        (status = 500, description = "Storage error", body = ErrorResponse)
    ),
    tag = "req-validate"
)]
pub async fn delete_requests_handler(
    State(state): State<AppState>,
    Path(org): Path<String>,
    ValidatedJson(payload): ValidatedJson<ValidationRequestPayload>,
) -> Result<(StatusCode, Json<ValidationRequestResponse>), ApiError> {
    let matching = state
        .requests
        .list(&keys::request_prefix(&org, &payload.id))
        .await?;

    if matching.is_empty() {
        tracing::info!("No validation requests {} for organization {}", payload.id, org);
        return Err(ApiError::OrganizationNotFound(format!("{}/{}", org, payload.id)));
    }

    try_join_all(matching.iter().map(|key| state.requests.delete(key))).await?;

    tracing::info!(
        "Deleted {} validation requests {} for organization {}",
        matching.len(),
        payload.id,
        org
    );
    Ok((StatusCode::OK, Json(payload.into())))
}
