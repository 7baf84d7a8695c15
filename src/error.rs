use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use validator::ValidationErrors;

/// A single violation reported alongside an error response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorDetail {
    /// Offending request field, when the violation is tied to one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
}

impl ErrorDetail {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            field: None,
            message: message.into(),
        }
    }

    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            message: message.into(),
        }
    }
}

/// Error response type
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ErrorDetail>,
}

/// Custom error type for API endpoints
///
/// Every handler returns this type on failure, so this `IntoResponse` impl is
/// the single place where failures become HTTP responses. Server-side
/// failures are logged here before being rendered.
#[derive(Debug)]
pub enum ApiError {
    /// Body was not valid JSON for the expected payload shape
    InvalidBody(String),
    /// Body parsed but violated field constraints
    Validation(Vec<ErrorDetail>),
    /// No validation requests stored under the organization (or id) prefix
    OrganizationNotFound(String),
    /// No route matches the request
    RouteNotFound(String),
    /// Key-value store operation failed
    Storage(anyhow::Error),
    /// Anything else that escaped a handler
    Internal(anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidBody(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::OrganizationNotFound(_) | ApiError::RouteNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Storage(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error, errors) = match self {
            ApiError::InvalidBody(msg) => (
                "Invalid request body".to_string(),
                vec![ErrorDetail::message(msg)],
            ),
            ApiError::Validation(details) => ("Validation failed".to_string(), details),
            ApiError::OrganizationNotFound(scope) => (
                "Organization not found".to_string(),
                vec![ErrorDetail::message(format!(
                    "No validation requests found for '{}'",
                    scope
                ))],
            ),
            ApiError::RouteNotFound(path) => (format!("Route not found: {}", path), Vec::new()),
            ApiError::Storage(err) => {
                tracing::error!("Storage error: {:#}", err);
                (
                    "Storage error".to_string(),
                    vec![ErrorDetail::message(format!("{:#}", err))],
                )
            }
            ApiError::Internal(err) => {
                tracing::error!("Unhandled error: {:#}", err);
                (err.to_string(), Vec::new())
            }
        };

        let body = Json(ErrorResponse {
            ok: false,
            error,
            errors,
        });

        (status, body).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Storage(err)
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let mut details: Vec<ErrorDetail> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, field_errors)| {
                field_errors.iter().map(move |err| {
                    let message = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("failed '{}' check", err.code));
                    ErrorDetail::field(field.to_string(), message)
                })
            })
            .collect();
        details.sort_by(|a, b| a.field.cmp(&b.field).then_with(|| a.message.cmp(&b.message)));

        ApiError::Validation(details)
    }
}
