use crate::error::ApiError;
use axum::http::Uri;

/// Fallback for requests that match no route
pub async fn not_found_handler(uri: Uri) -> ApiError {
    tracing::debug!("No route for {}", uri);
    ApiError::RouteNotFound(uri.path().to_string())
}
