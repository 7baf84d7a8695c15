use crate::models::HealthResponse;
use crate::routes;
use axum::{http::StatusCode, Json};

/// GET /api/health handler - Health check endpoint
///
/// Always reports healthy with the service version; no dependency is probed.
#[utoipa::path(
    get,
    path = routes::HEALTH,
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_handler() -> (StatusCode, Json<HealthResponse>) {
    tracing::debug!("Health check passed");
    (
        StatusCode::OK,
        Json(HealthResponse {
            ok: true,
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use crate::app::{router, testing::send};
    use crate::state::AppState;
    use crate::store::failing::FailingStore;
    use axum::http::StatusCode;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_health_endpoint_healthy() {
        let app = router(AppState::in_memory());

        let (status, body) = send(&app, "GET", "/api/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            serde_json::json!({"ok": true, "status": "healthy", "version": "1.0.0"})
        );
    }

    #[tokio::test]
    async fn test_health_ignores_store_state() {
        let app = router(AppState::new(Arc::new(FailingStore)));

        let (status, body) = send(&app, "GET", "/api/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }
}
