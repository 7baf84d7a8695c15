use axum::{
    response::{IntoResponse, Response},
    routing::get,
    routing::post,
    Router,
};
use std::any::Any;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{self, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api_doc::openapi_handler;
use crate::error::ApiError;
use crate::handlers::{
    create_post_handler, create_request_handler, delete_post_handler, delete_requests_handler,
    get_post_handler, health_handler, latest_request_handler, list_posts_handler,
    not_found_handler, update_post_handler,
};
use crate::routes;
use crate::state::AppState;

/// Build the full application router with all middleware applied
pub fn router(state: AppState) -> Router {
    let cors_layer = CorsLayer::new()
        .allow_origin(cors::Any)
        .allow_methods(cors::Any)
        .allow_headers(cors::Any);

    Router::new()
        .route(routes::HEALTH, get(health_handler))
        .route(routes::OPENAPI_JSON, get(openapi_handler))
        .route(routes::POSTS, post(create_post_handler).get(list_posts_handler))
        .route(
            routes::POST_ITEM,
            get(get_post_handler)
                .put(update_post_handler)
                .delete(delete_post_handler),
        )
        .route(
            routes::REQ_VALIDATE,
            post(create_request_handler)
                .get(latest_request_handler)
                .delete(delete_requests_handler),
        )
        .fallback(not_found_handler)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer)
                .layer(CatchPanicLayer::custom(handle_panic)),
        )
        .with_state(state)
}

/// Render a handler panic the same way as any other unhandled error
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };

    ApiError::Internal(anyhow::anyhow!(detail)).into_response()
}

#[cfg(test)]
pub mod testing {
    use axum::{body::Body, http::Request, http::StatusCode, Router};
    use serde_json::Value as JsonValue;
    use tower::ServiceExt;

    /// Send one request through `app` and decode the JSON response body
    pub async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<JsonValue>,
    ) -> (StatusCode, JsonValue) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&json).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            JsonValue::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, json)
    }
}

#[cfg(test)]
mod tests {
    use super::testing::send;
    use super::*;
    use axum::{body::Body, http::Request, http::StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_cors_allows_any_origin() {
        let app = router(AppState::in_memory());

        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/posts")
                    .header("origin", "https://example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let app = router(AppState::in_memory());

        let response = app
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/api/acme/req-validate")
                    .header("origin", "https://example.com")
                    .header("access-control-request-method", "DELETE")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("access-control-allow-methods"));
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let app = router(AppState::in_memory());

        let (status, body) = send(&app, "GET", "/nope", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["ok"], false);
        assert!(body["error"].as_str().unwrap().contains("/nope"));
    }

    async fn boom() -> &'static str {
        panic!("kaboom")
    }

    #[tokio::test]
    async fn test_panic_becomes_500() {
        let app = Router::new()
            .route("/boom", get(boom))
            .layer(CatchPanicLayer::custom(handle_panic));

        let (status, body) = send(&app, "GET", "/boom", None).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["ok"], false);
        assert_eq!(body["error"], "kaboom");
    }

    #[tokio::test]
    async fn test_openapi_document_served() {
        let app = router(AppState::in_memory());

        let (status, body) = send(&app, "GET", routes::OPENAPI_JSON, None).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"].get("/api/{org}/req-validate").is_some());
        assert!(body["paths"].get("/posts/{id}").is_some());
    }
}
