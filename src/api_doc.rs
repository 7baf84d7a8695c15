use axum::Json;
use utoipa::OpenApi;

use crate::error::{ErrorDetail, ErrorResponse};
use crate::handlers;
use crate::models::{
    HealthResponse, MaybePostResponse, MessageResponse, Post, PostListResponse, PostPayload,
    PostResponse, ValidationRequestPayload, ValidationRequestResponse,
};

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "req-validate-api",
        version = "1.0.0",
        description = "Organization-scoped validation requests over a key-value store, plus post route scaffolding"
    ),
    paths(
        handlers::health::health_handler,
        handlers::posts::create_post_handler,
        handlers::posts::list_posts_handler,
        handlers::posts::get_post_handler,
        handlers::posts::update_post_handler,
        handlers::posts::delete_post_handler,
        handlers::req_validate::create_request_handler,
        handlers::req_validate::latest_request_handler,
        handlers::req_validate::delete_requests_handler
    ),
    components(
        schemas(
            HealthResponse,
            Post,
            PostPayload,
            PostResponse,
            MaybePostResponse,
            PostListResponse,
            MessageResponse,
            ValidationRequestPayload,
            ValidationRequestResponse,
            ErrorResponse,
            ErrorDetail
        )
    ),
    tags(
        (name = "health", description = "Health check operations"),
        (name = "posts", description = "Post scaffolding; nothing is persisted"),
        (name = "req-validate", description = "Organization-scoped validation requests")
    )
)]
pub struct ApiDoc;

/// GET /api-docs/openapi.json handler
pub async fn openapi_handler() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
