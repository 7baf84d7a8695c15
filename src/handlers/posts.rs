//! Post routes.
//!
//! These are scaffolding: they run against `AppState::posts`, which is a
//! `NullStore`, so nothing created here is ever read back.

use crate::error::{ApiError, ErrorResponse};
use crate::extract::ValidatedJson;
use crate::keys::iso_timestamp;
use crate::models::{
    MaybePostResponse, MessageResponse, Post, PostListResponse, PostPayload, PostResponse,
};
use crate::routes;
use crate::state::AppState;
use crate::store::KvStore;
use anyhow::Context;
use axum::{extract::Path, extract::State, http::StatusCode, Json};
use chrono::Utc;
use uuid::Uuid;

const POST_KEY_PREFIX: &str = "post:";

fn post_key(id: &str) -> String {
    format!("{POST_KEY_PREFIX}{id}")
}

fn build_post(id: String, payload: PostPayload) -> Post {
    let now = iso_timestamp(Utc::now());
    Post {
        id,
        title: payload.title,
        content: payload.content,
        created_at: now.clone(),
        updated_at: now,
    }
}

async fn save_post(store: &dyn KvStore, post: &Post) -> anyhow::Result<()> {
    let value = serde_json::to_string(post).context("Failed to serialize post")?;
    store.put(&post_key(&post.id), &value).await
}

async fn load_post(store: &dyn KvStore, key: &str) -> anyhow::Result<Option<Post>> {
    match store.get(key).await? {
        Some(value) => {
            let post = serde_json::from_str(&value).context("Failed to deserialize post")?;
            Ok(Some(post))
        }
        None => Ok(None),
    }
}

/// POST /posts handler - Create a post
#[utoipa::path(
    post,
    path = routes::POSTS,
    request_body = PostPayload,
    responses(
        (status = 201, description = "Post created", body = PostResponse),
        (status = 400, description = "Invalid post payload", body = ErrorResponse),
        (status = 500, description = "Unexpected error", body = ErrorResponse)
    ),
    tag = "posts"
)]
pub async fn create_post_handler(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<PostPayload>,
) -> Result<(StatusCode, Json<PostResponse>), ApiError> {
    let post = build_post(Uuid::new_v4().to_string(), payload);

    save_post(state.posts.as_ref(), &post)
        .await
        .map_err(ApiError::Internal)?;

    tracing::info!("Created post with id: {}", post.id);
    Ok((StatusCode::CREATED, Json(PostResponse { ok: true, post })))
}

/// GET /posts handler - List posts
#[utoipa::path(
    get,
    path = routes::POSTS,
    responses(
        (status = 200, description = "All posts", body = PostListResponse),
        (status = 500, description = "Unexpected error", body = ErrorResponse)
    ),
    tag = "posts"
)]
pub async fn list_posts_handler(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<PostListResponse>), ApiError> {
    let keys = state
        .posts
        .list(POST_KEY_PREFIX)
        .await
        .map_err(ApiError::Internal)?;

    let mut posts = Vec::with_capacity(keys.len());
    for key in &keys {
        if let Some(post) = load_post(state.posts.as_ref(), key)
            .await
            .map_err(ApiError::Internal)?
        {
            posts.push(post);
        }
    }

    tracing::info!("Listed {} posts", posts.len());
    Ok((StatusCode::OK, Json(PostListResponse { ok: true, posts })))
}

/// GET /posts/:id handler - Fetch a post
///
/// Responds with `post: null` when nothing is stored under the id.
#[utoipa::path(
    get,
    path = routes::POST_ITEM,
    params(
        ("id" = String, Path, description = "Post identifier")
    ),
    responses(
        (status = 200, description = "Post, or null", body = MaybePostResponse),
        (status = 500, description = "Unexpected error", body = ErrorResponse)
    ),
    tag = "posts"
)]
pub async fn get_post_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<MaybePostResponse>), ApiError> {
    let post = load_post(state.posts.as_ref(), &post_key(&id))
        .await
        .map_err(ApiError::Internal)?;

    tracing::info!("Fetched post {} (found: {})", id, post.is_some());
    Ok((StatusCode::OK, Json(MaybePostResponse { ok: true, post })))
}

/// PUT /posts/:id handler - Replace a post
///
/// Does not check that the post exists; both timestamps are regenerated.
#[utoipa::path(
    put,
    path = routes::POST_ITEM,
    params(
        ("id" = String, Path, description = "Post identifier")
    ),
    request_body = PostPayload,
    responses(
        (status = 200, description = "Post updated", body = PostResponse),
        (status = 400, description = "Invalid post payload", body = ErrorResponse),
        (status = 500, description = "Unexpected error", body = ErrorResponse)
    ),
    tag = "posts"
)]
pub async fn update_post_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<PostPayload>,
) -> Result<(StatusCode, Json<PostResponse>), ApiError> {
    let post = build_post(id, payload);

    save_post(state.posts.as_ref(), &post)
        .await
        .map_err(ApiError::Internal)?;

    tracing::info!("Updated post with id: {}", post.id);
    Ok((StatusCode::OK, Json(PostResponse { ok: true, post })))
}

/// DELETE /posts/:id handler - Delete a post
#[utoipa::path(
    delete,
    path = routes::POST_ITEM,
    params(
        ("id" = String, Path, description = "Post identifier")
    ),
    responses(
        (status = 200, description = "Post deleted", body = MessageResponse),
        (status = 500, description = "Unexpected error", body = ErrorResponse)
    ),
    tag = "posts"
)]
pub async fn delete_post_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    state
        .posts
        .delete(&post_key(&id))
        .await
        .map_err(ApiError::Internal)?;

    tracing::info!("Deleted post with id: {}", id);
    Ok((
        StatusCode::OK,
        Json(MessageResponse {
            ok: true,
            message: format!("Post {} deleted", id),
        }),
    ))
}
