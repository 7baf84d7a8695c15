use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request body for creating or updating a post
#[derive(Debug, Clone, Serialize, Deserialize, Validate, utoipa::ToSchema)]
#[serde(deny_unknown_fields)]
pub struct PostPayload {
    #[validate(length(min = 1, max = 100, message = "title must be 1-100 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 1000, message = "content must be 1-1000 characters"))]
    pub content: String,
}

/// A blog post as returned by the post routes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub title: String,
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Response type for create and update
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct PostResponse {
    pub ok: bool,
    pub post: Post,
}

/// Response type for get-by-id; `post` is null when nothing is stored
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct MaybePostResponse {
    pub ok: bool,
    pub post: Option<Post>,
}

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct PostListResponse {
    pub ok: bool,
    pub posts: Vec<Post>,
}

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct MessageResponse {
    pub ok: bool,
    pub message: String,
}

/// Request body for creating or deleting validation requests
#[derive(Debug, Clone, Serialize, Deserialize, Validate, utoipa::ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ValidationRequestPayload {
    #[validate(length(min = 1, message = "id must not be empty"))]
    pub id: String,
    #[validate(length(min = 6, message = "salt must be at least 6 characters"))]
    pub salt: String,
}

/// Stored value for a single validation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRequestRecord {
    pub organization: String,
    pub id: String,
    pub salt: String,
    pub timestamp: String,
}

/// Response type for all validation-request routes
#[derive(Debug, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ValidationRequestResponse {
    pub id: String,
    pub salt: String,
}

impl From<ValidationRequestRecord> for ValidationRequestResponse {
    fn from(record: ValidationRequestRecord) -> Self {
        Self {
            id: record.id,
            salt: record.salt,
        }
    }
}

impl From<ValidationRequestPayload> for ValidationRequestResponse {
    fn from(payload: ValidationRequestPayload) -> Self {
        Self {
            id: payload.id,
            salt: payload.salt,
        }
    }
}

/// Response type for health check endpoint
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub ok: bool,
    pub status: String,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_payload_bounds() {
        let ok = PostPayload {
            title: "t".repeat(100),
            content: "c".repeat(1000),
        };
        assert!(ok.validate().is_ok());

        let empty_title = PostPayload {
            title: String::new(),
            content: "body".to_string(),
        };
        assert!(empty_title.validate().is_err());

        let long_content = PostPayload {
            title: "title".to_string(),
            content: "c".repeat(1001),
        };
        let errors = long_content.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("content"));
    }

    #[test]
    fn test_post_payload_counts_characters_not_bytes() {
        let payload = PostPayload {
            title: "é".repeat(100),
            content: "ok".to_string(),
        };
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn test_validation_request_payload_bounds() {
        let ok = ValidationRequestPayload {
            id: "x".to_string(),
            salt: "123456".to_string(),
        };
        assert!(ok.validate().is_ok());

        let bad = ValidationRequestPayload {
            id: String::new(),
            salt: "12345".to_string(),
        };
        let errors = bad.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("id"));
        assert!(fields.contains_key("salt"));
    }

    #[test]
    fn test_payload_rejects_unknown_fields() {
        let result = serde_json::from_value::<ValidationRequestPayload>(serde_json::json!({
            "id": "abc",
            "salt": "123456",
            "extra": true
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_post_serializes_camel_case() {
        let post = Post {
            id: "1".to_string(),
            title: "t".to_string(),
            content: "c".to_string(),
            created_at: "2024-01-01T00:00:00.000Z".to_string(),
            updated_at: "2024-01-01T00:00:00.000Z".to_string(),
        };
        let json = serde_json::to_value(&post).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
    }
}
