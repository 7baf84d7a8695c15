// Route path constants - single source of truth for all API paths

pub const HEALTH: &str = "/api/health";
pub const OPENAPI_JSON: &str = "/api-docs/openapi.json";
pub const POSTS: &str = "/posts";
pub const POST_ITEM: &str = "/posts/{id}";
pub const REQ_VALIDATE: &str = "/api/{org}/req-validate";
