pub mod fallback;
pub mod health;
pub mod posts;
pub mod req_validate;

pub use fallback::not_found_handler;
pub use health::health_handler;
pub use posts::{
    create_post_handler, delete_post_handler, get_post_handler, list_posts_handler,
    update_post_handler,
};
pub use req_validate::{
    create_request_handler, delete_requests_handler, latest_request_handler,
};
