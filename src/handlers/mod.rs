pub mod auth_handlers;
pub mod comment_handlers;
pub mod feed_handlers;
pub mod home_handlers;
pub mod nav_handlers;
pub mod post_handlers;
pub mod profile_handlers;
pub mod prompt;
pub mod search_handlers;
