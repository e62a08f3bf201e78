pub mod auth_dtos;
pub mod comment_dtos;
pub mod post_dtos;
pub mod profile_dtos;
