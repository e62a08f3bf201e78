pub mod listing;
pub mod media;
pub mod route;
pub mod theme;
