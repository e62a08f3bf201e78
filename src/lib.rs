pub mod app;
pub mod config;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod render;
pub mod repositories;
pub mod services;
