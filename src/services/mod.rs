pub mod api_client;
pub mod auth_services;
