use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct LoginIn {
    pub username: String,
    pub password: String,
}

/// Registration payload; optional fields are only sent when non-empty.
#[derive(Debug, Default, Serialize)]
pub struct RegisterIn {
    pub username: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

/// `POST /api/auth/login/` response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshIn<'a> {
    pub refresh: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct RefreshOut {
    pub access: String,
    // Rotating refresh setups hand back a new refresh token as well.
    pub refresh: Option<String>,
}
