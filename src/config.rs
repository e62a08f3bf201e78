use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_REGISTER_ROUTE: &str = "/api/auth/register/";
const DEFAULT_SESSION_FILE: &str = ".dj_session.json";

/// Client settings, read from the process environment (and `.env` when present).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
    pub register_route: String,
    pub session_file: PathBuf,
    pub search_debounce: Duration,
    pub dark_mode: bool,
    pub http_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            register_route: DEFAULT_REGISTER_ROUTE.to_string(),
            session_file: PathBuf::from(DEFAULT_SESSION_FILE),
            search_debounce: Duration::from_millis(300),
            dark_mode: false,
            http_timeout: Duration::from_secs(30),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        let defaults = Self::default();

        let api_url = env::var("DJ_API_URL")
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_url);

        let register_route = env::var("DJ_REGISTER_ROUTE").unwrap_or(defaults.register_route);

        let session_file = env::var("DJ_SESSION_FILE")
            .map(PathBuf::from)
            .unwrap_or(defaults.session_file);

        let search_debounce = match env::var("DJ_SEARCH_DEBOUNCE_MS") {
            Ok(v) => Duration::from_millis(
                v.trim()
                    .parse()
                    .context("DJ_SEARCH_DEBOUNCE_MS must be a whole number of milliseconds")?,
            ),
            Err(_) => defaults.search_debounce,
        };

        let dark_mode = match env::var("DJ_DARK_MODE") {
            Ok(v) => parse_flag(&v).context("DJ_DARK_MODE must be true or false")?,
            Err(_) => defaults.dark_mode,
        };

        let http_timeout = match env::var("DJ_HTTP_TIMEOUT_SECS") {
            Ok(v) => Duration::from_secs(
                v.trim()
                    .parse()
                    .context("DJ_HTTP_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            Err(_) => defaults.http_timeout,
        };

        Ok(Self {
            api_url,
            register_route,
            session_file,
            search_debounce,
            dark_mode,
            http_timeout,
        })
    }
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => anyhow::bail!("unrecognised flag value {other:?}"),
    }
}
