// src/middleware/route_guard.rs - gate member views behind a stored access token
use std::sync::{Arc, Mutex};

use base64::Engine;
use log::{debug, info};
use serde::Deserialize;

use crate::models::route::Route;
use crate::repositories::session_store::{SessionError, SessionStore};

/// Outcome of checking a route against the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    Redirect(Route),
}

/// Only the presence of a token is checked; expiry is handled by the API
/// client when a request comes back 401.
pub fn guard(route: Route, session: &dyn SessionStore) -> Result<Access, SessionError> {
    if !route.requires_auth() {
        return Ok(Access::Allow);
    }
    match session.access_token()? {
        Some(token) => {
            if let Some(claims) = peek_claims(&token) {
                debug!("{} allowed for user {:?}", route, claims.user_id);
            }
            Ok(Access::Allow)
        }
        None => {
            info!("{} requires login, redirecting", route);
            Ok(Access::Redirect(Route::Login))
        }
    }
}

/// Claims carried in the access token payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TokenClaims {
    pub user_id: Option<serde_json::Value>,
    pub exp: Option<i64>,
    pub token_type: Option<String>,
}

/// Reads the JWT payload without verifying the signature. Display only.
pub fn peek_claims(token: &str) -> Option<TokenClaims> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return None;
    }
    let payload = parts[1];
    let decoded = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(payload)
        .or_else(|_| base64::engine::general_purpose::STANDARD.decode(payload))
        .ok()?;
    serde_json::from_slice(&decoded).ok()
}

/// Current location plus the side effects of the special routes.
#[derive(Clone)]
pub struct Navigator {
    current: Arc<Mutex<Route>>,
    session: Arc<dyn SessionStore>,
}

impl Navigator {
    pub fn new(session: Arc<dyn SessionStore>) -> Self {
        Self {
            current: Arc::new(Mutex::new(Route::Landing)),
            session,
        }
    }

    pub fn current(&self) -> Route {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn is_active(&self, route: Route) -> bool {
        self.current() == route
    }

    /// Moves to `target` and returns the route that ends up rendered.
    /// `/logout` clears the session and lands on login; `/register` clears
    /// the session first; member views without a token land on login.
    pub fn navigate(&self, target: Route) -> Result<Route, SessionError> {
        let landed = match target {
            Route::Logout => {
                self.session.clear()?;
                info!("session cleared");
                Route::Login
            }
            Route::Register => {
                self.session.clear()?;
                Route::Register
            }
            other => match guard(other, self.session.as_ref())? {
                Access::Allow => other,
                Access::Redirect(to) => to,
            },
        };
        *self.current.lock().unwrap_or_else(|e| e.into_inner()) = landed;
        debug!("navigated to {} (requested {})", landed, target);
        Ok(landed)
    }

    pub fn navigate_path(&self, path: &str) -> Result<Route, SessionError> {
        self.navigate(Route::parse(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::session_store::{ACCESS_TOKEN, MemorySessionStore, REFRESH_TOKEN};

    fn jwt(payload: &str) -> String {
        let body = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(payload);
        format!("eyJhbGciOiJIUzI1NiJ9.{}.sig", body)
    }

    #[test]
    fn member_views_redirect_without_token() {
        let store = MemorySessionStore::new();
        assert_eq!(guard(Route::Home, &store).unwrap(), Access::Redirect(Route::Login));
        assert_eq!(guard(Route::Login, &store).unwrap(), Access::Allow);
        store.set(ACCESS_TOKEN, "anything").unwrap();
        assert_eq!(guard(Route::Home, &store).unwrap(), Access::Allow);
    }

    #[test]
    fn logout_clears_tokens_and_lands_on_login() {
        let store = Arc::new(MemorySessionStore::new());
        store.set(ACCESS_TOKEN, "a1").unwrap();
        store.set(REFRESH_TOKEN, "r1").unwrap();
        let nav = Navigator::new(store.clone());

        assert_eq!(nav.navigate(Route::Feed).unwrap(), Route::Feed);
        assert_eq!(nav.navigate_path("/logout").unwrap(), Route::Login);
        assert!(store.access_token().unwrap().is_none());
        assert!(store.refresh_token().unwrap().is_none());
        assert_eq!(nav.navigate(Route::Dashboard).unwrap(), Route::Login);
        assert!(nav.is_active(Route::Login));
    }

    #[test]
    fn register_route_clears_the_session_first() {
        let store = Arc::new(MemorySessionStore::new());
        store.set(ACCESS_TOKEN, "a1").unwrap();
        let nav = Navigator::new(store.clone());
        assert_eq!(nav.navigate(Route::Register).unwrap(), Route::Register);
        assert!(store.access_token().unwrap().is_none());
    }

    #[test]
    fn unknown_paths_render_not_found() {
        let nav = Navigator::new(Arc::new(MemorySessionStore::new()));
        assert_eq!(nav.navigate_path("/admin").unwrap(), Route::NotFound);
    }

    #[test]
    fn claims_are_read_from_the_payload() {
        let token = jwt(r#"{"token_type":"access","exp":1700000000,"user_id":7}"#);
        let claims = peek_claims(&token).unwrap();
        assert_eq!(claims.exp, Some(1700000000));
        assert_eq!(claims.user_id, Some(serde_json::json!(7)));
        assert!(peek_claims("not-a-jwt").is_none());
    }
}
