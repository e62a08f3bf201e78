// src/services/auth_services.rs
use log::info;

use crate::dtos::auth_dtos::{LoginIn, RegisterIn, TokenPair};
use crate::repositories::session_store::{ACCESS_TOKEN, REFRESH_TOKEN};
use crate::services::api_client::{ApiClient, ApiError, LOGIN_PATH, mask_token};

/// Login and registration against the token endpoints.
#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
    register_route: String,
}

impl AuthService {
    pub fn new(api: ApiClient, register_route: impl Into<String>) -> Self {
        Self {
            api,
            register_route: register_route.into(),
        }
    }

    /// Posts credentials and persists exactly the two returned tokens.
    pub async fn login(&self, input: LoginIn) -> Result<TokenPair, ApiError> {
        let username = input.username.trim().to_string();
        let body = LoginIn {
            username,
            password: input.password,
        };
        let pair: TokenPair = self.api.post_json(LOGIN_PATH, &body).await?;

        let session = self.api.session();
        session.set(ACCESS_TOKEN, &pair.access)?;
        session.set(REFRESH_TOKEN, &pair.refresh)?;
        info!(
            "logged in as {} (access {})",
            body.username,
            mask_token(&pair.access)
        );
        Ok(pair)
    }

    /// Creates an account. Does not log in.
    pub async fn register(&self, input: RegisterIn) -> Result<(), ApiError> {
        let body = RegisterIn {
            username: input.username.trim().to_string(),
            password: input.password,
            email: non_empty(input.email),
            first_name: non_empty(input.first_name),
            last_name: non_empty(input.last_name),
        };
        self.api.post_discard(&self.register_route, &body).await?;
        info!("registered account {}", body.username);
        Ok(())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::session_store::{MemorySessionStore, SessionStore};
    use mockito::Matcher;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    fn service(server: &mockito::Server, store: Arc<MemorySessionStore>) -> AuthService {
        let api = ApiClient::new(&server.url(), store, Duration::from_secs(5)).unwrap();
        AuthService::new(api, "/api/auth/register/")
    }

    #[tokio::test]
    async fn login_persists_both_tokens() {
        let mut server = mockito::Server::new_async().await;
        let m = server
            .mock("POST", "/api/auth/login/")
            .match_body(Matcher::Json(json!({"username": "ada", "password": "pw"})))
            .with_status(200)
            .with_body(r#"{"access":"a1","refresh":"r1"}"#)
            .expect(1)
            .create_async()
            .await;
        let store = Arc::new(MemorySessionStore::new());
        let auth = service(&server, store.clone());

        auth.login(LoginIn {
            username: " ada ".into(),
            password: "pw".into(),
        })
        .await
        .unwrap();

        assert_eq!(store.get(ACCESS_TOKEN).unwrap().as_deref(), Some("a1"));
        assert_eq!(store.get(REFRESH_TOKEN).unwrap().as_deref(), Some("r1"));
        assert!(store.access_token().unwrap().is_some());
        m.assert_async().await;
    }

    #[tokio::test]
    async fn failed_login_stores_nothing() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/auth/login/")
            .with_status(401)
            .with_body(r#"{"detail":"No active account found with the given credentials"}"#)
            .create_async()
            .await;
        let store = Arc::new(MemorySessionStore::new());
        let auth = service(&server, store.clone());

        let err = auth
            .login(LoginIn {
                username: "ada".into(),
                password: "bad".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.status().map(|s| s.as_u16()), Some(401));
        assert!(store.access_token().unwrap().is_none());
    }

    #[tokio::test]
    async fn register_sends_only_filled_optionals() {
        let mut server = mockito::Server::new_async().await;
        let m = server
            .mock("POST", "/api/auth/register/")
            .match_body(Matcher::Json(
                json!({"username": "kofi", "password": "pw", "last_name": "Mensah"}),
            ))
            .with_status(201)
            .with_body(r#"{"id":5,"username":"kofi"}"#)
            .expect(1)
            .create_async()
            .await;
        let store = Arc::new(MemorySessionStore::new());
        let auth = service(&server, store.clone());

        auth.register(RegisterIn {
            username: "kofi".into(),
            password: "pw".into(),
            email: Some("  ".into()),
            first_name: None,
            last_name: Some("Mensah".into()),
        })
        .await
        .unwrap();
        assert!(store.access_token().unwrap().is_none());
        m.assert_async().await;
    }
}
