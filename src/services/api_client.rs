// src/services/api_client.rs - shared HTTP client for every view
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use reqwest::header::AUTHORIZATION;
use reqwest::multipart::{Form, Part};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::dtos::auth_dtos::{RefreshIn, RefreshOut};
use crate::models::listing::Listing;
use crate::models::media::ImageFile;
use crate::repositories::session_store::{ACCESS_TOKEN, REFRESH_TOKEN, SessionError, SessionStore};

pub const LOGIN_PATH: &str = "/api/auth/login/";
pub const REFRESH_PATH: &str = "/api/auth/refresh/";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("request failed with status code {}", .status.as_u16())]
    Status { status: StatusCode, body: ErrorBody },
    #[error("invalid json: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("session expired, please log in again")]
    SessionExpired,
    #[error("session storage error: {0}")]
    Session(#[from] SessionError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The `detail` string DRF puts on most error responses.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Status {
                body: ErrorBody::Json(value),
                ..
            } => value.get("detail").and_then(|d| d.as_str()),
            _ => None,
        }
    }
}

/// Body of a failed response.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorBody {
    Empty,
    Text(String),
    Json(Value),
}

impl ErrorBody {
    pub fn parse(text: &str) -> Self {
        if text.trim().is_empty() {
            return ErrorBody::Empty;
        }
        match serde_json::from_str::<Value>(text) {
            Ok(Value::String(s)) => ErrorBody::Text(s),
            Ok(Value::Null) => ErrorBody::Empty,
            Ok(value) => ErrorBody::Json(value),
            Err(_) => ErrorBody::Text(text.to_string()),
        }
    }

    /// String bodies verbatim; objects as `field: message` lines.
    pub fn lines(&self) -> Vec<String> {
        match self {
            ErrorBody::Empty => Vec::new(),
            ErrorBody::Text(text) => vec![text.clone()],
            ErrorBody::Json(Value::Object(map)) => map
                .iter()
                .map(|(key, val)| format!("{}: {}", key, field_message(val)))
                .collect(),
            ErrorBody::Json(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(i, val)| format!("{}: {}", i, field_message(val)))
                .collect(),
            ErrorBody::Json(other) => vec![other.to_string()],
        }
    }
}

fn field_message(val: &Value) -> String {
    match val {
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", "),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// User-facing text for a failed form submission.
pub fn describe_error(err: &ApiError) -> String {
    let mut message = String::from("An error occurred");
    if let Some(status) = err.status() {
        message.push_str(&format!(" (HTTP {})", status.as_u16()));
    }
    let lines = match err {
        ApiError::Status { body, .. } => body.lines(),
        _ => Vec::new(),
    };
    if !lines.is_empty() {
        message.push('\n');
        message.push_str(&lines.join("\n"));
    } else {
        message.push('\n');
        message.push_str(&err.to_string());
    }
    message
}

/// A multipart body that can be turned into a fresh `Form` for each attempt.
#[derive(Debug, Clone, Default)]
pub struct MultipartPayload {
    fields: Vec<(String, String)>,
    files: Vec<(String, ImageFile)>,
}

impl MultipartPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: impl Into<String>) -> Self {
        self.fields.push((name.to_string(), value.into()));
        self
    }

    pub fn file(mut self, name: &str, file: ImageFile) -> Self {
        self.files.push((name.to_string(), file));
        self
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn file_names(&self) -> Vec<(&str, &str)> {
        self.files
            .iter()
            .map(|(name, file)| (name.as_str(), file.file_name.as_str()))
            .collect()
    }

    fn to_form(&self) -> Result<Form, ApiError> {
        let mut form = Form::new();
        for (name, value) in &self.fields {
            form = form.text(name.clone(), value.clone());
        }
        for (name, file) in &self.files {
            let part = Part::bytes(file.bytes.clone())
                .file_name(file.file_name.clone())
                .mime_str(file.content_type.essence_str())?;
            form = form.part(name.clone(), part);
        }
        Ok(form)
    }
}

enum Body<'a> {
    Empty,
    Json(Value),
    Multipart(&'a MultipartPayload),
}

/// Thin wrapper around `reqwest::Client` that knows the API base URL and
/// attaches the stored bearer token to every request.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    session: Arc<dyn SessionStore>,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        session: Arc<dyn SessionStore>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .user_agent("juggernaut-client/0.1")
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    async fn send_once(
        &self,
        method: &Method,
        path: &str,
        query: &[(&str, String)],
        body: &Body<'_>,
    ) -> Result<reqwest::Response, ApiError> {
        let mut req = self.client.request(method.clone(), self.url(path));
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(token) = self.session.access_token()? {
            req = req.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        req = match body {
            Body::Empty => req,
            Body::Json(value) => req.json(value),
            Body::Multipart(payload) => req.multipart(payload.to_form()?),
        };
        debug!("{} {}", method, path);
        Ok(req.send().await?)
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Body<'_>,
    ) -> Result<String, ApiError> {
        let mut resp = self.send_once(&method, path, query, &body).await?;

        if resp.status() == StatusCode::UNAUTHORIZED && !is_token_endpoint(path) {
            if self.session.refresh_token()?.is_some() {
                warn!("{} {} returned 401, refreshing access token", method, path);
                self.refresh_access().await?;
                resp = self.send_once(&method, path, query, &body).await?;
            }
        }

        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            debug!("{} {} failed: {} {}", method, path, status, text);
            return Err(ApiError::Status {
                status,
                body: ErrorBody::parse(&text),
            });
        }
        Ok(text)
    }

    /// Exchanges the stored refresh token for a new access token. A failed
    /// exchange ends the session.
    pub async fn refresh_access(&self) -> Result<String, ApiError> {
        let refresh = self
            .session
            .refresh_token()?
            .ok_or(ApiError::SessionExpired)?;

        let resp = self
            .client
            .post(self.url(REFRESH_PATH))
            .json(&RefreshIn { refresh: &refresh })
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            warn!("token refresh failed: {}; clearing session", status);
            self.session.clear()?;
            return Err(ApiError::SessionExpired);
        }

        let out: RefreshOut = serde_json::from_str(&text)?;
        self.session.set(ACCESS_TOKEN, &out.access)?;
        if let Some(rotated) = out.refresh.as_deref() {
            self.session.set(REFRESH_TOKEN, rotated)?;
        }
        info!("access token refreshed");
        Ok(out.access)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.get_with_query(path, &[]).await
    }

    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let text = self.execute(Method::GET, path, query, Body::Empty).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// GET a collection, accepting either a bare array or `{"results": [...]}`.
    pub async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, ApiError> {
        let listing: Listing<T> = self.get_with_query(path, query).await?;
        Ok(listing.into_vec())
    }

    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let value = serde_json::to_value(body)?;
        let text = self.execute(Method::POST, path, &[], Body::Json(value)).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// POST with no body (action endpoints like `like/`).
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let text = self.execute(Method::POST, path, &[], Body::Empty).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// POST whose response body is not needed.
    pub async fn post_discard<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), ApiError> {
        let value = serde_json::to_value(body)?;
        self.execute(Method::POST, path, &[], Body::Json(value)).await?;
        Ok(())
    }

    pub async fn send_multipart<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        payload: &MultipartPayload,
    ) -> Result<T, ApiError> {
        let text = self
            .execute(method, path, &[], Body::Multipart(payload))
            .await?;
        Ok(serde_json::from_str(&text)?)
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.execute(Method::DELETE, path, &[], Body::Empty).await?;
        Ok(())
    }
}

fn is_token_endpoint(path: &str) -> bool {
    path == LOGIN_PATH || path == REFRESH_PATH
}

/// Shows only the ends of a token, for logs.
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 8 {
        return "[REDACTED]".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}***{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::session_store::MemorySessionStore;
    use mockito::Matcher;
    use serde_json::json;

    fn client_for(server: &mockito::Server, store: Arc<MemorySessionStore>) -> ApiClient {
        ApiClient::new(&server.url(), store, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn object_bodies_flatten_to_field_lines() {
        let err = ApiError::Status {
            status: StatusCode::BAD_REQUEST,
            body: ErrorBody::parse(concat!(
                r#"{"username":["A user with that username already exists.","Try another."],"#,
                r#""password":"too short","code":7}"#,
            )),
        };
        assert_eq!(
            describe_error(&err),
            "An error occurred (HTTP 400)\n\
             username: A user with that username already exists., Try another.\n\
             password: too short\n\
             code: 7"
        );
    }

    #[test]
    fn string_bodies_are_shown_verbatim() {
        let err = ApiError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: ErrorBody::parse("<h1>Server Error</h1>"),
        };
        assert_eq!(
            describe_error(&err),
            "An error occurred (HTTP 500)\n<h1>Server Error</h1>"
        );
    }

    #[test]
    fn errors_without_body_fall_back_to_their_message() {
        let err = ApiError::SessionExpired;
        assert_eq!(
            describe_error(&err),
            "An error occurred\nsession expired, please log in again"
        );
    }

    #[test]
    fn detail_is_extracted_from_json_bodies() {
        let err = ApiError::Status {
            status: StatusCode::FORBIDDEN,
            body: ErrorBody::parse(r#"{"detail":"Not allowed"}"#),
        };
        assert_eq!(err.detail(), Some("Not allowed"));
        assert_eq!(ErrorBody::parse("  "), ErrorBody::Empty);
    }

    #[test]
    fn mask_token_hides_the_middle() {
        assert_eq!(mask_token("short"), "[REDACTED]");
        assert_eq!(mask_token("abcd1234efgh"), "abcd***efgh");
    }

    #[test]
    fn mask_token_counts_characters_not_bytes() {
        assert_eq!(mask_token("éééé1234ßßßß"), "éééé***ßßßß");
        assert_eq!(mask_token("ééééßßßß"), "[REDACTED]");
    }

    #[tokio::test]
    async fn bearer_token_is_attached_when_present() {
        let mut server = mockito::Server::new_async().await;
        let m = server
            .mock("GET", "/api/categories/")
            .match_header("authorization", "Bearer a1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"results":[{"id":1,"name":"Sports"}]}"#)
            .expect(1)
            .create_async()
            .await;

        let store = Arc::new(MemorySessionStore::new());
        store.set(ACCESS_TOKEN, "a1").unwrap();
        let api = client_for(&server, store);

        let cats: Vec<crate::dtos::post_dtos::Category> =
            api.get_list("/api/categories/", &[]).await.unwrap();
        assert_eq!(cats[0].name, "Sports");
        m.assert_async().await;
    }

    #[tokio::test]
    async fn unauthorized_requests_refresh_once_and_retry() {
        let mut server = mockito::Server::new_async().await;
        let stale = server
            .mock("GET", "/api/profile/")
            .match_header("authorization", "Bearer old")
            .with_status(401)
            .with_body(r#"{"detail":"Given token not valid for any token type"}"#)
            .expect(1)
            .create_async()
            .await;
        let refresh = server
            .mock("POST", REFRESH_PATH)
            .match_body(Matcher::Json(json!({"refresh": "r1"})))
            .with_status(200)
            .with_body(r#"{"access":"new"}"#)
            .expect(1)
            .create_async()
            .await;
        let fresh = server
            .mock("GET", "/api/profile/")
            .match_header("authorization", "Bearer new")
            .with_status(200)
            .with_body(r#"{"id":1,"username":"ada"}"#)
            .expect(1)
            .create_async()
            .await;

        let store = Arc::new(MemorySessionStore::new());
        store.set(ACCESS_TOKEN, "old").unwrap();
        store.set(REFRESH_TOKEN, "r1").unwrap();
        let api = client_for(&server, store.clone());

        let profile: crate::dtos::profile_dtos::UserProfile =
            api.get("/api/profile/").await.unwrap();
        assert_eq!(profile.username, "ada");
        assert_eq!(store.access_token().unwrap().as_deref(), Some("new"));
        stale.assert_async().await;
        refresh.assert_async().await;
        fresh.assert_async().await;
    }

    #[tokio::test]
    async fn failed_refresh_clears_the_session() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/profile/")
            .with_status(401)
            .create_async()
            .await;
        server
            .mock("POST", REFRESH_PATH)
            .with_status(401)
            .with_body(r#"{"detail":"Token is blacklisted"}"#)
            .create_async()
            .await;

        let store = Arc::new(MemorySessionStore::new());
        store.set(ACCESS_TOKEN, "old").unwrap();
        store.set(REFRESH_TOKEN, "r1").unwrap();
        let api = client_for(&server, store.clone());

        let err = api
            .get::<crate::dtos::profile_dtos::UserProfile>("/api/profile/")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::SessionExpired));
        assert!(store.access_token().unwrap().is_none());
        assert!(store.refresh_token().unwrap().is_none());
    }

    #[tokio::test]
    async fn unauthorized_without_refresh_token_is_returned_as_is() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/dashboard/")
            .with_status(401)
            .with_body(r#"{"detail":"Authentication credentials were not provided."}"#)
            .create_async()
            .await;
        let api = client_for(&server, Arc::new(MemorySessionStore::new()));

        let err = api
            .get::<serde_json::Value>("/api/dashboard/")
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
        assert_eq!(
            err.detail(),
            Some("Authentication credentials were not provided.")
        );
    }

    #[tokio::test]
    async fn multipart_payload_carries_fields_and_files() {
        let mut server = mockito::Server::new_async().await;
        let m = server
            .mock("POST", "/api/posts/")
            .match_header(
                "content-type",
                Matcher::Regex("^multipart/form-data".into()),
            )
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#"name="title""#.into()),
                Matcher::Regex(r#"name="image"; filename="hero.png""#.into()),
                Matcher::Regex(r#"name="additional_images"; filename="b.jpg""#.into()),
            ]))
            .with_status(201)
            .with_body(r#"{"id":42,"title":"Hi"}"#)
            .expect(1)
            .create_async()
            .await;

        let api = client_for(&server, Arc::new(MemorySessionStore::new()));
        let payload = MultipartPayload::new()
            .text("title", "Hi")
            .file("image", ImageFile::new("hero.png", vec![1, 2]))
            .file("additional_images", ImageFile::new("b.jpg", vec![3]));
        let created: crate::dtos::post_dtos::Post = api
            .send_multipart(Method::POST, "/api/posts/", &payload)
            .await
            .unwrap();
        assert_eq!(created.id, 42);
        m.assert_async().await;
    }
}
