use log::warn;

use crate::app::AppContext;
use crate::dtos::profile_dtos::UserProfile;
use crate::models::route::Route;
use crate::services::api_client::{ApiClient, ApiError};

pub const LOADING_LABEL: &str = "Loading...";

pub async fn load_username(api: &ApiClient) -> Result<String, ApiError> {
    let profile: UserProfile = api.get("/api/profile/").await?;
    Ok(profile.username)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavTarget {
    Link(Route),
    /// Opens the user search instead of navigating.
    Search,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavItem {
    pub label: String,
    pub target: NavTarget,
    pub active: bool,
}

/// Top bar and mobile bar state. The username is cosmetic: a failed
/// lookup leaves the loading label in place.
pub struct NavState {
    ctx: AppContext,
    pub username: Option<String>,
}

impl NavState {
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx, username: None }
    }

    pub async fn mount(&mut self) {
        match load_username(&self.ctx.api).await {
            Ok(username) => self.username = Some(username),
            Err(e) => warn!("could not load username for navigation: {}", e),
        }
    }

    pub fn user_label(&self) -> &str {
        self.username.as_deref().unwrap_or(LOADING_LABEL)
    }

    pub fn is_active(&self, path: &str) -> bool {
        self.ctx.navigator.is_active(Route::parse(path))
    }

    pub fn mobile_items(&self) -> Vec<NavItem> {
        let link = |label: &str, route: Route| NavItem {
            label: label.to_string(),
            target: NavTarget::Link(route),
            active: self.ctx.navigator.is_active(route),
        };
        vec![
            link("Home", Route::Home),
            link("Feed", Route::Feed),
            NavItem {
                label: "Search".to_string(),
                target: NavTarget::Search,
                active: false,
            },
            link("Create", Route::Posts),
            link(self.user_label(), Route::Dashboard),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::testing;
    use crate::handlers::prompt::testing::RecordingPrompt;
    use std::sync::Arc;

    #[tokio::test]
    async fn username_replaces_the_loading_label() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/profile/")
            .with_status(200)
            .with_body(r#"{"id":1,"username":"mina"}"#)
            .create_async()
            .await;
        let (ctx, _) = testing::context(&server.url(), Arc::new(RecordingPrompt::default()));
        let mut nav = NavState::new(ctx);
        assert_eq!(nav.user_label(), LOADING_LABEL);

        nav.mount().await;
        assert_eq!(nav.user_label(), "mina");
    }

    #[tokio::test]
    async fn lookup_failures_are_swallowed() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/profile/")
            .with_status(500)
            .create_async()
            .await;
        let prompt = Arc::new(RecordingPrompt::default());
        let (ctx, _) = testing::context(&server.url(), prompt.clone());
        let mut nav = NavState::new(ctx);

        nav.mount().await;
        assert_eq!(nav.user_label(), LOADING_LABEL);
        assert!(prompt.alerts().is_empty());
    }

    #[test]
    fn mobile_items_mark_the_current_route() {
        let (ctx, _) = testing::context("http://127.0.0.1:9", Arc::new(RecordingPrompt::default()));
        ctx.navigator.navigate(Route::Feed).unwrap();
        let mut nav = NavState::new(ctx);
        nav.username = Some("mina".into());

        let items = nav.mobile_items();
        let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["Home", "Feed", "Search", "Create", "mina"]);
        assert!(items[1].active);
        assert!(!items[0].active);
        assert_eq!(items[2].target, NavTarget::Search);
        assert_eq!(items[4].target, NavTarget::Link(Route::Dashboard));
        assert!(nav.is_active("/feed/"));
    }
}
