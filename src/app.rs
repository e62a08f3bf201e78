use std::sync::Arc;

use crate::config::ClientConfig;
use crate::handlers::prompt::Prompt;
use crate::middleware::route_guard::Navigator;
use crate::models::theme::{Theme, ThemeProvider};
use crate::repositories::session_store::SessionStore;
use crate::services::api_client::{ApiClient, ApiError};
use crate::services::auth_services::AuthService;

/// Everything a view needs, cloned into each one.
#[derive(Clone)]
pub struct AppContext {
    pub api: ApiClient,
    pub auth: AuthService,
    pub navigator: Navigator,
    pub theme: Theme,
    pub prompt: Arc<dyn Prompt>,
    pub config: ClientConfig,
}

/// Root of the client: owns the theme flag and hands out contexts.
pub struct App {
    ctx: AppContext,
    theme: ThemeProvider,
}

impl App {
    pub fn new(
        config: ClientConfig,
        session: Arc<dyn SessionStore>,
        prompt: Arc<dyn Prompt>,
    ) -> Result<Self, ApiError> {
        let api = ApiClient::new(&config.api_url, Arc::clone(&session), config.http_timeout)?;
        let auth = AuthService::new(api.clone(), config.register_route.clone());
        let navigator = Navigator::new(session);
        let theme = ThemeProvider::new(config.dark_mode);
        let ctx = AppContext {
            api,
            auth,
            navigator,
            theme: theme.handle(),
            prompt,
            config,
        };
        Ok(Self { ctx, theme })
    }

    pub fn context(&self) -> AppContext {
        self.ctx.clone()
    }

    pub fn toggle_theme(&self) -> bool {
        self.theme.toggle()
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use crate::handlers::prompt::testing::RecordingPrompt;
    use crate::repositories::session_store::{ACCESS_TOKEN, MemorySessionStore};

    /// A logged-in context pointed at `base_url`.
    pub fn context(
        base_url: &str,
        prompt: Arc<RecordingPrompt>,
    ) -> (AppContext, Arc<MemorySessionStore>) {
        let store = Arc::new(MemorySessionStore::new());
        store.set(ACCESS_TOKEN, "a1").unwrap();
        let config = ClientConfig {
            api_url: base_url.to_string(),
            search_debounce: std::time::Duration::from_millis(40),
            ..ClientConfig::default()
        };
        let app = App::new(config, store.clone(), prompt).unwrap();
        (app.context(), store)
    }
}
