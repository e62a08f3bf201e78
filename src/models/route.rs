use std::fmt;

/// Every navigable location in the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Landing,
    Login,
    Register,
    Home,
    Dashboard,
    Posts,
    Feed,
    Logout,
    NotFound,
}

impl Route {
    pub fn parse(path: &str) -> Route {
        let trimmed = path.trim();
        let normalized = trimmed.trim_end_matches('/');
        // route matching is case-insensitive ("/Register" is linked from the login form)
        match normalized.to_ascii_lowercase().as_str() {
            "" => Route::Landing,
            "/login" => Route::Login,
            "/register" => Route::Register,
            "/home" => Route::Home,
            "/dashboard" => Route::Dashboard,
            "/posts" => Route::Posts,
            "/feed" => Route::Feed,
            "/logout" => Route::Logout,
            _ => Route::NotFound,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Route::Landing => "/",
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Home => "/home",
            Route::Dashboard => "/dashboard",
            Route::Posts => "/posts",
            Route::Feed => "/feed",
            Route::Logout => "/logout",
            Route::NotFound => "/404",
        }
    }

    /// Views that are only rendered with a stored access token.
    pub fn requires_auth(&self) -> bool {
        matches!(
            self,
            Route::Home | Route::Dashboard | Route::Posts | Route::Feed
        )
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
