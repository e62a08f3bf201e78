use serde::{Deserialize, Serialize};

/// Profile as returned by `GET /api/profile/`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub cover_photo: Option<String>,
    #[serde(default)]
    pub posts_count: i64,
    #[serde(default)]
    pub followers_count: i64,
    #[serde(default)]
    pub following_count: i64,
}

/// `GET /api/dashboard/`: the profile plus an activity summary.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Dashboard {
    #[serde(flatten)]
    pub profile: UserProfile,
    #[serde(default)]
    pub activity: Option<Activity>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Activity {
    #[serde(default)]
    pub total_posts: i64,
    #[serde(default)]
    pub total_likes_received: i64,
    #[serde(default)]
    pub total_comments_received: i64,
    #[serde(default)]
    pub recent_posts: Vec<RecentPost>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RecentPost {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub likes_count: i64,
    #[serde(default)]
    pub comments_count: i64,
    #[serde(default)]
    pub views_count: i64,
}

/// `GET /api/dashboard/stats/`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DashboardStats {
    #[serde(default)]
    pub posts_count: i64,
    #[serde(default)]
    pub likes_received: i64,
    #[serde(default)]
    pub comments_received: i64,
    #[serde(default)]
    pub followers_count: i64,
    #[serde(default)]
    pub following_count: i64,
    #[serde(default)]
    pub unread_notifications: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchResult {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

impl SearchResult {
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.username)
    }

    /// `@username • location`, skipping empty parts.
    pub fn info_line(&self) -> String {
        let mut parts = Vec::new();
        if !self.username.is_empty() {
            parts.push(format!("@{}", self.username));
        }
        if let Some(location) = self.location.as_deref().filter(|l| !l.is_empty()) {
            parts.push(location.to_string());
        }
        parts.join(" • ")
    }
}

/// `GET /api/search/users/?q=` response.
#[derive(Debug, Deserialize)]
pub struct SearchOut {
    #[serde(default)]
    pub results: Vec<SearchResult>,
}
