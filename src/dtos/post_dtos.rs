use serde::{Deserialize, Serialize};

use crate::dtos::comment_dtos::Comment;

/// A post as served by `/api/posts/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub additional_images: Vec<PostImage>,
    #[serde(default)]
    pub category: Option<i64>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub category_color: Option<String>,
    #[serde(default)]
    pub author_username: String,
    #[serde(default)]
    pub author_avatar: Option<String>,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub is_liked: bool,
    #[serde(default = "default_true")]
    pub is_published: bool,
    #[serde(default = "default_visibility")]
    pub visibility: String,
    #[serde(default)]
    pub likes_count: i64,
    #[serde(default)]
    pub comments_count: i64,
    #[serde(default)]
    pub views_count: i64,
    #[serde(default)]
    pub shares_count: i64,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub time_since_posted: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostImage {
    #[serde(default)]
    pub id: Option<i64>,
    pub image: String,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub order: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LikeStatus {
    Liked,
    Unliked,
}

/// `POST /api/posts/{id}/like/` response.
#[derive(Debug, Clone, Deserialize)]
pub struct LikeOut {
    pub status: LikeStatus,
}

#[derive(Debug, Serialize)]
pub struct ShareIn<'a> {
    pub shared_to: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShareOut {
    pub id: i64,
    pub post: i64,
    #[serde(default)]
    pub shared_to: String,
}

/// Feed filters. `None` means "all categories" / no search term.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostQuery {
    pub category: Option<String>,
    pub search: Option<String>,
}

impl PostQuery {
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(category) = self.category.as_deref().filter(|c| !c.is_empty()) {
            params.push(("category", category.to_string()));
        }
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            params.push(("search", search.to_string()));
        }
        params
    }
}

fn default_true() -> bool {
    true
}

fn default_visibility() -> String {
    "public".to_string()
}
