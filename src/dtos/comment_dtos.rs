use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub author_username: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub likes_count: i64,
}

#[derive(Debug, Serialize)]
pub struct CommentIn<'a> {
    pub content: &'a str,
}
