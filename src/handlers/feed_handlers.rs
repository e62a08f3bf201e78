use log::error;

use crate::app::AppContext;
use crate::dtos::post_dtos::{LikeOut, LikeStatus, Post, PostQuery, ShareIn, ShareOut};
use crate::services::api_client::ApiError;

/// Category filter choices offered by the feed, as `(value, label)`.
pub const FEED_CATEGORIES: &[(&str, &str)] = &[
    ("all", "All Categories"),
    ("1", "Breaking News"),
    ("2", "Sports"),
    ("3", "Technology"),
    ("4", "Campus Life"),
];

/// The searchable news feed. Unlike the home view it re-fetches after a like
/// instead of patching counts locally.
pub struct FeedView {
    ctx: AppContext,
    pub posts: Vec<Post>,
    pub loading: bool,
    pub query: PostQuery,
}

impl FeedView {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            posts: Vec::new(),
            loading: false,
            query: PostQuery::default(),
        }
    }

    /// `"all"` clears the category filter.
    pub async fn set_category(&mut self, category: &str) {
        self.query.category = match category.trim() {
            "" | "all" => None,
            other => Some(other.to_string()),
        };
        self.fetch_posts().await
    }

    pub async fn set_search(&mut self, term: &str) {
        self.query.search = Some(term.to_string()).filter(|t| !t.is_empty());
        self.fetch_posts().await
    }

    /// Errors keep the previous list on screen.
    pub async fn fetch_posts(&mut self) {
        self.loading = true;
        let params = self.query.params();
        match self.ctx.api.get_list::<Post>("/api/posts/", &params).await {
            Ok(posts) => self.posts = posts,
            Err(e) => error!("Error fetching posts: {}", e),
        }
        self.loading = false;
    }

    pub async fn handle_like(&mut self, post_id: i64) -> Result<LikeStatus, ApiError> {
        let path = format!("/api/posts/{}/like/", post_id);
        match self.ctx.api.post_empty::<LikeOut>(&path).await {
            Ok(out) => {
                self.fetch_posts().await;
                Ok(out.status)
            }
            Err(e) => {
                error!("Error liking post {}: {}", post_id, e);
                Err(e)
            }
        }
    }

    /// Records a share and bumps the visible share count.
    pub async fn share(
        &mut self,
        post_id: i64,
        shared_to: Option<&str>,
    ) -> Result<ShareOut, ApiError> {
        let path = format!("/api/posts/{}/share/", post_id);
        let body = ShareIn {
            shared_to: shared_to.unwrap_or("copy_link"),
        };
        let out: ShareOut = self.ctx.api.post_json(&path, &body).await.map_err(|e| {
            error!("Error sharing post {}: {}", post_id, e);
            e
        })?;
        for post in self.posts.iter_mut().filter(|p| p.id == post_id) {
            post.shares_count += 1;
        }
        Ok(out)
    }
}
