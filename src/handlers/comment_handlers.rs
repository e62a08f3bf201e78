use log::error;

use crate::app::AppContext;
use crate::dtos::comment_dtos::{Comment, CommentIn};
use crate::services::api_client::ApiError;

const POST_FAILED: &str = "Error posting comment. Please try again.";

/// Callback fired after a comment is created; the parent owns the count.
pub type OnCommentAdded = Box<dyn FnMut(&Comment) + Send>;

#[derive(Debug)]
pub enum SubmitOutcome {
    /// Whitespace-only input, nothing was sent.
    Rejected,
    Posted(Comment),
    Failed(ApiError),
}

/// Per-post comment list and submission form, collapsed until revealed.
pub struct CommentThread {
    ctx: AppContext,
    pub post_id: i64,
    pub comments: Vec<Comment>,
    pub draft: String,
    pub expanded: bool,
    pub loading: bool,
    on_added: Option<OnCommentAdded>,
}

impl CommentThread {
    pub fn new(ctx: AppContext, post_id: i64, comments: Vec<Comment>) -> Self {
        Self {
            ctx,
            post_id,
            comments,
            draft: String::new(),
            expanded: false,
            loading: false,
            on_added: None,
        }
    }

    pub fn on_comment_added(mut self, callback: OnCommentAdded) -> Self {
        self.on_added = Some(callback);
        self
    }

    pub fn toggle(&mut self) {
        self.expanded = !self.expanded;
    }

    pub fn toggle_label(&self) -> String {
        if self.expanded {
            "Hide Comments".to_string()
        } else {
            format!("View Comments ({})", self.comments.len())
        }
    }

    /// Seeds the thread from `GET /api/comments/?post=<id>`.
    pub async fn load(&mut self) -> Result<(), ApiError> {
        let query = [("post", self.post_id.to_string())];
        self.comments = self.ctx.api.get_list("/api/comments/", &query).await?;
        Ok(())
    }

    pub async fn submit(&mut self) -> SubmitOutcome {
        let content = self.draft.trim().to_string();
        if content.is_empty() {
            return SubmitOutcome::Rejected;
        }

        self.loading = true;
        let path = format!("/api/posts/{}/comments/", self.post_id);
        let result = self
            .ctx
            .api
            .post_json::<_, Comment>(&path, &CommentIn { content: &content })
            .await;
        self.loading = false;

        match result {
            Ok(comment) => {
                self.comments.insert(0, comment.clone());
                self.draft.clear();
                if let Some(callback) = self.on_added.as_mut() {
                    callback(&comment);
                }
                SubmitOutcome::Posted(comment)
            }
            Err(e) => {
                error!("Error posting comment on post {}: {}", self.post_id, e);
                self.ctx.prompt.alert(POST_FAILED);
                SubmitOutcome::Failed(e)
            }
        }
    }
}
