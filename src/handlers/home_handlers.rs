// src/handlers/home_handlers.rs - featured story + latest posts
use std::collections::{HashMap, HashSet};

use log::{error, warn};

use crate::app::AppContext;
use crate::dtos::post_dtos::{LikeOut, LikeStatus, Post};
use crate::services::api_client::{ApiClient, ApiError};

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Loading,
    Ready,
    Failed(String),
}

/// Splits a post list into the featured story and the regular cards.
/// The featured story is the first flagged post, or the first post when
/// nothing is flagged; flagged posts never appear among the regular cards.
pub fn partition_posts(all: Vec<Post>) -> (Option<Post>, Vec<Post>) {
    let featured = all
        .iter()
        .find(|p| p.is_featured)
        .or_else(|| all.first())
        .cloned();
    let regular = all.into_iter().filter(|p| !p.is_featured).collect();
    (featured, regular)
}

/// Only the posts flagged featured, from `/api/posts/featured/`.
pub async fn featured_posts(api: &ApiClient) -> Result<Vec<Post>, ApiError> {
    api.get_list("/api/posts/featured/", &[]).await
}

/// Patches a post with the state the like endpoint reported.
pub fn apply_like(post: &mut Post, status: LikeStatus) {
    match status {
        LikeStatus::Liked => {
            post.likes_count += 1;
            post.is_liked = true;
        }
        LikeStatus::Unliked => {
            post.likes_count -= 1;
            post.is_liked = false;
        }
    }
}

/// A like toggle in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeTicket {
    pub post_id: i64,
    pub seq: u64,
}

/// Sequence numbers for like toggles, per post. Toggles that resolve out of
/// order leave the counter unreliable until the next fetch.
#[derive(Debug, Default)]
pub struct LikeTracker {
    issued: HashMap<i64, u64>,
    resolved: HashMap<i64, u64>,
    stale: HashSet<i64>,
}

impl LikeTracker {
    pub fn begin(&mut self, post_id: i64) -> LikeTicket {
        let seq = self.issued.entry(post_id).or_insert(0);
        *seq += 1;
        LikeTicket { post_id, seq: *seq }
    }

    /// Returns false when a later toggle of the same post already resolved.
    pub fn resolve(&mut self, ticket: LikeTicket) -> bool {
        let latest = self.resolved.entry(ticket.post_id).or_insert(0);
        if ticket.seq < *latest {
            self.stale.insert(ticket.post_id);
            return false;
        }
        *latest = ticket.seq;
        true
    }

    pub fn needs_refresh(&self, post_id: i64) -> bool {
        self.stale.contains(&post_id)
    }

    pub fn reset(&mut self) {
        self.issued.clear();
        self.resolved.clear();
        self.stale.clear();
    }
}

pub struct HomeView {
    ctx: AppContext,
    pub featured: Option<Post>,
    pub posts: Vec<Post>,
    pub state: LoadState,
    likes: LikeTracker,
}

impl HomeView {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            featured: None,
            posts: Vec::new(),
            state: LoadState::Loading,
            likes: LikeTracker::default(),
        }
    }

    /// Loads `/api/posts/`. Also the "Try Again" action of the error view.
    pub async fn fetch_posts(&mut self) {
        self.state = LoadState::Loading;
        match self.ctx.api.get_list::<Post>("/api/posts/", &[]).await {
            Ok(all) => {
                let (featured, regular) = partition_posts(all);
                self.featured = featured;
                self.posts = regular;
                self.likes.reset();
                self.state = LoadState::Ready;
            }
            Err(e) => {
                error!("Error fetching posts: {}", e);
                self.state = LoadState::Failed(fetch_error_message(&e));
            }
        }
    }

    pub async fn retry(&mut self) {
        self.fetch_posts().await
    }

    pub fn begin_like(&mut self, post_id: i64) -> LikeTicket {
        self.likes.begin(post_id)
    }

    /// Applies a like response to every copy of the post on screen.
    pub fn finish_like(&mut self, ticket: LikeTicket, status: LikeStatus) {
        if !self.likes.resolve(ticket) {
            warn!(
                "like toggle #{} for post {} resolved out of order; counts may drift until refresh",
                ticket.seq, ticket.post_id
            );
        }
        for post in self.posts.iter_mut().filter(|p| p.id == ticket.post_id) {
            apply_like(post, status);
        }
        if let Some(featured) = self.featured.as_mut().filter(|p| p.id == ticket.post_id) {
            apply_like(featured, status);
        }
    }

    /// Toggles a like. Failures are logged and leave the view untouched.
    pub async fn handle_like(&mut self, post_id: i64) -> Result<LikeStatus, ApiError> {
        let ticket = self.begin_like(post_id);
        let path = format!("/api/posts/{}/like/", post_id);
        match self.ctx.api.post_empty::<LikeOut>(&path).await {
            Ok(out) => {
                self.finish_like(ticket, out.status);
                Ok(out.status)
            }
            Err(e) => {
                error!("Error liking post {}: {}", post_id, e);
                Err(e)
            }
        }
    }

    pub fn needs_refresh(&self, post_id: i64) -> bool {
        self.likes.needs_refresh(post_id)
    }
}

fn fetch_error_message(err: &ApiError) -> String {
    if let Some(detail) = err.detail() {
        return detail.to_string();
    }
    match err {
        ApiError::Decode(_) => "Invalid data format received from server".to_string(),
        other => {
            let message = other.to_string();
            if message.is_empty() {
                "Failed to load posts".to_string()
            } else {
                message
            }
        }
    }
}
