// src/render.rs - text rendering of view state for the terminal front-end
use chrono::{DateTime, Local, NaiveDate, TimeZone};

use crate::dtos::post_dtos::Post;
use crate::handlers::comment_handlers::CommentThread;
use crate::handlers::home_handlers::{HomeView, LoadState};
use crate::handlers::nav_handlers::{NavState, NavTarget};
use crate::handlers::post_handlers::PostManager;
use crate::handlers::profile_handlers::DashboardView;
use crate::handlers::search_handlers::UserSearch;
use crate::models::theme::Theme;

pub const FEATURED_PREVIEW_CHARS: usize = 150;
pub const CARD_PREVIEW_CHARS: usize = 120;

/// Cuts `text` to `max` characters and appends `...` when it was longer.
pub fn preview(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// `Jan 5, 2024, 10:30 AM` in local time; anything unparseable is shown as is.
pub fn format_date(raw: &str) -> String {
    format_date_in(raw, &Local)
}

pub fn format_date_in<Tz: TimeZone>(raw: &str, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt
            .with_timezone(tz)
            .format("%b %-d, %Y, %-I:%M %p")
            .to_string(),
        Err(_) => raw.to_string(),
    }
}

/// Birth dates: `January 5, 2024`, or `Not set`.
pub fn format_long_date(raw: Option<&str>) -> String {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => "Not set".to_string(),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(|d| d.format("%B %-d, %Y").to_string())
            .unwrap_or_else(|_| s.to_string()),
    }
}

pub fn header(theme: &Theme, nav: Option<&NavState>) -> String {
    let mut line = format!("== Daily Juggernaut == [{} mode]", theme.label());
    if let Some(nav) = nav {
        line.push_str(&format!("  {}", nav.user_label()));
    }
    line
}

pub fn mobile_nav(nav: &NavState) -> String {
    nav.mobile_items()
        .iter()
        .map(|item| {
            let label = match item.target {
                NavTarget::Link(route) => format!("{} ({})", item.label, route),
                NavTarget::Search => item.label.clone(),
            };
            if item.active { format!("[{}]", label) } else { label }
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

pub fn landing() -> String {
    [
        "Daily Juggernaut",
        "Your Campus News Hub",
        "Stay Informed, Stay Connected",
        "Join thousands who rely on Daily Juggernaut for campus news",
    ]
    .join("\n")
}

fn post_card(post: &Post, preview_chars: usize) -> Vec<String> {
    let mut meta = Vec::new();
    if let Some(category) = post.category_name.as_deref().filter(|c| !c.is_empty()) {
        meta.push(category.to_string());
    }
    if !post.author_username.is_empty() {
        meta.push(format!("by {}", post.author_username));
    }
    meta.push(format_date(&post.created_at));

    let mut lines = vec![
        format!("#{} {}", post.id, post.title),
        format!("   {}", meta.join(" • ")),
    ];
    if !post.content.is_empty() {
        lines.push(format!("   {}", preview(&post.content, preview_chars)));
    }
    lines.push(format!(
        "   {} {} likes | {} comments | {} views | {} shares",
        if post.is_liked { "♥" } else { "♡" },
        post.likes_count,
        post.comments_count,
        post.views_count,
        post.shares_count
    ));
    lines
}

pub fn post_list(posts: &[Post]) -> String {
    if posts.is_empty() {
        return "No posts yet.".to_string();
    }
    posts
        .iter()
        .flat_map(|p| post_card(p, CARD_PREVIEW_CHARS))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn home(view: &HomeView) -> String {
    match &view.state {
        LoadState::Loading => "Loading posts...".to_string(),
        LoadState::Failed(message) => {
            format!("Error Loading Posts\n{}\n[Try Again]", message)
        }
        LoadState::Ready => {
            let mut lines = Vec::new();
            if let Some(featured) = &view.featured {
                lines.push("Featured Story".to_string());
                lines.extend(post_card(featured, FEATURED_PREVIEW_CHARS));
                lines.push(String::new());
            }
            lines.push("Latest News".to_string());
            lines.push(post_list(&view.posts));
            lines.join("\n")
        }
    }
}

pub fn manager(view: &PostManager) -> String {
    if view.loading {
        return "Loading your posts...".to_string();
    }
    let mut lines = vec![format!("My Posts ({})", view.posts.len())];
    for post in &view.posts {
        let status = if post.is_published { "published" } else { "draft" };
        lines.push(format!(
            "#{} {} [{} • {}] {}",
            post.id,
            post.title,
            status,
            post.visibility,
            format_date(&post.created_at)
        ));
    }
    if !view.categories.is_empty() {
        let names: Vec<&str> = view.categories.iter().map(|c| c.name.as_str()).collect();
        lines.push(format!("Categories: {}", names.join(", ")));
    }
    lines.join("\n")
}

pub fn comments(thread: &CommentThread) -> String {
    let mut lines = vec![thread.toggle_label()];
    if thread.expanded {
        if thread.comments.is_empty() {
            lines.push("No comments yet. Be the first to comment!".to_string());
        }
        for comment in &thread.comments {
            lines.push(format!(
                "{} • {}\n  {}",
                comment.author_username,
                format_date(&comment.created_at),
                comment.content
            ));
        }
    }
    lines.join("\n")
}

pub fn search(search: &UserSearch) -> String {
    let state = search.snapshot();
    let mut lines = Vec::new();
    if let Some(hint) = search.hint() {
        lines.push(hint);
    }
    if state.open {
        for (i, user) in state.results.iter().enumerate() {
            lines.push(format!("{}. {}  {}", i + 1, user.display_name(), user.info_line()));
        }
    }
    lines.join("\n")
}

pub fn dashboard(view: &DashboardView) -> String {
    if view.loading {
        return "Loading dashboard...".to_string();
    }
    let Some(dash) = &view.dashboard else {
        return "Could not load your dashboard.".to_string();
    };
    let profile = &dash.profile;
    let name = profile
        .full_name
        .as_deref()
        .filter(|n| !n.trim().is_empty())
        .unwrap_or(&profile.username);
    let text = |v: &Option<String>| {
        v.clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "Not set".into())
    };

    let mut lines = vec![
        format!("{} (@{})", name, profile.username),
        format!(
            "{} posts | {} followers | {} following",
            profile.posts_count, profile.followers_count, profile.following_count
        ),
        format!("Bio: {}", text(&profile.bio)),
        format!("Location: {}", text(&profile.location)),
        format!("Website: {}", text(&profile.website)),
        format!("Phone: {}", text(&profile.phone)),
        format!("Birth date: {}", format_long_date(profile.birth_date.as_deref())),
    ];
    if let Some(activity) = &dash.activity {
        lines.push(format!(
            "Activity: {} posts, {} likes received, {} comments received",
            activity.total_posts, activity.total_likes_received, activity.total_comments_received
        ));
        for post in &activity.recent_posts {
            lines.push(format!(
                "  - {} ({} likes, {} comments, {} views) {}",
                post.title,
                post.likes_count,
                post.comments_count,
                post.views_count,
                format_date(&post.created_at)
            ));
        }
    }
    if let Some(stats) = &view.stats {
        lines.push(format!("Unread notifications: {}", stats.unread_notifications));
    }
    lines.join("\n")
}
