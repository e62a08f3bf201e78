// src/handlers/post_handlers.rs - authoring tool: own posts, create, delete
use std::path::Path;

use log::{error, info};
use reqwest::Method;

use crate::app::AppContext;
use crate::dtos::post_dtos::{Category, Post};
use crate::models::media::{self, ImageFile};
use crate::services::api_client::{ApiError, MultipartPayload};

pub const DELETE_CONFIRMATION: &str = "Are you sure you want to delete this post?";
const CREATE_FAILED: &str = "Error creating post. Please try again.";
const DELETE_FAILED: &str = "Error deleting post. Please try again.";

/// Scalar fields of the "Create New Post" form.
#[derive(Debug, Clone, PartialEq)]
pub struct PostForm {
    pub title: String,
    pub content: String,
    pub category: String,
    pub visibility: String,
    pub is_published: bool,
}

impl Default for PostForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            content: String::new(),
            category: String::new(),
            visibility: "public".to_string(),
            is_published: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Cancelled,
    Deleted,
    Failed,
}

pub struct PostManager {
    ctx: AppContext,
    pub posts: Vec<Post>,
    pub categories: Vec<Category>,
    pub loading: bool,
    pub show_create_form: bool,
    pub form: PostForm,
    pub main_image: Option<ImageFile>,
    pub image_preview: Option<String>,
    pub additional_images: Vec<ImageFile>,
    pub additional_previews: Vec<String>,
}

impl PostManager {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            posts: Vec::new(),
            categories: Vec::new(),
            loading: false,
            show_create_form: false,
            form: PostForm::default(),
            main_image: None,
            image_preview: None,
            additional_images: Vec::new(),
            additional_previews: Vec::new(),
        }
    }

    /// Loads the user's own posts and the category list side by side.
    pub async fn mount(&mut self) {
        self.loading = true;
        let api = &self.ctx.api;
        let (posts, categories) = futures::join!(
            api.get_list::<Post>("/api/posts/my_posts/", &[]),
            api.get_list::<Category>("/api/categories/", &[]),
        );
        match posts {
            Ok(posts) => self.posts = posts,
            Err(e) => error!("Error fetching posts: {}", e),
        }
        match categories {
            Ok(categories) => self.categories = categories,
            Err(e) => error!("Error fetching categories: {}", e),
        }
        self.loading = false;
    }

    pub async fn fetch_posts(&mut self) {
        self.loading = true;
        match self.ctx.api.get_list::<Post>("/api/posts/my_posts/", &[]).await {
            Ok(posts) => self.posts = posts,
            Err(e) => error!("Error fetching posts: {}", e),
        }
        self.loading = false;
    }

    pub fn toggle_create_form(&mut self) {
        self.show_create_form = !self.show_create_form;
    }

    pub fn set_main_image(&mut self, file: ImageFile) {
        self.image_preview = Some(file.preview_data_url());
        self.main_image = Some(file);
    }

    /// Replaces the additional images; previews keep selection order.
    pub fn set_additional_images(&mut self, files: Vec<ImageFile>) {
        self.additional_previews = files.iter().map(ImageFile::preview_data_url).collect();
        self.additional_images = files;
    }

    pub async fn pick_main_image(&mut self, path: impl AsRef<Path>) -> Result<(), ApiError> {
        let file = ImageFile::read(path).await?;
        self.set_main_image(file);
        Ok(())
    }

    pub async fn pick_additional_images(
        &mut self,
        paths: &[impl AsRef<Path>],
    ) -> Result<(), ApiError> {
        let files = media::read_all(paths).await?;
        self.set_additional_images(files);
        Ok(())
    }

    /// Every scalar field, then `image`, then one `additional_images` part per file.
    pub fn build_payload(&self) -> MultipartPayload {
        let mut payload = MultipartPayload::new()
            .text("title", self.form.title.as_str())
            .text("content", self.form.content.as_str())
            .text("category", self.form.category.as_str())
            .text("visibility", self.form.visibility.as_str())
            .text("is_published", self.form.is_published.to_string());
        if let Some(image) = &self.main_image {
            payload = payload.file("image", image.clone());
        }
        for image in &self.additional_images {
            payload = payload.file("additional_images", image.clone());
        }
        payload
    }

    fn reset_form(&mut self) {
        self.form = PostForm::default();
        self.main_image = None;
        self.additional_images.clear();
        self.image_preview = None;
        self.additional_previews.clear();
        self.show_create_form = false;
    }

    /// Submits the form. On success the form is reset and closed and the
    /// list re-fetched; on failure the user is alerted and the form kept.
    pub async fn create(&mut self) -> Result<Post, ApiError> {
        let payload = self.build_payload();
        self.loading = true;
        let result = self
            .ctx
            .api
            .send_multipart::<Post>(Method::POST, "/api/posts/", &payload)
            .await;
        self.loading = false;

        match result {
            Ok(post) => {
                info!("created post {}", post.id);
                self.reset_form();
                self.fetch_posts().await;
                Ok(post)
            }
            Err(e) => {
                error!("Error creating post: {}", e);
                self.ctx.prompt.alert(CREATE_FAILED);
                Err(e)
            }
        }
    }

    /// Asks first; declining sends nothing.
    pub async fn delete(&mut self, post_id: i64) -> DeleteOutcome {
        if !self.ctx.prompt.confirm(DELETE_CONFIRMATION) {
            return DeleteOutcome::Cancelled;
        }
        let path = format!("/api/posts/{}/", post_id);
        match self.ctx.api.delete(&path).await {
            Ok(()) => {
                info!("deleted post {}", post_id);
                self.fetch_posts().await;
                DeleteOutcome::Deleted
            }
            Err(e) => {
                error!("Error deleting post {}: {}", post_id, e);
                self.ctx.prompt.alert(DELETE_FAILED);
                DeleteOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::testing;
    use crate::handlers::prompt::testing::RecordingPrompt;
    use mockito::Matcher;
    use std::sync::Arc;

    #[tokio::test]
    async fn mount_loads_own_posts_and_categories() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/posts/my_posts/")
            .with_status(200)
            .with_body(r#"{"count":1,"results":[{"id":3,"title":"Mine"}]}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/api/categories/")
            .with_status(200)
            .with_body(r#"[{"id":1,"name":"Breaking News"},{"id":2,"name":"Sports"}]"#)
            .create_async()
            .await;
        let prompt = Arc::new(RecordingPrompt::default());
        let (ctx, _) = testing::context(&server.url(), prompt);
        let mut manager = PostManager::new(ctx);

        manager.mount().await;
        assert_eq!(manager.posts[0].title, "Mine");
        assert_eq!(manager.categories.len(), 2);
        assert!(!manager.loading);
    }

    #[test]
    fn payload_lists_fields_then_files() {
        let prompt = Arc::new(RecordingPrompt::default());
        let (ctx, _) = testing::context("http://127.0.0.1:9", prompt);
        let mut manager = PostManager::new(ctx);
        manager.form.title = "Finals schedule".into();
        manager.form.is_published = false;
        manager.set_main_image(ImageFile::new("hero.png", vec![1]));
        manager.set_additional_images(vec![
            ImageFile::new("one.jpg", vec![2]),
            ImageFile::new("two.jpg", vec![3]),
        ]);

        let payload = manager.build_payload();
        let fields: Vec<(&str, &str)> = payload
            .fields()
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(
            fields,
            vec![
                ("title", "Finals schedule"),
                ("content", ""),
                ("category", ""),
                ("visibility", "public"),
                ("is_published", "false"),
            ]
        );
        assert_eq!(
            payload.file_names(),
            vec![
                ("image", "hero.png"),
                ("additional_images", "one.jpg"),
                ("additional_images", "two.jpg"),
            ]
        );
        assert_eq!(manager.additional_previews.len(), 2);
        assert!(manager.image_preview.as_deref().unwrap().starts_with("data:image/png;base64,"));
    }

    #[tokio::test]
    async fn successful_create_resets_closes_and_refetches() {
        let mut server = mockito::Server::new_async().await;
        let create = server
            .mock("POST", "/api/posts/")
            .match_body(Matcher::Regex(r#"name="title""#.into()))
            .with_status(201)
            .with_body(r#"{"id":12,"title":"New"}"#)
            .expect(1)
            .create_async()
            .await;
        let list = server
            .mock("GET", "/api/posts/my_posts/")
            .with_status(200)
            .with_body(r#"[{"id":12,"title":"New"}]"#)
            .expect(1)
            .create_async()
            .await;
        let prompt = Arc::new(RecordingPrompt::default());
        let (ctx, _) = testing::context(&server.url(), prompt.clone());
        let mut manager = PostManager::new(ctx);
        manager.show_create_form = true;
        manager.form.title = "New".into();
        manager.form.visibility = "private".into();
        manager.set_main_image(ImageFile::new("a.png", vec![0]));

        let post = manager.create().await.unwrap();
        assert_eq!(post.id, 12);
        assert_eq!(manager.form, PostForm::default());
        assert!(!manager.show_create_form);
        assert!(manager.main_image.is_none());
        assert!(manager.image_preview.is_none());
        assert_eq!(manager.posts.len(), 1);
        assert!(prompt.alerts().is_empty());
        create.assert_async().await;
        list.assert_async().await;
    }

    #[tokio::test]
    async fn failed_create_alerts_and_keeps_the_form() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/posts/")
            .with_status(400)
            .with_body(r#"{"title":["This field may not be blank."]}"#)
            .create_async()
            .await;
        let prompt = Arc::new(RecordingPrompt::default());
        let (ctx, _) = testing::context(&server.url(), prompt.clone());
        let mut manager = PostManager::new(ctx);
        manager.show_create_form = true;
        manager.form.content = "draft".into();

        assert!(manager.create().await.is_err());
        assert!(manager.show_create_form);
        assert_eq!(manager.form.content, "draft");
        assert_eq!(prompt.alerts(), vec![CREATE_FAILED.to_string()]);
    }

    #[tokio::test]
    async fn declined_delete_sends_nothing() {
        let mut server = mockito::Server::new_async().await;
        let delete = server
            .mock("DELETE", "/api/posts/4/")
            .expect(0)
            .create_async()
            .await;
        let prompt = Arc::new(RecordingPrompt::answering(&[false]));
        let (ctx, _) = testing::context(&server.url(), prompt.clone());
        let mut manager = PostManager::new(ctx);

        assert_eq!(manager.delete(4).await, DeleteOutcome::Cancelled);
        assert_eq!(prompt.confirms(), vec![DELETE_CONFIRMATION.to_string()]);
        delete.assert_async().await;
    }

    #[tokio::test]
    async fn confirmed_delete_refetches() {
        let mut server = mockito::Server::new_async().await;
        let delete = server
            .mock("DELETE", "/api/posts/4/")
            .with_status(204)
            .expect(1)
            .create_async()
            .await;
        let list = server
            .mock("GET", "/api/posts/my_posts/")
            .with_status(200)
            .with_body("[]")
            .expect(1)
            .create_async()
            .await;
        let prompt = Arc::new(RecordingPrompt::answering(&[true]));
        let (ctx, _) = testing::context(&server.url(), prompt);
        let mut manager = PostManager::new(ctx);
        manager.posts = vec![serde_json::from_value(serde_json::json!({"id":4})).unwrap()];

        assert_eq!(manager.delete(4).await, DeleteOutcome::Deleted);
        assert!(manager.posts.is_empty());
        delete.assert_async().await;
        list.assert_async().await;
    }

    #[tokio::test]
    async fn failed_delete_is_alerted() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("DELETE", "/api/posts/4/")
            .with_status(403)
            .create_async()
            .await;
        let prompt = Arc::new(RecordingPrompt::answering(&[true]));
        let (ctx, _) = testing::context(&server.url(), prompt.clone());
        let mut manager = PostManager::new(ctx);

        assert_eq!(manager.delete(4).await, DeleteOutcome::Failed);
        assert_eq!(prompt.alerts(), vec![DELETE_FAILED.to_string()]);
    }
}
