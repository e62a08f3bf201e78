// src/handlers/profile_handlers.rs - profile dashboard and profile editing
use std::path::Path;

use log::{error, info};
use reqwest::Method;

use crate::app::AppContext;
use crate::dtos::profile_dtos::{Dashboard, DashboardStats, UserProfile};
use crate::models::media::ImageFile;
use crate::services::api_client::{ApiError, MultipartPayload};

const UPDATE_FAILED: &str = "Error updating profile. Please try again.";

/// Editable mirror of the profile, seeded from the dashboard response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub bio: String,
    pub location: String,
    pub birth_date: String,
    pub website: String,
    pub phone: String,
}

impl ProfileForm {
    pub fn from_profile(profile: &UserProfile) -> Self {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        Self {
            first_name: text(&profile.first_name),
            last_name: text(&profile.last_name),
            email: text(&profile.email),
            bio: text(&profile.bio),
            location: text(&profile.location),
            birth_date: text(&profile.birth_date),
            website: text(&profile.website),
            phone: text(&profile.phone),
        }
    }

    fn entries(&self) -> [(&'static str, &str); 8] {
        [
            ("first_name", self.first_name.as_str()),
            ("last_name", self.last_name.as_str()),
            ("email", self.email.as_str()),
            ("bio", self.bio.as_str()),
            ("location", self.location.as_str()),
            ("birth_date", self.birth_date.as_str()),
            ("website", self.website.as_str()),
            ("phone", self.phone.as_str()),
        ]
    }
}

pub struct DashboardView {
    ctx: AppContext,
    pub dashboard: Option<Dashboard>,
    pub stats: Option<DashboardStats>,
    pub loading: bool,
    pub editing: bool,
    pub form: ProfileForm,
    pub avatar: Option<ImageFile>,
    pub avatar_preview: Option<String>,
    pub cover_photo: Option<ImageFile>,
    pub cover_preview: Option<String>,
}

impl DashboardView {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            dashboard: None,
            stats: None,
            loading: true,
            editing: false,
            form: ProfileForm::default(),
            avatar: None,
            avatar_preview: None,
            cover_photo: None,
            cover_preview: None,
        }
    }

    pub async fn fetch(&mut self) {
        self.loading = true;
        match self.ctx.api.get::<Dashboard>("/api/dashboard/").await {
            Ok(dashboard) => {
                self.form = ProfileForm::from_profile(&dashboard.profile);
                self.dashboard = Some(dashboard);
            }
            Err(e) => error!("Error fetching dashboard: {}", e),
        }
        self.loading = false;
    }

    pub async fn fetch_stats(&mut self) -> Result<&DashboardStats, ApiError> {
        let stats = self.ctx.api.get::<DashboardStats>("/api/dashboard/stats/").await?;
        Ok(&*self.stats.insert(stats))
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;
    }

    pub fn set_avatar(&mut self, file: ImageFile) {
        self.avatar_preview = Some(file.preview_data_url());
        self.avatar = Some(file);
    }

    pub fn set_cover_photo(&mut self, file: ImageFile) {
        self.cover_preview = Some(file.preview_data_url());
        self.cover_photo = Some(file);
    }

    pub async fn pick_avatar(&mut self, path: impl AsRef<Path>) -> Result<(), ApiError> {
        let file = ImageFile::read(path).await?;
        self.set_avatar(file);
        Ok(())
    }

    pub async fn pick_cover_photo(&mut self, path: impl AsRef<Path>) -> Result<(), ApiError> {
        let file = ImageFile::read(path).await?;
        self.set_cover_photo(file);
        Ok(())
    }

    /// Only non-empty fields, plus whichever images were picked.
    pub fn build_payload(&self) -> MultipartPayload {
        let mut payload = MultipartPayload::new();
        for (name, value) in self.form.entries() {
            if !value.is_empty() {
                payload = payload.text(name, value);
            }
        }
        if let Some(avatar) = &self.avatar {
            payload = payload.file("avatar", avatar.clone());
        }
        if let Some(cover) = &self.cover_photo {
            payload = payload.file("cover_photo", cover.clone());
        }
        payload
    }

    pub async fn submit(&mut self) -> Result<UserProfile, ApiError> {
        let payload = self.build_payload();
        let result = self
            .ctx
            .api
            .send_multipart::<UserProfile>(Method::PATCH, "/api/profile/", &payload)
            .await;

        match result {
            Ok(profile) => {
                info!("profile updated for {}", profile.username);
                self.editing = false;
                self.avatar = None;
                self.avatar_preview = None;
                self.cover_photo = None;
                self.cover_preview = None;
                self.fetch().await;
                Ok(profile)
            }
            Err(e) => {
                error!("Error updating profile: {}", e);
                self.ctx.prompt.alert(UPDATE_FAILED);
                Err(e)
            }
        }
    }
}
