use log::error;

use crate::app::AppContext;
use crate::dtos::auth_dtos::{LoginIn, RegisterIn};
use crate::models::route::Route;
use crate::services::api_client::describe_error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Login,
    Register,
}

/// What happened to a submitted auth form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Navigated(Route),
    Failed(String),
}

/// The shared login / registration form.
#[derive(Debug, Clone)]
pub struct AuthForm {
    pub mode: FormMode,
    pub username: String,
    pub password: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub loading: bool,
}

impl AuthForm {
    pub fn new(mode: FormMode) -> Self {
        Self {
            mode,
            username: String::new(),
            password: String::new(),
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            loading: false,
        }
    }

    pub fn title(&self) -> &'static str {
        match self.mode {
            FormMode::Login => "Sign In",
            FormMode::Register => "Sign Up",
        }
    }

    /// Prompt text and target of the "switch form" link.
    pub fn switch_link(&self) -> (&'static str, &'static str, Route) {
        match self.mode {
            FormMode::Login => ("Don't have an account?", "Sign up", Route::Register),
            FormMode::Register => ("Already have an account?", "Sign in", Route::Login),
        }
    }

    /// Login stores the tokens and moves to home; registration moves to
    /// login without signing in. Failures are alerted.
    pub async fn submit(&mut self, ctx: &AppContext) -> AuthOutcome {
        self.loading = true;
        let result = match self.mode {
            FormMode::Login => ctx
                .auth
                .login(LoginIn {
                    username: self.username.clone(),
                    password: self.password.clone(),
                })
                .await
                .map(|_| Route::Home),
            FormMode::Register => ctx
                .auth
                .register(RegisterIn {
                    username: self.username.clone(),
                    password: self.password.clone(),
                    email: Some(self.email.clone()),
                    first_name: Some(self.first_name.clone()),
                    last_name: Some(self.last_name.clone()),
                })
                .await
                .map(|_| Route::Login),
        };
        self.loading = false;

        match result {
            Ok(target) => match ctx.navigator.navigate(target) {
                Ok(landed) => AuthOutcome::Navigated(landed),
                Err(e) => {
                    let message = format!("An error occurred\n{}", e);
                    ctx.prompt.alert(&message);
                    AuthOutcome::Failed(message)
                }
            },
            Err(e) => {
                error!("{} failed: {}", self.title(), e);
                let message = describe_error(&e);
                ctx.prompt.alert(&message);
                AuthOutcome::Failed(message)
            }
        }
    }
}
