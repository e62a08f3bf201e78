// src/handlers/search_handlers.rs - debounced type-ahead user search
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use log::{debug, error};
use tokio::task::JoinHandle;

use crate::app::AppContext;
use crate::dtos::profile_dtos::{SearchOut, SearchResult};
use crate::services::api_client::{ApiClient, ApiError};

pub const MIN_QUERY_CHARS: usize = 2;
const SEARCH_FAILED: &str = "Failed to search users";

pub type OnSelect = Box<dyn FnMut(&SearchResult) + Send>;

#[derive(Debug, Default, Clone)]
pub struct SearchState {
    pub query: String,
    pub results: Vec<SearchResult>,
    pub loading: bool,
    pub open: bool,
    pub error: Option<String>,
    // generation of the latest keystroke, and of the latest result shown
    issued: u64,
    applied: u64,
}

impl SearchState {
    fn clear(&mut self) {
        self.results.clear();
        self.open = false;
        self.loading = false;
        self.error = None;
    }

    fn issue(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// Hides the dropdown and makes every search issued so far stale.
    fn retire(&mut self) {
        self.applied = self.issue();
        self.clear();
    }

    /// Called when the debounce timer of `generation` fires. False when a
    /// later keystroke or a reset superseded it.
    fn begin(&mut self, generation: u64) -> bool {
        if generation != self.issued {
            return false;
        }
        self.loading = true;
        true
    }

    /// Stores the outcome of search number `generation`. Returns false when
    /// a newer search already landed and this one was dropped.
    fn apply(&mut self, generation: u64, outcome: Result<Vec<SearchResult>, ApiError>) -> bool {
        if generation < self.applied {
            debug!("dropping stale user search #{}", generation);
            return false;
        }
        self.applied = generation;
        self.loading = false;
        match outcome {
            Ok(results) => {
                self.results = results;
                self.error = None;
            }
            Err(e) => {
                error!("User search failed: {}", e);
                self.results.clear();
                self.error = Some(SEARCH_FAILED.to_string());
            }
        }
        self.open = true;
        true
    }
}

fn lock(state: &Mutex<SearchState>) -> MutexGuard<'_, SearchState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

fn is_searchable(query: &str) -> bool {
    query.trim().chars().count() >= MIN_QUERY_CHARS
}

/// Sends the query as typed; the length check is the only place it is trimmed.
pub async fn search_users(api: &ApiClient, query: &str) -> Result<Vec<SearchResult>, ApiError> {
    let path = format!("/api/search/users/?q={}", urlencoding::encode(query));
    let out: SearchOut = api.get(&path).await?;
    Ok(out.results)
}

/// Search box with a result dropdown. Each keystroke restarts the debounce
/// timer; a fired search runs detached and is never cancelled.
pub struct UserSearch {
    api: ApiClient,
    debounce: Duration,
    state: Arc<Mutex<SearchState>>,
    timer: Option<JoinHandle<()>>,
    on_select: Option<OnSelect>,
}

impl UserSearch {
    pub fn new(ctx: &AppContext) -> Self {
        Self {
            api: ctx.api.clone(),
            debounce: ctx.config.search_debounce,
            state: Arc::new(Mutex::new(SearchState::default())),
            timer: None,
            on_select: None,
        }
    }

    pub fn on_select(mut self, callback: OnSelect) -> Self {
        self.on_select = Some(callback);
        self
    }

    pub fn snapshot(&self) -> SearchState {
        lock(&self.state).clone()
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }

    /// Must be called inside a tokio runtime.
    pub fn set_query(&mut self, query: &str) {
        self.cancel_timer();
        let mut state = lock(&self.state);
        state.query = query.to_string();

        if !is_searchable(query) {
            // results of searches already in flight must not reopen the dropdown
            state.retire();
            return;
        }
        let generation = state.issue();
        drop(state);

        let api = self.api.clone();
        let state = Arc::clone(&self.state);
        let debounce = self.debounce;
        let query = query.to_string();
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            if !lock(&state).begin(generation) {
                return;
            }
            tokio::spawn(async move {
                let outcome = search_users(&api, &query).await;
                lock(&state).apply(generation, outcome);
            });
        }));
    }

    /// Pointer-down anywhere; `inside` tells whether it hit the widget.
    pub fn pointer_down(&self, inside: bool) {
        if !inside {
            lock(&self.state).open = false;
        }
    }

    /// Picks a result by index: runs the callback, then clears the query and
    /// hides the dropdown. Pending and in-flight searches are discarded.
    pub fn select(&mut self, index: usize) -> Option<SearchResult> {
        let picked = lock(&self.state).results.get(index).cloned()?;
        if let Some(callback) = self.on_select.as_mut() {
            callback(&picked);
        }
        self.cancel_timer();
        let mut state = lock(&self.state);
        state.query.clear();
        state.retire();
        Some(picked)
    }

    /// Status text under the search box, if any.
    pub fn hint(&self) -> Option<String> {
        let state = lock(&self.state);
        let trimmed = state.query.trim();
        if !trimmed.is_empty() && !is_searchable(trimmed) {
            return Some("Type at least 2 characters to search".to_string());
        }
        if state.loading {
            return Some("Searching...".to_string());
        }
        if let Some(e) = &state.error {
            return Some(e.clone());
        }
        if state.open && state.results.is_empty() {
            return Some("No users found".to_string());
        }
        None
    }
}

impl Drop for UserSearch {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}
