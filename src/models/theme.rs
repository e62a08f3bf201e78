use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Owner of the process-wide dark-mode flag. Created once at the root of the
/// app; views only ever see the read-only [`Theme`] handle.
#[derive(Debug)]
pub struct ThemeProvider {
    dark_mode: Arc<AtomicBool>,
}

/// Read-only view of the theme flag.
#[derive(Debug, Clone)]
pub struct Theme {
    dark_mode: Arc<AtomicBool>,
}

impl ThemeProvider {
    pub fn new(dark_mode: bool) -> Self {
        Self {
            dark_mode: Arc::new(AtomicBool::new(dark_mode)),
        }
    }

    pub fn handle(&self) -> Theme {
        Theme {
            dark_mode: Arc::clone(&self.dark_mode),
        }
    }

    /// Flips the flag and returns the new value.
    pub fn toggle(&self) -> bool {
        !self.dark_mode.fetch_xor(true, Ordering::SeqCst)
    }
}

impl Theme {
    pub fn dark_mode(&self) -> bool {
        self.dark_mode.load(Ordering::SeqCst)
    }

    pub fn label(&self) -> &'static str {
        if self.dark_mode() { "dark" } else { "light" }
    }
}
