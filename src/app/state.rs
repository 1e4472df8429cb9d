// ConsoleWatch - app/state.rs
//
// Application state for the GUI. Holds the shared console view, connection
// status, and the flags panels set to request actions.
// Owned by the eframe::App implementation.

use crate::app::poller::{lock_view, ConsoleView, SharedView};
use crate::core::escape::unescape_markup;
use crate::core::model::{DisplayState, PollProgress, PollTimings};
use crate::core::surface::Viewport;
use crate::platform::config::AppConfig;
use crate::util::constants::{DEFAULT_LINE_HEIGHT, MAX_WARNINGS};
use chrono::{DateTime, Local};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Export target chosen in the File menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Html,
    Text,
}

/// Connection health derived from the latest poll progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkStatus {
    Idle,
    Connecting,
    Live,
    Retrying { consecutive_failures: u32 },
}

/// Top-level application state.
#[derive(Debug)]
pub struct AppState {
    /// Console endpoint being polled.
    pub console_url: String,

    /// Stream state and scroll metrics shared with the poll task.
    pub view: SharedView,

    pub timings: PollTimings,
    pub request_timeout: Duration,

    /// Keep polling after the first successful answer.
    pub repeat: bool,

    /// Whether a poll loop is running.
    pub polling: bool,

    pub link: LinkStatus,

    /// Status message for the status bar.
    pub status_message: String,

    /// Local time of the last chunk that carried new text.
    pub last_update: Option<DateTime<Local>>,

    /// Gaps seen since the console was last cleared.
    pub gap_count: u64,

    /// Non-fatal warnings (config problems, transport failures).
    pub warnings: Vec<String>,

    pub show_warnings: bool,
    pub show_about: bool,

    pub font_size: f32,
    pub dark_mode: bool,
    pub debug_mode: bool,

    // -- Requests raised by panels, handled by the app each frame --
    pub request_start: bool,
    pub request_stop: bool,
    pub request_export: Option<ExportFormat>,

    /// Decoded copy of the rendered markup and the generation it matches.
    plain_text: String,
    plain_generation: Option<u64>,
}

impl AppState {
    /// Create initial state for `console_url` from validated config.
    pub fn new(console_url: String, config: &AppConfig, repeat: bool, debug_mode: bool) -> Self {
        let view = ConsoleView::new(
            DisplayState::with_max_rendered_bytes(config.max_rendered_bytes),
            Viewport::new(0.0, DEFAULT_LINE_HEIGHT),
        );
        Self {
            console_url,
            view: Arc::new(Mutex::new(view)),
            timings: config.timings,
            request_timeout: config.request_timeout,
            repeat,
            polling: false,
            link: LinkStatus::Idle,
            status_message: "Ready.".to_string(),
            last_update: None,
            gap_count: 0,
            warnings: Vec::new(),
            show_warnings: false,
            show_about: false,
            font_size: config.font_size,
            dark_mode: config.dark_mode,
            debug_mode,
            request_start: false,
            request_stop: false,
            request_export: None,
            plain_text: String::new(),
            plain_generation: None,
        }
    }

    /// Fold one poll progress message into the visible status.
    pub fn handle_progress(&mut self, msg: PollProgress) {
        match msg {
            PollProgress::Started { url } => {
                self.polling = true;
                self.link = LinkStatus::Connecting;
                self.status_message = format!("Connecting to {url}...");
            }
            PollProgress::Applied { gap, cursor, .. } => {
                self.link = LinkStatus::Live;
                self.last_update = Some(Local::now());
                if gap {
                    self.gap_count += 1;
                }
                self.status_message = format!("Receiving. Cursor at {cursor}.");
            }
            PollProgress::NoData => {
                self.link = LinkStatus::Live;
                self.status_message = "Connected. Waiting for output...".to_string();
            }
            PollProgress::TransportFailed { message, retry_in } => {
                let consecutive_failures = match self.link {
                    LinkStatus::Retrying {
                        consecutive_failures,
                    } => consecutive_failures.saturating_add(1),
                    _ => 1,
                };
                self.link = LinkStatus::Retrying {
                    consecutive_failures,
                };
                self.status_message = format!(
                    "Fetch failed ({consecutive_failures}x), retrying in {} ms.",
                    retry_in.as_millis()
                );
                self.push_warning(message);
            }
            PollProgress::Stopped => {
                self.polling = false;
                self.link = LinkStatus::Idle;
                self.status_message = "Polling stopped.".to_string();
            }
        }
    }

    /// Record a warning, dropping the oldest past `MAX_WARNINGS`.
    pub fn push_warning(&mut self, warning: String) {
        if self.warnings.len() >= MAX_WARNINGS {
            self.warnings.remove(0);
        }
        self.warnings.push(warning);
    }

    /// Decoded console text, re-derived only when the rendered markup changed.
    pub fn plain_text(&mut self) -> &str {
        let guard = lock_view(&self.view);
        let generation = guard.state.generation();
        if self.plain_generation != Some(generation) {
            self.plain_text = unescape_markup(guard.state.rendered());
            self.plain_generation = Some(generation);
        }
        drop(guard);
        &self.plain_text
    }

    /// Current stream cursor.
    pub fn cursor(&self) -> u64 {
        lock_view(&self.view).state.cursor()
    }

    /// Clear rendered console content; polling continues from the cursor.
    pub fn clear_console(&mut self) {
        let mut guard = lock_view(&self.view);
        guard.state.clear_rendered();
        let client_height = guard.viewport.client_height;
        guard.viewport.measured(0.0, 0.0, client_height);
        drop(guard);
        self.gap_count = 0;
        self.status_message = "Console cleared.".to_string();
    }
}
