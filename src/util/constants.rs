// ConsoleWatch - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.
// Every configurable value has a default plus an inclusive min/max bound that
// config.toml validation checks against.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "ConsoleWatch";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "ConsoleWatch";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Poll cadence
// =============================================================================

/// Delay before the next request when the previous one returned new text (ms).
pub const DEFAULT_FAST_POLL_MS: u64 = 500;

/// Delay before the next request when the previous one returned nothing (ms).
pub const DEFAULT_SLOW_POLL_MS: u64 = 3_000;

/// Fixed delay before retrying after a transport failure (ms).
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1_000;

/// Lower bound for any user-configured poll delay (ms).
pub const MIN_POLL_DELAY_MS: u64 = 50;

/// Upper bound for any user-configured poll delay (ms).
pub const MAX_POLL_DELAY_MS: u64 = 60_000; // 60 s

/// Per-request timeout. A stalled device counts as a transport failure.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Minimum user-configurable request timeout (ms).
pub const MIN_REQUEST_TIMEOUT_MS: u64 = 500;

/// Maximum user-configurable request timeout (ms).
pub const MAX_REQUEST_TIMEOUT_MS: u64 = 120_000;

/// Delay before the very first request of a session (ms).
pub const INITIAL_POLL_DELAY_MS: u64 = 0;

// =============================================================================
// Rendering
// =============================================================================

/// Marker inserted into the rendered output when the server's next chunk
/// starts beyond the local cursor. Escaped like any other text on append.
pub const GAP_MARKER: &str = "\r\n<missing lines\r\n";

/// Scroll metrics tolerance when deciding whether the viewport sits at the
/// bottom of the content (same unit as the metrics themselves).
pub const SCROLL_BOTTOM_TOLERANCE: f32 = 1.0;

/// Default cap on the rendered buffer (bytes). Oldest whole lines are
/// dropped once exceeded.
pub const DEFAULT_MAX_RENDERED_BYTES: usize = 4 * 1024 * 1024; // 4 MiB

/// Minimum user-configurable rendered buffer cap.
pub const MIN_MAX_RENDERED_BYTES: usize = 64 * 1024; // 64 KiB

/// Maximum user-configurable rendered buffer cap.
pub const ABSOLUTE_MAX_RENDERED_BYTES: usize = 256 * 1024 * 1024; // 256 MiB

/// Line height the GUI viewport assumes until the first frame measures the
/// console font.
pub const DEFAULT_LINE_HEIGHT: f32 = 16.0;

// =============================================================================
// UI
// =============================================================================

/// Maximum number of poll-progress messages processed per UI frame.
pub const MAX_POLL_MESSAGES_PER_FRAME: usize = 200;

/// Maximum number of non-fatal warnings kept for the warnings panel.
pub const MAX_WARNINGS: usize = 500;

/// Default console font size in points.
pub const DEFAULT_FONT_SIZE: f32 = 13.0;

/// Minimum user-configurable font size (points).
pub const MIN_FONT_SIZE: f32 = 8.0;

/// Maximum user-configurable font size (points).
pub const MAX_FONT_SIZE: f32 = 32.0;

/// How often the UI repaints while a poller is running (ms).
pub const UI_REPAINT_INTERVAL_MS: u64 = 250;

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Maximum number of characters of fetched text shown in debug logs.
pub const DEBUG_MAX_TEXT_PREVIEW: usize = 120;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Maximum accepted config file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: u64 = 64 * 1024;
