// ConsoleWatch - core/model.rs
//
// Core data model types. Pure data definitions with no I/O and no UI.
// These types are the shared vocabulary across all layers.

use crate::util::constants;
use serde::{Deserialize, Serialize};
use std::time::Duration;

// =============================================================================
// Wire format
// =============================================================================

/// One chunk of console text offered by the endpoint.
///
/// The server claims `len` units of stream starting at absolute offset
/// `start`. `text` carries the content; a device may send fewer characters
/// than `len` when its output buffer fills, the cursor still advances by `len`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchResponse {
    pub start: u64,
    pub len: u64,
    #[serde(default)]
    pub text: String,
}

impl FetchResponse {
    pub fn new(start: u64, len: u64, text: impl Into<String>) -> Self {
        Self {
            start,
            len,
            text: text.into(),
        }
    }

    /// Offset one past the last unit covered by this chunk.
    pub fn end(&self) -> u64 {
        self.start.saturating_add(self.len)
    }
}

// =============================================================================
// Display state
// =============================================================================

/// The poller's view of the remote stream: how much has been consumed and
/// the display-safe markup rendered so far.
#[derive(Debug, Clone)]
pub struct DisplayState {
    /// Absolute stream offset consumed so far. Only ever increases.
    cursor: u64,

    /// Escaped, display-safe markup.
    rendered: String,

    /// Rendered buffer cap in bytes; oldest whole lines are dropped past it.
    max_rendered_bytes: usize,

    /// Bumped on every mutation of `rendered` so readers can cache derived text.
    generation: u64,
}

impl DisplayState {
    pub fn new() -> Self {
        Self::with_max_rendered_bytes(constants::DEFAULT_MAX_RENDERED_BYTES)
    }

    pub fn with_max_rendered_bytes(max_rendered_bytes: usize) -> Self {
        Self {
            cursor: 0,
            rendered: String::new(),
            max_rendered_bytes,
            generation: 0,
        }
    }

    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    pub fn rendered(&self) -> &str {
        &self.rendered
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Advance the cursor. Moving backwards is ignored.
    pub(crate) fn advance_cursor(&mut self, to: u64) {
        if to > self.cursor {
            self.cursor = to;
        }
    }

    /// Append already-escaped markup.
    pub(crate) fn push_markup(&mut self, markup: &str) {
        self.rendered.push_str(markup);
        self.generation += 1;
    }

    /// Drop the oldest whole lines until the buffer fits the cap.
    ///
    /// Returns the number of lines removed. A buffer with no newline in the
    /// excess region is cut at the first char boundary past the excess, moved
    /// past the end of any escape entity the cut would split.
    pub(crate) fn enforce_cap(&mut self) -> usize {
        if self.rendered.len() <= self.max_rendered_bytes {
            return 0;
        }
        let excess = self.rendered.len() - self.max_rendered_bytes;
        let cut = match self.rendered[excess..].find('\n') {
            Some(pos) => excess + pos + 1,
            None => {
                let mut idx = excess;
                while !self.rendered.is_char_boundary(idx) {
                    idx += 1;
                }
                entity_safe_cut(&self.rendered, idx)
            }
        };
        let removed = self.rendered[..cut].matches('\n').count();
        self.rendered.drain(..cut);
        self.generation += 1;
        removed
    }

    /// Discard rendered content. The cursor is kept so polling resumes where
    /// it left off instead of replaying the device buffer.
    pub fn clear_rendered(&mut self) {
        self.rendered.clear();
        self.generation += 1;
    }
}

/// Move `idx` past the `;` of an entity that starts before it and ends after.
/// Escaped markup never holds a bare `&`, so every `&` opens an entity.
fn entity_safe_cut(markup: &str, idx: usize) -> usize {
    let Some(amp) = markup[..idx].rfind('&') else {
        return idx;
    };
    if markup[amp..idx].contains(';') {
        return idx;
    }
    match markup[idx..].find(';') {
        Some(pos) => idx + pos + 1,
        None => idx,
    }
}

impl Default for DisplayState {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Poll timings
// =============================================================================

/// Delays driving the poll cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollTimings {
    /// Next delay after a chunk with new text.
    pub fast: Duration,
    /// Next delay after an empty answer.
    pub slow: Duration,
    /// Fixed delay after a transport failure.
    pub retry: Duration,
}

impl Default for PollTimings {
    fn default() -> Self {
        Self {
            fast: Duration::from_millis(constants::DEFAULT_FAST_POLL_MS),
            slow: Duration::from_millis(constants::DEFAULT_SLOW_POLL_MS),
            retry: Duration::from_millis(constants::DEFAULT_RETRY_DELAY_MS),
        }
    }
}

// =============================================================================
// Poll progress messages (background task -> UI)
// =============================================================================

/// Messages sent from the background poller to the UI or headless printer.
#[derive(Debug, Clone, PartialEq)]
pub enum PollProgress {
    /// The poll loop is running against `url`.
    Started { url: String },

    /// New text was applied. `text` is the raw (unescaped) new content.
    Applied { text: String, gap: bool, cursor: u64 },

    /// The endpoint had nothing new.
    NoData,

    /// A request failed; the next attempt happens after `retry_in`.
    TransportFailed { message: String, retry_in: Duration },

    /// The poll loop exited (cancelled, one-shot finished, or receiver gone).
    Stopped,
}
