// ConsoleWatch - core/update.rs
//
// The update step: applies one endpoint answer to the display state and
// picks the delay before the next request.
//
// Order of operations matters for scroll pinning: the bottom check runs
// before the buffer grows, the pin runs after.

use crate::core::escape::escape_markup;
use crate::core::model::{DisplayState, FetchResponse, PollTimings};
use crate::core::surface::DisplaySurface;
use crate::util::constants::GAP_MARKER;
use std::time::Duration;

/// What a successful update appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedChunk {
    /// Raw new text (not escaped).
    pub text: String,
    /// A gap marker was rendered before the text.
    pub gap: bool,
    /// Cursor after the update.
    pub cursor: u64,
}

/// Result of `apply_update`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Delay before the next request.
    pub next_delay: Duration,
    /// `None` when the answer carried no new data.
    pub applied: Option<AppliedChunk>,
}

impl UpdateOutcome {
    fn no_data(timings: &PollTimings) -> Self {
        Self {
            next_delay: timings.slow,
            applied: None,
        }
    }
}

/// Apply one endpoint answer.
///
/// `None` or a zero-length chunk leaves everything untouched and asks for the
/// slow delay. Otherwise the text is escaped and appended, preceded by a gap
/// marker when the chunk starts beyond the cursor, and the cursor moves to
/// `start + len`. A chunk starting before the cursor has its already-consumed
/// prefix (`cursor - start` bytes) skipped.
pub fn apply_update<S: DisplaySurface>(
    state: &mut DisplayState,
    surface: &mut S,
    response: Option<&FetchResponse>,
    timings: &PollTimings,
) -> UpdateOutcome {
    let Some(resp) = response.filter(|r| r.len > 0) else {
        return UpdateOutcome::no_data(timings);
    };

    let cursor = state.cursor();
    let text: &str = if resp.start < cursor {
        if resp.end() <= cursor {
            tracing::debug!(
                cursor,
                start = resp.start,
                len = resp.len,
                "Chunk already consumed; treating as no data"
            );
            return UpdateOutcome::no_data(timings);
        }
        // Offsets count device bytes, which arrive as UTF-8 text.
        let skip = usize::try_from(cursor - resp.start).unwrap_or(usize::MAX);
        if skip >= resp.text.len() {
            ""
        } else {
            let mut idx = skip;
            while !resp.text.is_char_boundary(idx) {
                idx += 1;
            }
            &resp.text[idx..]
        }
    } else {
        &resp.text
    };
    let gap = resp.start > cursor;

    let was_at_bottom = surface.is_scrolled_to_bottom();

    let mut markup = String::with_capacity(text.len() + GAP_MARKER.len() + 8);
    if gap {
        tracing::info!(
            expected = cursor,
            start = resp.start,
            missing = resp.start - cursor,
            "Console stream gap; data before the new chunk was lost"
        );
        markup.push_str(&escape_markup(GAP_MARKER));
    }
    markup.push_str(&escape_markup(text));

    state.push_markup(&markup);
    state.advance_cursor(resp.end());
    let lines_removed = state.enforce_cap();
    surface.content_changed(markup.matches('\n').count(), lines_removed);

    if was_at_bottom {
        surface.scroll_to_bottom();
    }

    tracing::debug!(
        cursor = state.cursor(),
        len = resp.len,
        gap,
        pinned = was_at_bottom,
        text = %crate::util::logging::preview(text),
        "Applied console chunk"
    );

    UpdateOutcome {
        next_delay: timings.fast,
        applied: Some(AppliedChunk {
            text: text.to_string(),
            gap,
            cursor: state.cursor(),
        }),
    }
}
