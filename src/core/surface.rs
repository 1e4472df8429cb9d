// ConsoleWatch - core/surface.rs
//
// The display surface the update step scrolls. Only scroll metrics are
// modelled; content lives in `DisplayState`.
//
// `Viewport` is the concrete surface shared with the GUI: the GUI writes the
// real metrics it measured after each frame, and the update step grows
// `scroll_height` by an estimate (lines * line height) between frames. A
// scroll requested by the update step is parked in `pending_scroll` until the
// GUI applies it. Pinning to the bottom is parked as `ScrollRequest::Bottom`
// rather than an offset, since wrapped lines make the estimate fall short of
// the laid-out height.

use crate::util::constants::{DEFAULT_LINE_HEIGHT, SCROLL_BOTTOM_TOLERANCE};

/// A scrollable display with DOM-like metrics.
pub trait DisplaySurface {
    /// Current vertical scroll offset.
    fn scroll_top(&self) -> f32;

    /// Total height of the scrollable content.
    fn scroll_height(&self) -> f32;

    /// Height of the visible area.
    fn client_height(&self) -> f32;

    fn set_scroll_top(&mut self, top: f32);

    /// Notify the surface that the rendered content gained and lost lines.
    fn content_changed(&mut self, lines_added: usize, lines_removed: usize);

    /// True when the viewport shows the end of the content, within
    /// `SCROLL_BOTTOM_TOLERANCE`.
    fn is_scrolled_to_bottom(&self) -> bool {
        self.scroll_height() - self.client_height() <= self.scroll_top() + SCROLL_BOTTOM_TOLERANCE
    }

    /// Move the viewport to the end of the content.
    fn scroll_to_bottom(&mut self) {
        let bottom = (self.scroll_height() - self.client_height()).max(0.0);
        self.set_scroll_top(bottom);
    }
}

/// A scroll the renderer still has to perform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollRequest {
    /// Scroll to this vertical offset.
    Offset(f32),
    /// Scroll to the end of the laid-out content, whatever its height.
    Bottom,
}

/// In-memory scroll metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    pub scroll_top: f32,
    pub scroll_height: f32,
    pub client_height: f32,
    /// Height of one rendered line, used to estimate content growth.
    pub line_height: f32,
    /// Scroll requested by the update step that the GUI has not applied yet.
    pub pending_scroll: Option<ScrollRequest>,
}

impl Viewport {
    pub fn new(client_height: f32, line_height: f32) -> Self {
        Self {
            scroll_top: 0.0,
            scroll_height: 0.0,
            client_height,
            line_height,
            pending_scroll: None,
        }
    }

    /// Record metrics measured by the renderer.
    pub fn measured(&mut self, scroll_top: f32, scroll_height: f32, client_height: f32) {
        self.scroll_top = scroll_top;
        self.scroll_height = scroll_height;
        self.client_height = client_height;
    }

    /// Hand the pending scroll request to the renderer.
    pub fn take_pending_scroll(&mut self) -> Option<ScrollRequest> {
        self.pending_scroll.take()
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(0.0, DEFAULT_LINE_HEIGHT)
    }
}

impl DisplaySurface for Viewport {
    fn scroll_top(&self) -> f32 {
        self.scroll_top
    }

    fn scroll_height(&self) -> f32 {
        self.scroll_height
    }

    fn client_height(&self) -> f32 {
        self.client_height
    }

    fn set_scroll_top(&mut self, top: f32) {
        self.scroll_top = top;
        self.pending_scroll = Some(ScrollRequest::Offset(top));
    }

    fn scroll_to_bottom(&mut self) {
        self.scroll_top = (self.scroll_height - self.client_height).max(0.0);
        self.pending_scroll = Some(ScrollRequest::Bottom);
    }

    fn content_changed(&mut self, lines_added: usize, lines_removed: usize) {
        let delta = (lines_added as f32 - lines_removed as f32) * self.line_height;
        self.scroll_height = (self.scroll_height + delta).max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_viewport_counts_as_bottom() {
        assert!(Viewport::default().is_scrolled_to_bottom());
    }

    #[test]
    fn test_bottom_detection_uses_one_unit_tolerance() {
        let mut vp = Viewport::new(100.0, 10.0);
        vp.measured(199.0, 300.0, 100.0);
        assert!(vp.is_scrolled_to_bottom());
        vp.measured(198.0, 300.0, 100.0);
        assert!(!vp.is_scrolled_to_bottom());
    }

    #[test]
    fn test_scroll_to_bottom_requests_laid_out_bottom() {
        let mut vp = Viewport::new(100.0, 10.0);
        vp.measured(0.0, 400.0, 100.0);
        vp.scroll_to_bottom();
        assert_eq!(vp.scroll_top, 300.0);
        assert_eq!(vp.take_pending_scroll(), Some(ScrollRequest::Bottom));
        assert_eq!(vp.take_pending_scroll(), None);
    }

    #[test]
    fn test_set_scroll_top_requests_offset() {
        let mut vp = Viewport::new(100.0, 10.0);
        vp.set_scroll_top(42.0);
        assert_eq!(vp.take_pending_scroll(), Some(ScrollRequest::Offset(42.0)));
    }

    #[test]
    fn test_pin_survives_wrapped_lines() {
        // One newline estimated as one row, laid out as three wrapped rows.
        let mut vp = Viewport::new(100.0, 10.0);
        vp.measured(200.0, 300.0, 100.0);
        vp.content_changed(1, 0);
        vp.scroll_to_bottom();
        assert_eq!(vp.take_pending_scroll(), Some(ScrollRequest::Bottom));

        // The renderer scrolls to the real end and reports what it laid out.
        vp.measured(220.0, 320.0, 100.0);
        assert!(vp.is_scrolled_to_bottom());
    }

    #[test]
    fn test_content_changed_grows_and_shrinks_height() {
        let mut vp = Viewport::new(100.0, 10.0);
        vp.content_changed(5, 0);
        assert_eq!(vp.scroll_height, 50.0);
        vp.content_changed(1, 3);
        assert_eq!(vp.scroll_height, 30.0);
        vp.content_changed(0, 10);
        assert_eq!(vp.scroll_height, 0.0);
    }
}
