// ConsoleWatch - ui/panels/console.rs
//
// The scrolling console view (central area).
//
// Scroll pinning is decided by the update step, not by egui: each frame this
// panel applies any scroll the update step requested, renders, and writes the
// measured scroll metrics back into the shared viewport so the next update
// sees where the user actually is. A pin scrolls to the end of the laid-out
// text, which covers wrapped lines the update step could not measure.

use crate::app::poller::lock_view;
use crate::app::state::AppState;
use crate::core::surface::ScrollRequest;
use crate::ui::theme;
use std::sync::Arc;

/// Render the console panel.
pub fn render(ui: &mut egui::Ui, state: &mut AppState) {
    let view = Arc::clone(&state.view);
    let font_size = state.font_size;
    let colour = theme::console_text_colour(state.dark_mode);
    let line_height = ui.fonts(|f| f.row_height(&egui::FontId::monospace(font_size)));

    let pending_scroll = {
        let mut guard = lock_view(&view);
        guard.viewport.line_height = line_height;
        guard.viewport.take_pending_scroll()
    };

    let text = state.plain_text();
    if text.is_empty() {
        ui.centered_and_justified(|ui| {
            ui.label("Waiting for console output...");
        });
        return;
    }

    let mut area = egui::ScrollArea::vertical()
        .id_salt("console_scroll")
        .auto_shrink([false; 2]);
    if let Some(ScrollRequest::Offset(offset)) = pending_scroll {
        area = area.vertical_scroll_offset(offset);
    }
    let pin = pending_scroll == Some(ScrollRequest::Bottom);

    let output = area.show(ui, |ui| {
        ui.add(
            egui::Label::new(
                egui::RichText::new(text)
                    .monospace()
                    .size(font_size)
                    .color(colour),
            )
            .wrap()
            .selectable(true),
        );
        if pin {
            ui.scroll_to_cursor(Some(egui::Align::BOTTOM));
            ui.ctx().request_repaint();
        }
    });

    lock_view(&view).viewport.measured(
        output.state.offset.y,
        output.content_size.y,
        output.inner_rect.height(),
    );
}
