// ConsoleWatch - ui/panels/warnings.rs
//
// Warnings window listing config problems and transport failures.

use crate::app::state::AppState;
use crate::ui::theme;

/// Render the warnings window (if `state.show_warnings` is true).
pub fn render(ctx: &egui::Context, state: &mut AppState) {
    if !state.show_warnings {
        return;
    }

    let mut open = true;
    let mut clear = false;
    egui::Window::new(format!("Warnings ({})", state.warnings.len()))
        .open(&mut open)
        .default_size([theme::WARNINGS_WINDOW_WIDTH, theme::WARNINGS_WINDOW_HEIGHT])
        .show(ctx, |ui| {
            if state.warnings.is_empty() {
                ui.label("No warnings.");
                return;
            }
            if ui.button("Clear").clicked() {
                clear = true;
            }
            ui.separator();
            egui::ScrollArea::vertical()
                .auto_shrink([false; 2])
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    for w in &state.warnings {
                        ui.label(egui::RichText::new(w).monospace().small());
                    }
                });
        });

    if clear {
        state.warnings.clear();
    }
    if !open {
        state.show_warnings = false;
    }
}
