// ConsoleWatch - ui/panels/status.rs
//
// Status bar: link badge, status message, cursor, gaps, last update time.

use crate::app::state::AppState;
use crate::ui::theme;

/// Render the status bar contents.
pub fn render(ui: &mut egui::Ui, state: &AppState) {
    ui.horizontal(|ui| {
        let (colour, label) = theme::link_badge(&state.link);
        ui.label(
            egui::RichText::new(label)
                .strong()
                .color(colour)
                .background_color(colour.gamma_multiply(0.15)),
        );
        ui.separator();
        ui.label(&state.status_message);

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if let Some(ts) = state.last_update {
                ui.label(format!("Last update {}", ts.format("%H:%M:%S")));
                ui.separator();
            }
            if state.gap_count > 0 {
                ui.label(
                    egui::RichText::new(format!("{} gap(s)", state.gap_count))
                        .color(egui::Color32::from_rgb(217, 119, 6)),
                );
                ui.separator();
            }
            ui.label(format!("Cursor {}", state.cursor()));
        });
    });
}
