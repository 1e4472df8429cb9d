// ConsoleWatch - ui/theme.rs
//
// Colour scheme, link status colours, and layout constants.
// No dependencies on business logic.

use crate::app::state::LinkStatus;
use egui::Color32;

/// Badge colour and label for a link status.
pub fn link_badge(status: &LinkStatus) -> (Color32, &'static str) {
    match status {
        LinkStatus::Idle => (Color32::from_rgb(107, 114, 128), " STOPPED "), // Gray 500
        LinkStatus::Connecting => (Color32::from_rgb(59, 130, 246), " CONNECTING "), // Blue 500
        LinkStatus::Live => (Color32::from_rgb(34, 197, 94), " \u{25cf} LIVE "), // Green 500
        LinkStatus::Retrying { .. } => (Color32::from_rgb(217, 119, 6), " RETRYING "), // Amber 600
    }
}

/// Console text colour for the active theme.
pub fn console_text_colour(dark_mode: bool) -> Color32 {
    if dark_mode {
        Color32::from_rgb(229, 231, 235) // Gray 200
    } else {
        Color32::from_rgb(17, 24, 39) // Gray 900
    }
}

/// Apply dark or light visuals to the context.
pub fn apply(ctx: &egui::Context, dark_mode: bool) {
    if dark_mode {
        ctx.set_visuals(egui::Visuals::dark());
    } else {
        ctx.set_visuals(egui::Visuals::light());
    }
}

/// Layout constants.
pub const WARNINGS_WINDOW_WIDTH: f32 = 520.0;
pub const WARNINGS_WINDOW_HEIGHT: f32 = 320.0;
