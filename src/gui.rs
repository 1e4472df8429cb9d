// ConsoleWatch - gui.rs
//
// Top-level eframe::App implementation.
// Wires the panels together and manages the poll lifecycle.

use crate::app::poller::{lock_view, PollManager};
use crate::app::state::{AppState, ExportFormat};
use crate::app::transport::HttpTransport;
use crate::core::export;
use crate::ui;
use crate::util::constants::UI_REPAINT_INTERVAL_MS;
use crate::util::error::ConsoleWatchError;

/// The ConsoleWatch application.
pub struct ConsoleWatchApp {
    pub state: AppState,
    pub poll_manager: PollManager,
}

impl ConsoleWatchApp {
    /// Create a new application instance and start polling immediately.
    pub fn new(state: AppState, poll_manager: PollManager) -> Self {
        let mut app = Self {
            state,
            poll_manager,
        };
        app.state.request_start = true;
        app
    }

    fn start_polling(&mut self) {
        match HttpTransport::new(self.state.console_url.clone(), self.state.request_timeout) {
            Ok(transport) => {
                self.poll_manager.start(
                    transport,
                    std::sync::Arc::clone(&self.state.view),
                    self.state.timings,
                    self.state.repeat,
                );
            }
            Err(e) => {
                tracing::error!(error = %e, "Cannot start polling");
                self.state.status_message = format!("Cannot start polling: {e}");
                self.state.push_warning(e.to_string());
            }
        }
    }

    fn export(&mut self, format: ExportFormat) {
        let (name, filter, ext) = match format {
            ExportFormat::Html => ("console.html", "HTML", "html"),
            ExportFormat::Text => ("console.txt", "Text", "txt"),
        };
        let Some(dest) = rfd::FileDialog::new()
            .add_filter(filter, &[ext])
            .set_file_name(name)
            .save_file()
        else {
            return;
        };

        let result = self.write_export(format, &dest);

        match result {
            Ok(n) => {
                tracing::info!(path = %dest.display(), bytes = n, "Console exported");
                self.state.status_message =
                    format!("Exported {n} bytes to {}.", dest.display());
            }
            Err(e) => {
                tracing::warn!(error = %e, "Console export failed");
                self.state.status_message = format!("Export failed: {e}");
            }
        }
    }

    fn write_export(
        &self,
        format: ExportFormat,
        dest: &std::path::Path,
    ) -> crate::util::error::Result<usize> {
        let file = std::fs::File::create(dest).map_err(|e| ConsoleWatchError::Io {
            operation: "creating export file",
            source: e,
        })?;
        let writer = std::io::BufWriter::new(file);

        let guard = lock_view(&self.state.view);
        let written = match format {
            ExportFormat::Html => {
                export::export_html(&guard.state, &self.state.console_url, writer, dest)?
            }
            ExportFormat::Text => export::export_text(&guard.state, writer, dest)?,
        };
        Ok(written)
    }
}

impl eframe::App for ConsoleWatchApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Poll progress from the background poll loop.
        let messages = self.poll_manager.poll_progress();
        for msg in messages {
            let stopped = msg == crate::core::model::PollProgress::Stopped;
            self.state.handle_progress(msg);
            if stopped {
                // One-shot finished: release the manager so Start is offered again.
                self.poll_manager.stop();
            }
        }

        // ---- Handle flags set by panels ----
        if self.state.request_start {
            self.state.request_start = false;
            self.start_polling();
        }
        if self.state.request_stop {
            self.state.request_stop = false;
            self.poll_manager.stop();
            self.state.handle_progress(crate::core::model::PollProgress::Stopped);
        }
        if let Some(format) = self.state.request_export.take() {
            self.export(format);
        }

        // Menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Export HTML...").clicked() {
                        self.state.request_export = Some(ExportFormat::Html);
                        ui.close_menu();
                    }
                    if ui.button("Export Text...").clicked() {
                        self.state.request_export = Some(ExportFormat::Text);
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Exit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
                ui.menu_button("Console", |ui| {
                    let active = self.poll_manager.is_active();
                    ui.add_enabled_ui(!active, |ui| {
                        if ui.button("Start Polling").clicked() {
                            self.state.request_start = true;
                            ui.close_menu();
                        }
                    });
                    ui.add_enabled_ui(active, |ui| {
                        if ui.button("Stop Polling").clicked() {
                            self.state.request_stop = true;
                            ui.close_menu();
                        }
                    });
                    ui.separator();
                    if ui.button("Clear").clicked() {
                        self.state.clear_console();
                        ui.close_menu();
                    }
                });
                ui.menu_button("View", |ui| {
                    let label = format!("Warnings ({})", self.state.warnings.len());
                    if ui.button(label).clicked() {
                        self.state.show_warnings = true;
                        ui.close_menu();
                    }
                    if ui.checkbox(&mut self.state.dark_mode, "Dark mode").changed() {
                        ui::theme::apply(ctx, self.state.dark_mode);
                    }
                });
                ui.menu_button("Help", |ui| {
                    if ui.button("About").clicked() {
                        self.state.show_about = true;
                        ui.close_menu();
                    }
                });
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(egui::RichText::new(&self.state.console_url).weak());
                });
            });
        });

        // Status bar
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui::panels::status::render(ui, &self.state);
        });

        // Central panel (console)
        egui::CentralPanel::default().show(ctx, |ui| {
            ui::panels::console::render(ui, &mut self.state);
        });

        ui::panels::warnings::render(ctx, &mut self.state);
        ui::panels::about::render(ctx, &mut self.state);

        // Keep repainting while polling so new output appears promptly.
        if self.state.polling {
            ctx.request_repaint_after(std::time::Duration::from_millis(UI_REPAINT_INTERVAL_MS));
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.poll_manager.stop();
    }
}
