// ConsoleWatch - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. Config loading and logging initialisation (debug mode support)
// 3. Either headless polling to stdout or the eframe GUI launch

mod gui;

// Re-export modules from the library crate so that `gui.rs` can still use
// `crate::app::...`, `crate::core::...` etc.
pub use consolewatch::app;
pub use consolewatch::core;
pub use consolewatch::platform;
pub use consolewatch::ui;
pub use consolewatch::util;

use clap::Parser;
use std::io::Write;
use std::path::PathBuf;

/// ConsoleWatch - live viewer for device console endpoints.
///
/// Polls an HTTP console endpoint (e.g. esp-link's /console/text) with a
/// start offset, appending new output as it arrives and marking lost output.
#[derive(Parser, Debug)]
#[command(name = "ConsoleWatch", version, about)]
struct Cli {
    /// Console endpoint URL (falls back to [console] url in config.toml).
    url: Option<String>,

    /// Stop after the first successful fetch instead of polling forever.
    #[arg(long = "once")]
    once: bool,

    /// Print console output to stdout instead of opening a window.
    #[arg(long = "headless")]
    headless: bool,

    /// Path to config.toml (defaults to the platform config directory).
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| platform::config::PlatformPaths::resolve().config_file());

    // Config is loaded before logging so its level can take part; its
    // warnings are replayed once tracing is up.
    let (config, config_warnings) = platform::config::load_config(&config_path);

    util::logging::init(cli.debug, config.log_level.as_deref());

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        config = %config_path.display(),
        "ConsoleWatch starting"
    );
    for w in &config_warnings {
        tracing::warn!(warning = %w, "Config warning");
    }

    let (state, poll_manager) = match prepare(&cli, &config, config_warnings) {
        Ok(prepared) => prepared,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            eprintln!("Error: {e}");
            let code = match e {
                util::error::ConsoleWatchError::Config(_) => 2,
                _ => 1,
            };
            std::process::exit(code);
        }
    };

    if cli.headless {
        if let Err(e) = run_headless(state, poll_manager) {
            tracing::error!(error = %e, "Headless run failed");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
        return;
    }

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(format!(
                "{} v{} - {}",
                util::constants::APP_NAME,
                util::constants::APP_VERSION,
                state.console_url
            ))
            .with_inner_size([1000.0, 700.0])
            .with_min_inner_size([480.0, 320.0]),
        ..Default::default()
    };

    let dark_mode = state.dark_mode;
    let result = eframe::run_native(
        util::constants::APP_NAME,
        native_options,
        Box::new(move |cc| {
            ui::theme::apply(&cc.egui_ctx, dark_mode);
            Ok(Box::new(gui::ConsoleWatchApp::new(state, poll_manager)))
        }),
    );

    if let Err(e) = result {
        tracing::error!(error = %e, "Failed to launch GUI");
        eprintln!("Error: Failed to launch ConsoleWatch GUI: {e}");
        std::process::exit(1);
    }
}

/// Resolve the console URL and build the state and poll manager both front
/// ends share.
fn prepare(
    cli: &Cli,
    config: &platform::config::AppConfig,
    config_warnings: Vec<String>,
) -> util::error::Result<(app::state::AppState, app::poller::PollManager)> {
    let url = platform::config::resolve_console_url(cli.url.as_deref(), config)?;
    let poll_manager = app::poller::PollManager::new()?;

    let mut state = app::state::AppState::new(url, config, !cli.once, cli.debug);
    for w in config_warnings {
        state.push_warning(w);
    }
    Ok((state, poll_manager))
}

/// Poll without a window, writing raw console text to stdout until stopped
/// (Ctrl-C, or the first success with --once).
fn run_headless(
    state: app::state::AppState,
    mut poll_manager: app::poller::PollManager,
) -> util::error::Result<()> {
    let transport = app::transport::HttpTransport::new(state.console_url.clone(), state.request_timeout)?;
    poll_manager.start(transport, state.view, state.timings, state.repeat);
    poll_manager.stop_on_ctrl_c();

    let stdout = std::io::stdout();
    let io_err = |e| util::error::ConsoleWatchError::Io {
        operation: "writing console output",
        source: e,
    };

    while let Some(msg) = poll_manager.recv_progress() {
        match msg {
            core::model::PollProgress::Applied { text, gap, .. } => {
                let mut out = stdout.lock();
                if gap {
                    out.write_all(util::constants::GAP_MARKER.as_bytes())
                        .map_err(io_err)?;
                }
                out.write_all(text.as_bytes()).map_err(io_err)?;
                out.flush().map_err(io_err)?;
            }
            core::model::PollProgress::TransportFailed { message, retry_in } => {
                tracing::debug!(
                    error = %message,
                    retry_ms = retry_in.as_millis() as u64,
                    "Headless fetch failed"
                );
            }
            core::model::PollProgress::Stopped => break,
            core::model::PollProgress::Started { .. } | core::model::PollProgress::NoData => {}
        }
    }

    poll_manager.stop();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use util::error::{ConfigError, ConsoleWatchError};

    #[test]
    fn test_prepare_without_url_is_config_error() {
        let cli = Cli::parse_from(["consolewatch", "--headless"]);
        let config = platform::config::AppConfig::default();
        match prepare(&cli, &config, Vec::new()) {
            Err(ConsoleWatchError::Config(ConfigError::MissingUrl)) => {}
            Err(e) => panic!("unexpected error: {e}"),
            Ok(_) => panic!("missing URL should fail"),
        }
    }

    #[test]
    fn test_prepare_builds_state_from_cli() {
        let cli = Cli::parse_from(["consolewatch", "--once", "http://esp.local/console/text"]);
        let config = platform::config::AppConfig::default();
        let (state, manager) =
            prepare(&cli, &config, vec!["bad font".to_string()]).unwrap();
        assert_eq!(state.console_url, "http://esp.local/console/text");
        assert!(!state.repeat);
        assert_eq!(state.warnings, vec!["bad font".to_string()]);
        assert!(!manager.is_active());
    }
}
