// ConsoleWatch - platform/config.rs
//
// Platform config directory resolution and config.toml loading with startup
// validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::core::model::PollTimings;
use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Resolved platform paths for ConsoleWatch configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/consolewatch/ or %APPDATA%\ConsoleWatch\)
    pub config_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            tracing::debug!(config = %config_dir.display(), "Platform paths resolved");
            Self { config_dir }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self {
                config_dir: PathBuf::from("."),
            }
        }
    }

    /// Default location of config.toml.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml shape
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[console]` section.
    pub console: ConsoleSection,
    /// `[polling]` section.
    pub polling: PollingSection,
    /// `[display]` section.
    pub display: DisplaySection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[console]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ConsoleSection {
    /// Console endpoint, e.g. http://esp-link.local/console/text
    pub url: Option<String>,
}

/// `[polling]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct PollingSection {
    pub fast_delay_ms: Option<u64>,
    pub slow_delay_ms: Option<u64>,
    pub retry_delay_ms: Option<u64>,
    pub request_timeout_ms: Option<u64>,
}

/// `[display]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct DisplaySection {
    /// Rendered buffer cap in bytes.
    pub max_rendered_bytes: Option<usize>,
    /// Console font size in points.
    pub font_size: Option<f32>,
    /// Theme: "dark" or "light".
    pub theme: Option<String>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

// =============================================================================
// Validated config
// =============================================================================

/// Validated application configuration.
///
/// Invalid values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub console_url: Option<String>,

    pub timings: PollTimings,
    pub request_timeout: Duration,

    pub max_rendered_bytes: usize,
    pub font_size: f32,
    pub dark_mode: bool,

    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            console_url: None,
            timings: PollTimings::default(),
            request_timeout: Duration::from_millis(constants::DEFAULT_REQUEST_TIMEOUT_MS),
            max_rendered_bytes: constants::DEFAULT_MAX_RENDERED_BYTES,
            font_size: constants::DEFAULT_FONT_SIZE,
            dark_mode: true,
            log_level: None,
        }
    }
}

/// Load and validate the config file at `config_path`.
///
/// Returns `AppConfig` with validated values and a list of non-fatal warnings.
/// A missing file yields defaults with no warnings (first run). An unreadable
/// or unparseable file yields defaults plus a warning.
pub fn load_config(config_path: &Path) -> (AppConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), warnings);
    }

    let raw = match read_raw_config(config_path) {
        Ok(raw) => raw,
        Err(e) => {
            let msg = format!("{e}. Using defaults.");
            tracing::warn!("{}", msg);
            warnings.push(msg);
            return (AppConfig::default(), warnings);
        }
    };

    tracing::info!(path = %config_path.display(), "Loaded config.toml");

    let config = validate(raw, &mut warnings);

    if !warnings.is_empty() {
        tracing::warn!(
            count = warnings.len(),
            "Config validation produced warnings"
        );
    }

    (config, warnings)
}

fn read_raw_config(config_path: &Path) -> Result<RawConfig, ConfigError> {
    let size = std::fs::metadata(config_path)
        .map_err(|e| ConfigError::Io {
            path: config_path.to_path_buf(),
            source: e,
        })?
        .len();
    if size > constants::MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::FileTooLarge {
            path: config_path.to_path_buf(),
            size,
            max: constants::MAX_CONFIG_FILE_SIZE,
        });
    }

    let content = std::fs::read_to_string(config_path).map_err(|e| ConfigError::Io {
        path: config_path.to_path_buf(),
        source: e,
    })?;

    toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
        path: config_path.to_path_buf(),
        source: e,
    })
}

/// Check a millisecond value against the shared poll bounds.
fn validated_delay(
    section: &str,
    key: &str,
    value: Option<u64>,
    default_ms: u64,
    (min, max): (u64, u64),
    warnings: &mut Vec<String>,
) -> Duration {
    match value {
        Some(ms) if (min..=max).contains(&ms) => Duration::from_millis(ms),
        Some(ms) => {
            warnings.push(format!(
                "[{section}] {key} = {ms} is out of range ({min}-{max}). Using default ({default_ms})."
            ));
            Duration::from_millis(default_ms)
        }
        None => Duration::from_millis(default_ms),
    }
}

fn validate(raw: RawConfig, warnings: &mut Vec<String>) -> AppConfig {
    let mut config = AppConfig::default();
    let delay_bounds = (constants::MIN_POLL_DELAY_MS, constants::MAX_POLL_DELAY_MS);

    // -- Console: url --
    if let Some(url) = raw.console.url {
        match validate_url(&url) {
            Ok(url) => config.console_url = Some(url),
            Err(e) => warnings.push(format!("[console] {e}. Ignoring.")),
        }
    }

    // -- Polling --
    config.timings = PollTimings {
        fast: validated_delay(
            "polling",
            "fast_delay_ms",
            raw.polling.fast_delay_ms,
            constants::DEFAULT_FAST_POLL_MS,
            delay_bounds,
            warnings,
        ),
        slow: validated_delay(
            "polling",
            "slow_delay_ms",
            raw.polling.slow_delay_ms,
            constants::DEFAULT_SLOW_POLL_MS,
            delay_bounds,
            warnings,
        ),
        retry: validated_delay(
            "polling",
            "retry_delay_ms",
            raw.polling.retry_delay_ms,
            constants::DEFAULT_RETRY_DELAY_MS,
            delay_bounds,
            warnings,
        ),
    };
    config.request_timeout = validated_delay(
        "polling",
        "request_timeout_ms",
        raw.polling.request_timeout_ms,
        constants::DEFAULT_REQUEST_TIMEOUT_MS,
        (
            constants::MIN_REQUEST_TIMEOUT_MS,
            constants::MAX_REQUEST_TIMEOUT_MS,
        ),
        warnings,
    );

    // -- Display: max_rendered_bytes --
    if let Some(bytes) = raw.display.max_rendered_bytes {
        if (constants::MIN_MAX_RENDERED_BYTES..=constants::ABSOLUTE_MAX_RENDERED_BYTES)
            .contains(&bytes)
        {
            config.max_rendered_bytes = bytes;
        } else {
            warnings.push(format!(
                "[display] max_rendered_bytes = {bytes} is out of range ({}-{}). Using default ({}).",
                constants::MIN_MAX_RENDERED_BYTES,
                constants::ABSOLUTE_MAX_RENDERED_BYTES,
                constants::DEFAULT_MAX_RENDERED_BYTES,
            ));
        }
    }

    // -- Display: font_size --
    if let Some(size) = raw.display.font_size {
        if (constants::MIN_FONT_SIZE..=constants::MAX_FONT_SIZE).contains(&size) {
            config.font_size = size;
        } else {
            warnings.push(format!(
                "[display] font_size = {size} is out of range ({}-{}). Using default ({}).",
                constants::MIN_FONT_SIZE,
                constants::MAX_FONT_SIZE,
                constants::DEFAULT_FONT_SIZE,
            ));
        }
    }

    // -- Display: theme --
    if let Some(ref theme) = raw.display.theme {
        match theme.to_lowercase().as_str() {
            "dark" => config.dark_mode = true,
            "light" => config.dark_mode = false,
            other => warnings.push(format!(
                "[display] theme = \"{other}\" is not recognised. Expected \"dark\" or \"light\". Using default (dark).",
            )),
        }
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.to_lowercase());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default (info).",
            ));
        }
    }

    config
}

/// Accept only http(s) console URLs.
pub fn validate_url(url: &str) -> Result<String, ConfigError> {
    let trimmed = url.trim();
    let lower = trimmed.to_ascii_lowercase();
    let has_host = ["http://", "https://"]
        .iter()
        .any(|scheme| lower.starts_with(scheme) && lower.len() > scheme.len());
    if has_host {
        Ok(trimmed.to_string())
    } else {
        Err(ConfigError::InvalidUrl {
            url: url.to_string(),
        })
    }
}

/// Pick the console URL: CLI argument first, then config.toml.
pub fn resolve_console_url(
    cli_url: Option<&str>,
    config: &AppConfig,
) -> Result<String, ConfigError> {
    match cli_url {
        Some(url) => validate_url(url),
        None => config.console_url.clone().ok_or(ConfigError::MissingUrl),
    }
}
