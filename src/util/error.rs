// ConsoleWatch - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// No string-based error propagation: every variant keeps its cause so the
// diagnostic log shows the full chain.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all ConsoleWatch operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum ConsoleWatchError {
    /// Configuration loading or validation failed.
    Config(ConfigError),

    /// The console endpoint could not be reached or answered badly.
    Transport(TransportError),

    /// Export of the rendered console failed.
    Export(ExportError),

    /// I/O error with context.
    Io {
        operation: &'static str,
        source: io::Error,
    },
}

impl fmt::Display for ConsoleWatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Transport(e) => write!(f, "Transport error: {e}"),
            Self::Export(e) => write!(f, "Export error: {e}"),
            Self::Io { operation, source } => {
                write!(f, "I/O error during {operation}: {source}")
            }
        }
    }
}

impl std::error::Error for ConsoleWatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Transport(e) => Some(e),
            Self::Export(e) => Some(e),
            Self::Io { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

/// A failed poll request. Every variant is recovered by the retry policy;
/// none of them ends the poll loop.
#[derive(Debug)]
pub enum TransportError {
    /// The HTTP client could not be constructed.
    ClientBuild { source: reqwest::Error },

    /// Connection, DNS, or protocol failure before a status was received.
    Request { url: String, source: reqwest::Error },

    /// The request did not complete within the configured timeout.
    Timeout { url: String },

    /// The endpoint answered with a non-success status.
    Status { url: String, status: u16 },

    /// The body was not a valid console chunk.
    Decode {
        url: String,
        source: serde_json::Error,
    },
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClientBuild { source } => write!(f, "Cannot build HTTP client: {source}"),
            Self::Request { url, source } => write!(f, "Request to '{url}' failed: {source}"),
            Self::Timeout { url } => write!(f, "Request to '{url}' timed out"),
            Self::Status { url, status } => {
                write!(f, "'{url}' answered with HTTP status {status}")
            }
            Self::Decode { url, source } => {
                write!(f, "'{url}' returned an undecodable console chunk: {source}")
            }
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ClientBuild { source } => Some(source),
            Self::Request { source, .. } => Some(source),
            Self::Decode { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<TransportError> for ConsoleWatchError {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

/// Errors related to exporting the rendered console.
#[derive(Debug)]
pub enum ExportError {
    /// I/O error writing the export file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Export I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
        }
    }
}

impl From<ExportError> for ConsoleWatchError {
    fn from(e: ExportError) -> Self {
        Self::Export(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Config file exceeds the maximum allowed size.
    FileTooLarge { path: PathBuf, size: u64, max: u64 },

    /// No console URL was given on the command line or in config.toml.
    MissingUrl,

    /// The console URL is not an http(s) URL.
    InvalidUrl { url: String },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::FileTooLarge { path, size, max } => write!(
                f,
                "Config '{}' is {size} bytes, exceeds maximum of {max} bytes",
                path.display()
            ),
            Self::MissingUrl => write!(
                f,
                "No console URL given. Pass one on the command line or set \
                 [console] url in config.toml."
            ),
            Self::InvalidUrl { url } => write!(
                f,
                "Console URL '{url}' must start with http:// or https://"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for ConsoleWatchError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience type alias for ConsoleWatch results.
pub type Result<T> = std::result::Result<T, ConsoleWatchError>;
