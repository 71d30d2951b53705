//! Error types for shardscope

use std::fmt;
use std::path::PathBuf;

/// Result type alias for shardscope operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for shardscope
#[derive(Debug)]
pub enum Error {
    /// IO errors
    Io(std::io::Error),
    /// CSV read/write errors
    Csv(csv::Error),
    /// HTTP transport errors
    Http(reqwest::Error),
    /// Backend returned a non-success response or a malformed envelope
    Backend(String),
    /// Serialization errors
    Serialization(String),
    /// Configuration errors (invalid time window, bad duration, bad flag)
    Config(String),
    /// A row or value that could not be parsed where tolerance is not allowed
    Malformed(String),
    /// Export finished with one or more failed catalog queries
    Export(Vec<String>),
    /// Target run directory is non-empty and overwrite was not requested
    OutputConflict(PathBuf),
    /// Chart rendering failed (backend unavailable, unsupported format, draw error)
    Render(String),
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Csv(e) => Some(e),
            Error::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "IO error: {}", e),
            Error::Csv(e) => write!(f, "CSV error: {}", e),
            Error::Http(e) => write!(f, "HTTP error: {}", e),
            Error::Backend(msg) => write!(f, "Backend error: {}", msg),
            Error::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::Malformed(msg) => write!(f, "Malformed input: {}", msg),
            Error::Export(failures) => {
                write!(
                    f,
                    "export failed for {} catalog entries: {}",
                    failures.len(),
                    failures.join("; ")
                )
            }
            Error::OutputConflict(path) => {
                write!(
                    f,
                    "output directory not empty: {} (use --overwrite or a new run id)",
                    path.display()
                )
            }
            Error::Render(msg) => write!(f, "Render error: {}", msg),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        Error::Csv(e)
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Http(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
