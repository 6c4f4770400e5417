//! Custom error types for the Chimera control panel
//!
//! This module defines the crate-wide error enum. Configuration errors are
//! fatal and end the process before the server starts; data errors are
//! recovered per request and turned into JSON error bodies by the API layer.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Main error type for the Chimera control panel
#[derive(Debug)]
pub enum PanelError {
    /// `index.html` is missing from the project root
    MissingIndex(PathBuf),

    /// The listening port is already taken by another process
    PortInUse { host: String, port: u16 },

    /// Binding the listening socket failed for another reason
    Bind { address: String, source: io::Error },

    /// Error occurred while running the server
    ServerRun(io::Error),

    /// A data file could not be read
    DataRead { path: PathBuf, source: io::Error },

    /// A data file is not valid JSON
    DataParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// A data file parsed, but its top-level value is not an object
    DataShape(PathBuf),

    /// Any other I/O failure during startup
    Io(io::Error),
}

impl fmt::Display for PanelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PanelError::MissingIndex(root) => {
                write!(
                    f,
                    "Cannot find index.html in {}; run the server from the project \
                     directory or pass --root",
                    root.display()
                )
            }
            PanelError::PortInUse { host, port } => {
                write!(
                    f,
                    "Port {port} is already in use on {host}; try a different port: --port {}",
                    port.saturating_add(1)
                )
            }
            PanelError::Bind { address, source } => {
                write!(f, "Failed to bind {address}: {source}")
            }
            PanelError::ServerRun(e) => {
                write!(f, "Server runtime error: {e}")
            }
            PanelError::DataRead { path, source } => {
                write!(f, "Failed to read {}: {source}", path.display())
            }
            PanelError::DataParse { path, source } => {
                write!(f, "Failed to parse {}: {source}", path.display())
            }
            PanelError::DataShape(path) => {
                write!(
                    f,
                    "Unexpected layout in {}: top-level value is not an object",
                    path.display()
                )
            }
            PanelError::Io(e) => {
                write!(f, "I/O error: {e}")
            }
        }
    }
}

impl std::error::Error for PanelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PanelError::Bind { source, .. } | PanelError::DataRead { source, .. } => Some(source),
            PanelError::DataParse { source, .. } => Some(source),
            PanelError::ServerRun(e) | PanelError::Io(e) => Some(e),
            PanelError::MissingIndex(_)
            | PanelError::PortInUse { .. }
            | PanelError::DataShape(_) => None,
        }
    }
}

impl From<io::Error> for PanelError {
    fn from(error: io::Error) -> Self {
        PanelError::Io(error)
    }
}

/// Result type alias using our custom error type
pub type Result<T> = std::result::Result<T, PanelError>;
