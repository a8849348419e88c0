//! Error types for testadapter

use std::io;
use thiserror::Error;

/// Result type alias for testadapter operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for testadapter
#[derive(Error, Debug)]
pub enum Error {
    /// The adapter command is not supported by the selected tool.
    #[error("Unsupported command: {0}")]
    UnsupportedCommand(String),

    /// The requested test framework is not supported.
    #[error("Unsupported tool: {0}")]
    UnsupportedTool(String),

    /// The collection engine exited with a non-zero status.
    #[error("Discovery failed with exit code {0}")]
    DiscoveryFailed(i32),

    /// A collected file does not lie under its root.
    #[error("{path} is not under root {root}")]
    PathOutsideRoot { path: String, root: String },

    /// A node id could not be split into file and test segments.
    #[error("Invalid node id: {0}")]
    InvalidNodeId(String),

    /// Configuration file error or invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Engine command execution failed.
    #[error("Command execution failed: {0}")]
    CommandExecution(String),

    /// Failed to parse engine output.
    #[error("Parse error: {0}")]
    Parse(String),

    /// I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
