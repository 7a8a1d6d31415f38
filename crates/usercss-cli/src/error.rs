//! Error types for the command-line front end.

use std::io;
use std::path::PathBuf;

/// Errors that can occur while collecting a command's inputs.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    /// Failed to read from stdin.
    #[error("Failed to read stdin: {0}")]
    StdinFailed(#[source] io::Error),

    /// `-` was given but stdin is an interactive terminal.
    #[error("Refusing to read a style from an interactive terminal; pipe one in or pass a file.")]
    StdinIsTerminal,

    /// Failed to read a file.
    #[error("Failed to read {}: {source}", path.display())]
    FileFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A values file could not be parsed.
    #[error("Invalid values file {}: {reason}", path.display())]
    InvalidValues { path: PathBuf, reason: String },

    /// A `--set` argument is not of the form `NAME=VALUE`.
    #[error("Invalid --set '{0}': expected NAME=VALUE")]
    InvalidAssignment(String),
}

impl InputError {
    /// Create a values file error.
    pub fn values(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidValues {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
