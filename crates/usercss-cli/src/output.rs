//! Output mode control and destinations.
//!
//! [`OutputMode`] selects between the human-readable text report and
//! structured serialization of the same data. [`OutputDestination`] decides
//! where the result is written.

use std::io::Write;
use std::path::PathBuf;

use clap::ValueEnum;
use serde::Serialize;
use thiserror::Error;

/// Controls how results are rendered.
///
/// This is the user-facing enum for the `--output` CLI flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputMode {
    /// Plain text report
    #[default]
    Text,
    /// Serialize data as JSON
    Json,
    /// Serialize data as YAML
    Yaml,
}

impl OutputMode {
    /// Returns true if this is a structured output mode (JSON, YAML).
    pub fn is_structured(&self) -> bool {
        matches!(self, OutputMode::Json | OutputMode::Yaml)
    }
}

/// Errors that can occur during serialization.
#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Text rendering failed")]
    Text(#[from] std::fmt::Error),

    #[error("Not a structured output mode")]
    NotStructured,
}

/// Serializes data to the specified structured format.
///
/// Returns an error if the output mode is not a structured mode.
pub fn serialize_structured<T: Serialize>(
    data: &T,
    mode: OutputMode,
) -> Result<String, SerializeError> {
    match mode {
        OutputMode::Json => Ok(serde_json::to_string_pretty(data)?),
        OutputMode::Yaml => Ok(serde_yaml::to_string(data)?),
        OutputMode::Text => Err(SerializeError::NotStructured),
    }
}

/// Destination for rendered output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputDestination {
    /// Write to standard output
    Stdout,
    /// Write to a specific file
    File(PathBuf),
}

impl OutputDestination {
    /// Chooses a file destination when a path is given, else stdout.
    pub fn from_option(path: Option<PathBuf>) -> Self {
        path.map_or(OutputDestination::Stdout, OutputDestination::File)
    }

    /// Writes text content to this destination.
    ///
    /// Stdout gets a trailing newline unless the content already ends with
    /// one; files receive the content exactly.
    pub fn write_text(&self, content: &str) -> std::io::Result<()> {
        match self {
            OutputDestination::Stdout => {
                let stdout = std::io::stdout();
                let mut handle = stdout.lock();
                if content.ends_with('\n') {
                    handle.write_all(content.as_bytes())
                } else {
                    writeln!(handle, "{}", content)
                }
            }
            OutputDestination::File(path) => {
                validate_path(path)?;
                std::fs::write(path, content)
            }
        }
    }
}

/// Validates that a file path's parent directory exists.
fn validate_path(path: &std::path::Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Parent directory does not exist: {}", parent.display()),
            ));
        }
    }
    Ok(())
}
