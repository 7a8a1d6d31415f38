//! Variable overrides from `--values` files and `--set` arguments.
//!
//! A values file is a flat mapping from variable name to a scalar:
//!
//! ```yaml
//! "--bg": "#222222"
//! "--size": 18px
//! "--wrap": true
//! ```
//!
//! `.json` files are read as JSON, anything else as YAML. Numbers and
//! booleans are turned into their textual form, since every variable value
//! is a string.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::Deserialize;
use usercss::CurrentValues;

use crate::error::InputError;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Int(n) => write!(f, "{}", n),
            Scalar::Float(n) => write!(f, "{}", n),
            Scalar::Str(s) => f.write_str(s),
        }
    }
}

/// Loads a values file.
pub fn load_values_file(path: &Path) -> Result<CurrentValues, InputError> {
    let text = std::fs::read_to_string(path).map_err(|source| InputError::FileFailed {
        path: path.to_path_buf(),
        source,
    })?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let raw: HashMap<String, Scalar> = if is_json {
        serde_json::from_str(&text).map_err(|e| InputError::values(path, e.to_string()))?
    } else if text.trim().is_empty() {
        HashMap::new()
    } else {
        serde_yaml::from_str(&text).map_err(|e| InputError::values(path, e.to_string()))?
    };

    log::debug!("loaded {} values from {}", raw.len(), path.display());
    Ok(raw
        .into_iter()
        .map(|(name, value)| (name, value.to_string()))
        .collect())
}

/// Splits a `NAME=VALUE` argument. The value may itself contain `=`.
pub fn parse_assignment(arg: &str) -> Result<(String, String), InputError> {
    let (name, value) = arg
        .split_once('=')
        .ok_or_else(|| InputError::InvalidAssignment(arg.to_string()))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(InputError::InvalidAssignment(arg.to_string()));
    }
    Ok((name.to_string(), value.to_string()))
}

/// Combines a values file with `--set` pairs; `--set` wins.
pub fn collect_values(
    file: Option<&Path>,
    assignments: &[String],
) -> Result<CurrentValues, InputError> {
    let mut values = match file {
        Some(path) => load_values_file(path)?,
        None => CurrentValues::new(),
    };
    for arg in assignments {
        let (name, value) = parse_assignment(arg)?;
        values.insert(name, value);
    }
    Ok(values)
}
