//! Parse configuration.

use serde::{Deserialize, Serialize};

/// Options controlling how strictly a source is parsed.
///
/// The defaults reproduce the standard behavior; every option is opt-in.
///
/// ```
/// use usercss::ParseOptions;
///
/// let options = ParseOptions::new().warn_on_invalid_regexp(true);
/// assert!(options.warn_on_invalid_regexp);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ParseOptions {
    /// Report `regexp(...)` conditions that fail to compile as warnings
    /// instead of dropping them silently.
    pub warn_on_invalid_regexp: bool,
}

impl ParseOptions {
    /// Creates the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets [`ParseOptions::warn_on_invalid_regexp`].
    pub fn warn_on_invalid_regexp(mut self, warn: bool) -> Self {
        self.warn_on_invalid_regexp = warn;
        self
    }
}
