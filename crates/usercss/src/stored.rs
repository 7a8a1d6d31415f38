//! Persisted form of a compiled style.
//!
//! A host application stores the compiled CSS together with everything
//! needed to decide where it applies and to re-compile it with new values.
//! Diagnostics are not persisted: a stored style is always one that was
//! accepted for installation.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::domain::{DomainMatcher, DomainRule};
use crate::engine::ParsedStyle;
use crate::error::Result;
use crate::header::Metadata;
use crate::variable::VariableDescriptor;

/// A compiled style as saved by a host application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredStyle {
    pub meta: Metadata,
    #[serde(default)]
    pub variables: IndexMap<String, VariableDescriptor>,
    #[serde(default)]
    pub domains: Vec<DomainRule>,
    pub compiled_css: String,
}

impl StoredStyle {
    /// Serializes the style as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Loads a style saved with [`StoredStyle::to_json`].
    ///
    /// Fails if the JSON is malformed or a `regexp` domain rule no longer
    /// compiles.
    pub fn from_json(json: &str) -> Result<Self> {
        let stored: StoredStyle = serde_json::from_str(json)?;
        for rule in &stored.domains {
            rule.compile()?;
        }
        log::debug!(
            "loaded stored style {:?} with {} domain rules",
            stored.meta.name,
            stored.domains.len()
        );
        Ok(stored)
    }

    /// Returns `true` if this style applies to `page_url`.
    pub fn matches(&self, page_url: &str) -> bool {
        crate::domain::matches(&self.domains, page_url)
    }

    /// Builds a reusable matcher for this style's domain rules.
    pub fn matcher(&self) -> DomainMatcher {
        DomainMatcher::new(&self.domains)
    }

    /// Effective variable values, suitable as current values for a re-parse.
    pub fn current_values(&self) -> crate::engine::CurrentValues {
        self.variables
            .iter()
            .map(|(name, var)| (name.clone(), var.value.clone()))
            .collect()
    }
}

impl From<&ParsedStyle> for StoredStyle {
    fn from(style: &ParsedStyle) -> Self {
        StoredStyle {
            meta: style.meta.clone(),
            variables: style.variables.clone(),
            domains: style.domains.clone(),
            compiled_css: style.compiled_css.clone(),
        }
    }
}

impl From<ParsedStyle> for StoredStyle {
    fn from(style: ParsedStyle) -> Self {
        StoredStyle {
            meta: style.meta,
            variables: style.variables,
            domains: style.domains,
            compiled_css: style.compiled_css,
        }
    }
}
