//! Diagnostics collected while compiling a UserCSS source.
//!
//! Malformed user input never aborts a parse. Each problem becomes a
//! [`Diagnostic`] with a [`Severity`]: warnings are advisory, errors mean the
//! compiled result should not be installed. [`ParsedStyle`](crate::ParsedStyle)
//! exposes both the typed list and the rendered message strings.

use serde::Serialize;
use thiserror::Error;

use crate::variable::VarKind;

/// How serious a [`Diagnostic`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Recoverable; the style can still be installed.
    Warning,
    /// The compiled result is not safe to install.
    Error,
}

/// A single problem found in a UserCSS source.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Diagnostic {
    // Header
    #[error("no metadata header found")]
    MissingHeader,

    #[error("unterminated metadata header: missing `==/UserStyle== */`")]
    UnterminatedHeader,

    #[error("metadata header has no @name")]
    MissingName,

    #[error("duplicate metadata key '@{key}', keeping the first value")]
    DuplicateMetaKey { key: String },

    // Placeholders
    #[error("malformed placeholder '{text}' left as-is")]
    MalformedPlaceholder { text: String },

    #[error("unknown type '{kind}' for variable '{name}', treating it as text")]
    UnknownVarType { name: String, kind: String },

    #[error("duplicate variable '{name}', keeping the first declaration")]
    DuplicateVariable { name: String },

    #[error("variable '{name}' is declared as both {first} and {second}")]
    ConflictingVariable {
        name: String,
        first: VarKind,
        second: VarKind,
    },

    #[error("placeholder references undeclared variable '{name}'")]
    UndeclaredVariable { name: String },

    #[error("invalid {bound} bound '{value}' for variable '{name}', ignoring it")]
    InvalidBound {
        name: String,
        bound: &'static str,
        value: String,
    },

    #[error("select variable '{name}' declares no options")]
    MissingOptions { name: String },

    #[error("invalid default '{value}' for {kind} variable '{name}': {reason}")]
    InvalidDefault {
        name: String,
        kind: VarKind,
        value: String,
        reason: String,
    },

    // Substitution
    #[error("invalid value '{value}' for {kind} variable '{name}': {reason}")]
    InvalidValue {
        name: String,
        kind: VarKind,
        value: String,
        reason: String,
    },

    #[error("unknown variable '{name}' in current values")]
    UnknownOverride { name: String },

    #[error("variable '{name}' was never substituted, placeholder left as-is")]
    Unsubstituted { name: String },

    // Domain rules
    #[error("skipping invalid regexp '{pattern}': {reason}")]
    InvalidRegexp { pattern: String, reason: String },
}

impl Diagnostic {
    /// Returns the severity of this diagnostic.
    pub fn severity(&self) -> Severity {
        match self {
            Diagnostic::UnterminatedHeader
            | Diagnostic::ConflictingVariable { .. }
            | Diagnostic::UndeclaredVariable { .. } => Severity::Error,
            _ => Severity::Warning,
        }
    }

    /// Returns `true` if this diagnostic makes the result uninstallable.
    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }
}

/// Ordered accumulator shared by the parsing passes.
#[derive(Debug, Default)]
pub(crate) struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity() {
            Severity::Error => log::debug!("usercss error: {}", diagnostic),
            Severity::Warning => log::trace!("usercss warning: {}", diagnostic),
        }
        self.items.push(diagnostic);
    }

    pub(crate) fn into_inner(self) -> Vec<Diagnostic> {
        self.items
    }
}

/// Splits diagnostics into rendered `(warnings, errors)` message lists,
/// keeping the order in which they were reported.
pub(crate) fn render_messages(diagnostics: &[Diagnostic]) -> (Vec<String>, Vec<String>) {
    let mut warnings = Vec::new();
    let mut errors = Vec::new();
    for diagnostic in diagnostics {
        match diagnostic.severity() {
            Severity::Warning => warnings.push(diagnostic.to_string()),
            Severity::Error => errors.push(diagnostic.to_string()),
        }
    }
    (warnings, errors)
}
