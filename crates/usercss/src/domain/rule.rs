//! Domain rule types.

use std::fmt;

use fancy_regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Result;

/// The four site-targeting condition kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleKind {
    /// Exact match against the full page URL.
    Url,
    /// The page URL starts with the pattern.
    UrlPrefix,
    /// The page host is the pattern or one of its subdomains.
    Domain,
    /// A regular expression found anywhere in the page URL.
    Regexp,
}

impl RuleKind {
    /// Kinds in the order conditions are recognized.
    pub const ALL: [RuleKind; 4] = [
        RuleKind::Url,
        RuleKind::UrlPrefix,
        RuleKind::Domain,
        RuleKind::Regexp,
    ];

    /// Maps a CSS function name (`url-prefix`, ...) to its kind.
    pub fn from_function(name: &str) -> Option<RuleKind> {
        RuleKind::ALL
            .into_iter()
            .find(|kind| name.eq_ignore_ascii_case(kind.as_str()))
    }

    /// Returns the CSS function name for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            RuleKind::Url => "url",
            RuleKind::UrlPrefix => "url-prefix",
            RuleKind::Domain => "domain",
            RuleKind::Regexp => "regexp",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single site-targeting condition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DomainRule {
    pub kind: RuleKind,
    /// Normalized pattern.
    pub pattern: String,
    /// Always `true`: the directive grammar has no negation.
    #[serde(default = "include_default")]
    pub include: bool,
}

fn include_default() -> bool {
    true
}

impl DomainRule {
    /// Creates an including rule from an already normalized pattern.
    pub fn new(kind: RuleKind, pattern: impl Into<String>) -> Self {
        DomainRule {
            kind,
            pattern: pattern.into(),
            include: true,
        }
    }

    /// `url(...)` rule.
    pub fn url(pattern: impl Into<String>) -> Self {
        Self::new(RuleKind::Url, pattern)
    }

    /// `url-prefix(...)` rule.
    pub fn url_prefix(pattern: impl Into<String>) -> Self {
        Self::new(RuleKind::UrlPrefix, pattern)
    }

    /// `domain(...)` rule. The argument is normalized to a bare hostname.
    pub fn domain(pattern: &str) -> Self {
        Self::new(RuleKind::Domain, normalize_domain(pattern))
    }

    /// `regexp(...)` rule. The pattern is not validated here.
    pub fn regexp(pattern: impl Into<String>) -> Self {
        Self::new(RuleKind::Regexp, pattern)
    }

    /// Compiles the pattern of a `regexp` rule. Returns `None` for other kinds.
    pub fn compile(&self) -> Result<Option<Regex>> {
        match self.kind {
            RuleKind::Regexp => Ok(Some(Regex::new(&self.pattern)?)),
            _ => Ok(None),
        }
    }
}

impl fmt::Display for DomainRule {
    /// Formats the rule as it appears in a directive prelude.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?})", self.kind, self.pattern)
    }
}

/// Normalizes a `domain(...)` argument.
///
/// Full URLs resolve to their hostname. Anything else is trimmed and loses
/// one trailing slash.
pub fn normalize_domain(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.contains("://") {
        if let Some(host) = Url::parse(trimmed)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
        {
            return host;
        }
    }
    trimmed
        .strip_suffix('/')
        .unwrap_or(trimmed)
        .trim()
        .to_string()
}
