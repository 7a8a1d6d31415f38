//! Metadata header parsing.
//!
//! A UserCSS file starts with a comment block delimited by `==UserStyle==`
//! markers. Each line of the form `@key value` inside the block contributes
//! one metadata field:
//!
//! ```css
//! /* ==UserStyle==
//! @name        Dark Docs
//! @namespace   example.org
//! @version     1.2.0
//! @description Dark theme for the docs site
//! @author      Jane Doe
//! @license     MIT
//! ==/UserStyle== */
//! ```
//!
//! Known keys fill the typed fields of [`Metadata`]. Any other key is kept in
//! [`Metadata::extra`] so dialect-specific fields (`@preprocessor`, `@var`, ...)
//! survive the parse.

use std::ops::Range;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::diagnostic::{Diagnostic, Diagnostics};

/// Marker that opens the header, after the `/*` comment opener.
pub const START_MARKER: &str = "==UserStyle==";
/// Marker that closes the header, before the `*/` comment closer.
pub const END_MARKER: &str = "==/UserStyle==";

/// Metadata declared in the header block.
///
/// Required fields default to the empty string when the header omits them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Metadata {
    pub name: String,
    pub namespace: String,
    pub version: String,
    pub description: String,
    pub author: String,
    /// Where updates are fetched from (`@updateURL`).
    pub source_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(rename = "homepageURL", skip_serializing_if = "Option::is_none")]
    pub homepage_url: Option<String>,
    #[serde(rename = "supportURL", skip_serializing_if = "Option::is_none")]
    pub support_url: Option<String>,
    /// Unrecognized keys, in header order. Repeated keys keep every value.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub extra: IndexMap<String, Vec<String>>,
}

impl Metadata {
    /// Returns the first value of an unrecognized header key.
    pub fn extra_value(&self, key: &str) -> Option<&str> {
        self.extra
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Stores a field. Returns `false` if a known key was already set.
    fn set(&mut self, key: &str, value: &str) -> bool {
        let value = value.to_string();
        let slot = match key.to_ascii_lowercase().as_str() {
            "name" => &mut self.name,
            "namespace" => &mut self.namespace,
            "version" => &mut self.version,
            "description" => &mut self.description,
            "author" => &mut self.author,
            "updateurl" | "sourceurl" => &mut self.source_url,
            "license" => return set_once(&mut self.license, value),
            "homepageurl" => return set_once(&mut self.homepage_url, value),
            "supporturl" => return set_once(&mut self.support_url, value),
            _ => {
                self.extra.entry(key.to_string()).or_default().push(value);
                return true;
            }
        };
        if slot.is_empty() {
            *slot = value;
            true
        } else {
            false
        }
    }
}

fn set_once(slot: &mut Option<String>, value: String) -> bool {
    if slot.is_some() {
        return false;
    }
    *slot = Some(value);
    true
}

/// Result of locating and parsing the header block.
#[derive(Debug, Clone, Default)]
pub(crate) struct Header<'a> {
    /// Parsed fields (all empty when no header was found).
    pub meta: Metadata,
    /// The header comment verbatim, from `/*` through `*/`.
    pub block: &'a str,
    /// Byte range of the header within the source, if one was found.
    pub span: Option<Range<usize>>,
}

/// Locates the first header block in `source` and parses its fields.
///
/// A missing header is a warning. A header that is opened but never closed
/// is an error; its lines are still read so partial metadata can be shown.
pub(crate) fn parse_header<'a>(source: &'a str, diagnostics: &mut Diagnostics) -> Header<'a> {
    let Some(start) = find_start(source) else {
        diagnostics.push(Diagnostic::MissingHeader);
        return Header::default();
    };

    let end = find_end(source, start);
    if end.is_none() {
        diagnostics.push(Diagnostic::UnterminatedHeader);
    }
    let end = end.unwrap_or(source.len());
    let block = &source[start..end];

    let mut meta = Metadata::default();
    for (key, value) in header_fields(block) {
        if !meta.set(key, value) {
            diagnostics.push(Diagnostic::DuplicateMetaKey {
                key: key.to_string(),
            });
        }
    }
    if meta.name.is_empty() {
        diagnostics.push(Diagnostic::MissingName);
    }

    log::debug!(
        "metadata header at {}..{}: name={:?} version={:?}",
        start,
        end,
        meta.name,
        meta.version
    );

    Header {
        meta,
        block,
        span: Some(start..end),
    }
}

/// Finds the `/*` that opens the header: a comment whose first non-blank
/// text is the start marker.
fn find_start(source: &str) -> Option<usize> {
    let mut from = 0;
    while let Some(offset) = source[from..].find("/*") {
        let open = from + offset;
        let after = source[open + 2..].trim_start();
        if after.starts_with(START_MARKER) {
            return Some(open);
        }
        from = open + 2;
    }
    None
}

/// Finds the byte offset just past the `*/` that follows the end marker.
fn find_end(source: &str, start: usize) -> Option<usize> {
    let marker = start + source[start..].find(END_MARKER)?;
    let after_marker = marker + END_MARKER.len();
    let close = source[after_marker..].find("*/")?;
    Some(after_marker + close + 2)
}

/// Yields `(key, value)` for every `@key value` line of the block.
///
/// Lines with a key but no value are skipped.
fn header_fields(block: &str) -> impl Iterator<Item = (&str, &str)> {
    block.lines().filter_map(|line| {
        let rest = line.trim().strip_prefix('@')?;
        let key_len = rest
            .find(|c: char| c.is_whitespace())
            .unwrap_or(rest.len());
        let (key, value) = rest.split_at(key_len);
        let valid_key = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        let value = value.trim();
        if valid_key && !value.is_empty() {
            Some((key, value))
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::render_messages;

    fn parse(source: &str) -> (Header<'_>, Vec<String>, Vec<String>) {
        let mut diagnostics = Diagnostics::new();
        let header = parse_header(source, &mut diagnostics);
        let (warnings, errors) = render_messages(&diagnostics.into_inner());
        (header, warnings, errors)
    }

    const FULL: &str = "/* ==UserStyle==
@name        Dark Docs
@namespace   example.org
@version     1.2.0
@description Dark theme for the docs site
@author      Jane Doe
@license     MIT
@homepageURL https://example.org/dark-docs
@supportURL  https://example.org/issues
@updateURL   https://example.org/dark-docs.user.css
@preprocessor default
==/UserStyle== */
body { color: red; }
";

    #[test]
    fn parses_known_fields() {
        let (header, warnings, errors) = parse(FULL);
        let meta = &header.meta;
        assert_eq!(meta.name, "Dark Docs");
        assert_eq!(meta.namespace, "example.org");
        assert_eq!(meta.version, "1.2.0");
        assert_eq!(meta.description, "Dark theme for the docs site");
        assert_eq!(meta.author, "Jane Doe");
        assert_eq!(meta.license.as_deref(), Some("MIT"));
        assert_eq!(
            meta.homepage_url.as_deref(),
            Some("https://example.org/dark-docs")
        );
        assert_eq!(
            meta.support_url.as_deref(),
            Some("https://example.org/issues")
        );
        assert_eq!(meta.source_url, "https://example.org/dark-docs.user.css");
        assert!(warnings.is_empty());
        assert!(errors.is_empty());
    }

    #[test]
    fn keeps_unknown_keys() {
        let (header, _, _) = parse(FULL);
        assert_eq!(header.meta.extra_value("preprocessor"), Some("default"));
    }

    #[test]
    fn repeated_unknown_keys_keep_every_value() {
        let source = "/* ==UserStyle==
@name x
@var color a \"A\" #fff
@var color b \"B\" #000
==/UserStyle== */";
        let (header, warnings, _) = parse(source);
        assert_eq!(header.meta.extra["var"].len(), 2);
        assert!(warnings.is_empty());
    }

    #[test]
    fn block_is_verbatim_and_span_covers_comment() {
        let (header, _, _) = parse(FULL);
        assert!(header.block.starts_with("/* ==UserStyle=="));
        assert!(header.block.ends_with("==/UserStyle== */"));
        let span = header.span.unwrap();
        assert_eq!(&FULL[span], header.block);
    }

    #[test]
    fn missing_header_is_a_warning() {
        let (header, warnings, errors) = parse("body { color: red; }");
        assert_eq!(header.meta, Metadata::default());
        assert_eq!(header.block, "");
        assert!(header.span.is_none());
        assert_eq!(warnings, vec!["no metadata header found".to_string()]);
        assert!(errors.is_empty());
    }

    #[test]
    fn unterminated_header_is_an_error() {
        let (header, _, errors) = parse("/* ==UserStyle==\n@name Broken\nbody {}");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("unterminated"));
        assert_eq!(header.meta.name, "Broken");
    }

    #[test]
    fn first_header_wins() {
        let source = "/* ==UserStyle==\n@name One\n==/UserStyle== */\n\
                      /* ==UserStyle==\n@name Two\n==/UserStyle== */";
        let (header, _, _) = parse(source);
        assert_eq!(header.meta.name, "One");
    }

    #[test]
    fn duplicate_known_key_keeps_first() {
        let source = "/* ==UserStyle==\n@name One\n@name Two\n==/UserStyle== */";
        let (header, warnings, _) = parse(source);
        assert_eq!(header.meta.name, "One");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("@name"));
    }

    #[test]
    fn keys_are_case_insensitive() {
        let source = "/* ==UserStyle==\n@Name Mixed\n@HOMEPAGEURL https://x.test\n==/UserStyle== */";
        let (header, _, _) = parse(source);
        assert_eq!(header.meta.name, "Mixed");
        assert_eq!(header.meta.homepage_url.as_deref(), Some("https://x.test"));
    }

    #[test]
    fn ordinary_comments_are_not_headers() {
        let source = "/* just a comment */\n/*==UserStyle==\n@name Tight\n==/UserStyle==*/";
        let (header, _, _) = parse(source);
        assert_eq!(header.meta.name, "Tight");
        assert!(header.block.starts_with("/*==UserStyle=="));
    }

    #[test]
    fn header_without_name_warns() {
        let (_, warnings, errors) = parse("/* ==UserStyle==\n@version 1\n==/UserStyle== */");
        assert_eq!(warnings, vec!["metadata header has no @name".to_string()]);
        assert!(errors.is_empty());
    }

    #[test]
    fn value_runs_to_end_of_line() {
        let source = "/* ==UserStyle==\n@name   Spaced   Name  \n@description\n==/UserStyle== */";
        let (header, _, _) = parse(source);
        assert_eq!(header.meta.name, "Spaced   Name");
        assert_eq!(header.meta.description, "");
    }
}
