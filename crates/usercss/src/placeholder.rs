//! Inline variable placeholder scanning.
//!
//! Variables are declared inline in the CSS body with a comment that
//! ordinary CSS engines ignore, followed by a literal fallback value:
//!
//! ```css
//! a { color: /*[[--link|color|#3366cc]]*/ #3366cc; }
//! p { font-size: /*[[--size|number|16px|8|32]]*/ 16px; }
//! body { /*[[--font|select|serif|serif:Serif=>font-family: Georgia\, serif,sans:Sans]]*/ }
//! h1 { color: /*[[--link]]*/ #3366cc; }
//! ```
//!
//! The segments are `name|type|default|options...`. A comment holding only a
//! name references a variable declared elsewhere in the body.
//!
//! Number bounds come from the 4th and 5th segments (`min`, `max`), from a
//! `min..max` range in the 4th segment, or from a range suffix on the
//! default (`16 8..32`).

use std::ops::Range;

use indexmap::{IndexMap, IndexSet};

use crate::diagnostic::{Diagnostic, Diagnostics};
use crate::variable::{parse_number, parse_options, VarKind, VariableDescriptor};

/// Opens a placeholder comment.
pub const OPEN: &str = "/*[[";
/// Closes a placeholder comment.
pub const CLOSE: &str = "]]*/";

/// One placeholder occurrence in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Site {
    /// The comment plus its trailing literal fallback.
    pub span: Range<usize>,
    /// Variable this site stands for; `None` when malformed.
    pub name: Option<String>,
}

/// Output of the placeholder pass.
#[derive(Debug, Default)]
pub(crate) struct Scan {
    pub variables: IndexMap<String, VariableDescriptor>,
    pub sites: Vec<Site>,
}

enum Parsed {
    Malformed,
    Reference(String),
    Declaration(VariableDescriptor),
}

/// Scans `source` for placeholders, skipping the header span.
pub(crate) fn scan_placeholders(
    source: &str,
    header: Option<&Range<usize>>,
    diagnostics: &mut Diagnostics,
) -> Scan {
    let mut scan = Scan::default();
    let mut references = IndexSet::new();
    let mut from = 0;

    while let Some(offset) = source[from..].find(OPEN) {
        let open = from + offset;
        if let Some(header) = header.filter(|h| h.contains(&open)) {
            from = header.end;
            continue;
        }

        let inner_start = open + OPEN.len();
        let Some(close) = source[inner_start..].find(CLOSE) else {
            diagnostics.push(Diagnostic::MalformedPlaceholder {
                text: excerpt(&source[open..]),
            });
            break;
        };
        let inner = &source[inner_start..inner_start + close];
        let comment_end = inner_start + close + CLOSE.len();
        let span = open..comment_end + fallback_len(&source[comment_end..]);
        from = span.end;

        let name = match parse_declaration(inner, diagnostics) {
            Parsed::Malformed => {
                diagnostics.push(Diagnostic::MalformedPlaceholder {
                    text: source[open..comment_end].to_string(),
                });
                None
            }
            Parsed::Reference(name) => {
                log::trace!("placeholder reference {}", name);
                references.insert(name.clone());
                Some(name)
            }
            Parsed::Declaration(var) => {
                log::trace!("placeholder {} ({}) default {:?}", var.name, var.kind, var.default);
                let name = var.name.clone();
                register(&mut scan.variables, var, diagnostics);
                Some(name)
            }
        };
        scan.sites.push(Site { span, name });
    }

    for name in references {
        if !scan.variables.contains_key(&name) {
            diagnostics.push(Diagnostic::UndeclaredVariable { name });
        }
    }

    log::debug!(
        "found {} placeholders declaring {} variables",
        scan.sites.len(),
        scan.variables.len()
    );
    scan
}

/// Adds a declaration, keeping the first of any duplicates.
fn register(
    variables: &mut IndexMap<String, VariableDescriptor>,
    var: VariableDescriptor,
    diagnostics: &mut Diagnostics,
) {
    match variables.get(&var.name) {
        Some(existing) if existing.kind != var.kind => {
            diagnostics.push(Diagnostic::ConflictingVariable {
                name: var.name,
                first: existing.kind,
                second: var.kind,
            });
        }
        Some(_) => diagnostics.push(Diagnostic::DuplicateVariable { name: var.name }),
        None => {
            variables.insert(var.name.clone(), var);
        }
    }
}

fn parse_declaration(inner: &str, diagnostics: &mut Diagnostics) -> Parsed {
    let segments: Vec<&str> = inner.split('|').map(str::trim).collect();
    let name = segments[0];
    if name.is_empty() {
        return Parsed::Malformed;
    }
    if segments.len() == 1 {
        return Parsed::Reference(name.to_string());
    }

    let kind = VarKind::parse(segments[1]).unwrap_or_else(|| {
        diagnostics.push(Diagnostic::UnknownVarType {
            name: name.to_string(),
            kind: segments[1].to_string(),
        });
        VarKind::Text
    });
    let default = segments.get(2).copied().unwrap_or("");
    let extra = segments.get(3..).unwrap_or(&[]);

    let mut var = VariableDescriptor::new(name, kind, default);
    match kind {
        VarKind::Number => {
            let (value, min, max) = number_bounds(default, extra);
            var.min = min.and_then(|s| parse_bound(name, "min", s, diagnostics));
            var.max = max.and_then(|s| parse_bound(name, "max", s, diagnostics));
            var.default = value.to_string();
        }
        kind if kind.takes_options() => {
            if let Some(list) = extra.first() {
                var.options = parse_options(list);
            }
            if var.default.is_empty() {
                var.default = match (kind, var.options.first()) {
                    (VarKind::Select, Some(first)) => first.value.clone(),
                    (VarKind::Checkbox, _) => "0".to_string(),
                    _ => String::new(),
                };
            }
        }
        _ => {}
    }
    var.value = var.default.clone();

    if kind == VarKind::Select && var.options.is_empty() {
        diagnostics.push(Diagnostic::MissingOptions {
            name: name.to_string(),
        });
    } else if let Err(reason) = var.validate(&var.default) {
        diagnostics.push(Diagnostic::InvalidDefault {
            name: name.to_string(),
            kind,
            value: var.default.clone(),
            reason,
        });
    }

    Parsed::Declaration(var)
}

/// Splits a number declaration into `(default, min, max)`.
fn number_bounds<'a>(
    default: &'a str,
    extra: &[&'a str],
) -> (&'a str, Option<&'a str>, Option<&'a str>) {
    if let Some((value, suffix)) = default.rsplit_once(char::is_whitespace) {
        if let Some((min, max)) = suffix.split_once("..") {
            return (value.trim(), non_empty(min), non_empty(max));
        }
    }
    match extra {
        &[range, ..] if range.contains("..") => {
            let (min, max) = range.split_once("..").unwrap_or_default();
            (default, non_empty(min), non_empty(max))
        }
        &[min, max, ..] => (default, non_empty(min), non_empty(max)),
        &[min] => (default, non_empty(min), None),
        &[] => (default, None, None),
    }
}

fn non_empty(s: &str) -> Option<&str> {
    let s = s.trim();
    (!s.is_empty()).then_some(s)
}

fn parse_bound(
    name: &str,
    bound: &'static str,
    value: &str,
    diagnostics: &mut Diagnostics,
) -> Option<f64> {
    let parsed = parse_number(value);
    if parsed.is_none() {
        diagnostics.push(Diagnostic::InvalidBound {
            name: name.to_string(),
            bound,
            value: value.to_string(),
        });
    }
    parsed
}

/// Length of the literal fallback that follows a placeholder comment.
///
/// The fallback starts after spaces or tabs and runs up to `!`, a line
/// break, another comment, or one of `;` `{` `}` `,` `)` outside parentheses.
/// Quoted strings are taken whole. Trailing whitespace is excluded. Returns 0
/// when there is no fallback, leaving the whitespace in place.
///
/// If a parenthesis is still open where the scan stops, the fallback ends at
/// the first `;`, `{` or `}` seen inside it instead.
pub(crate) fn fallback_len(rest: &str) -> usize {
    let bytes = rest.as_bytes();
    let start = rest.len() - rest.trim_start_matches(|c: char| c == ' ' || c == '\t').len();
    let mut depth = 0usize;
    let mut end = start;
    let mut nested_stop = None;
    let mut i = start;

    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' => {
                i = skip_string(bytes, i);
                end = i;
                continue;
            }
            b'(' => depth += 1,
            b')' if depth == 0 => break,
            b')' => depth -= 1,
            b',' | b';' | b'{' | b'}' if depth == 0 => break,
            b';' | b'{' | b'}' => {
                nested_stop.get_or_insert(end);
            }
            b'!' | b'\n' | b'\r' => break,
            b'/' if bytes.get(i + 1) == Some(&b'*') => break,
            _ => {}
        }
        if !bytes[i].is_ascii_whitespace() {
            end = i + 1;
        }
        i += 1;
    }

    if depth > 0 {
        if let Some(stop) = nested_stop {
            end = stop;
        }
    }
    if end == start {
        0
    } else {
        end
    }
}

/// Returns the index just past the string that opens at `open`.
fn skip_string(bytes: &[u8], open: usize) -> usize {
    let quote = bytes[open];
    let mut i = open + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\n' => return i,
            b if b == quote => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

fn excerpt(text: &str) -> String {
    let line = text.lines().next().unwrap_or("");
    match line.char_indices().nth(40) {
        Some((cut, _)) => format!("{}...", &line[..cut]),
        None => line.to_string(),
    }
}
