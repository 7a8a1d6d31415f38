//! The compilation engine.
//!
//! [`parse`] runs the header, placeholder and domain passes over the original
//! source, none of which depend on each other, then performs a single
//! substitution pass that replaces every placeholder (comment plus literal
//! fallback) with its effective value.
//!
//! The engine holds no state between calls. To change a variable, re-run
//! [`parse`] with a new set of current values.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use serde::Serialize;

use crate::diagnostic::{render_messages, Diagnostic, Diagnostics};
use crate::domain::{extract_domain_rules, DomainMatcher, DomainRule};
use crate::header::{parse_header, Metadata};
use crate::options::ParseOptions;
use crate::placeholder::{scan_placeholders, Scan};
use crate::variable::VariableDescriptor;

/// Caller-supplied variable overrides, keyed by variable name.
pub type CurrentValues = HashMap<String, String>;

/// Immutable result of compiling one UserCSS source.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedStyle {
    pub meta: Metadata,
    /// Site-targeting rules in source order. Empty means "everywhere".
    pub domains: Vec<DomainRule>,
    /// Declared variables in declaration order.
    pub variables: IndexMap<String, VariableDescriptor>,
    /// The source with every placeholder replaced by its effective value.
    pub compiled_css: String,
    /// The header comment verbatim, or empty when there is none.
    pub metadata_block: String,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    /// Typed form of `warnings` and `errors`, in report order.
    #[serde(skip)]
    pub diagnostics: Vec<Diagnostic>,
}

impl ParsedStyle {
    /// Returns `true` when no errors were reported.
    pub fn is_installable(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns `true` if this style applies to `page_url`.
    pub fn matches(&self, page_url: &str) -> bool {
        crate::domain::matches(&self.domains, page_url)
    }

    /// Builds a reusable matcher for this style's domain rules.
    pub fn matcher(&self) -> DomainMatcher {
        DomainMatcher::new(&self.domains)
    }

    /// Effective value of every variable, in declaration order.
    pub fn values(&self) -> IndexMap<String, String> {
        self.variables
            .iter()
            .map(|(name, var)| (name.clone(), var.value.clone()))
            .collect()
    }
}

/// Compiles `source` with optional variable overrides.
///
/// Never fails on malformed input: problems are reported through
/// [`ParsedStyle::warnings`] and [`ParsedStyle::errors`].
///
/// ```
/// use std::collections::HashMap;
///
/// let source = "/* ==UserStyle==\n@name Demo\n==/UserStyle== */\n\
///               p { font-size: /*[[--size|number|16px]]*/ 16px; }";
/// let values = HashMap::from([("--size".to_string(), "24px".to_string())]);
/// let style = usercss::parse(source, Some(&values));
///
/// assert_eq!(style.meta.name, "Demo");
/// assert!(style.compiled_css.contains("font-size: 24px;"));
/// assert!(style.is_installable());
/// ```
pub fn parse(source: &str, current_values: Option<&CurrentValues>) -> ParsedStyle {
    parse_with_options(source, current_values, &ParseOptions::default())
}

/// Like [`parse`], with explicit [`ParseOptions`].
pub fn parse_with_options(
    source: &str,
    current_values: Option<&CurrentValues>,
    options: &ParseOptions,
) -> ParsedStyle {
    let mut diagnostics = Diagnostics::new();

    let header = parse_header(source, &mut diagnostics);
    let mut scan = scan_placeholders(source, header.span.as_ref(), &mut diagnostics);
    let domains = extract_domain_rules(source, options, &mut diagnostics);

    if let Some(values) = current_values {
        apply_overrides(&mut scan.variables, values, &mut diagnostics);
    }
    let compiled_css = substitute(source, &scan, &mut diagnostics);

    let diagnostics = diagnostics.into_inner();
    let (warnings, errors) = render_messages(&diagnostics);
    log::debug!(
        "compiled {:?}: {} variables, {} domain rules, {} warnings, {} errors",
        header.meta.name,
        scan.variables.len(),
        domains.len(),
        warnings.len(),
        errors.len()
    );

    ParsedStyle {
        meta: header.meta,
        domains,
        variables: scan.variables,
        compiled_css,
        metadata_block: header.block.to_string(),
        warnings,
        errors,
        diagnostics,
    }
}

/// Sets each variable's effective value from non-empty overrides.
///
/// Invalid overrides are still used, with a warning.
fn apply_overrides(
    variables: &mut IndexMap<String, VariableDescriptor>,
    values: &CurrentValues,
    diagnostics: &mut Diagnostics,
) {
    for var in variables.values_mut() {
        let Some(value) = values.get(&var.name).filter(|value| !value.is_empty()) else {
            continue;
        };
        if let Err(reason) = var.validate(value) {
            diagnostics.push(Diagnostic::InvalidValue {
                name: var.name.clone(),
                kind: var.kind,
                value: value.clone(),
                reason,
            });
        }
        var.value = value.clone();
    }

    let mut unknown: Vec<&String> = values
        .keys()
        .filter(|name| !variables.contains_key(name.as_str()))
        .collect();
    unknown.sort();
    for name in unknown {
        diagnostics.push(Diagnostic::UnknownOverride { name: name.clone() });
    }
}

/// Replaces each placeholder site with its variable's substitution text.
///
/// Malformed sites and references to undeclared names are copied verbatim.
fn substitute(source: &str, scan: &Scan, diagnostics: &mut Diagnostics) -> String {
    let mut out = String::with_capacity(source.len());
    let mut substituted = HashSet::new();
    let mut last = 0;

    for site in &scan.sites {
        let Some(var) = site
            .name
            .as_ref()
            .and_then(|name| scan.variables.get(name))
        else {
            continue;
        };
        out.push_str(&source[last..site.span.start]);
        out.push_str(var.substitution());
        last = site.span.end;
        substituted.insert(var.name.as_str());
    }
    out.push_str(&source[last..]);

    for name in scan.variables.keys() {
        if !substituted.contains(name.as_str()) {
            diagnostics.push(Diagnostic::Unsubstituted { name: name.clone() });
        }
    }
    out
}
