//! Command handlers.
//!
//! Each handler loads and compiles the style, then renders its result as
//! text or structured data. Rendering is kept separate from I/O so the
//! reports can be tested directly.

use std::fmt::{self, Write as _};
use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use serde::Serialize;
use usercss::{CurrentValues, ParseOptions, ParsedStyle, StoredStyle, VarKind, VariableDescriptor};

use crate::cli::{Cli, Command};
use crate::input::Source;
use crate::output::{serialize_structured, OutputDestination, OutputMode, SerializeError};
use crate::values::collect_values;

/// Runs the selected command.
pub fn run(cli: &Cli) -> anyhow::Result<ExitCode> {
    let options = ParseOptions::new().warn_on_invalid_regexp(cli.warn_invalid_regexp);

    match &cli.command {
        Command::Parse { file } => {
            let style = load(file, None, &options)?;
            let report = render_parse(&style, cli.output)?;
            OutputDestination::Stdout.write_text(&report)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Compile {
            file,
            set,
            values,
            out,
        } => {
            let current = collect_values(values.as_deref(), set)?;
            let style = load(file, Some(&current), &options)?;
            if !cli.output.is_structured() {
                log_diagnostics(&style);
            }

            let report = render_compile(&style, cli.output)?;
            let destination = OutputDestination::from_option(out.clone());
            destination
                .write_text(&report)
                .with_context(|| format!("writing compiled CSS to {:?}", destination))?;

            Ok(if style.is_installable() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Match { file, urls } => {
            let style = load(file, None, &options)?;
            let results = match_urls(&style, urls);
            let report = render_matches(&results, cli.output)?;
            OutputDestination::Stdout.write_text(&report)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load(
    file: &Path,
    current: Option<&CurrentValues>,
    options: &ParseOptions,
) -> anyhow::Result<ParsedStyle> {
    let source = Source::from_arg(file);
    let text = source
        .read()
        .with_context(|| format!("loading style from {}", source.label()))?;

    let style = usercss::parse_with_options(&text, current, options);
    log::info!(
        "{}: {:?} with {} variables and {} domain rules",
        source.label(),
        style.meta.name,
        style.variables.len(),
        style.domains.len()
    );
    Ok(style)
}

fn log_diagnostics(style: &ParsedStyle) {
    for warning in &style.warnings {
        log::warn!("{}", warning);
    }
    for error in &style.errors {
        log::error!("{}", error);
    }
}

// ============================================================================
// parse
// ============================================================================

/// Renders the `parse` report.
pub fn render_parse(style: &ParsedStyle, mode: OutputMode) -> Result<String, SerializeError> {
    if mode.is_structured() {
        return serialize_structured(style, mode);
    }

    let mut out = String::new();
    write_parse_report(&mut out, style)?;
    Ok(out)
}

fn write_parse_report(out: &mut String, style: &ParsedStyle) -> fmt::Result {
    let meta = &style.meta;
    let fields = [
        ("name", Some(meta.name.as_str())),
        ("namespace", Some(meta.namespace.as_str())),
        ("version", Some(meta.version.as_str())),
        ("description", Some(meta.description.as_str())),
        ("author", Some(meta.author.as_str())),
        ("license", meta.license.as_deref()),
        ("homepage", meta.homepage_url.as_deref()),
        ("support", meta.support_url.as_deref()),
        ("update", Some(meta.source_url.as_str())),
    ];
    for (label, value) in fields {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            writeln!(out, "{:<12} {}", format!("{}:", label), value)?;
        }
    }
    for (key, values) in &meta.extra {
        for value in values {
            writeln!(out, "{:<12} {}", format!("@{}:", key), value)?;
        }
    }

    out.push_str("\nvariables:\n");
    if style.variables.is_empty() {
        out.push_str("  (none)\n");
    }
    for var in style.variables.values() {
        out.push_str("  ");
        write_variable(out, var)?;
        out.push('\n');
    }

    out.push_str("\ndomains:\n");
    if style.domains.is_empty() {
        out.push_str("  (none: applies everywhere)\n");
    }
    for rule in &style.domains {
        writeln!(out, "  {}", rule)?;
    }

    write_messages(out, "warnings", &style.warnings)?;
    write_messages(out, "errors", &style.errors)
}

fn write_variable(out: &mut String, var: &VariableDescriptor) -> fmt::Result {
    write!(out, "{} ({}", var.name, var.kind)?;
    if var.kind == VarKind::Number && (var.min.is_some() || var.max.is_some()) {
        let bound = |b: Option<f64>| b.map(|n| n.to_string()).unwrap_or_default();
        write!(out, " {}..{}", bound(var.min), bound(var.max))?;
    }
    if !var.options.is_empty() {
        let values: Vec<&str> = var.options.iter().map(|o| o.value.as_str()).collect();
        write!(out, " [{}]", values.join(", "))?;
    }
    write!(out, ") = {:?}", var.value)
}

fn write_messages(out: &mut String, title: &str, messages: &[String]) -> fmt::Result {
    if messages.is_empty() {
        return Ok(());
    }
    write!(out, "\n{}:\n", title)?;
    for message in messages {
        writeln!(out, "  - {}", message)?;
    }
    Ok(())
}

// ============================================================================
// compile
// ============================================================================

#[derive(Serialize)]
struct CompileReport<'a> {
    #[serde(flatten)]
    style: StoredStyle,
    warnings: &'a [String],
    errors: &'a [String],
}

/// Renders the `compile` result: bare CSS for text, a full report otherwise.
pub fn render_compile(style: &ParsedStyle, mode: OutputMode) -> Result<String, SerializeError> {
    if !mode.is_structured() {
        return Ok(style.compiled_css.clone());
    }
    let report = CompileReport {
        style: StoredStyle::from(style),
        warnings: &style.warnings,
        errors: &style.errors,
    };
    serialize_structured(&report, mode)
}

// ============================================================================
// match
// ============================================================================

/// Whether one URL receives the style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub url: String,
    pub matches: bool,
}

/// Tests every URL against the style's domain rules.
pub fn match_urls(style: &ParsedStyle, urls: &[String]) -> Vec<MatchResult> {
    let matcher = style.matcher();
    urls.iter()
        .map(|url| MatchResult {
            url: url.clone(),
            matches: matcher.is_match(url),
        })
        .collect()
}

/// Renders match results, one `yes`/`no` line per URL in text mode.
pub fn render_matches(results: &[MatchResult], mode: OutputMode) -> Result<String, SerializeError> {
    if mode.is_structured() {
        return serialize_structured(&results, mode);
    }
    let mut out = String::new();
    for result in results {
        let answer = if result.matches { "yes" } else { "no" };
        writeln!(out, "{:<4}{}", answer, result.url)?;
    }
    Ok(out)
}
