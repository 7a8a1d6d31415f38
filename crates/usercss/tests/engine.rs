//! End-to-end tests through the public API.

use std::collections::HashMap;

use usercss::{
    matches, parse, parse_with_options, DomainRule, ParseOptions, RuleKind, Severity,
    StoredStyle, VarKind,
};

const FULL: &str = r#"/* ==UserStyle==
@name           Dark Docs
@namespace      example.org
@version        1.4.0
@description    Dark theme for the docs
@author         Jane Doe
@license        CC0-1.0
@homepageURL    https://example.org/dark-docs
@updateURL      https://example.org/dark-docs.user.css
@preprocessor   default
==/UserStyle== */

@-moz-document domain("example.com"), url-prefix("https://docs.example.net/") {
  body {
    background: /*[[--bg|color|#111111]]*/ #111111;
    font-size: /*[[--size|number|15px|10|24]]*/ 15px;
    font-family: /*[[--face|text|Georgia]]*/ Georgia, serif;
  }
  /*[[--links|select|blue|blue:Blue=>a { color: #39f; },green:Green=>a { color: #3c3; }]]*/
  pre { white-space: /*[[--wrap|checkbox|1|pre,pre-wrap]]*/ pre-wrap; }
}
"#;

fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

// ============================================================================
// Full documents
// ============================================================================

#[test]
fn full_document_metadata() {
    let style = parse(FULL, None);
    assert_eq!(style.meta.name, "Dark Docs");
    assert_eq!(style.meta.namespace, "example.org");
    assert_eq!(style.meta.version, "1.4.0");
    assert_eq!(style.meta.author, "Jane Doe");
    assert_eq!(style.meta.license.as_deref(), Some("CC0-1.0"));
    assert_eq!(
        style.meta.homepage_url.as_deref(),
        Some("https://example.org/dark-docs")
    );
    assert_eq!(
        style.meta.source_url,
        "https://example.org/dark-docs.user.css"
    );
    assert_eq!(style.meta.extra_value("preprocessor"), Some("default"));
    assert!(style.metadata_block.starts_with("/* ==UserStyle=="));
    assert!(style.metadata_block.ends_with("==/UserStyle== */"));
}

#[test]
fn full_document_variables() {
    let style = parse(FULL, None);
    let names: Vec<&str> = style.variables.keys().map(String::as_str).collect();
    assert_eq!(names, ["--bg", "--size", "--face", "--links", "--wrap"]);

    let size = &style.variables["--size"];
    assert_eq!(size.kind, VarKind::Number);
    assert_eq!(size.min, Some(10.0));
    assert_eq!(size.max, Some(24.0));

    let links = &style.variables["--links"];
    assert_eq!(links.kind, VarKind::Select);
    assert_eq!(links.options.len(), 2);
    assert_eq!(links.options[1].label, "Green");

    assert_eq!(style.variables["--wrap"].kind, VarKind::Checkbox);
    assert!(style.warnings.is_empty(), "{:?}", style.warnings);
    assert!(style.errors.is_empty(), "{:?}", style.errors);
}

#[test]
fn full_document_compiles_defaults() {
    let style = parse(FULL, None);
    let css = &style.compiled_css;
    assert!(css.contains("background: #111111;"));
    assert!(css.contains("font-size: 15px;"));
    assert!(css.contains("font-family: Georgia, serif;"));
    assert!(css.contains("a { color: #39f; }"));
    assert!(css.contains("white-space: pre-wrap;"));
    assert!(!css.contains("/*[["));
}

#[test]
fn full_document_compiles_overrides() {
    let current = values(&[
        ("--bg", "#000"),
        ("--size", "18px"),
        ("--face", "Inter"),
        ("--links", "green"),
        ("--wrap", "0"),
    ]);
    let style = parse(FULL, Some(&current));
    let css = &style.compiled_css;
    assert!(css.contains("background: #000;"));
    assert!(css.contains("font-size: 18px;"));
    assert!(css.contains("font-family: Inter, serif;"));
    assert!(css.contains("a { color: #3c3; }"));
    assert!(!css.contains("#39f"));
    assert!(css.contains("white-space: pre;"));
    assert!(style.warnings.is_empty(), "{:?}", style.warnings);
}

#[test]
fn full_document_domains() {
    let style = parse(FULL, None);
    assert_eq!(
        style.domains,
        vec![
            DomainRule::domain("example.com"),
            DomainRule::url_prefix("https://docs.example.net/"),
        ]
    );
    assert!(style.matches("https://www.example.com/"));
    assert!(style.matches("https://docs.example.net/guide"));
    assert!(!style.matches("https://example.net/"));
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn round_trip_without_variables() {
    let source = "/* ==UserStyle==\n@name Plain\n@version 1\n==/UserStyle== */\nbody { color: red; }\n";
    let first = parse(source, None);
    let second = parse(&first.compiled_css, None);
    assert_eq!(first.meta, second.meta);
    assert!(first.variables.is_empty());
    assert!(second.variables.is_empty());
}

#[test]
fn compiling_twice_is_idempotent() {
    let current = values(&[("--bg", "#123456"), ("--links", "green")]);
    let once = parse(FULL, Some(&current));
    let twice = parse(&once.compiled_css, Some(&current));
    assert_eq!(once.compiled_css, twice.compiled_css);
}

#[test]
fn empty_rules_match_any_url() {
    assert!(matches(&[], "https://example.com/"));
    assert!(matches(&[], "about:blank"));
    assert!(matches(&[], ""));
}

#[test]
fn domain_rule_kinds() {
    let rules = [DomainRule::new(RuleKind::Domain, "example.com")];
    assert!(matches(&rules, "https://example.com/x"));
    assert!(matches(&rules, "https://sub.example.com"));
    assert!(!matches(&rules, "https://notexample.com"));
}

#[test]
fn url_prefix_rule() {
    let rules = [DomainRule::new(RuleKind::UrlPrefix, "https://example.com/app")];
    assert!(matches(&rules, "https://example.com/app/page"));
    assert!(!matches(&rules, "https://example.com/ap"));
}

#[test]
fn invalid_regexp_is_skipped() {
    let source = r#"@-moz-document regexp("[bad"), domain("ok.com") { a { color: red; } }"#;
    let style = parse(source, None);
    assert_eq!(style.domains.len(), 1);
    assert_eq!(style.domains, vec![DomainRule::domain("ok.com")]);
    assert!(style.is_installable());
}

#[test]
fn lookahead_regexp_limits_the_style() {
    let source = r#"@-moz-document regexp("https://(?!www\\.)example\\.com/.*") { a { color: red; } }"#;
    let style = parse(source, None);
    assert_eq!(style.domains.len(), 1);
    assert!(style.matches("https://example.com/page"));
    assert!(!style.matches("https://www.example.com/page"));
    assert!(!style.matches("https://unrelated.test/"));
}

#[test]
fn unicode_domain_rule() {
    let style = parse(r#"@-moz-document domain("bücher.de") { a { color: red; } }"#, None);
    assert!(style.matches("https://bücher.de/"));
    assert!(style.matches("https://www.xn--bcher-kva.de/katalog"));
    assert!(!style.matches("https://example.com/"));
}

#[test]
fn invalid_regexp_warning_is_opt_in() {
    let source = r#"@-moz-document regexp("[bad"), domain("ok.com") { }"#;
    let options = ParseOptions::new().warn_on_invalid_regexp(true);
    let style = parse_with_options(source, None, &options);
    assert_eq!(style.domains.len(), 1);
    assert!(style.warnings.iter().any(|w| w.contains("[bad")));
}

#[test]
fn variable_substitution() {
    let source = "/* ==UserStyle==\n@name Size\n==/UserStyle== */\np { font-size: /*[[--size|number|16]]*/ 16; }";
    let style = parse(source, Some(&values(&[("--size", "24")])));
    assert!(style.compiled_css.contains("24"));
    assert!(!style.compiled_css.contains("16"));
}

#[test]
fn unknown_type_falls_back_to_text() {
    let source = "/* ==UserStyle==\n@name Slider\n==/UserStyle== */\np { width: /*[[--w|slider|5px]]*/ 5px; }";
    let style = parse(source, None);
    let var = &style.variables["--w"];
    assert_eq!(var.kind, VarKind::Text);
    assert_eq!(var.kind.as_str(), "text");
    assert!(!style.warnings.is_empty());
    assert!(style.compiled_css.contains("width: 5px;"));
}

// ============================================================================
// Diagnostics
// ============================================================================

#[test]
fn missing_header_still_compiles() {
    let style = parse("body { color: /*[[--c|color|#fff]]*/ #fff; }", None);
    assert_eq!(style.meta.name, "");
    assert!(style.metadata_block.is_empty());
    assert!(!style.warnings.is_empty());
    assert!(style.is_installable());
    assert_eq!(style.compiled_css, "body { color: #fff; }");
}

#[test]
fn conflicting_declarations_are_errors() {
    let source = "/* ==UserStyle==\n@name X\n==/UserStyle== */\n\
                  a { color: /*[[--c|color|#fff]]*/ #fff; width: /*[[--c|number|3]]*/ 3px; }";
    let style = parse(source, None);
    assert!(!style.is_installable());
    assert_eq!(style.errors.len(), 1);
    assert!(style
        .diagnostics
        .iter()
        .any(|d| d.severity() == Severity::Error));
}

#[test]
fn stored_style_round_trip() {
    let style = parse(FULL, Some(&values(&[("--links", "green")])));
    let stored = StoredStyle::from(&style);
    let loaded = StoredStyle::from_json(&stored.to_json().unwrap()).unwrap();
    assert_eq!(loaded.compiled_css, style.compiled_css);
    assert_eq!(loaded.variables["--links"].value, "green");
    assert!(loaded.matches("https://example.com/"));
}

#[test]
fn parsed_style_json_shape() {
    let style = parse(FULL, None);
    let json = serde_json::to_value(&style).unwrap();
    assert_eq!(json["meta"]["name"], "Dark Docs");
    assert_eq!(json["meta"]["homepageURL"], "https://example.org/dark-docs");
    assert_eq!(json["domains"][1]["kind"], "url-prefix");
    assert_eq!(json["variables"]["--size"]["type"], "number");
    assert!(json["warnings"].as_array().unwrap().is_empty());
}
