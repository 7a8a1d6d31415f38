//! UserCSS - compilation and site matching for user stylesheets.
//!
//! A UserCSS source is ordinary CSS with three additions:
//!
//! - A metadata header comment delimited by `==UserStyle==` markers
//! - Inline variable placeholders, `/*[[name|type|default]]*/ fallback`
//! - `@-moz-document` directives naming the sites the style targets
//!
//! [`parse`] turns a source into a [`ParsedStyle`]: the metadata, declared
//! variables, domain rules and the compiled CSS with every placeholder
//! replaced by its effective value. Parsing never fails; problems are
//! reported as warnings (the style still installs) or errors (it should not).
//!
//! # Quick Start
//!
//! ```rust
//! use std::collections::HashMap;
//!
//! let source = r#"/* ==UserStyle==
//! @name        Dark Docs
//! @version     1.0.0
//! ==/UserStyle== */
//! @-moz-document domain("example.com") {
//!   body { background: /*[[--bg|color|#111111]]*/ #111111; }
//! }"#;
//!
//! let style = usercss::parse(source, None);
//! assert!(style.is_installable());
//! assert!(style.compiled_css.contains("background: #111111;"));
//! assert!(style.matches("https://docs.example.com/"));
//! assert!(!style.matches("https://example.org/"));
//!
//! let values = HashMap::from([("--bg".to_string(), "#222222".to_string())]);
//! let style = usercss::parse(source, Some(&values));
//! assert!(style.compiled_css.contains("background: #222222;"));
//! ```
//!
//! # Placeholder Types
//!
//! | Type | Value | Substituted as |
//! |------|-------|----------------|
//! | `color` | `#rgb`, `#rrggbb`, `#rrggbbaa` | the value |
//! | `number` | decimal with optional unit, optional bounds | the value |
//! | `text` | any string | the value |
//! | `select` | one of the option values | the option's CSS, else its value |
//! | `checkbox` | `0` / `1` | the matching option's CSS, else the value |
//!
//! # Domain Matching
//!
//! ```text
//! match = rules is empty
//!       ∨ (at least one rule matches the page URL)
//! ```
//!
//! See [`DomainMatcher`] for the per-kind tests.

mod diagnostic;
mod domain;
mod engine;
mod error;
mod header;
mod options;
mod placeholder;
mod stored;
mod variable;

// Re-export public API
pub use diagnostic::{Diagnostic, Severity};
pub use domain::{matches, normalize_domain, DomainMatcher, DomainRule, RuleKind};
pub use engine::{parse, parse_with_options, CurrentValues, ParsedStyle};
pub use error::{Result, UsercssError};
pub use header::{Metadata, END_MARKER, START_MARKER};
pub use options::ParseOptions;
pub use stored::StoredStyle;
pub use variable::{HexColor, SelectOption, VarKind, VariableDescriptor};
