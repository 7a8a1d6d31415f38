//! Site-targeting directive extraction.
//!
//! Styles select the pages they apply to with `@-moz-document` (or
//! `@document`) blocks whose prelude is a comma-separated condition list:
//!
//! ```css
//! @-moz-document url("https://example.com/"), url-prefix("https://example.com/docs/"),
//!                domain("example.org"), regexp("https?://.*\\.example\\.net/.*") {
//!     body { background: #111; }
//! }
//! ```
//!
//! The prelude is tokenized with `cssparser`, so quoted arguments arrive
//! unescaped and comments between conditions are ignored. The block body is
//! irrelevant here and is skipped.

use cssparser::{
    AtRuleParser, CowRcStr, ParseError, Parser, ParserInput, ParserState, QualifiedRuleParser,
    Token,
};
use fancy_regex::Regex;

use super::rule::{normalize_domain, DomainRule, RuleKind};
use crate::diagnostic::{Diagnostic, Diagnostics};
use crate::options::ParseOptions;

/// A condition as written, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Condition {
    kind: RuleKind,
    raw: String,
}

/// Collects every domain rule declared in `source`.
///
/// Blocks are visited in source order and conditions left to right. Invalid
/// `regexp` patterns are dropped; they are reported only when
/// [`ParseOptions::warn_on_invalid_regexp`] is set.
pub(crate) fn extract_domain_rules(
    source: &str,
    options: &ParseOptions,
    diagnostics: &mut Diagnostics,
) -> Vec<DomainRule> {
    let mut input = ParserInput::new(source);
    let mut parser = Parser::new(&mut input);
    let mut directives = DirectiveParser;

    let mut conditions = Vec::new();
    for block in cssparser::StyleSheetParser::new(&mut parser, &mut directives).flatten() {
        conditions.extend(block);
    }

    let rules: Vec<DomainRule> = conditions
        .into_iter()
        .filter_map(|condition| normalize(condition, options, diagnostics))
        .collect();

    log::debug!("extracted {} domain rules", rules.len());
    rules
}

fn normalize(
    condition: Condition,
    options: &ParseOptions,
    diagnostics: &mut Diagnostics,
) -> Option<DomainRule> {
    log::trace!("{}({:?})", condition.kind, condition.raw);
    match condition.kind {
        RuleKind::Domain => Some(DomainRule::new(
            RuleKind::Domain,
            normalize_domain(&condition.raw),
        )),
        RuleKind::Url | RuleKind::UrlPrefix => Some(DomainRule::new(condition.kind, condition.raw)),
        RuleKind::Regexp => match Regex::new(&condition.raw) {
            Ok(_) => Some(DomainRule::regexp(condition.raw)),
            Err(err) => {
                log::debug!("dropping invalid regexp {:?}: {}", condition.raw, err);
                if options.warn_on_invalid_regexp {
                    diagnostics.push(Diagnostic::InvalidRegexp {
                        pattern: condition.raw,
                        reason: err.to_string(),
                    });
                }
                None
            }
        },
    }
}

fn is_directive(name: &str) -> bool {
    name.eq_ignore_ascii_case("-moz-document") || name.eq_ignore_ascii_case("document")
}

struct DirectiveParser;

impl<'i> AtRuleParser<'i> for DirectiveParser {
    type Prelude = Vec<Condition>;
    type AtRule = Vec<Condition>;
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        if !is_directive(name.as_ref()) {
            return Err(input.new_custom_error::<(), ()>(()));
        }

        let mut conditions = Vec::new();
        loop {
            let token = match input.next() {
                Ok(token) => token.clone(),
                Err(_) => break, // End of prelude
            };
            match token {
                Token::UnquotedUrl(url) => conditions.push(Condition {
                    kind: RuleKind::Url,
                    raw: url.as_ref().to_string(),
                }),
                Token::Function(function) => {
                    let Some(kind) = RuleKind::from_function(function.as_ref()) else {
                        continue;
                    };
                    let raw = input.parse_nested_block(
                        |input| -> Result<String, ParseError<'i, ()>> { Ok(argument(input)) },
                    );
                    if let Ok(raw) = raw {
                        conditions.push(Condition { kind, raw });
                    }
                }
                _ => {
                    // Commas, whitespace and anything unrecognized
                }
            }
        }
        Ok(conditions)
    }

    fn parse_block<'t>(
        &mut self,
        conditions: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::AtRule, ParseError<'i, Self::Error>> {
        // The style rules inside are not needed; drain them.
        while input.next().is_ok() {}
        Ok(conditions)
    }
}

impl<'i> QualifiedRuleParser<'i> for DirectiveParser {
    type Prelude = ();
    type QualifiedRule = Vec<Condition>;
    type Error = ();
}

/// Reads a function argument: a lone quoted string is unescaped, anything
/// else is taken as raw trimmed text.
fn argument(input: &mut Parser<'_, '_>) -> String {
    let start = input.position();
    let mut tokens = 0;
    let mut quoted = None;
    while let Ok(token) = input.next() {
        tokens += 1;
        if let Token::QuotedString(value) = token {
            quoted = Some(value.as_ref().to_string());
        }
    }
    match quoted {
        Some(value) if tokens == 1 => value,
        _ => input.slice_from(start).trim().to_string(),
    }
}
