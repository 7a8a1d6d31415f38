//! Site targeting: domain rule extraction and URL matching.
//!
//! [`DomainRule`]s are extracted once per parse from `@-moz-document`
//! directives. Matching is separate and pure, so persisted rules can be
//! checked on every navigation without re-parsing the source.

mod extract;
mod matcher;
mod rule;

pub(crate) use extract::extract_domain_rules;
pub use matcher::{matches, DomainMatcher};
pub use rule::{normalize_domain, DomainRule, RuleKind};
