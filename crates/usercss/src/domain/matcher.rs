//! Deciding whether a page URL receives a style.
//!
//! ```text
//! match = rules is empty
//!       ∨ (at least one rule matches the page URL)
//! ```
//!
//! | Kind | Test |
//! |------|------|
//! | `url` | page URL equals the pattern |
//! | `url-prefix` | page URL starts with the pattern |
//! | `domain` | page host equals the pattern or is a subdomain of it, ignoring `www.` |
//! | `regexp` | the pattern matches anywhere in the page URL |
//!
//! Hosts are compared in their ASCII (punycode) form, so `domain("bücher.de")`
//! matches `https://xn--bcher-kva.de/` and vice versa. Regexps are compiled
//! with `fancy_regex`, which accepts lookaround and backreferences.

use fancy_regex::Regex;
use url::{Host, Url};

use super::rule::{DomainRule, RuleKind};

/// Returns `true` if a style with `rules` applies to `page_url`.
///
/// An empty rule list applies everywhere. Regexps are compiled for this call
/// only; build a [`DomainMatcher`] to reuse them across URLs.
pub fn matches(rules: &[DomainRule], page_url: &str) -> bool {
    DomainMatcher::new(rules).is_match(page_url)
}

/// Rule set prepared for repeated matching.
///
/// Regexps are compiled once at construction. The matcher is immutable
/// afterwards and can be shared across threads.
#[derive(Debug, Clone)]
pub struct DomainMatcher {
    rules: Vec<Compiled>,
}

#[derive(Debug, Clone)]
enum Compiled {
    Url(String),
    UrlPrefix(String),
    Domain(String),
    Regexp(Regex),
    /// A rule that can never match (invalid regexp, empty domain).
    Never,
}

impl DomainMatcher {
    /// Prepares `rules` for matching.
    pub fn new(rules: &[DomainRule]) -> Self {
        let rules = rules
            .iter()
            .map(|rule| match rule.kind {
                RuleKind::Url => Compiled::Url(rule.pattern.clone()),
                RuleKind::UrlPrefix => Compiled::UrlPrefix(rule.pattern.clone()),
                RuleKind::Domain => {
                    let host = comparable_host(&rule.pattern);
                    if host.is_empty() {
                        Compiled::Never
                    } else {
                        Compiled::Domain(host)
                    }
                }
                RuleKind::Regexp => match Regex::new(&rule.pattern) {
                    Ok(regex) => Compiled::Regexp(regex),
                    Err(err) => {
                        log::debug!("regexp rule {:?} never matches: {}", rule.pattern, err);
                        Compiled::Never
                    }
                },
            })
            .collect();
        DomainMatcher { rules }
    }

    /// Returns `true` if the style applies everywhere.
    pub fn is_global(&self) -> bool {
        self.rules.is_empty()
    }

    /// Returns `true` if any rule matches `page_url`, or there are no rules.
    pub fn is_match(&self, page_url: &str) -> bool {
        if self.is_global() {
            return true;
        }
        let host = page_host(page_url);
        self.rules.iter().any(|rule| match rule {
            Compiled::Url(pattern) => page_url == pattern,
            Compiled::UrlPrefix(prefix) => page_url.starts_with(prefix.as_str()),
            Compiled::Domain(domain) => host
                .as_deref()
                .is_some_and(|host| is_same_or_subdomain(host, domain)),
            Compiled::Regexp(regex) => regex.is_match(page_url).unwrap_or_else(|err| {
                log::debug!("regexp {:?} gave up on {:?}: {}", regex.as_str(), page_url, err);
                false
            }),
            Compiled::Never => false,
        })
    }
}

/// Lowercased host of `page_url` without a leading `www.`.
fn page_host(page_url: &str) -> Option<String> {
    let url = Url::parse(page_url).ok()?;
    let host = url.host_str()?;
    Some(comparable_host(host))
}

/// ASCII, lowercased form of `host` without a leading `www.`.
///
/// Hosts the URL parser rejects are only lowercased.
fn comparable_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('.');
    let host = match Host::parse(host) {
        Ok(parsed) => parsed.to_string(),
        Err(_) => host.to_lowercase(),
    };
    match host.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => host,
    }
}

fn is_same_or_subdomain(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_rules_match_everything() {
        assert!(matches(&[], "https://anything.test/"));
        assert!(matches(&[], "not even a url"));
        assert!(DomainMatcher::new(&[]).is_global());
    }

    #[test]
    fn domain_matches_host_and_subdomains() {
        let rules = [DomainRule::domain("example.com")];
        assert!(matches(&rules, "https://example.com/x"));
        assert!(matches(&rules, "https://sub.example.com"));
        assert!(matches(&rules, "https://a.b.example.com:8443/path"));
        assert!(!matches(&rules, "https://notexample.com"));
        assert!(!matches(&rules, "https://example.com.evil.test/"));
    }

    #[test]
    fn www_is_insignificant_on_both_sides() {
        assert!(matches(&[DomainRule::domain("www.example.com")], "https://example.com/"));
        assert!(matches(&[DomainRule::domain("example.com")], "https://www.example.com/"));
        assert!(matches(&[DomainRule::domain("WWW.Example.com")], "https://www.EXAMPLE.com/"));
    }

    #[test]
    fn unicode_domains_compare_as_punycode() {
        let rules = [DomainRule::domain("bücher.de")];
        assert!(matches(&rules, "https://bücher.de/"));
        assert!(matches(&rules, "https://xn--bcher-kva.de/"));
        assert!(matches(&rules, "https://shop.BÜCHER.de/"));
        assert!(!matches(&rules, "https://buecher.de/"));
        assert!(matches(&[DomainRule::domain("xn--bcher-kva.de")], "https://www.bücher.de/"));
    }

    #[test]
    fn domain_never_matches_unparsable_urls() {
        assert!(!matches(&[DomainRule::domain("example.com")], "example.com"));
        assert!(!matches(&[DomainRule::domain("")], "https://example.com"));
    }

    #[test]
    fn url_is_exact() {
        let rules = [DomainRule::url("https://example.com/a")];
        assert!(matches(&rules, "https://example.com/a"));
        assert!(!matches(&rules, "https://example.com/a/"));
        assert!(!matches(&rules, "https://example.com/"));
    }

    #[test]
    fn url_prefix() {
        let rules = [DomainRule::url_prefix("https://example.com/app")];
        assert!(matches(&rules, "https://example.com/app/page"));
        assert!(matches(&rules, "https://example.com/app"));
        assert!(!matches(&rules, "https://example.com/ap"));
    }

    #[test]
    fn regexp_finds_match_anywhere() {
        let rules = [DomainRule::regexp(r"/issues/\d+")];
        assert!(matches(&rules, "https://git.test/repo/issues/42"));
        assert!(!matches(&rules, "https://git.test/repo/pulls/42"));
    }

    #[test]
    fn regexp_supports_lookaround() {
        let rules = [DomainRule::regexp(r"https://(?!www\.)example\.com/.*")];
        assert!(matches(&rules, "https://example.com/a"));
        assert!(!matches(&rules, "https://www.example.com/a"));
        assert!(!matches(&rules, "https://unrelated.test/"));

        let rules = [DomainRule::regexp(r"^https://(\w+)\.test/\1/")];
        assert!(matches(&rules, "https://docs.test/docs/intro"));
        assert!(!matches(&rules, "https://docs.test/blog/intro"));
    }

    #[test]
    fn invalid_regexp_never_matches() {
        let rules = [DomainRule::regexp("[bad")];
        assert!(!matches(&rules, "https://[bad.test/"));
    }

    #[test]
    fn any_rule_is_enough() {
        let rules = [
            DomainRule::domain("a.test"),
            DomainRule::url_prefix("https://b.test/docs"),
        ];
        assert!(matches(&rules, "https://a.test/"));
        assert!(matches(&rules, "https://b.test/docs/intro"));
        assert!(!matches(&rules, "https://b.test/blog"));
    }

    #[test]
    fn matcher_is_reusable() {
        let matcher = DomainMatcher::new(&[DomainRule::regexp("^https://")]);
        assert!(matcher.is_match("https://x.test"));
        assert!(!matcher.is_match("http://x.test"));
        assert!(!matcher.is_global());
    }
}
