//! Pattern compilation: turns the raw [`RuleConfig`] into matchers, once per run.
//!
//! Glob syntax understood by [`compile_glob`]:
//! - `**` matches any run of characters, `/` included
//! - `*` matches any run of characters except `/`
//! - `?` matches exactly one character
//! - everything else matches itself
//!
//! Every matcher is anchored to the whole normalized filename. Compilation never
//! fails: a pattern the regex engine rejects degrades to a literal comparison.

use std::collections::HashMap;

use regex::Regex;
use tracing::{debug, warn};

use crate::config::RuleConfig;

/// Opaque "does this normalized path match" capability produced by [`compile_glob`].
#[derive(Debug, Clone)]
pub struct PathMatcher {
    pattern: String,
    kind: MatcherKind,
}

#[derive(Debug, Clone)]
enum MatcherKind {
    Regex(Regex),
    Literal,
}

impl PathMatcher {
    pub fn matches(&self, path: &str) -> bool {
        match &self.kind {
            MatcherKind::Regex(re) => re.is_match(path),
            MatcherKind::Literal => path == self.pattern,
        }
    }

    /// The glob this matcher was compiled from.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn is_literal_fallback(&self) -> bool {
        matches!(self.kind, MatcherKind::Literal)
    }
}

/// Translate a glob into an anchored regular expression source.
pub fn glob_to_regex(glob: &str) -> String {
    let mut out = String::with_capacity(glob.len() + 8);
    out.push('^');
    let mut chars = glob.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' if chars.peek() == Some(&'*') => {
                chars.next();
                out.push_str(".*");
            }
            '*' => out.push_str("[^/]*"),
            '?' => out.push('.'),
            other => {
                let mut buf = [0u8; 4];
                out.push_str(&regex::escape(other.encode_utf8(&mut buf)));
            }
        }
    }
    out.push('$');
    out
}

pub fn compile_glob(glob: &str) -> PathMatcher {
    let source = glob_to_regex(glob);
    let kind = match Regex::new(&source) {
        Ok(re) => MatcherKind::Regex(re),
        Err(e) => {
            warn!(pattern = %glob, error = %e, "Glob could not be compiled, matching it literally");
            MatcherKind::Literal
        }
    };
    PathMatcher {
        pattern: glob.to_string(),
        kind,
    }
}

pub fn compile_keyword(keyword: &str) -> String {
    keyword.to_lowercase()
}

#[derive(Debug, Clone)]
pub struct DomainRule {
    pub name: String,
    pub patterns: Vec<PathMatcher>,
}

impl DomainRule {
    pub fn matches(&self, path: &str) -> bool {
        self.patterns.iter().any(|m| m.matches(path))
    }
}

#[derive(Debug, Clone)]
pub struct SignalRule {
    pub name: String,
    /// Lowercase keywords.
    pub keywords: Vec<String>,
}

impl SignalRule {
    /// `haystack` must already be lowercase.
    pub fn matches(&self, haystack: &str) -> bool {
        self.keywords.iter().any(|k| haystack.contains(k.as_str()))
    }
}

/// Exclude matchers, domain rules and signal rules, ready for classification.
#[derive(Debug, Clone, Default)]
pub struct CompiledRules {
    pub exclude: Vec<PathMatcher>,
    pub domains: Vec<DomainRule>,
    pub signals: Vec<SignalRule>,
}

impl CompiledRules {
    pub fn compile(config: &RuleConfig) -> Self {
        let mut cache = GlobCache::default();

        let exclude = config
            .exclude_paths
            .iter()
            .map(|p| cache.get(p))
            .collect();

        let domains = config
            .domain_map
            .iter()
            .map(|rule| DomainRule {
                name: rule.name.clone(),
                patterns: rule.patterns.iter().map(|p| cache.get(p)).collect(),
            })
            .collect();

        let signals = config
            .signal_keywords
            .iter()
            .map(|rule| SignalRule {
                name: rule.name.clone(),
                keywords: rule.keywords.iter().map(|k| compile_keyword(k)).collect(),
            })
            .collect();

        debug!(distinct_globs = cache.len(), "Compiled rule config");
        CompiledRules {
            exclude,
            domains,
            signals,
        }
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        self.exclude.iter().any(|m| m.matches(path))
    }
}

/// One compilation per distinct glob string.
#[derive(Default)]
struct GlobCache {
    compiled: HashMap<String, PathMatcher>,
}

impl GlobCache {
    fn get(&mut self, glob: &str) -> PathMatcher {
        self.compiled
            .entry(glob.to_string())
            .or_insert_with(|| compile_glob(glob))
            .clone()
    }

    fn len(&self) -> usize {
        self.compiled.len()
    }
}
