// token.rs — Pattern tokens: the leaf matchers of every strategy.
//
// A token tests a goal's label either by substring containment (literal) or
// by regex search. It carries:
//   - complement: invert the matched/unmatched outcome
//   - max_matches: cap on emissions per evaluation (negative = unbounded)
//   - a template, so it can be re-instantiated with capture bindings
//
// A token whose template still has placeholders is "unresolved": it cannot
// be evaluated until `instantiate()` fills the placeholders in.

use std::fmt;
use std::sync::Arc;

use regex::{Captures, Regex};

use crate::cache::PatternCache;
use crate::error::OracleError;
use crate::goal::{Bindings, Goal};
use crate::template::{Substitution, Template};

/// Which test a token applies to a goal label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    /// Substring containment. Never captures.
    Literal,
    /// Regex search anywhere in the label. Named groups become bindings.
    Regex,
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternKind::Literal => write!(f, "literal"),
            PatternKind::Regex => write!(f, "regex"),
        }
    }
}

/// The concrete test of a resolved token. Cloning is cheap: literal text or
/// a shared compiled regex.
#[derive(Debug, Clone)]
enum Matcher {
    Literal(String),
    Regex(Arc<Regex>),
}

impl Matcher {
    /// Test a label. `Some(bindings)` on a match, `None` otherwise.
    fn search(&self, label: &str) -> Option<Bindings> {
        match self {
            Matcher::Literal(text) => label.contains(text.as_str()).then(Bindings::new),
            Matcher::Regex(regex) => regex
                .captures(label)
                .map(|caps| capture_bindings(regex, &caps)),
        }
    }
}

/// Extract every named group of `regex` from `caps`. Groups that did not
/// participate in the match bind to the empty string. Values are stored raw;
/// escaping happens when they are substituted into a regex template.
fn capture_bindings(regex: &Regex, caps: &Captures<'_>) -> Bindings {
    regex
        .capture_names()
        .flatten()
        .map(|name| {
            let value = caps.name(name).map_or("", |m| m.as_str());
            (name.to_string(), value.to_string())
        })
        .collect()
}

/// A pattern token.
#[derive(Debug, Clone)]
pub struct Token {
    kind: PatternKind,
    template: Template,
    matcher: Option<Matcher>,
    complement: bool,
    max_matches: i64,
}

impl Token {
    /// Cap applied when a token is created without an explicit one.
    pub const DEFAULT_MAX_MATCHES: i64 = 3;

    /// A substring token. `text` may contain `{name}` placeholders.
    pub fn literal(text: &str) -> Self {
        let template = Template::parse(text);
        let matcher = template
            .resolve(&Bindings::new(), Substitution::Raw)
            .ok()
            .map(Matcher::Literal);
        Self {
            kind: PatternKind::Literal,
            template,
            matcher,
            complement: false,
            max_matches: Self::DEFAULT_MAX_MATCHES,
        }
    }

    /// A regex token. A concrete source is compiled immediately through
    /// `cache`; a templated source is compiled when instantiated.
    pub fn regex(source: &str, cache: &PatternCache) -> Result<Self, OracleError> {
        let template = Template::parse(source);
        let matcher = if template.is_concrete() {
            let resolved = template.resolve(&Bindings::new(), Substitution::RegexEscaped)?;
            Some(Matcher::Regex(cache.compile(&resolved)?))
        } else {
            None
        };
        Ok(Self {
            kind: PatternKind::Regex,
            template,
            matcher,
            complement: false,
            max_matches: Self::DEFAULT_MAX_MATCHES,
        })
    }

    /// Invert the matched/unmatched outcome.
    pub fn with_complement(mut self, complement: bool) -> Self {
        self.complement = complement;
        self
    }

    /// Set the emission cap; any negative value means unbounded.
    pub fn with_max_matches(mut self, max_matches: i64) -> Self {
        self.max_matches = max_matches;
        self
    }

    /// Remove the emission cap.
    pub fn unbounded(self) -> Self {
        self.with_max_matches(-1)
    }

    pub fn kind(&self) -> PatternKind {
        self.kind
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn is_complement(&self) -> bool {
        self.complement
    }

    pub fn max_matches(&self) -> i64 {
        self.max_matches
    }

    /// True when every placeholder has been filled in.
    pub fn is_resolved(&self) -> bool {
        self.matcher.is_some()
    }

    /// Test one goal.
    ///
    /// Returns the goal re-wrapped with this match's captures (empty for
    /// literal and complemented matches), or `None` when the goal is
    /// rejected.
    pub fn match_goal(&self, goal: &Goal) -> Result<Option<Goal>, OracleError> {
        Ok(emit(self.matcher()?, self.complement, goal))
    }

    /// Lazily test every goal in order, stopping after `max_matches`
    /// emissions unless the cap is negative.
    pub fn match_all<'a>(&self, goals: &'a [Goal]) -> Result<MatchAll<'a>, OracleError> {
        Ok(MatchAll {
            matcher: self.matcher()?.clone(),
            complement: self.complement,
            remaining: usize::try_from(self.max_matches).ok(),
            goals: goals.iter(),
        })
    }

    /// Produce a new token with `goal`'s bindings substituted into the
    /// template. Regex tokens escape each value and go through `cache`.
    pub fn instantiate(&self, goal: &Goal, cache: &PatternCache) -> Result<Token, OracleError> {
        let matcher = match self.kind {
            PatternKind::Literal => {
                Matcher::Literal(self.template.resolve(goal.bindings(), Substitution::Raw)?)
            }
            PatternKind::Regex => {
                let source = self
                    .template
                    .resolve(goal.bindings(), Substitution::RegexEscaped)?;
                Matcher::Regex(cache.compile(&source)?)
            }
        };
        Ok(Token {
            kind: self.kind,
            template: self.template.clone(),
            matcher: Some(matcher),
            complement: self.complement,
            max_matches: self.max_matches,
        })
    }

    /// The resolved source text this token tests with: the literal text or
    /// the regex source. `None` while unresolved.
    pub fn pattern(&self) -> Option<&str> {
        self.matcher.as_ref().map(|matcher| match matcher {
            Matcher::Literal(text) => text.as_str(),
            Matcher::Regex(regex) => regex.as_str(),
        })
    }

    fn matcher(&self) -> Result<&Matcher, OracleError> {
        self.matcher
            .as_ref()
            .ok_or_else(|| OracleError::MissingBinding {
                name: self.template.placeholders().next().unwrap_or_default().to_string(),
                template: self.template.source().to_string(),
            })
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.complement {
            write!(f, "!")?;
        }
        write!(
            f,
            "{}({})",
            self.kind,
            self.pattern().unwrap_or(self.template.source())
        )
    }
}

/// Apply the complement rule to one goal.
fn emit(matcher: &Matcher, complement: bool, goal: &Goal) -> Option<Goal> {
    match (matcher.search(goal.label()), complement) {
        (Some(bindings), false) => Some(goal.with_bindings(bindings)),
        (None, true) => Some(goal.with_bindings(Bindings::new())),
        _ => None,
    }
}

/// Lazy, capped iterator over the goals a token accepts.
///
/// Holds its own copy of the matcher, so it can outlive the (possibly
/// freshly instantiated) token that created it.
#[derive(Debug, Clone)]
pub struct MatchAll<'a> {
    matcher: Matcher,
    complement: bool,
    remaining: Option<usize>,
    goals: std::slice::Iter<'a, Goal>,
}

impl Iterator for MatchAll<'_> {
    type Item = Goal;

    fn next(&mut self) -> Option<Goal> {
        if self.remaining == Some(0) {
            return None;
        }
        for goal in self.goals.by_ref() {
            if let Some(matched) = emit(&self.matcher, self.complement, goal) {
                if let Some(remaining) = self.remaining.as_mut() {
                    *remaining -= 1;
                }
                return Some(matched);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goals(labels: &[&str]) -> Vec<Goal> {
        labels
            .iter()
            .enumerate()
            .map(|(i, label)| Goal::new(i as u64 + 1, *label))
            .collect()
    }

    fn ids(matches: impl Iterator<Item = Goal>) -> Vec<u64> {
        matches.map(|g| g.id()).collect()
    }

    // ── Literal tokens ───────────────────────────────────────────

    #[test]
    fn literal_matches_substring() {
        let token = Token::literal("Session(");
        let goal = Goal::new(1, "Session( A ) ▶₀ #t");
        let matched = token.match_goal(&goal).unwrap().unwrap();
        assert_eq!(matched.id(), 1);
        assert!(matched.bindings().is_empty());
        assert!(token.match_goal(&Goal::new(2, "Other")).unwrap().is_none());
    }

    #[test]
    fn literal_does_not_interpret_metacharacters() {
        let token = Token::literal("a.b");
        assert!(token.match_goal(&Goal::new(1, "xa.by")).unwrap().is_some());
        assert!(token.match_goal(&Goal::new(2, "axb")).unwrap().is_none());
    }

    #[test]
    fn default_cap_is_three() {
        let token = Token::literal("x");
        assert_eq!(token.max_matches(), Token::DEFAULT_MAX_MATCHES);
        let gs = goals(&["x1", "x2", "x3", "x4", "x5"]);
        assert_eq!(ids(token.match_all(&gs).unwrap()), vec![1, 2, 3]);
    }

    #[test]
    fn negative_cap_is_unbounded() {
        let token = Token::literal("x").unbounded();
        let gs = goals(&["x1", "y", "x2", "x3", "x4", "x5"]);
        assert_eq!(ids(token.match_all(&gs).unwrap()), vec![1, 3, 4, 5, 6]);
    }

    #[test]
    fn zero_cap_yields_nothing() {
        let token = Token::literal("x").with_max_matches(0);
        let gs = goals(&["x1", "x2"]);
        assert_eq!(token.match_all(&gs).unwrap().count(), 0);
    }

    #[test]
    fn match_all_is_restartable() {
        let token = Token::literal("x").with_max_matches(2);
        let gs = goals(&["x1", "y", "x2", "x3"]);
        let first = ids(token.match_all(&gs).unwrap());
        let second = ids(token.match_all(&gs).unwrap());
        assert_eq!(first, vec![1, 3]);
        assert_eq!(first, second);
    }

    // ── Regex tokens ─────────────────────────────────────────────

    #[test]
    fn regex_searches_anywhere() {
        let cache = PatternCache::new();
        let token = Token::regex(r"▶. #t$", &cache).unwrap();
        assert!(token
            .match_goal(&Goal::new(1, "Session( x ) ▶₁ #t"))
            .unwrap()
            .is_some());
        assert!(token
            .match_goal(&Goal::new(2, "Session( x ) ▶₁ #t1"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn regex_captures_named_groups() {
        let cache = PatternCache::new();
        let token = Token::regex(
            r"^To(Sender|Receiver)\(\s*\)\s*@ (?P<tvar>#\w+(\.\d+)?)$",
            &cache,
        )
        .unwrap();
        let matched = token
            .match_goal(&Goal::new(5, "ToSender( ) @ #t.2"))
            .unwrap()
            .unwrap();
        assert_eq!(matched.binding("tvar"), Some("#t.2"));
        assert_eq!(matched.bindings().len(), 1);
    }

    #[test]
    fn unparticipating_group_binds_empty() {
        let cache = PatternCache::new();
        let token = Token::regex(r"a(?P<opt>b)?", &cache).unwrap();
        let matched = token.match_goal(&Goal::new(1, "ac")).unwrap().unwrap();
        assert_eq!(matched.binding("opt"), Some(""));
    }

    #[test]
    fn new_captures_replace_prior_bindings() {
        let cache = PatternCache::new();
        let first = Token::regex(r"(?P<a>\d)", &cache).unwrap();
        let second = Token::regex(r"(?P<b>[a-z])", &cache).unwrap();
        let goal = Goal::new(1, "x1");
        let once = first.match_goal(&goal).unwrap().unwrap();
        let twice = second.match_goal(&once).unwrap().unwrap();
        assert_eq!(twice.binding("a"), None);
        assert_eq!(twice.binding("b"), Some("x"));
    }

    #[test]
    fn regex_tokens_share_cached_patterns() {
        let cache = PatternCache::new();
        let a = Token::regex("Session", &cache).unwrap();
        let b = Token::regex("Session", &cache).unwrap();
        assert_eq!(a.pattern(), b.pattern());
        assert_eq!(cache.stats().misses, 1);
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn invalid_regex_is_rejected() {
        let cache = PatternCache::new();
        assert!(matches!(
            Token::regex("Session(", &cache),
            Err(OracleError::InvalidPattern { .. })
        ));
    }

    // ── Complement ───────────────────────────────────────────────

    #[test]
    fn complement_inverts_and_drops_bindings() {
        let cache = PatternCache::new();
        let token = Token::regex(r"(?P<x>b)", &cache)
            .unwrap()
            .with_complement(true)
            .unbounded();
        let gs = goals(&["abc", "xyz", "b", "q"]);
        let matched: Vec<Goal> = token.match_all(&gs).unwrap().collect();
        assert_eq!(matched.iter().map(Goal::id).collect::<Vec<_>>(), vec![2, 4]);
        assert!(matched.iter().all(|g| g.bindings().is_empty()));
    }

    // ── Instantiation ────────────────────────────────────────────

    #[test]
    fn unresolved_token_cannot_be_evaluated() {
        let cache = PatternCache::new();
        let token = Token::regex(r"@ {tvar}$", &cache).unwrap();
        assert!(!token.is_resolved());
        assert!(matches!(
            token.match_all(&[]),
            Err(OracleError::MissingBinding { ref name, .. }) if name == "tvar"
        ));
        // Nothing was compiled for the templated source.
        assert!(cache.is_empty());
    }

    #[test]
    fn instantiate_regex_escapes_bound_values() {
        let cache = PatternCache::new();
        let when = Token::regex(r"KU\( (?P<sk>[^ ]+) \)", &cache).unwrap();
        let then = Token::regex(r"^Gen.+{sk} \)$", &cache).unwrap();

        let fact = when
            .match_goal(&Goal::new(1, "KU( sk.1 )"))
            .unwrap()
            .unwrap();
        let concrete = then.instantiate(&fact, &cache).unwrap();
        assert_eq!(concrete.pattern(), Some(r"^Gen.+sk\.1 \)$"));

        assert!(concrete
            .match_goal(&Goal::new(2, "Gen( x, sk.1 )"))
            .unwrap()
            .is_some());
        assert!(concrete
            .match_goal(&Goal::new(3, "Gen( x, skx1 )"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn instantiate_literal_inserts_raw_text() {
        let cache = PatternCache::new();
        let capture = Token::regex(r"foo\((?P<x>[^)]*)\)", &cache).unwrap();
        let fact = capture
            .match_goal(&Goal::new(1, "foo(bar)"))
            .unwrap()
            .unwrap();
        let literal = Token::literal("{x}").instantiate(&fact, &cache).unwrap();
        assert_eq!(literal.pattern(), Some("bar"));
    }

    #[test]
    fn instantiate_preserves_flags() {
        let cache = PatternCache::new();
        let token = Token::literal("{x}").with_complement(true).with_max_matches(7);
        let goal = Goal::new(1, "a").with_bindings(
            [("x".to_string(), "a".to_string())].into_iter().collect(),
        );
        let concrete = token.instantiate(&goal, &cache).unwrap();
        assert!(concrete.is_complement());
        assert_eq!(concrete.max_matches(), 7);
        assert_eq!(concrete.kind(), PatternKind::Literal);
    }

    #[test]
    fn instantiate_reports_missing_binding() {
        let cache = PatternCache::new();
        let token = Token::regex(r"@ {tvar}$", &cache).unwrap();
        let err = token.instantiate(&Goal::new(1, "x"), &cache).unwrap_err();
        assert!(matches!(err, OracleError::MissingBinding { ref name, .. } if name == "tvar"));
    }

    #[test]
    fn display_shows_kind_and_pattern() {
        let cache = PatternCache::new();
        assert_eq!(Token::literal("a").to_string(), "literal(a)");
        assert_eq!(
            Token::regex("b+", &cache)
                .unwrap()
                .with_complement(true)
                .to_string(),
            "!regex(b+)"
        );
    }
}
