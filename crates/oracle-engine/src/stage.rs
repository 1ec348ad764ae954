// stage.rs — Strategy expressions as values.
//
// A `Stage` is the variant-typed form of a strategy: a tree of tokens and
// combinators. Strategy tables build these from configuration; the engine
// only evaluates them.

use std::fmt;

use crate::cache::PatternCache;
use crate::combinator::{self, GoalStream};
use crate::goal::Goal;
use crate::token::Token;

/// Operands of a conditional join.
#[derive(Debug, Clone)]
pub struct WhenThen {
    pub when: Token,
    pub then: Token,
    pub also: Option<Token>,
    pub also_neg: bool,
}

/// Operands of a negative join.
#[derive(Debug, Clone)]
pub struct MatchUnless {
    pub then: Token,
    pub unless: Token,
}

/// One node of a strategy expression.
#[derive(Debug, Clone)]
pub enum Stage {
    /// A bare token, evaluated with its own cap.
    Token(Token),
    /// Ordered alternation over the same candidates.
    Prioritize(Vec<Stage>),
    /// Sequential narrowing.
    Compose(Vec<Stage>),
    /// Conditional join.
    WhenThen(WhenThen),
    /// Negative join.
    MatchUnless(MatchUnless),
    /// Reorder candidates, longest label first.
    SortByLabelLength,
    /// Fall back to the candidates when the inner stage yields nothing.
    PreserveIfEmpty(Box<Stage>),
}

impl Stage {
    /// The strategy that selects nothing: an empty alternation.
    ///
    /// Unknown strategy names resolve to this.
    pub fn empty() -> Self {
        Stage::Prioritize(Vec::new())
    }

    /// True for the empty alternation.
    pub fn is_empty(&self) -> bool {
        matches!(self, Stage::Prioritize(stages) if stages.is_empty())
    }

    pub fn when_then(when: Token, then: Token) -> Self {
        Stage::WhenThen(WhenThen {
            when,
            then,
            also: None,
            also_neg: false,
        })
    }

    pub fn when_then_also(when: Token, then: Token, also: Token, also_neg: bool) -> Self {
        Stage::WhenThen(WhenThen {
            when,
            then,
            also: Some(also),
            also_neg,
        })
    }

    pub fn match_unless(then: Token, unless: Token) -> Self {
        Stage::MatchUnless(MatchUnless { then, unless })
    }

    /// Evaluate this stage against `candidates`.
    pub fn evaluate<'a>(&'a self, candidates: &'a [Goal], cache: &'a PatternCache) -> GoalStream<'a> {
        match self {
            Stage::Token(token) => combinator::match_token(token, candidates),
            Stage::Prioritize(stages) => combinator::prioritize(stages, candidates, cache),
            Stage::Compose(stages) => combinator::compose(stages, candidates, cache),
            Stage::WhenThen(join) => combinator::when_then(
                &join.when,
                &join.then,
                join.also.as_ref(),
                join.also_neg,
                candidates,
                cache,
            ),
            Stage::MatchUnless(join) => {
                combinator::match_unless(&join.then, &join.unless, candidates, cache)
            }
            Stage::SortByLabelLength => combinator::sort_by_label_length(candidates),
            Stage::PreserveIfEmpty(inner) => combinator::preserve_if_empty(inner, candidates, cache),
        }
    }
}

impl From<Token> for Stage {
    fn from(token: Token) -> Self {
        Stage::Token(token)
    }
}

/// Compact one-line rendering, used in debug logs.
impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn list(f: &mut fmt::Formatter<'_>, name: &str, stages: &[Stage]) -> fmt::Result {
            write!(f, "{}[", name)?;
            for (i, stage) in stages.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", stage)?;
            }
            write!(f, "]")
        }

        match self {
            Stage::Token(token) => write!(f, "{}", token),
            Stage::Prioritize(stages) => list(f, "prioritize", stages),
            Stage::Compose(stages) => list(f, "compose", stages),
            Stage::WhenThen(join) => {
                write!(f, "when_then({} => {}", join.when, join.then)?;
                if let Some(also) = &join.also {
                    write!(f, ", also{} {}", if join.also_neg { " not" } else { "" }, also)?;
                }
                write!(f, ")")
            }
            Stage::MatchUnless(join) => write!(f, "match_unless({} unless {})", join.then, join.unless),
            Stage::SortByLabelLength => write!(f, "sort_by_label_length"),
            Stage::PreserveIfEmpty(inner) => write!(f, "preserve_if_empty({})", inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goal::parse_goals;

    #[test]
    fn empty_stage_selects_nothing() {
        let cache = PatternCache::new();
        let goals = parse_goals("1: a\n2: b").unwrap();
        let stage = Stage::empty();
        assert!(stage.is_empty());
        assert_eq!(stage.evaluate(&goals, &cache).count(), 0);
    }

    #[test]
    fn nested_combinators_compose() {
        let cache = PatternCache::new();
        let goals = parse_goals("1: a\n2: b\n3: c").unwrap();
        // Mirrors a debugging strategy: drop "b", then prefer a-if-c, then
        // c-unless-b.
        let stage = Stage::Compose(vec![
            Token::literal("b").with_complement(true).unbounded().into(),
            Stage::Prioritize(vec![
                Stage::when_then(Token::literal("c"), Token::literal("a")),
                Stage::match_unless(Token::literal("c"), Token::literal("b")),
            ]),
        ]);
        let ids: Vec<u64> = stage
            .evaluate(&goals, &cache)
            .map(|g| g.unwrap().id())
            .collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn display_renders_tree() {
        let stage = Stage::Prioritize(vec![
            Token::literal("a").into(),
            Stage::PreserveIfEmpty(Box::new(Stage::SortByLabelLength)),
        ]);
        assert_eq!(
            stage.to_string(),
            "prioritize[literal(a), preserve_if_empty(sort_by_label_length)]"
        );
    }
}
