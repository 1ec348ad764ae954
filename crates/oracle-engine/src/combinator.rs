// combinator.rs — Composition primitives over ordered goal collections.
//
// Every combinator takes the candidate collection by reference and returns a
// lazy `GoalStream`. Nothing here mutates its input.
//
//   prioritize   each stage against the SAME candidates, outputs concatenated
//   compose      stage N's full output becomes stage N+1's candidates
//   when_then    for each WHEN match, emit instantiated THEN matches,
//                optionally gated on an instantiated ALSO existing (or not)
//   match_unless emit THEN matches whose instantiated UNLESS finds nothing
//
// Capture bindings are scoped to one combinator evaluation: a nested
// combinator derives its own bindings from its own WHEN/THEN matches.

use std::iter;

use crate::cache::PatternCache;
use crate::error::OracleError;
use crate::goal::Goal;
use crate::stage::Stage;
use crate::token::Token;

/// A lazy, ordered, fallible sequence of goals.
///
/// Errors (a missing binding or a bad pattern discovered during
/// instantiation) are yielded in place and end the useful part of the
/// stream; the selection driver stops at the first one.
pub type GoalStream<'a> = Box<dyn Iterator<Item = Result<Goal, OracleError>> + 'a>;

/// A stream that yields a single error.
pub(crate) fn failed<'a>(err: OracleError) -> GoalStream<'a> {
    Box::new(iter::once(Err(err)))
}

/// Lazily evaluate a token over `candidates`.
pub fn match_token<'a>(token: &Token, candidates: &'a [Goal]) -> GoalStream<'a> {
    match token.match_all(candidates) {
        Ok(matches) => Box::new(matches.map(Ok)),
        Err(err) => failed(err),
    }
}

/// Ordered alternation: every stage sees the original candidates; stage 1's
/// output comes first, then stage 2's, and so on. Nothing is discarded.
pub fn prioritize<'a>(
    stages: &'a [Stage],
    candidates: &'a [Goal],
    cache: &'a PatternCache,
) -> GoalStream<'a> {
    Box::new(
        stages
            .iter()
            .flat_map(move |stage| stage.evaluate(candidates, cache)),
    )
}

/// Sequential pipeline: each stage's output is materialized and becomes the
/// next stage's candidate collection. With no stages the candidates pass
/// through unchanged.
pub fn compose<'a>(
    stages: &'a [Stage],
    candidates: &'a [Goal],
    cache: &'a PatternCache,
) -> GoalStream<'a> {
    let mut current = candidates.to_vec();
    for stage in stages {
        let next: Result<Vec<Goal>, OracleError> = stage.evaluate(&current, cache).collect();
        match next {
            Ok(next) => current = next,
            Err(err) => return failed(err),
        }
    }
    Box::new(current.into_iter().map(Ok))
}

/// Conditional join.
///
/// For each goal `when` matches, `then` (and `also`, if present) is
/// instantiated with that match's bindings. With `also`, the WHEN match is
/// skipped when `also` finds nothing (or, with `also_neg`, when it finds
/// something). Otherwise every goal the instantiated `then` matches is
/// emitted, in `then`'s own capped order.
pub fn when_then<'a>(
    when: &'a Token,
    then: &'a Token,
    also: Option<&'a Token>,
    also_neg: bool,
    candidates: &'a [Goal],
    cache: &'a PatternCache,
) -> GoalStream<'a> {
    let facts = match when.match_all(candidates) {
        Ok(facts) => facts,
        Err(err) => return failed(err),
    };

    Box::new(facts.flat_map(move |fact| -> GoalStream<'a> {
        if let Some(also) = also {
            match exists(also, &fact, candidates, cache) {
                Ok(found) if found == also_neg => {
                    tracing::trace!(goal = fact.id(), also = %also, found, "when_then: gated out");
                    return Box::new(iter::empty());
                }
                Ok(_) => {}
                Err(err) => return failed(err),
            }
        }
        match then.instantiate(&fact, cache) {
            Ok(concrete) => match_token(&concrete, candidates),
            Err(err) => failed(err),
        }
    }))
}

/// Negative join: emit each `then` match unless `unless`, instantiated with
/// that match's bindings, matches anything in `candidates`.
pub fn match_unless<'a>(
    then: &'a Token,
    unless: &'a Token,
    candidates: &'a [Goal],
    cache: &'a PatternCache,
) -> GoalStream<'a> {
    let facts = match then.match_all(candidates) {
        Ok(facts) => facts,
        Err(err) => return failed(err),
    };

    Box::new(
        facts.filter_map(move |fact| match exists(unless, &fact, candidates, cache) {
            Ok(true) => None,
            Ok(false) => Some(Ok(fact)),
            Err(err) => Some(Err(err)),
        }),
    )
}

/// The candidates ordered by label length, longest first. Equal lengths keep
/// their input order.
pub fn sort_by_label_length<'a>(candidates: &'a [Goal]) -> GoalStream<'a> {
    let mut sorted = candidates.to_vec();
    sorted.sort_by_key(|goal| std::cmp::Reverse(goal.label().chars().count()));
    Box::new(sorted.into_iter().map(Ok))
}

/// Evaluate `stage`; if it yields nothing, pass the candidates through
/// unchanged instead.
pub fn preserve_if_empty<'a>(
    stage: &'a Stage,
    candidates: &'a [Goal],
    cache: &'a PatternCache,
) -> GoalStream<'a> {
    let matches: Result<Vec<Goal>, OracleError> = stage.evaluate(candidates, cache).collect();
    match matches {
        Ok(matches) if matches.is_empty() => Box::new(candidates.iter().cloned().map(Ok)),
        Ok(matches) => Box::new(matches.into_iter().map(Ok)),
        Err(err) => failed(err),
    }
}

/// Does `template`, instantiated with `fact`'s bindings, match any candidate?
fn exists(
    template: &Token,
    fact: &Goal,
    candidates: &[Goal],
    cache: &PatternCache,
) -> Result<bool, OracleError> {
    let concrete = template.instantiate(fact, cache)?;
    Ok(concrete.match_all(candidates)?.next().is_some())
}
