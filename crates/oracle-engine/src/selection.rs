// selection.rs — Selection driver.
//
// Runs one strategy over the canonical goal collection, consumes its stream
// to completion, and keeps the first occurrence of each goal id in emission
// order. The first error in the stream aborts the run.

use std::collections::HashSet;

use crate::cache::PatternCache;
use crate::combinator::GoalStream;
use crate::error::OracleError;
use crate::goal::Goal;
use crate::stage::Stage;

/// Anything the driver can run: a callable from candidates to a goal stream.
///
/// `Stage` is the built-in implementation; embedders can supply their own.
pub trait Strategy {
    fn evaluate<'a>(&'a self, candidates: &'a [Goal], cache: &'a PatternCache) -> GoalStream<'a>;
}

impl Strategy for Stage {
    fn evaluate<'a>(&'a self, candidates: &'a [Goal], cache: &'a PatternCache) -> GoalStream<'a> {
        Stage::evaluate(self, candidates, cache)
    }
}

/// Run `strategy` once over `goals` and return the ranked, deduplicated ids.
pub fn select<S>(strategy: &S, goals: &[Goal], cache: &PatternCache) -> Result<Vec<u64>, OracleError>
where
    S: Strategy + ?Sized,
{
    let mut seen = HashSet::new();
    let mut ranked = Vec::new();
    let mut emitted = 0usize;

    for goal in strategy.evaluate(goals, cache) {
        let goal = goal?;
        emitted += 1;
        if seen.insert(goal.id()) {
            ranked.push(goal.id());
        }
    }

    tracing::debug!(
        candidates = goals.len(),
        emitted,
        selected = ranked.len(),
        "selection complete"
    );
    Ok(ranked)
}

/// Keep the first occurrence of each id, preserving order.
pub fn dedup_ids<I>(ids: I) -> Vec<u64>
where
    I: IntoIterator<Item = u64>,
{
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goal::parse_goals;
    use crate::token::Token;

    #[test]
    fn select_dedups_in_first_occurrence_order() {
        let cache = PatternCache::new();
        let goals = parse_goals("1: ab\n2: b\n3: a").unwrap();
        let stage = Stage::Prioritize(vec![
            Token::literal("b").into(),
            Token::literal("a").into(),
        ]);
        assert_eq!(select(&stage, &goals, &cache).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn select_propagates_errors() {
        let cache = PatternCache::new();
        let goals = parse_goals("1: a").unwrap();
        let stage = Stage::Token(Token::literal("{x}"));
        assert!(matches!(
            select(&stage, &goals, &cache),
            Err(OracleError::MissingBinding { .. })
        ));
    }

    #[test]
    fn dedup_ids_is_idempotent() {
        let once = dedup_ids([3, 1, 3, 2, 1]);
        assert_eq!(once, vec![3, 1, 2]);
        assert_eq!(dedup_ids(once.clone()), once);
    }

    #[test]
    fn custom_strategy_implementation() {
        struct Reverse;
        impl Strategy for Reverse {
            fn evaluate<'a>(
                &'a self,
                candidates: &'a [Goal],
                _cache: &'a PatternCache,
            ) -> GoalStream<'a> {
                Box::new(candidates.iter().rev().cloned().map(Ok))
            }
        }

        let cache = PatternCache::new();
        let goals = parse_goals("1: a\n2: b").unwrap();
        assert_eq!(select(&Reverse, &goals, &cache).unwrap(), vec![2, 1]);
    }
}
