// compiler.rs — Strategy compiler.
//
// Turns a `StageSpec` read from YAML into an engine `Stage`:
// 1. Bare strings become literal tokens with the default cap
// 2. Token maps are validated (exactly one of literal/regex)
// 3. Concrete regex sources are compiled through the shared PatternCache
// 4. Templated regex sources are left for instantiation at evaluation time
//
// Compilation is per strategy: only the strategy that was asked for is
// compiled, so a broken pattern in an unrelated entry does not fail the run.

use oracle_engine::{PatternCache, Stage, Token};

use crate::config::{CombinatorSpec, StageSpec, TokenOptions, TokenSpec};
use crate::error::StrategyError;

/// The strategy compiler — transforms YAML stage specs into evaluable stages.
pub struct StrategyCompiler;

impl StrategyCompiler {
    /// Compile `spec` for the strategy called `strategy` (used in errors).
    pub fn compile(
        strategy: &str,
        spec: &StageSpec,
        cache: &PatternCache,
    ) -> Result<Stage, StrategyError> {
        match spec {
            StageSpec::Token(token) => Ok(Stage::Token(Self::token(strategy, token, cache)?)),
            StageSpec::Combinator(combinator) => Self::combinator(strategy, combinator, cache),
        }
    }

    fn combinator(
        strategy: &str,
        spec: &CombinatorSpec,
        cache: &PatternCache,
    ) -> Result<Stage, StrategyError> {
        let stage = match spec {
            CombinatorSpec::Prioritize(stages) => {
                Stage::Prioritize(Self::stages(strategy, stages, cache)?)
            }
            CombinatorSpec::Compose(stages) => Stage::Compose(Self::stages(strategy, stages, cache)?),
            CombinatorSpec::WhenThen(join) => {
                let when = Self::token(strategy, &join.when, cache)?;
                let then = Self::token(strategy, &join.then, cache)?;
                match &join.also {
                    Some(also) => Stage::when_then_also(
                        when,
                        then,
                        Self::token(strategy, also, cache)?,
                        join.also_neg,
                    ),
                    None => Stage::when_then(when, then),
                }
            }
            CombinatorSpec::MatchUnless(join) => Stage::match_unless(
                Self::token(strategy, &join.then, cache)?,
                Self::token(strategy, &join.unless, cache)?,
            ),
            CombinatorSpec::SortByLabelLength {} => Stage::SortByLabelLength,
            CombinatorSpec::PreserveIfEmpty(inner) => {
                Stage::PreserveIfEmpty(Box::new(Self::compile(strategy, inner, cache)?))
            }
        };
        Ok(stage)
    }

    fn stages(
        strategy: &str,
        specs: &[StageSpec],
        cache: &PatternCache,
    ) -> Result<Vec<Stage>, StrategyError> {
        specs
            .iter()
            .map(|spec| Self::compile(strategy, spec, cache))
            .collect()
    }

    /// Build a token from its YAML form.
    pub fn token(
        strategy: &str,
        spec: &TokenSpec,
        cache: &PatternCache,
    ) -> Result<Token, StrategyError> {
        match spec {
            TokenSpec::Literal(text) => Ok(Token::literal(text)),
            TokenSpec::Detailed(options) => Self::detailed_token(strategy, options, cache),
        }
    }

    fn detailed_token(
        strategy: &str,
        options: &TokenOptions,
        cache: &PatternCache,
    ) -> Result<Token, StrategyError> {
        let token = match (&options.literal, &options.regex) {
            (Some(text), None) => Token::literal(text),
            (None, Some(source)) => {
                Token::regex(source, cache).map_err(|source| StrategyError::Engine {
                    strategy: strategy.to_string(),
                    source,
                })?
            }
            (Some(_), Some(_)) => {
                return Err(StrategyError::InvalidToken {
                    strategy: strategy.to_string(),
                    reason: "token sets both 'literal' and 'regex'".to_string(),
                })
            }
            (None, None) => {
                return Err(StrategyError::InvalidToken {
                    strategy: strategy.to_string(),
                    reason: "token needs one of 'literal' or 'regex'".to_string(),
                })
            }
        };
        Ok(token
            .with_complement(options.complement)
            .with_max_matches(options.max))
    }
}
