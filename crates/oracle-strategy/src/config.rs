// config.rs — Strategy table file format.
//
// A strategy table is a YAML document mapping strategy names to stage
// expressions:
//
// ```yaml
// strategies:
//   - names: [Auto_Secrecy]
//     stage:
//       compose:
//         - { regex: "!KU\\( hkdf.+'msg_key_ind'", complement: true, max: -1 }
//         - prioritize:
//             - '∀'
//             - { regex: 'MessageSent\(.+@ #t$' }
//   - prefixes: [ChainKeyFormat]
//     stage: { prioritize: [Session] }
// ```
//
// A bare string anywhere a token is expected is a literal token with the
// default cap.

use serde::Deserialize;

/// A whole strategy table file.
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct StrategyFile {
    #[serde(default)]
    pub strategies: Vec<StrategyEntry>,
}

/// One strategy, selectable by exact name or by name prefix.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct StrategyEntry {
    /// Exact names this strategy answers to.
    #[serde(default)]
    pub names: Vec<String>,

    /// Name prefixes this strategy answers to when no exact name matches.
    #[serde(default)]
    pub prefixes: Vec<String>,

    /// Free-form note for humans; ignored by the engine.
    #[serde(default)]
    pub description: Option<String>,

    /// The strategy expression.
    pub stage: StageSpec,
}

impl StrategyEntry {
    /// A short label for logs and errors: the first name, or the first
    /// prefix with a trailing `*`.
    pub fn label(&self) -> String {
        match (self.names.first(), self.prefixes.first()) {
            (Some(name), _) => name.clone(),
            (None, Some(prefix)) => format!("{}*", prefix),
            (None, None) => "<unnamed>".to_string(),
        }
    }

    /// Does this entry answer to `name` exactly?
    pub fn has_name(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Does any of this entry's prefixes start `name`?
    pub fn has_prefix_of(&self, name: &str) -> bool {
        self.prefixes.iter().any(|p| name.starts_with(p.as_str()))
    }
}

/// One node of a strategy expression, as written in YAML.
///
/// `#[serde(untagged)]` tries each variant in order: a token (bare string or
/// token map) first, then a single-key combinator map.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum StageSpec {
    Token(TokenSpec),
    Combinator(CombinatorSpec),
}

/// A token as written in YAML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum TokenSpec {
    /// Bare string: literal substring, default cap.
    Literal(String),
    /// Map form with explicit options.
    Detailed(TokenOptions),
}

/// Map form of a token. Exactly one of `literal` and `regex` must be set.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TokenOptions {
    #[serde(default)]
    pub literal: Option<String>,

    #[serde(default)]
    pub regex: Option<String>,

    /// Invert the match outcome.
    #[serde(default)]
    pub complement: bool,

    /// Emission cap; negative means unbounded.
    #[serde(default = "default_max")]
    pub max: i64,
}

fn default_max() -> i64 {
    oracle_engine::Token::DEFAULT_MAX_MATCHES
}

/// Combinator nodes. Each is a single-key map, e.g. `{ compose: [...] }`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum CombinatorSpec {
    Prioritize(Vec<StageSpec>),
    Compose(Vec<StageSpec>),
    WhenThen(WhenThenSpec),
    MatchUnless(MatchUnlessSpec),
    /// Written as `{ sort_by_label_length: {} }`.
    SortByLabelLength {},
    PreserveIfEmpty(Box<StageSpec>),
}

/// Operands of `when_then`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct WhenThenSpec {
    pub when: TokenSpec,
    pub then: TokenSpec,
    #[serde(default)]
    pub also: Option<TokenSpec>,
    #[serde(default)]
    pub also_neg: bool,
}

/// Operands of `match_unless`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MatchUnlessSpec {
    pub then: TokenSpec,
    pub unless: TokenSpec,
}
