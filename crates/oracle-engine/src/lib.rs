//! # oracle-engine
//!
//! Goal matching and combinator engine for proof-search oracles.
//!
//! A prover streams its pending goals in as `<id>:<label>` lines; the engine
//! runs a strategy over them and returns the goal ids the prover should work
//! on next, best first, each id once.
//!
//! ## Key components
//!
//! - [`Goal`] / [`parse_goals`] — the canonical, immutable goal collection
//! - [`Token`] — literal or regex test with complement, cap, and captures
//! - [`Template`] — typed `{name}` placeholders, escaped on substitution
//! - [`PatternCache`] — process-scoped compiled-regex cache
//! - [`combinator`] — `prioritize`, `compose`, `when_then`, `match_unless`
//! - [`Stage`] — a strategy expression built from the above
//! - [`select`] — the driver: run once, dedup by id, keep order
//!
//! ## Key invariants
//!
//! - **Deterministic**: same strategy and input always give the same ids.
//! - **No backward leaks**: captures live on re-wrapped goal instances only.
//! - **Errors are fatal**: malformed input, unbound captures, and bad
//!   patterns abort the run; an unknown strategy is just empty.

pub mod cache;
pub mod combinator;
pub mod error;
pub mod goal;
pub mod selection;
pub mod stage;
pub mod template;
pub mod token;

pub use cache::{CacheStats, PatternCache};
pub use combinator::GoalStream;
pub use error::OracleError;
pub use goal::{parse_goals, Bindings, Goal};
pub use selection::{dedup_ids, select, Strategy};
pub use stage::{MatchUnless, Stage, WhenThen};
pub use template::{Substitution, Template};
pub use token::{MatchAll, PatternKind, Token};
