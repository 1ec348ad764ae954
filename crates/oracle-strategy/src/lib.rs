//! # oracle-strategy
//!
//! Strategy tables for the goal oracle.
//!
//! Strategies are configuration, not code: a YAML file maps strategy names
//! (and name prefixes) to stage expressions, and the [`StrategyCompiler`]
//! turns the selected expression into an [`oracle_engine::Stage`].
//!
//! ## Key invariants
//!
//! - **Unknown names are empty**: [`StrategyTable::select`] returns
//!   [`oracle_engine::Stage::empty`] rather than an error.
//! - **Exact before prefix**: an exact name always wins over a prefix entry.
//! - **Lazy compilation**: only the selected strategy is compiled.

pub mod compiler;
pub mod config;
pub mod error;
pub mod table;

pub use compiler::StrategyCompiler;
pub use config::{
    CombinatorSpec, MatchUnlessSpec, StageSpec, StrategyEntry, StrategyFile, TokenOptions,
    TokenSpec, WhenThenSpec,
};
pub use error::StrategyError;
pub use table::StrategyTable;
