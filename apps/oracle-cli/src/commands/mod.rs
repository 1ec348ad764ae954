// mod.rs — Command implementations and shared configuration loading.

pub mod list;
pub mod rank;

use std::path::Path;

use anyhow::Context;
use oracle_strategy::StrategyTable;

/// Strategy table looked up in the working directory when `--strategies` is
/// not given.
pub const DEFAULT_STRATEGY_FILE: &str = "oracle.yaml";

/// Load the strategy table.
///
/// An explicit path must exist. Without one, `./oracle.yaml` is used if
/// present; otherwise the table is empty and every strategy selects nothing.
pub fn load_table(path: Option<&Path>) -> anyhow::Result<StrategyTable> {
    match path {
        Some(path) => StrategyTable::load(path)
            .with_context(|| format!("failed to load strategy table {}", path.display())),
        None => {
            let default = Path::new(DEFAULT_STRATEGY_FILE);
            if default.exists() {
                StrategyTable::load(default)
                    .with_context(|| format!("failed to load strategy table {}", default.display()))
            } else {
                tracing::info!(
                    "no --strategies given and no {} found; using an empty table",
                    DEFAULT_STRATEGY_FILE
                );
                Ok(StrategyTable::new())
            }
        }
    }
}
