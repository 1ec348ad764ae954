// list.rs — `oracle --list`: show which strategy names the table answers to.

use std::path::Path;

use oracle_strategy::StrategyTable;

pub fn execute(strategies: Option<&Path>) -> anyhow::Result<()> {
    let table = super::load_table(strategies)?;
    for line in render(&table) {
        println!("{}", line);
    }
    Ok(())
}

/// Exact names first, then prefixes marked with a trailing `*`.
fn render(table: &StrategyTable) -> Vec<String> {
    table
        .names()
        .map(str::to_string)
        .chain(table.prefixes().map(|prefix| format!("{}*", prefix)))
        .collect()
}
