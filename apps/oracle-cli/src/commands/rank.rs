// rank.rs — `oracle <STRATEGY>`: rank goals and print their ids.
//
// Order of work:
// 1. Read all input (stdin or --input)
// 2. Parse goals; a malformed line aborts before any strategy runs
// 3. No goals → exit successfully without loading or running anything
// 4. Load the table, select the strategy (unknown → empty), run it
// 5. Print ids, one per line, nothing else on stdout

use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

use anyhow::Context;
use oracle_engine::{parse_goals, select, PatternCache};

pub fn execute(strategy: &str, strategies: Option<&Path>, input: Option<&Path>) -> anyhow::Result<()> {
    let raw = read_input(input)?;
    let ranked = rank(&raw, strategy, strategies)?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    write_ranked(&mut out, &ranked)?;
    out.flush()?;
    Ok(())
}

fn read_input(input: Option<&Path>) -> anyhow::Result<String> {
    match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read goals from {}", path.display())),
        None => {
            let mut raw = String::new();
            io::stdin()
                .read_to_string(&mut raw)
                .context("failed to read goals from stdin")?;
            Ok(raw)
        }
    }
}

/// Parse `raw`, then run `strategy` from the table at `strategies`.
pub fn rank(raw: &str, strategy: &str, strategies: Option<&Path>) -> anyhow::Result<Vec<u64>> {
    let goals = parse_goals(raw)?;
    if goals.is_empty() {
        tracing::debug!("no goals on input, nothing to rank");
        return Ok(Vec::new());
    }

    let table = super::load_table(strategies)?;
    let cache = PatternCache::new();
    let stage = table.select(strategy, &cache)?;
    let ranked = select(&stage, &goals, &cache)
        .with_context(|| format!("strategy '{}' failed", strategy))?;

    tracing::debug!(
        strategy,
        goals = goals.len(),
        ranked = ranked.len(),
        cache = ?cache.stats(),
        "ranked goals"
    );
    Ok(ranked)
}

/// Write ids one per line.
pub fn write_ranked<W: Write>(out: &mut W, ids: &[u64]) -> io::Result<()> {
    for id in ids {
        writeln!(out, "{}", id)?;
    }
    Ok(())
}
