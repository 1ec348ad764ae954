//! # oracle
//!
//! Goal-ranking oracle for interactive theorem provers.
//!
//! The prover pipes its open goals to stdin, one `<id>:<label>` per line, and
//! passes the lemma name as the only argument. The oracle prints the ids it
//! recommends, best first, one per line:
//!
//! ```text
//! oracle --strategies strategies/oracle.yaml CkCompromise < goals.txt
//! ```
//!
//! - `oracle <STRATEGY>` — rank stdin goals with the named strategy
//! - `oracle --list` — show configured strategy names and prefixes

mod commands;

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Rank prover goals with a configured strategy.
#[derive(Parser)]
#[command(name = "oracle", version, about)]
struct Cli {
    /// Strategy (usually the lemma name) to rank goals for.
    #[arg(required_unless_present = "list")]
    strategy: Option<String>,

    /// Strategy table (YAML). Defaults to ./oracle.yaml when it exists.
    #[arg(long)]
    strategies: Option<PathBuf>,

    /// Read goals from this file instead of stdin.
    #[arg(long)]
    input: Option<PathBuf>,

    /// List configured strategy names and prefixes, then exit.
    #[arg(long)]
    list: bool,

    /// Log strategy selection and evaluation details to stderr.
    #[arg(long, short)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    if cli.list {
        return commands::list::execute(cli.strategies.as_deref());
    }

    match cli.strategy.as_deref() {
        Some(strategy) => {
            commands::rank::execute(strategy, cli.strategies.as_deref(), cli.input.as_deref())
        }
        None => Err(anyhow::anyhow!("a strategy name is required")),
    }
}

/// Logs go to stderr so they never mix with the ranked ids on stdout.
fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(format!("oracle={level}").parse()?)
                .add_directive(format!("oracle_engine={level}").parse()?)
                .add_directive(format!("oracle_strategy={level}").parse()?),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
    Ok(())
}
