//! Replay an election log for several independent holders
//!
//! Every holder decodes the snapshot on its own and applies the whole log;
//! the run fails if they do not agree on the final state.
//!
//! Usage:
//!   cargo run --bin replay_log -- --snapshot snapshots/tarf.json --log elections.csv \
//!       --fixings fixings.csv --holders 8

use anyhow::{anyhow, Context, Result};
use arrangement_engine::market::{load_fixings, FixingTable};
use arrangement_engine::replay::{load_election_log, ReplayConfig, ReplayRunner};
use arrangement_engine::temporal::format_date;
use arrangement_engine::ContractSnapshot;
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "replay_log")]
#[command(about = "Replay an election log against an arrangement snapshot")]
struct Args {
    /// Snapshot JSON (arrangement plus bindings)
    #[arg(long)]
    snapshot: PathBuf,

    /// Election log CSV (actor,action,date)
    #[arg(long)]
    log: PathBuf,

    /// Market data CSV (kind,name,start,end,value)
    #[arg(long)]
    fixings: Option<PathBuf>,

    /// Number of independent holders
    #[arg(long)]
    holders: Option<usize>,

    /// Require a chronological log that discharges the contract
    #[arg(long)]
    strict: bool,

    /// Write the outcome as JSON here
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let bytes = fs::read(&args.snapshot)
        .with_context(|| format!("Failed to read {}", args.snapshot.display()))?;
    let snapshot = ContractSnapshot::from_canonical_bytes(&bytes)?;
    let steps = load_election_log(&args.log)
        .map_err(|e| anyhow!("Failed to load {}: {}", args.log.display(), e))?;
    let market = match &args.fixings {
        Some(path) => load_fixings(path).map_err(|e| anyhow!("Failed to load {}: {}", path.display(), e))?,
        None => FixingTable::new(),
    };

    let mut config = if args.strict { ReplayConfig::strict() } else { ReplayConfig::default() };
    if let Some(holders) = args.holders {
        config.holders = holders;
    }

    let start = Instant::now();
    let runner = ReplayRunner::new(config);
    let outcome = runner.run_holders(&snapshot, &steps, &market)?;
    println!(
        "Replayed {} election(s) for {} holder(s) in {:?}",
        outcome.elections.len(),
        runner.config().holders,
        start.elapsed()
    );

    for (i, election) in outcome.elections.iter().enumerate() {
        println!("{:>3} {} \"{}\" on {}", i, election.actor, election.label, format_date(election.at));
        for payment in &election.effects {
            println!("      {}", payment);
        }
    }

    println!("\nNet positions:");
    println!("{:<20} {:>4} {:>18}", "Party", "Ccy", "Amount");
    println!("{}", "-".repeat(44));
    for position in &outcome.positions {
        println!("{:<20} {:>4} {:>18}", position.party.name(), position.currency.code(), position.amount.round_dp(2));
    }

    println!("\nFinal state {}{}", outcome.final_hash, if outcome.final_state.is_zero() { " (zero)" } else { "" });

    if let Some(path) = &args.output {
        fs::write(path, serde_json::to_string_pretty(&outcome)?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Outcome written to {}", path.display());
    }

    Ok(())
}
