//! Perform one election on a contract snapshot
//!
//! Reads a snapshot written by the main binary (or any previous `elect` run),
//! elects one action, prints the resulting payments and writes the successor
//! snapshot.
//!
//! Usage:
//!   cargo run --bin elect -- --snapshot snapshots/swaption.json --actor acmeCorp \
//!       --action cancel --date 15/03/2015

use anyhow::{anyhow, Context, Result};
use arrangement_engine::evaluator::{available_actions, elect};
use arrangement_engine::expression::{Bindings, Environment};
use arrangement_engine::market::{load_fixings, FixingTable};
use arrangement_engine::temporal::parse_date;
use arrangement_engine::{ContractSnapshot, Party};
use clap::Parser;
use log::info;
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "elect")]
#[command(about = "Elect one action on an arrangement snapshot")]
struct Args {
    /// Snapshot JSON (arrangement plus bindings)
    #[arg(long)]
    snapshot: PathBuf,

    /// Electing party
    #[arg(long)]
    actor: String,

    /// Action label; omit to list the enabled actions
    #[arg(long)]
    action: Option<String>,

    /// Election date, dd/MM/yyyy
    #[arg(long)]
    date: String,

    /// Market data CSV (kind,name,start,end,value)
    #[arg(long)]
    fixings: Option<PathBuf>,

    /// Extra bindings as name=value
    #[arg(long = "bind", value_name = "NAME=VALUE")]
    bindings: Vec<String>,

    /// Where to write the successor snapshot
    #[arg(long, default_value = "successor.json")]
    output: PathBuf,
}

fn parse_bindings(base: &Bindings, extra: &[String]) -> Result<Bindings> {
    let mut bindings = base.clone();
    for entry in extra {
        let (name, value) = entry
            .split_once('=')
            .ok_or_else(|| anyhow!("Binding must be NAME=VALUE, got: {}", entry))?;
        let value = value
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for binding {}", name))?;
        bindings.insert(name.trim(), value);
    }
    Ok(bindings)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let bytes = fs::read(&args.snapshot)
        .with_context(|| format!("Failed to read {}", args.snapshot.display()))?;
    let snapshot = ContractSnapshot::from_canonical_bytes(&bytes)?;
    info!("loaded snapshot {}", snapshot.content_hash()?);

    let market = match &args.fixings {
        Some(path) => load_fixings(path).map_err(|e| anyhow!("Failed to load {}: {}", path.display(), e))?,
        None => FixingTable::new(),
    };
    let bindings = parse_bindings(&snapshot.bindings, &args.bindings)?;
    let env = Environment::new(&bindings, &market);
    let at = parse_date(&args.date)?;
    let actor = Party::new(&args.actor);

    let Some(label) = &args.action else {
        println!("Enabled on {}:", args.date);
        for action in available_actions(&snapshot.arrangement, at) {
            let marker = if action.actors.contains(&actor) { "*" } else { " " };
            println!(" {} {} ({})", marker, action.label, action.actors);
        }
        return Ok(());
    };

    let election = elect(&snapshot.arrangement, &actor, label, at, &env)?;

    println!("{} elected \"{}\" on {}", actor, label, args.date);
    if election.effects.is_empty() {
        println!("  no payments");
    }
    for payment in &election.effects {
        println!("  {}", payment);
    }

    let successor = ContractSnapshot::new(election.successor, bindings);
    fs::write(&args.output, successor.to_json_pretty()?)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    println!("Successor {} written to {}", successor.content_hash()?, args.output.display());

    Ok(())
}
