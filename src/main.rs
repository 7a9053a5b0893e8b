//! Arrangement Engine CLI
//!
//! Walks the default swaption through a proceed and a cancel, then writes
//! snapshots of every template for use with `elect` and `replay_log`.

use anyhow::{Context, Result};
use arrangement_engine::{
    available_actions, content_hash, elect, parse_date, Arrangement, Bindings, ContractSnapshot,
    Environment, FixingTable,
};
use arrangement_engine::templates::{FxForwardTerms, SwapTerms, SwaptionTerms, TarfTerms};
use rust_decimal_macros::dec;
use std::fs;
use std::path::Path;

fn print_tree(title: &str, tree: &Arrangement) -> Result<()> {
    println!("{} [{}]", title, content_hash(tree)?);
    println!("{}", tree);
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    println!("Arrangement Engine v0.1.0");
    println!("=========================\n");

    let terms = SwaptionTerms::default();
    let swaption = terms.build()?;
    print_tree("Swaption", &swaption)?;

    let bindings = Bindings::new()
        .with("notional", dec!(10000000))
        .with("coupon", dec!(0.015));
    let market = FixingTable::new()
        .with_fixing("LIBOR", parse_date("01/04/2015")?, parse_date("01/07/2015")?, dec!(0.0036))
        .with_fixing("LIBOR", parse_date("01/07/2015")?, parse_date("01/10/2015")?, dec!(0.0041));
    let env = Environment::new(&bindings, &market);

    for date in ["01/07/2015", "02/07/2015"] {
        let labels: Vec<&str> = available_actions(&swaption, parse_date(date)?)
            .iter()
            .map(|a| a.label.as_str())
            .collect();
        println!("Available on {}: {:?}", date, labels);
    }
    println!();

    let proceed = elect(&swaption, &terms.bank, "proceed", parse_date("02/07/2015")?, &env)?;
    println!("{} elects \"proceed\" on 02/07/2015:", terms.bank);
    for payment in &proceed.effects {
        println!("  {}", payment);
    }
    print_tree("Successor", &proceed.successor)?;

    let cancel = elect(&swaption, &terms.corp, "cancel", parse_date("15/03/2015")?, &env)?;
    println!("{} elects \"cancel\" on 15/03/2015:", terms.corp);
    for payment in &cancel.effects {
        println!("  {}", payment);
    }
    println!("Successor is zero: {}\n", cancel.successor.is_zero());

    // Snapshots for the other binaries
    let output_dir = Path::new("snapshots");
    fs::create_dir_all(output_dir).context("Failed to create snapshots directory")?;

    let snapshots = [
        ("swaption.json", ContractSnapshot::new(swaption, bindings.clone())),
        ("tarf.json", ContractSnapshot::new(TarfTerms::default().build()?, Bindings::new())),
        ("swap.json", ContractSnapshot::new(SwapTerms::default().build()?, Bindings::new())),
        ("fx_forward.json", ContractSnapshot::new(FxForwardTerms::default().build()?, Bindings::new())),
    ];
    for (name, snapshot) in &snapshots {
        let path = output_dir.join(name);
        fs::write(&path, snapshot.to_json_pretty()?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Wrote {} ({})", path.display(), snapshot.content_hash()?);
    }

    Ok(())
}
