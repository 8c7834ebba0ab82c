//! Transaction replay command.

use super::read_json;
use anyhow::{bail, Context, Result};
use carchain_chain::{Ledger, LedgerConfig, LedgerError};
use carchain_consensus::{CancelToken, RegistrationPolicy, DEFAULT_DIFFICULTY_PREFIX};
use carchain_core::Transaction;
use clap::Args;
use colored::Colorize;
use serde_json::json;
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

#[derive(Args)]
pub struct ReplayArgs {
    /// JSON array of tagged transactions
    file: PathBuf,

    /// Proof of work difficulty prefix
    #[arg(short, long, default_value = DEFAULT_DIFFICULTY_PREFIX)]
    difficulty: String,

    /// Mine a block after this many accepted transactions (0: one block at the end)
    #[arg(short, long, default_value = "0")]
    mine_every: usize,

    /// Accept registrations for VINs that are already registered
    #[arg(long)]
    allow_reregistration: bool,

    /// Stop at the first rejected transaction
    #[arg(long)]
    strict: bool,

    /// Write the resulting chain here, in the `GET /chain` shape
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub fn run(args: ReplayArgs) -> Result<()> {
    let transactions: Vec<Transaction> = serde_json::from_value(read_json(&args.file)?)
        .context("Expected a JSON array of transactions")?;

    let config = LedgerConfig {
        registration_policy: if args.allow_reregistration {
            RegistrationPolicy::AllowReset
        } else {
            RegistrationPolicy::Reject
        },
        ..LedgerConfig::with_difficulty(&args.difficulty)?
    };
    let mut ledger = Ledger::new(config);
    let token = CancelToken::new();

    println!();
    println!(
        "{}",
        format!("Replaying {} transactions...", transactions.len())
            .bold()
            .cyan()
    );
    println!();

    let mut accepted_since_mine = 0;
    let mut rejected = 0;

    for (i, tx) in transactions.into_iter().enumerate() {
        let label = format!("{:>4}.", i + 1);
        let summary = format!("{} {}", tx.kind(), tx.vin());

        match ledger.submit(tx) {
            Ok(height) => {
                println!(
                    "  {} {}  {} {}",
                    label.bright_black(),
                    "✓".green(),
                    summary,
                    format!("(block {})", height).bright_black()
                );
                accepted_since_mine += 1;
            }
            Err(LedgerError::Validation(e)) => {
                println!(
                    "  {} {}  {} {}",
                    label.bright_black(),
                    "✗".red(),
                    summary,
                    e.to_string().red()
                );
                if args.strict {
                    bail!("transaction {} rejected: {}", i + 1, e);
                }
                rejected += 1;
            }
            Err(e) => return Err(e.into()),
        }

        if args.mine_every > 0 && accepted_since_mine == args.mine_every {
            mine(&mut ledger, &token)?;
            accepted_since_mine = 0;
        }
    }

    if !ledger.pending().is_empty() {
        mine(&mut ledger, &token)?;
    }

    print_summary(&ledger, rejected);

    if let Some(path) = args.output {
        let chain: Vec<_> = ledger
            .chain()
            .iter()
            .map(|block| -> serde_json::Result<serde_json::Value> {
                let mut view = serde_json::to_value(block)?;
                view["hash"] = json!(block.hash_hex());
                Ok(view)
            })
            .collect::<serde_json::Result<_>>()?;
        let document = json!({ "length": chain.len(), "chain": chain });

        fs::write(&path, serde_json::to_string_pretty(&document)?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!(
            "{}  Saved chain to: {}",
            "✓".green().bold(),
            path.display().to_string().bright_black()
        );
        println!();
    }

    Ok(())
}

fn mine(ledger: &mut Ledger, token: &CancelToken) -> Result<()> {
    let block = ledger.mine(token).context("Failed to mine block")?;
    println!(
        "  {} {} {}",
        format!("#{}", block.height).bright_black(),
        block.hash_hex()[..16].bright_yellow(),
        format!("({} txs, nonce {})", block.tx_count(), block.nonce).bright_black()
    );
    Ok(())
}

fn print_summary(ledger: &Ledger, rejected: usize) {
    println!();
    println!("{}", "Vehicles:".bold().cyan());
    println!();

    let vins: BTreeSet<&str> = ledger
        .chain()
        .iter()
        .flat_map(|block| block.transactions.iter().map(Transaction::vin))
        .collect();

    for vin in vins {
        let state = ledger.latest_vin_state(vin);
        let owner = state.owner.as_deref().unwrap_or("-");
        let mileage = state
            .last_mileage
            .map(|m| m.to_string())
            .unwrap_or_else(|| "-".to_string());
        let status = if state.exists {
            "registered".green()
        } else {
            "unregistered".red()
        };

        println!(
            "  {}  {}  owner {}  mileage {}",
            vin.bright_yellow(),
            status,
            owner.bright_cyan(),
            mileage.bright_cyan()
        );
    }

    println!();
    println!("  Height:   {}", ledger.height().to_string().bright_cyan());
    println!("  Rejected: {}", rejected.to_string().bright_black());
    match ledger.verify() {
        Ok(()) => println!("  Chain:    {}", "valid".green()),
        Err(e) => println!("  Chain:    {}", e.to_string().red()),
    }
    println!();
}
