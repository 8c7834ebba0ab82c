//! Chain verification command.

use super::{parse_blocks, read_json};
use anyhow::{bail, Result};
use carchain_chain::verify_chain;
use carchain_consensus::{ProofOfWork, DEFAULT_DIFFICULTY_PREFIX};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Args)]
pub struct VerifyArgs {
    /// Saved chain: a `GET /chain` response or a JSON array of blocks
    file: PathBuf,

    /// Proof of work difficulty prefix the chain was mined with
    #[arg(short, long, default_value = DEFAULT_DIFFICULTY_PREFIX)]
    difficulty: String,
}

pub fn run(args: VerifyArgs) -> Result<()> {
    let pow = ProofOfWork::new(&args.difficulty)?;
    let blocks = parse_blocks(read_json(&args.file)?)?;

    println!();
    println!("{}", "Verifying chain...".bold().cyan());
    println!();
    println!("  Blocks:       {}", blocks.len().to_string().bright_cyan());
    println!(
        "  Transactions: {}",
        blocks
            .iter()
            .map(|b| b.tx_count())
            .sum::<usize>()
            .to_string()
            .bright_cyan()
    );
    if let Some(tip) = blocks.last() {
        println!("  Tip hash:     {}", tip.hash_hex().bright_yellow());
    }
    println!();

    match verify_chain(&blocks, &pow) {
        Ok(()) => {
            println!("{}  Chain is valid", "✓".green().bold());
            println!();
            Ok(())
        }
        Err(e) => {
            println!("{}  {}", "✗".red().bold(), e.to_string().red());
            println!();
            bail!("chain verification failed: {e}")
        }
    }
}
