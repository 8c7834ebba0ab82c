//! Proof of work nonce search command.

use anyhow::Result;
use carchain_consensus::{CancelToken, ProofOfWork, DEFAULT_DIFFICULTY_PREFIX};
use clap::Args;
use colored::Colorize;
use std::time::{Duration, Instant};

#[derive(Args)]
pub struct NonceArgs {
    /// Nonce of the previous block
    previous_nonce: u64,

    /// Hex hash of the previous block
    previous_hash: String,

    /// Difficulty prefix the digest must start with
    #[arg(short, long, default_value = DEFAULT_DIFFICULTY_PREFIX)]
    difficulty: String,

    /// Give up after this many seconds
    #[arg(short, long)]
    timeout: Option<u64>,
}

pub fn run(args: NonceArgs) -> Result<()> {
    let pow = ProofOfWork::new(&args.difficulty)?;
    let token = match args.timeout {
        Some(secs) => CancelToken::with_timeout(Duration::from_secs(secs)),
        None => CancelToken::new(),
    };

    println!("{}", "Searching nonce...".bold().cyan());
    println!();

    let started = Instant::now();
    let nonce = pow.search(args.previous_nonce, &args.previous_hash, &token)?;
    let digest = ProofOfWork::digest(args.previous_nonce, &args.previous_hash, nonce);

    println!("{}  Nonce found", "✓".green().bold());
    println!("    Nonce:   {}", nonce.to_string().bright_cyan());
    println!("    Digest:  {}", digest.bright_yellow());
    println!(
        "    Elapsed: {}",
        format!("{:.2?}", started.elapsed()).bright_black()
    );
    println!();

    Ok(())
}
