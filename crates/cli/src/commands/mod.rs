//! CLI commands module.

use anyhow::{Context, Result};
use carchain_core::Block;
use clap::Subcommand;
use serde_json::Value;
use std::fs;
use std::path::Path;

mod nonce;
mod replay;
mod verify;

#[derive(Subcommand)]
pub enum Commands {
    /// Verify hash links and proof of work of a saved chain
    Verify(verify::VerifyArgs),
    /// Search the proof of work nonce for a previous block
    Nonce(nonce::NonceArgs),
    /// Replay a file of transactions into a fresh in-memory ledger
    Replay(replay::ReplayArgs),
}

pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Verify(args) => verify::run(args),
        Commands::Nonce(args) => nonce::run(args),
        Commands::Replay(args) => replay::run(args),
    }
}

/// Read a JSON document from disk.
fn read_json(path: &Path) -> Result<Value> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("Invalid JSON in {}", path.display()))
}

/// Parse blocks from either a `GET /chain` response or a bare block array.
fn parse_blocks(value: Value) -> Result<Vec<Block>> {
    let blocks = match value {
        Value::Object(mut map) => map
            .remove("chain")
            .context("Expected a \"chain\" field or a JSON array of blocks")?,
        other => other,
    };
    serde_json::from_value(blocks).context("Malformed block list")
}
