//! Tree hash command.

use anyhow::{Context, Result};
use clap::Args;
use cnblob_core::{tree_hash, Hash};

#[derive(Args)]
pub struct TreeHashArgs {
    /// Transaction hashes (hex), miner transaction first
    #[arg(required = true)]
    hashes: Vec<String>,
}

pub fn run(args: TreeHashArgs) -> Result<()> {
    let hashes = parse_hashes(&args.hashes)?;
    println!("{}", tree_hash(&hashes).to_hex());
    Ok(())
}

fn parse_hashes(inputs: &[String]) -> Result<Vec<Hash>> {
    inputs
        .iter()
        .map(|s| Hash::from_hex(s.trim()).with_context(|| format!("Invalid hash: {}", s)))
        .collect()
}
