//! CLI commands module.

use anyhow::{Context, Result};
use clap::Subcommand;
use cnblob_core::Block;

mod address;
mod blob;
mod inspect;
mod tree_hash;

#[derive(Subcommand)]
pub enum Commands {
    /// Print the hashing blob of a block template
    Blob(blob::BlobArgs),
    /// Show the decoded contents of a block template
    Inspect(inspect::InspectArgs),
    /// Compute the tree hash of a list of transaction hashes
    TreeHash(tree_hash::TreeHashArgs),
    /// Decode an address
    Address(address::AddressArgs),
}

pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Blob(args) => blob::run(args),
        Commands::Inspect(args) => inspect::run(args),
        Commands::TreeHash(args) => tree_hash::run(args),
        Commands::Address(args) => address::run(args),
    }
}

/// Parse a hex block template given on the command line.
fn parse_block(template: &str) -> Result<Block> {
    Block::parse_template(template.trim()).context("Failed to parse block template")
}
