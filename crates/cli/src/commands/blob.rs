//! Hashing blob command.

use anyhow::Result;
use clap::Args;
use tracing::info;

#[derive(Args)]
pub struct BlobArgs {
    /// Block template blob (hex)
    template: String,

    /// Replace the header nonce before assembling
    #[arg(short, long)]
    nonce: Option<u32>,
}

pub fn run(args: BlobArgs) -> Result<()> {
    println!("{}", hashing_blob_hex(&args.template, args.nonce)?);
    Ok(())
}

fn hashing_blob_hex(template: &str, nonce: Option<u32>) -> Result<String> {
    let mut block = super::parse_block(template)?;
    if let Some(nonce) = nonce {
        info!(nonce, "setting nonce");
        block.set_nonce(nonce);
    }
    Ok(hex::encode(block.hashing_blob()))
}
