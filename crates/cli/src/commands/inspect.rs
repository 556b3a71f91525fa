//! Block template inspection command.

use anyhow::Result;
use clap::Args;
use cnblob_core::{Block, TxIn, TxOutTarget};
use colored::Colorize;
use serde_json::json;

#[derive(Args)]
pub struct InspectArgs {
    /// Block template blob (hex)
    template: String,

    /// Print as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: InspectArgs) -> Result<()> {
    let block = super::parse_block(&args.template)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&to_json(&block))?);
    } else {
        print_block(&block);
    }
    Ok(())
}

fn to_json(block: &Block) -> serde_json::Value {
    json!({
        "block": block,
        "height": block.height(),
        "miner_tx_hash": block.miner_tx.hash(),
        "merkle_root": block.merkle_root(),
        "hashing_blob": hex::encode(block.hashing_blob()),
        "id": block.id(),
    })
}

fn print_block(block: &Block) {
    let header = &block.header;
    let tx = &block.miner_tx;

    println!();
    println!("{}", "Block Template:".bold().cyan());
    println!();
    println!(
        "  Version:      {}.{}",
        header.major_version.to_string().bright_cyan(),
        header.minor_version.to_string().bright_cyan()
    );
    if let Some(height) = block.height() {
        println!("  Height:       {}", height.to_string().bright_cyan());
    }
    println!("  Id:           {}", block.id().to_hex().bright_yellow());
    println!("  Previous Id:  {}", header.prev_id.to_hex().bright_black());
    println!(
        "  Timestamp:    {}",
        header.timestamp.to_string().bright_black()
    );
    println!("  Nonce:        {}", header.nonce.to_string().bright_black());
    println!("  Merkle Root:  {}", block.merkle_root().to_hex().bright_black());
    println!(
        "  Transactions: {}",
        block.tx_count().to_string().bright_cyan()
    );
    println!();

    println!("{}", "Miner Transaction:".bold());
    println!();
    println!("  Hash:         {}", tx.hash().to_hex().bright_yellow());
    println!("  Prefix Hash:  {}", tx.prefix_hash().to_hex().bright_black());
    println!(
        "  Version:      {}",
        tx.prefix.version.to_string().bright_black()
    );
    println!(
        "  Unlock Time:  {}",
        tx.prefix.unlock_time.to_string().bright_black()
    );
    for input in &tx.prefix.inputs {
        match input {
            TxIn::Gen { height } => println!("  Input:        gen (height {})", height),
            TxIn::ToKey {
                amount,
                key_offsets,
                ..
            } => println!(
                "  Input:        to_key (amount {}, ring {})",
                amount,
                key_offsets.len()
            ),
        }
    }
    for (i, output) in tx.prefix.outputs.iter().enumerate() {
        let target = match &output.target {
            TxOutTarget::ToKey { key } => key.to_hex(),
            TxOutTarget::ToTaggedKey { key, view_tag } => {
                format!("{} (view tag {:02x})", key.to_hex(), view_tag)
            }
        };
        println!(
            "  {} {} -> {}",
            format!("Output {}:", i).bright_black(),
            output.amount.to_string().bright_green(),
            target
        );
    }
    println!(
        "  Extra:        {}",
        hex::encode(&tx.prefix.extra).bright_black()
    );
    println!();

    if !block.tx_hashes.is_empty() {
        println!("{}", "Transaction Hashes:".bold());
        println!();
        for (i, tx_hash) in block.tx_hashes.iter().enumerate() {
            println!(
                "  {} {}",
                format!("{}.", i + 1).bright_black(),
                tx_hash.to_hex().bright_yellow()
            );
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_fields() {
        let template = format!(
            "010000{}10270000013c01ff0001ffffffffffff03029b2e4c0281c0b02e7c53291a94d1d0cbff8883f8024f5142ee494ffbbd08807121017767aafcde9be00dcfd098715ebcf7f410daebc582fda69d24a28e9d0bc890d100",
            "00".repeat(32)
        );
        let block = Block::parse_template(&template).unwrap();
        let value = to_json(&block);

        assert_eq!(value["height"], 0);
        assert_eq!(
            value["id"],
            "418015bb9ae982a1975da7d79277c2705727a56894ba0fb246adaabb1f4632e3"
        );
        assert_eq!(
            value["miner_tx_hash"],
            "c88ce9783b4f11190d7b9c17a69c1c52200f9faaee8e98dd07e6811175177139"
        );
        assert_eq!(value["block"]["header"]["nonce"], 0x1027_0000u32);
    }
}
