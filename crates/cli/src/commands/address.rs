//! Address decoding command.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use cnblob_core::{Address, AddressConfig, AddressKind, Network};
use colored::Colorize;

#[derive(Clone, Copy, ValueEnum)]
enum NetworkArg {
    Mainnet,
    Testnet,
    Stagenet,
}

impl From<NetworkArg> for Network {
    fn from(arg: NetworkArg) -> Self {
        match arg {
            NetworkArg::Mainnet => Network::Mainnet,
            NetworkArg::Testnet => Network::Testnet,
            NetworkArg::Stagenet => Network::Stagenet,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Standard,
    Integrated,
    Subaddress,
}

impl From<KindArg> for AddressKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::Standard => AddressKind::Standard,
            KindArg::Integrated => AddressKind::Integrated,
            KindArg::Subaddress => AddressKind::Subaddress,
        }
    }
}

#[derive(Args)]
pub struct AddressArgs {
    /// Base58 address
    address: String,

    /// Required network (inferred from the address when omitted)
    #[arg(short, long, value_enum)]
    network: Option<NetworkArg>,

    /// Required address kind (inferred from the address when omitted)
    #[arg(short, long, value_enum)]
    kind: Option<KindArg>,
}

pub fn run(args: AddressArgs) -> Result<()> {
    let address = decode(&args)?;

    println!();
    println!("{}", "Address:".bold().cyan());
    println!();
    println!("  Network:    {}", address.network.to_string().bright_cyan());
    println!("  Kind:       {}", address.kind.to_string().bright_cyan());
    println!("  Spend Key:  {}", address.spend_key.to_hex().bright_yellow());
    println!("  View Key:   {}", address.view_key.to_hex().bright_yellow());
    if let Some(payment_id) = &address.payment_id {
        println!("  Payment Id: {}", hex::encode(payment_id).bright_green());
    }
    println!();
    Ok(())
}

fn decode(args: &AddressArgs) -> Result<Address> {
    let text = args.address.trim();
    let address = if args.network.is_none() && args.kind.is_none() {
        Address::parse(text)
    } else {
        let config = AddressConfig::new(
            args.network.map(Network::from).unwrap_or_default(),
            args.kind.map(AddressKind::from).unwrap_or_default(),
        );
        Address::decode(text, &config)
    };
    address.with_context(|| format!("Invalid address: {}", text))
}
