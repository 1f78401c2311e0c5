use std::path::PathBuf;

use cart_types::ProductId;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "cart",
    about = "RocketCart — stock-checked shopping cart",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Config file (TOML); defaults apply when it does not exist
    #[arg(short, long, global = true, default_value = "rocketcart.toml")]
    pub config: PathBuf,

    /// Directory holding the persisted cart
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Base URL of the inventory service
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the cart
    Show,
    /// Add one unit of a product
    Add(ProductArgs),
    /// Remove a product from the cart
    Remove(ProductArgs),
    /// Set the amount of a product already in the cart
    Update(UpdateArgs),
    /// Empty the cart
    Clear,
    /// Show item count and total price
    Total,
    /// Print the effective configuration
    Config,
}

#[derive(Args)]
pub struct ProductArgs {
    /// Product id
    pub product: ProductId,
}

#[derive(Args)]
pub struct UpdateArgs {
    /// Product id
    pub product: ProductId,
    /// New amount (at least 1)
    pub amount: u32,
}
