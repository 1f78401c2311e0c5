use std::sync::Arc;

use cart_core::{CartConfig, CartStore, CartUpdate, LineChange, NotificationSink};
use cart_inventory::HttpInventory;
use cart_store::FileStore;
use cart_types::Cart;
use colored::Colorize;

use crate::cli::*;

/// Prints user-facing failure messages to stderr.
struct ConsoleSink;

impl NotificationSink for ConsoleSink {
    fn notify(&self, message: &str) {
        eprintln!("{} {}", "✗".red().bold(), message.red());
    }
}

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = effective_config(&cli)?;
    let format = cli.format;

    match cli.command {
        Command::Config => cmd_config(&config),
        Command::Show => cmd_show(&open_store(&config)?, format),
        Command::Total => cmd_total(&open_store(&config)?, format),
        Command::Add(args) => {
            let store = open_store(&config)?;
            let update = store.add_product(args.product).await?;
            print_update(&update, format)
        }
        Command::Remove(args) => {
            let store = open_store(&config)?;
            let update = store.remove_product(args.product)?;
            print_update(&update, format)
        }
        Command::Update(args) => {
            let store = open_store(&config)?;
            let update = store.update_product_amount(args.product, args.amount).await?;
            print_update(&update, format)
        }
        Command::Clear => {
            let store = open_store(&config)?;
            let update = store.clear()?;
            print_update(&update, format)
        }
    }
}

/// Config file values with command-line overrides applied.
fn effective_config(cli: &Cli) -> anyhow::Result<CartConfig> {
    let mut config = CartConfig::load_or_default(&cli.config)?;
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(url) = &cli.api_url {
        config.api_url = url.clone();
    }
    Ok(config)
}

fn open_store(config: &CartConfig) -> anyhow::Result<CartStore> {
    let storage = FileStore::open(&config.data_dir)?;
    let inventory = Arc::new(HttpInventory::with_timeout(
        config.api_url.clone(),
        config.request_timeout(),
    )?);
    Ok(CartStore::open_with(
        config.options(),
        Arc::new(storage),
        inventory.clone(),
        inventory,
        Arc::new(ConsoleSink),
    ))
}

fn cmd_config(config: &CartConfig) -> anyhow::Result<()> {
    print!("{}", config.to_toml_string()?);
    Ok(())
}

fn cmd_show(store: &CartStore, format: OutputFormat) -> anyhow::Result<()> {
    let cart = store.get_cart();
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&cart)?),
        OutputFormat::Text => print_cart(&cart),
    }
    Ok(())
}

fn cmd_total(store: &CartStore, format: OutputFormat) -> anyhow::Result<()> {
    let cart = store.get_cart();
    match format {
        OutputFormat::Json => {
            let summary = serde_json::json!({
                "lines": cart.len(),
                "items": cart.item_count(),
                "total": cart.total(),
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        OutputFormat::Text => {
            println!("{} item(s) in {} line(s)", cart.item_count().to_string().bold(), cart.len());
            println!("Total: {}", format!("{:.2}", cart.total()).green().bold());
        }
    }
    Ok(())
}

fn print_update(update: &CartUpdate, format: OutputFormat) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&update.cart)?);
        return Ok(());
    }
    println!("{} {}", "✓".green().bold(), describe(&update.change));
    print_cart(&update.cart);
    Ok(())
}

fn describe(change: &LineChange) -> String {
    match change {
        LineChange::Added { product_id } => format!("Added product {}", product_id.to_string().yellow()),
        LineChange::Incremented { product_id, amount } => {
            format!("Product {} now x{amount}", product_id.to_string().yellow())
        }
        LineChange::Removed { product_id } => format!("Removed product {}", product_id.to_string().yellow()),
        LineChange::AmountSet { product_id, from, to } => {
            format!("Product {}: {from} → {to}", product_id.to_string().yellow())
        }
        LineChange::Cleared { removed } => format!("Cleared {removed} line(s)"),
    }
}

fn print_cart(cart: &Cart) {
    if cart.is_empty() {
        println!("Cart is empty.");
        return;
    }
    for line in cart {
        println!(
            "  {:>6}  {:<40} {:>4} x {:>10} = {:>10}",
            line.product_id.to_string().yellow(),
            line.name,
            line.amount,
            format!("{:.2}", line.price),
            format!("{:.2}", line.subtotal()).bold(),
        );
    }
    println!("  Total: {}", format!("{:.2}", cart.total()).green().bold());
}
