use clap::Parser;
use colored::*;
use eyre::{Context, Result};

use pantrystore::cli::{Cli, Command, default_store_dir};
use pantrystore::{Item, Preference, Store};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let store_dir = cli.store.clone().unwrap_or_else(default_store_dir);
    let store = Store::open(&store_dir).context("Failed to open pantry store")?;

    match cli.command {
        Command::Items { low } => {
            let items = if low { store.low_stock_items()? } else { store.list_items()? };
            if items.is_empty() {
                println!("No items.");
                return Ok(());
            }
            for item in items {
                let marker = if item.is_low() { "!".red().bold() } else { " ".normal() };
                let days = item
                    .days_remaining()
                    .map(|d| format!("~{:.0}d left", d))
                    .unwrap_or_default();
                println!(
                    "{} {:<24} {:>8.1} {:<8} (min {:.1}) {}",
                    marker,
                    item.name.cyan(),
                    item.quantity,
                    item.unit,
                    item.min_quantity,
                    days.dimmed()
                );
            }
        }
        Command::Add {
            name,
            quantity,
            unit,
            min,
            daily_use,
        } => {
            let item = Item::new(&name, quantity, &unit)
                .with_min_quantity(min)
                .with_avg_daily_use(daily_use);
            store.upsert_item(&item)?;
            println!("{} Added {}", "✓".green(), name.cyan());
        }
        Command::Prefs => {
            for pref in store.list_preferences()? {
                println!("{} = {}", pref.key.yellow(), pref.value);
            }
        }
        Command::SetPref { key, value } => {
            let parsed = serde_json::from_str(&value).unwrap_or(serde_json::Value::String(value));
            store.set_preference(&Preference::new(&key, parsed))?;
            println!("{} Set {}", "✓".green(), key.yellow());
        }
        Command::Orders => {
            for order in store.list_orders(None)? {
                println!(
                    "{} {:<20} {:>6.1} x ${:<8.2} {} {}",
                    order.created_at.format("%Y-%m-%d %H:%M"),
                    order.item_name.cyan(),
                    order.quantity,
                    order.total_usd,
                    order.status.to_string().yellow(),
                    order.vendor_ref.as_deref().unwrap_or("-").dimmed()
                );
            }
        }
        Command::Cycles { limit } => {
            for cycle in store.list_cycles(limit)? {
                let actions = cycle.actions.as_array().map(|a| a.len()).unwrap_or(0);
                println!(
                    "{} {} {} ({} actions)",
                    cycle.started_at.format("%Y-%m-%d %H:%M"),
                    cycle.id.dimmed(),
                    cycle.status.yellow(),
                    actions
                );
            }
        }
    }

    Ok(())
}
