use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing_subscriber::{prelude::*, EnvFilter};

use estimator::config::{Config, Settings};
use estimator::{Draft, FileStorage, IdStrategy, Item, ItemStore, Submitted};

#[derive(Parser)]
#[command(name = "estimator")]
#[command(about = "Keep a running cost estimate of project materials", long_about = None)]
struct Cli {
    /// Directory the item list is stored in
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Id strategy for new items: clock, timestamp or sequential
    #[arg(long, global = true)]
    ids: Option<IdStrategy>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show all items and the total
    List,
    /// Add an item
    Add {
        name: String,
        #[arg(allow_negative_numbers = true)]
        price: f64,
    },
    /// Change the name and price of an item
    Edit {
        id: u64,
        name: String,
        #[arg(allow_negative_numbers = true)]
        price: f64,
    },
    /// Remove an item
    Delete { id: u64 },
    /// Print the total of all prices
    Total,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(filter)
        .try_init();
}

fn print_table(out: &mut impl Write, items: &[Item], total: f64) -> io::Result<()> {
    writeln!(out, "{:>15}  {:<30}  {:>12}", "ID", "NAME", "PRICE")?;
    for item in items {
        writeln!(out, "{:>15}  {:<30}  {:>12.2}", item.id, item.name, item.price)?;
    }
    writeln!(out, "{:>15}  {:<30}  {:>12.2}", "", "Total", total)
}

fn run(settings: &Settings, command: Command, out: &mut impl Write) -> anyhow::Result<()> {
    let storage = FileStorage::open(&settings.data_dir)?;
    let store = ItemStore::with_ids(storage, settings.ids.build()).with_context(|| {
        format!("could not load items from {}", settings.data_dir.display())
    })?;

    match command {
        Command::List => print_table(out, &store.items(), store.total())?,
        Command::Total => writeln!(out, "{:.2}", store.total())?,
        Command::Add { name, price } => {
            if let Submitted::Added(id) = Draft::new(name, price).submit(&store)? {
                writeln!(out, "added {id}")?;
            }
        }
        Command::Edit { id, name, price } => {
            let mut draft = Draft::new(name, price);
            draft.id = Some(id);
            match draft.submit(&store)? {
                Submitted::Missing(id) => bail!("no item with id {id}"),
                _ => writeln!(out, "updated {id}")?,
            }
        }
        Command::Delete { id } => {
            if !store.delete_row(id)? {
                bail!("no item with id {id}");
            }
            writeln!(out, "deleted {id}")?;
        }
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let settings = Settings::resolve(Config::load(), cli.data_dir, cli.ids);
    run(&settings, cli.command, &mut io::stdout().lock())
}
