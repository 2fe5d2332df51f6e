//! Customer Desk CLI entry point.
//!
//! Opens the customer store and either runs a single command or the
//! interactive desk shell.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use customer_desk::application::{Desk, DeskView};
use customer_desk::infra::app_config::{self, AppConfig};
use customer_desk::infra::db::Database;
use customer_desk::infra::speech::{self, Notifier, SilentNotifier};
use customer_desk::ui::{shell, table};

#[derive(Parser, Debug)]
#[command(name = "customer-desk")]
#[command(version)]
#[command(about = "Record walk-in customers with a daily queue number", long_about = None)]
struct Args {
    /// Database file (overrides CUSTOMER_DESK_DB_PATH and the config file)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Config file (defaults to config.toml in the data directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Do not announce new customers
    #[arg(long, global = true)]
    no_speech: bool,

    /// Print results as JSON instead of a table
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Add a customer
    Add {
        /// Customer name (several words are joined with spaces)
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },

    /// List every customer, most recent first
    List,

    /// List today's customers in queue order
    Today,

    /// Search customers; all given filters must match
    Search {
        /// Part of the name (case-sensitive)
        #[arg(long)]
        name: Option<String>,
        /// Part of the customer ID (case-sensitive)
        #[arg(long)]
        id: Option<String>,
        /// Exact daily number
        #[arg(long)]
        seq: Option<String>,
    },

    /// Show total and today's customer counts
    Stats,

    /// Interactive desk (default)
    Shell,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => app_config::load_config_from(path),
        None => app_config::load_config(),
    };
    let db_path = app_config::resolve_db_path(args.db.clone(), &config);
    let db = Database::open_at(&db_path)
        .with_context(|| format!("Failed to initialise customer database {}", db_path.display()))?;
    log::info!("Using customer database {}", db_path.display());

    let desk = Desk::new(db.customer_repo(), notifier(&args, &config));
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match args.command.unwrap_or(Commands::Shell) {
        Commands::Add { name } => {
            let added = desk.add(&name.join(" "))?;
            if args.json {
                print_json(&mut out, &added.customer)?;
            } else {
                table::render_added(&mut out, &added.customer)?;
                table::render_summary(&mut out, &added.view.summary)?;
            }
        }
        Commands::List => print_view(&mut out, &desk.show_all()?, args.json)?,
        Commands::Today => print_view(&mut out, &desk.show_today()?, args.json)?,
        Commands::Search { name, id, seq } => {
            let view = desk.search(
                name.as_deref().unwrap_or_default(),
                id.as_deref().unwrap_or_default(),
                seq.as_deref().unwrap_or_default(),
            )?;
            print_view(&mut out, &view, args.json)?;
        }
        Commands::Stats => {
            let summary = desk.summary()?;
            if args.json {
                print_json(&mut out, &summary)?;
            } else {
                table::render_summary(&mut out, &summary)?;
            }
        }
        Commands::Shell => shell::run(&desk, io::stdin().lock(), &mut out)?,
    }

    Ok(())
}

fn notifier(args: &Args, config: &AppConfig) -> Arc<dyn Notifier> {
    if args.no_speech {
        return Arc::new(SilentNotifier);
    }
    speech::notifier_from_config(&config.speech)
}

fn print_view(out: &mut impl Write, view: &DeskView, json: bool) -> Result<()> {
    if json {
        print_json(out, view)
    } else {
        table::render_view(out, view).map_err(Into::into)
    }
}

fn print_json(out: &mut impl Write, value: &impl serde::Serialize) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
