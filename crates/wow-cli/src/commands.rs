use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use wow_ledger::LedgerConfig;
use wow_server::{DatabaseConfig, ServerConfig, WowServer};
use wow_store::{SqliteWishStore, WishStore};
use wow_types::{Donation, Snapshot};

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args).await,
        Command::Migrate(args) => cmd_migrate(args),
        Command::Wishes(args) => cmd_wishes(args, cli.format),
        Command::Donations(args) => cmd_donations(args, cli.format),
    }
}

async fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = server_config(&args)?;
    println!(
        "{} Wall of Wishes on {} (ledger: {})",
        "✓".green().bold(),
        config.bind_addr.to_string().bold(),
        ledger_label(&config.ledger).cyan()
    );
    WowServer::new(config)?.serve().await?;
    Ok(())
}

/// File settings first, then flag and environment overrides.
fn server_config(args: &ServeArgs) -> anyhow::Result<ServerConfig> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(path) = &args.database {
        config.database = DatabaseConfig::sqlite(path);
    }
    if let Some(endpoint) = &args.ledger_endpoint {
        config.ledger = LedgerConfig::Rpc {
            endpoint: endpoint.clone(),
        };
    }
    Ok(config)
}

fn ledger_label(ledger: &LedgerConfig) -> String {
    match ledger {
        LedgerConfig::Simulated => "simulated".to_string(),
        LedgerConfig::Rpc { endpoint } => endpoint.clone(),
    }
}

fn open(path: &Path) -> anyhow::Result<SqliteWishStore> {
    SqliteWishStore::open(path, 1).with_context(|| format!("opening {}", path.display()))
}

fn cmd_migrate(args: DatabaseArgs) -> anyhow::Result<()> {
    let store = open(&args.database)?;
    println!(
        "{} {} at schema version {}",
        "✓".green().bold(),
        args.database.display(),
        store.schema_version()?.to_string().yellow()
    );
    Ok(())
}

fn cmd_wishes(args: DatabaseArgs, format: OutputFormat) -> anyhow::Result<()> {
    let store = open(&args.database)?;
    let snapshot = Snapshot::new(store.get_wishes()?);
    println!("{}", render_wishes(&snapshot, format)?);
    Ok(())
}

fn cmd_donations(args: DonationsArgs, format: OutputFormat) -> anyhow::Result<()> {
    let store = open(&args.db.database)?;
    if store.get_wish_by_id(args.wish_id)?.is_none() {
        anyhow::bail!("wish {} not found", args.wish_id);
    }
    let donations = store.get_donations_by_wish_id(args.wish_id)?;
    println!("{}", render_donations(&donations, format)?);
    Ok(())
}

fn render_wishes(snapshot: &Snapshot, format: OutputFormat) -> anyhow::Result<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(snapshot)?);
    }
    if snapshot.is_empty() {
        return Ok("The wall is empty.".to_string());
    }
    let lines: Vec<String> = snapshot
        .wishes()
        .iter()
        .map(|wish| {
            format!(
                "{} {}  {} donations  {}",
                format!("#{}", wish.id).yellow(),
                wish.title.bold(),
                wish.total_donations.to_string().green(),
                wish.timestamp.format("%Y-%m-%d %H:%M").to_string().dimmed()
            )
        })
        .collect();
    Ok(lines.join("\n"))
}

fn render_donations(donations: &[Donation], format: OutputFormat) -> anyhow::Result<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(donations)?);
    }
    if donations.is_empty() {
        return Ok("No donations yet.".to_string());
    }
    let lines: Vec<String> = donations
        .iter()
        .map(|d| {
            format!(
                "{} {} from {}  [{}]",
                format!("#{}", d.id).yellow(),
                d.amount.to_string().green(),
                d.sender_wallet_address,
                d.status.as_str().cyan()
            )
        })
        .collect();
    Ok(lines.join("\n"))
}
