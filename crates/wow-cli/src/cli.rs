use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "wow",
    about = "Wall of Wishes: post wishes, donate to them, watch the wall update live",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

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
    /// Run the HTTP and websocket server
    Serve(ServeArgs),
    /// Create or upgrade the database schema
    Migrate(DatabaseArgs),
    /// Print the wall, newest first
    Wishes(DatabaseArgs),
    /// List donations to one wish
    Donations(DonationsArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// TOML config file
    #[arg(short, long, env = "WOW_CONFIG")]
    pub config: Option<PathBuf>,
    /// Address to listen on
    #[arg(long, env = "WOW_BIND")]
    pub bind: Option<SocketAddr>,
    /// SQLite database file; in-memory when neither this nor the config sets one
    #[arg(long, env = "WOW_DATABASE")]
    pub database: Option<PathBuf>,
    /// Ledger gateway URL; simulated ledger when unset
    #[arg(long, env = "WOW_LEDGER_ENDPOINT")]
    pub ledger_endpoint: Option<String>,
}

#[derive(Args)]
pub struct DatabaseArgs {
    /// SQLite database file
    #[arg(long, env = "WOW_DATABASE", default_value = "wishes.db")]
    pub database: PathBuf,
}

#[derive(Args)]
pub struct DonationsArgs {
    /// Wish id
    pub wish_id: i64,
    #[command(flatten)]
    pub db: DatabaseArgs,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn donations_takes_positional_id() {
        let cli = Cli::try_parse_from(["wow", "donations", "7", "--database", "w.db"]).unwrap();
        match cli.command {
            Command::Donations(args) => {
                assert_eq!(args.wish_id, 7);
                assert_eq!(args.db.database, PathBuf::from("w.db"));
            }
            _ => panic!("expected donations"),
        }
    }

    #[test]
    fn global_format_flag() {
        let cli = Cli::try_parse_from(["wow", "wishes", "--format", "json"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
    }
}
