//! ipsetctl - create, fill and inspect ipset sets.

mod commands;
mod config;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::{Context, CreateArgs, EntryArgs, ListArgs, NameArgs, Status};
use config::{Config, LogFormat};
use ipset::{CommandName, SystemRunner};

#[derive(Parser)]
#[command(name = "ipsetctl", version, about = "Manage ipset sets")]
struct Cli {
    /// Configuration file; skips the default search paths.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print the ipset command line instead of running it.
    #[arg(short = 'n', long, global = true)]
    dry_run: bool,

    /// Log as JSON.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a set.
    Create(CreateArgs),

    /// Add an entry to a set.
    Add(EntryArgs),

    /// Delete an entry from a set.
    #[command(visible_alias = "delete")]
    Del(EntryArgs),

    /// Test whether an entry is in a set. Exits 1 when it is not.
    Test(EntryArgs),

    /// List members of a set, or every set.
    List(ListArgs),

    /// Remove every entry from a set, or from all sets.
    Flush(NameArgs),

    /// Destroy a set, or all sets.
    Destroy(NameArgs),

    /// Check that a set exists. Exits 1 when it does not.
    Exists(NameArgs),

    /// Print the ipset version.
    Version,
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Ok(Config::load_from_file(path)?),
        None => match Config::load() {
            Ok(cfg) => Ok(cfg),
            Err(e) => {
                // Can't use tracing yet - not initialized
                eprintln!("Configuration error: {}", e);
                eprintln!("Using default configuration");
                Ok(Config::default())
            }
        },
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;

    if cli.json_logs || config.logging.format == LogFormat::Json {
        common::logging::init_json(config.log_level());
    } else {
        common::logging::init(config.log_level());
    }

    let ctx = Context {
        runner: SystemRunner::new(&config.ipset.binary),
        dry_run: cli.dry_run,
    };

    let status = match cli.command {
        Command::Create(args) => args.run(&ctx)?,
        Command::Add(args) => args.run(CommandName::Add, &ctx)?,
        Command::Del(args) => args.run(CommandName::Del, &ctx)?,
        Command::Test(args) => args.run(CommandName::Test, &ctx)?,
        Command::List(args) => args.run(&ctx)?,
        Command::Flush(args) => args.flush(&ctx)?,
        Command::Destroy(args) => args.destroy(&ctx)?,
        Command::Exists(args) => args.exists(&ctx)?,
        Command::Version => commands::print_version(&ctx)?,
    };

    if status == Status::Negative {
        std::process::exit(1);
    }

    Ok(())
}
