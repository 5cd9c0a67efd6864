pub mod commands;

use std::{path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "hrbot",
    about = "hrbot operator CLI",
    long_about = "Inspect hrbot configuration, check search service readiness, and run candidate searches from the terminal.",
    after_help = "Examples:\n  hrbot doctor --json\n  hrbot config\n  hrbot search backend engineer --cards"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to an hrbot.toml file (defaults to ./hrbot.toml or ./config/hrbot.toml)")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config and check that the search service is reachable")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Run a candidate search and print the messages the bot would send")]
    Search {
        #[arg(required = true, num_args = 1.., help = "Search query text")]
        query: Vec<String>,
        #[arg(long, help = "Render Adaptive Cards instead of text messages")]
        cards: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    let result = match cli.command {
        Command::Config => commands::config::run(config_path),
        Command::Doctor { json } => commands::doctor::run(config_path, json),
        Command::Search { query, cards } => {
            commands::search::run(config_path, &query.join(" "), cards)
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
