use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "studybear", version, about = "Studybear CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Track the study channel, reading presence and chat events from stdin
    Run(commands::run::RunArgs),
    /// Show the study-time leaderboard from the snapshot
    Leaderboard {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Show a member's spendable balance from the snapshot
    Balance {
        /// Member id
        id: String,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Commands::Run(args) => commands::run::run(args),
        Commands::Leaderboard { json } => commands::query::leaderboard(json),
        Commands::Balance { id, json } => commands::query::balance(&id, json),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
