use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

#[derive(Parser)]
#[command(name = "daily-checkin", version, about = "Daily on-chain check-in CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate eligibility for a timestamp without touching the chain
    Eval(commands::eval::EvalArgs),
    /// Connect and print the current record and eligibility
    Status(commands::session::StatusArgs),
    /// Connect and show the countdown until interrupted
    Watch(commands::session::WatchArgs),
    /// Connect and check in if the window is open
    CheckIn(commands::session::CheckInArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("DAILY_CHECKIN_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Eval(args) => commands::eval::run(args),
        Commands::Status(args) => commands::session::status(args).await,
        Commands::Watch(args) => commands::session::watch(args).await,
        Commands::CheckIn(args) => commands::session::check_in(args).await,
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
