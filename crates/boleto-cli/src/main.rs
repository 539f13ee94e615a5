//! CLI application for boleto processing.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{batch, config, history, ledger, log, process};

/// Boleto automation - Extract bills from PDFs into the accounts-payable ledger
#[derive(Parser)]
#[command(name = "boleto")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a single boleto (PDF or text file)
    Process(process::ProcessArgs),

    /// Process every PDF in the inbox folder
    Batch(batch::BatchArgs),

    /// Inspect and maintain the ledger
    Ledger(ledger::LedgerArgs),

    /// Show or clear the processing log
    Log(log::LogArgs),

    /// List or clear files in the processed folder
    History(history::HistoryArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Process(args) => process::run(args, cli.config.as_deref()).await,
        Commands::Batch(args) => batch::run(args, cli.config.as_deref()).await,
        Commands::Ledger(args) => ledger::run(args, cli.config.as_deref()).await,
        Commands::Log(args) => log::run(args, cli.config.as_deref()).await,
        Commands::History(args) => history::run(args, cli.config.as_deref()).await,
        Commands::Config(args) => config::run(args, cli.config.as_deref()).await,
    }
}
