use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;
mod db;

use commands::{ConfigCommand, PlanCommand, RecipeCommand, ShopCommand, StoreCommand, SyncCommand};
use config::Config;

#[derive(Parser)]
#[command(name = "cookplan")]
#[command(version)]
#[command(about = "Recipes, cooking plan and shopping list, synced to a shared store", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage recipes
    Recipe(RecipeCommand),

    /// Manage the cooking plan
    Plan(PlanCommand),

    /// Manage the shopping list
    Shop(ShopCommand),

    /// Resync with the remote store
    Sync(SyncCommand),

    /// Manage the remote store binding
    Store(StoreCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cookplan=warn".into()),
        )
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = Config::load(cli.config)?;

    match cli.command {
        Commands::Recipe(cmd) => cmd.run(&config).await,
        Commands::Plan(cmd) => cmd.run(&config).await,
        Commands::Shop(cmd) => cmd.run(&config).await,
        Commands::Sync(cmd) => cmd.run(&config).await,
        Commands::Store(cmd) => cmd.run(&config).await,
        Commands::Config(cmd) => cmd.run(&config),
    }
}
