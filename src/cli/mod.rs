//! CLI command handlers
//!
//! Each subcommand has its own module with handler functions.

pub mod clusters;
pub mod config;
pub mod seed;
pub mod serve;
pub mod status;
pub mod submit;

use clap::{Parser, Subcommand};

/// Civic complaint and compliment map
#[derive(Parser)]
#[command(name = "civicmap")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start web server (foreground)
    Serve(serve::ServeArgs),

    /// Submit a complaint or compliment
    Submit(submit::SubmitArgs),

    /// Show clusters inside a viewport
    Clusters(clusters::ClustersArgs),

    /// Fill the store with random submissions
    Seed(seed::SeedArgs),

    /// Manage configuration
    Config(config::ConfigArgs),

    /// Show store/server status
    Status(status::StatusArgs),
}

/// Run the CLI
pub async fn run() -> crate::error::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => serve::run(args).await,
        Commands::Submit(args) => submit::run(args).await,
        Commands::Clusters(args) => clusters::run(args).await,
        Commands::Seed(args) => seed::run(args).await,
        Commands::Config(args) => config::run(args),
        Commands::Status(args) => status::run(args).await,
    }
}
