//! civicmap CLI entry point
//!
//! Civic report clustering - CLI + web API

use civicmap::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
