//! Status command handler
//!
//! Shows store contents, engine tunables and server status.

use crate::config::Config;
use crate::error::Result;
use crate::store::SubmissionStore;
use clap::Args;

/// Status command arguments
#[derive(Args)]
pub struct StatusArgs {
    /// Check if server is running (tries to connect)
    #[arg(long)]
    pub server: bool,
}

/// Run the status command
pub async fn run(args: StatusArgs) -> Result<()> {
    let config = Config::load()?;

    // Check server status if requested
    if args.server {
        check_server_status(&config).await;
    }

    println!("civicmap v{}", env!("CARGO_PKG_VERSION"));
    println!();

    let path = config.store_path()?;
    println!("Store: {}", path.display());
    match config.open_store() {
        Ok(store) => match store.len().await {
            Ok(count) => println!("  Submissions: {}", count),
            Err(e) => println!("  Error: {}", e),
        },
        Err(e) => println!("  UNAVAILABLE: {}", e),
    }
    println!();

    let engine = &config.engine;
    println!("Engine:");
    println!("  Cluster radius:   {} km", engine.cluster_radius_km);
    println!("  Duplicate radius: {} km", engine.duplicate_radius_km);
    println!("  Retention:        {} days", engine.retention_days);
    println!("  Result cap:       {}", engine.result_cap);
    println!("  Debounce:         {} ms", engine.debounce_ms);

    Ok(())
}

/// Check if the server is running
async fn check_server_status(config: &Config) {
    let url = format!("http://{}/api/status", config.server_addr());

    match reqwest::get(&url).await {
        Ok(response) => {
            if response.status().is_success() {
                println!("Server: RUNNING on {}", config.server_addr());
                if let Ok(body) = response.text().await {
                    if let Ok(status) = serde_json::from_str::<serde_json::Value>(&body) {
                        if let Some(version) = status.get("version").and_then(|v| v.as_str()) {
                            println!("  Version: {}", version);
                        }
                        if let Some(store) = status.get("store").and_then(|v| v.as_str()) {
                            println!("  Store: {}", store);
                        }
                        if let Some(count) = status.get("submissions").and_then(|v| v.as_u64()) {
                            println!("  Submissions: {}", count);
                        }
                    }
                }
            } else {
                println!("Server: ERROR (status {})", response.status());
            }
        }
        Err(_) => {
            println!("Server: NOT RUNNING on {}", config.server_addr());
        }
    }
    println!();
}
