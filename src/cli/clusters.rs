//! Clusters command handler
//!
//! Runs a one-shot viewport query against the configured store.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::format::{available_formats, get_formatter};
use crate::geo::Viewport;
use crate::viewport::query_viewport;
use chrono::Utc;
use clap::Args;

/// Clusters command arguments
#[derive(Args)]
pub struct ClustersArgs {
    /// Southern latitude of the viewport
    #[arg(long, allow_hyphen_values = true, required_unless_present = "list_formats")]
    pub south: Option<f64>,

    /// Western longitude of the viewport
    #[arg(long, allow_hyphen_values = true, required_unless_present = "list_formats")]
    pub west: Option<f64>,

    /// Northern latitude of the viewport
    #[arg(long, allow_hyphen_values = true, required_unless_present = "list_formats")]
    pub north: Option<f64>,

    /// Eastern longitude of the viewport
    #[arg(long, allow_hyphen_values = true, required_unless_present = "list_formats")]
    pub east: Option<f64>,

    /// Clustering radius in kilometers (overrides engine.cluster_radius_km)
    #[arg(long, short = 'r')]
    pub radius: Option<f64>,

    /// Output format
    #[arg(long, short = 'f', default_value = "text")]
    pub format: String,

    /// Write output to file
    #[arg(long, short = 'o')]
    pub output: Option<String>,

    /// List available formats
    #[arg(short = 'F', long = "list-formats")]
    pub list_formats: bool,
}

/// Run the clusters command
pub async fn run(args: ClustersArgs) -> Result<()> {
    if args.list_formats {
        list_formats();
        return Ok(());
    }

    let (Some(south), Some(west), Some(north), Some(east)) =
        (args.south, args.west, args.north, args.east)
    else {
        return Err(Error::InvalidCoordinates(
            "Viewport needs --south, --west, --north and --east".to_string(),
        ));
    };

    let formatter = get_formatter(&args.format)
        .ok_or_else(|| Error::Config(format!("Unknown format: {}", args.format)))?;

    let config = Config::load()?;
    let mut engine = config.engine.clone();
    if let Some(radius) = args.radius {
        engine.cluster_radius_km = radius;
        engine.validate()?;
    }

    let viewport = Viewport::from_bounds(south, west, north, east);
    viewport.validate()?;

    let store = config.open_store()?;
    let result = query_viewport(&store, &viewport, &engine, Utc::now()).await?;
    let output = formatter.format(&result, &config)?;

    if let Some(path) = args.output {
        std::fs::write(&path, &output)?;
        eprintln!("Output written to {}", path);
    } else {
        println!("{}", output);
    }

    Ok(())
}

/// Print available output formats
fn list_formats() {
    println!("Available output formats:");
    for format in available_formats() {
        println!("  {:6} - {}", format.name, format.description);
    }
}
