//! Submit command handler
//!
//! Records one complaint or compliment in the configured store.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::policy::{submit, SubmitOutcome};
use crate::report::category::available_categories;
use crate::report::{slots, Mode, NewSubmission};
use clap::Args;
use std::str::FromStr;

/// Submit command arguments
#[derive(Args)]
pub struct SubmitArgs {
    /// Latitude
    #[arg(long, allow_hyphen_values = true, required_unless_present = "list_categories")]
    pub lat: Option<f64>,

    /// Longitude
    #[arg(long, allow_hyphen_values = true, required_unless_present = "list_categories")]
    pub lng: Option<f64>,

    /// complaint or compliment
    #[arg(long, short = 'm', default_value = "complaint")]
    pub mode: String,

    /// Category slot to select (repeatable)
    #[arg(long, short = 'c')]
    pub category: Vec<String>,

    /// Free-text address
    #[arg(long, default_value = "")]
    pub address: String,

    /// Submitter identity
    #[arg(long, short = 's', required_unless_present = "list_categories")]
    pub submitter: Option<String>,

    /// List categories and their slots
    #[arg(short = 'C', long = "list-categories")]
    pub list_categories: bool,
}

/// Run the submit command
pub async fn run(args: SubmitArgs) -> Result<()> {
    if args.list_categories {
        list_categories();
        return Ok(());
    }

    let (Some(lat), Some(lng)) = (args.lat, args.lng) else {
        return Err(Error::InvalidCoordinates(
            "Submission needs --lat and --lng".to_string(),
        ));
    };

    let config = Config::load()?;
    let store = config.open_store()?;

    let request = NewSubmission {
        mode: Mode::from_str(&args.mode).map_err(Error::InvalidSubmission)?,
        lat,
        lng,
        categories: slots(args.category),
        address: args.address,
        submitter_id: args.submitter.unwrap_or_default(),
    };

    match submit(&store, request, &config.engine).await? {
        SubmitOutcome::Accepted { submission } => {
            println!("Accepted {} ({})", submission.id, submission.spatial_key);
        }
        SubmitOutcome::Rejected { categories } => {
            let names: Vec<&str> = categories.iter().map(|c| c.as_str()).collect();
            eprintln!("Rejected: already reported nearby: {}", names.join(", "));
            std::process::exit(2);
        }
    }

    Ok(())
}

/// Print the category catalogue
fn list_categories() {
    println!("Available categories:");
    for category in available_categories() {
        println!("  {:10} - {}", category.as_str(), category.slots().join(", "));
    }
}
