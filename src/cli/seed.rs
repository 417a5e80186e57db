//! Seed command handler
//!
//! Writes random submissions around a point, for demos.

use crate::config::Config;
use crate::error::Result;
use crate::geo::Coordinate;
use crate::synthetic::generate_submissions;
use clap::Args;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Seed command arguments
#[derive(Args)]
pub struct SeedArgs {
    /// Center latitude
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    /// Center longitude
    #[arg(long, allow_hyphen_values = true)]
    pub lng: f64,

    /// Spread radius in meters
    #[arg(long, short = 'r', default_value = "500")]
    pub radius: f64,

    /// Number of submissions
    #[arg(long, short = 'n', default_value = "100")]
    pub count: usize,

    /// Submitter id stamped on every record
    #[arg(long, default_value = "seed")]
    pub submitter: String,

    /// Spread creation times over this many days
    #[arg(long, default_value = "30")]
    pub max_age_days: i64,

    /// RNG seed for reproducible data
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Run the seed command
pub async fn run(args: SeedArgs) -> Result<()> {
    let config = Config::load()?;
    let store = config.open_store()?;

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let submissions = generate_submissions(
        Coordinate::new(args.lat, args.lng),
        args.radius,
        args.count,
        &args.submitter,
        args.max_age_days,
        &mut rng,
    )?;

    let added = store.insert_batch(submissions).await?;
    match store.path() {
        Some(path) => println!("Added {} submissions to {}", added, path.display()),
        None => println!("Added {} submissions", added),
    }

    Ok(())
}
