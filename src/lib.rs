//! civicmap: location-tagged complaints and compliments on a map
//!
//! A library and CLI tool that stores geo-tagged civic reports and groups
//! them into proximity clusters for whatever part of the map is visible.
//!
//! ## Features
//!
//! - Haversine distance and geohash spatial keys with prefix range queries
//! - Greedy seed-based clustering with per-mode and per-category tallies
//! - Debounced, latest-wins viewport coordinator
//! - Proximity duplicate policy per submitter
//! - HTTP API + CLI interface
//!
//! ## Quick Start
//!
//! ```rust
//! use civicmap::cluster::cluster;
//! use civicmap::geo::Coordinate;
//! use civicmap::report::{slots, Mode, Submission};
//!
//! let now = chrono::Utc::now();
//! let records = vec![
//!     Submission::with_id("a", Mode::Complaint, Coordinate::new(40.7100, -74.01),
//!         slots(["potholes"]), "", "alice", now).unwrap(),
//!     Submission::with_id("b", Mode::Compliment, Coordinate::new(40.7101, -74.01),
//!         slots(["nice_park"]), "", "bob", now).unwrap(),
//! ];
//!
//! // 50 m proximity threshold
//! let clusters = cluster(&records, 0.05).unwrap();
//! assert_eq!(clusters.len(), 1);
//! assert_eq!(clusters[0].count, 2);
//! ```

pub mod cli;
pub mod cluster;
pub mod config;
pub mod constants;
pub mod error;
pub mod format;
pub mod geo;
pub mod policy;
pub mod report;
pub mod server;
pub mod store;
pub mod synthetic;
pub mod viewport;

// Re-export commonly used types
pub use cluster::Cluster;
pub use config::{Config, EngineConfig};
pub use error::{Error, Result};
pub use geo::{Coordinate, Viewport};
pub use report::{Category, Mode, NewSubmission, Submission};
pub use store::{DocumentStore, SubmissionStore};
pub use viewport::{ClusterSet, ViewportCoordinator};
