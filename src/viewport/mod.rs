//! Viewport queries
//!
//! Turns a visible map rectangle into clusters:
//! 1. Derive spatial key ranges for the viewport
//! 2. Range-scan the store (recent records only, capped)
//! 3. Drop the over-fetched margin with an exact bounding filter
//! 4. Cluster what is left
//!
//! `query_viewport` runs this once. `ViewportCoordinator` wraps it with
//! debouncing and latest-request-wins publishing for interactive maps.

pub mod coordinator;

use crate::cluster::{cluster, Cluster};
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::geo::spatial_key::{range_for_viewport, SpatialKeyRange};
use crate::geo::Viewport;
use crate::store::{RangeQuery, SubmissionStore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use coordinator::{ClusterSet, ConnectivityStatus, ViewportCoordinator};

/// Clusters for one viewport plus what it took to compute them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewportResult {
    /// Key ranges that were scanned
    pub ranges: Vec<SpatialKeyRange>,
    /// Rows returned by the store before the bounding filter
    pub fetched: usize,
    /// Rows inside the viewport
    pub visible: usize,
    pub clusters: Vec<Cluster>,
}

/// Range queries to issue for a viewport at time `now`
pub fn queries_for_viewport(
    viewport: &Viewport,
    engine: &EngineConfig,
    now: DateTime<Utc>,
) -> Result<Vec<RangeQuery>> {
    let since = now.checked_sub_signed(engine.retention()).ok_or_else(|| {
        Error::Config(format!(
            "Retention window of {} days reaches before the earliest timestamp",
            engine.retention_days
        ))
    })?;
    Ok(range_for_viewport(viewport)?
        .into_iter()
        .map(|range| RangeQuery {
            range,
            since,
            limit: engine.result_cap,
        })
        .collect())
}

/// Fetch, filter and cluster the submissions visible in `viewport`
///
/// The result cap applies across all ranges together.
pub async fn query_viewport<S: SubmissionStore>(
    store: &S,
    viewport: &Viewport,
    engine: &EngineConfig,
    now: DateTime<Utc>,
) -> Result<ViewportResult> {
    let queries = queries_for_viewport(viewport, engine, now)?;

    let mut rows = Vec::new();
    for mut query in queries.iter().cloned() {
        query.limit = engine.result_cap.saturating_sub(rows.len());
        if query.limit == 0 {
            break;
        }
        rows.extend(store.query_range(&query).await?);
    }
    let fetched = rows.len();

    rows.retain(|s| viewport.contains(s.location));
    let visible = rows.len();

    let clusters = cluster(&rows, engine.cluster_radius_km)?;
    debug!(
        "Viewport query: {} fetched, {} visible, {} clusters",
        fetched,
        visible,
        clusters.len()
    );

    Ok(ViewportResult {
        ranges: queries.into_iter().map(|q| q.range).collect(),
        fetched,
        visible,
        clusters,
    })
}
