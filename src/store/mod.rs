//! Submission document store
//!
//! The engine only needs ordered range scans on the spatial key plus an
//! equality lookup on the submitter. `SubmissionStore` is that interface;
//! `DocumentStore` is the bundled implementation, held in memory and
//! optionally persisted to a JSON file in the XDG data directory
//! (~/.local/share/civicmap/).

use crate::constants::store::{APP_DIR_NAME, SUBMISSIONS_FILE_NAME};
use crate::error::{Error, Result};
use crate::geo::spatial_key::SpatialKeyRange;
use crate::report::Submission;
use chrono::{DateTime, Utc};
use std::fs;
use std::future::Future;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

/// A range scan over the spatial key
#[derive(Debug, Clone, PartialEq)]
pub struct RangeQuery {
    /// Key bounds: `min` inclusive, `max` exclusive
    pub range: SpatialKeyRange,
    /// Only records created at or after this instant
    pub since: DateTime<Utc>,
    /// Maximum number of rows returned
    pub limit: usize,
}

impl RangeQuery {
    /// Whether a submission satisfies the query predicates
    pub fn matches(&self, submission: &Submission) -> bool {
        self.range.contains(&submission.spatial_key) && submission.created_at >= self.since
    }
}

/// Trait for submission stores
///
/// Implementations must be thread-safe (Send + Sync) to work with the
/// async server and the viewport coordinator task.
pub trait SubmissionStore: Send + Sync {
    /// Records matching `query`, ordered by spatial key ascending then
    /// newest first, truncated to `query.limit`
    fn query_range(
        &self,
        query: &RangeQuery,
    ) -> impl Future<Output = Result<Vec<Submission>>> + Send;

    /// Every record from one submitter, newest first
    fn history_for(
        &self,
        submitter_id: &str,
    ) -> impl Future<Output = Result<Vec<Submission>>> + Send;

    /// Append a record
    fn insert(&self, submission: Submission) -> impl Future<Output = Result<()>> + Send;

    /// Number of stored records
    fn len(&self) -> impl Future<Output = Result<usize>> + Send;
}

/// In-memory submission store with optional JSON file persistence
#[derive(Debug)]
pub struct DocumentStore {
    submissions: RwLock<Vec<Submission>>,
    path: Option<PathBuf>,
    offline: AtomicBool,
}

impl DocumentStore {
    /// Get the data directory path
    pub fn data_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine data directory".to_string()))
    }

    /// Get the default submissions file path
    pub fn default_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join(SUBMISSIONS_FILE_NAME))
    }

    /// A store that lives only in memory
    pub fn in_memory() -> Self {
        Self::with_submissions(Vec::new())
    }

    /// An in-memory store preloaded with submissions
    pub fn with_submissions(submissions: Vec<Submission>) -> Self {
        Self {
            submissions: RwLock::new(submissions),
            path: None,
            offline: AtomicBool::new(false),
        }
    }

    /// Open a file-backed store, loading existing records
    pub fn open(path: PathBuf) -> Result<Self> {
        let submissions = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| {
                Error::StoreUnavailable(format!("Failed to read submissions file: {}", e))
            })?;

            serde_json::from_str(&content).map_err(|e| {
                Error::StoreUnavailable(format!("Failed to parse submissions file: {}", e))
            })?
        } else {
            Vec::new()
        };

        Ok(Self {
            submissions: RwLock::new(submissions),
            path: Some(path),
            offline: AtomicBool::new(false),
        })
    }

    /// Simulate losing (or regaining) the connection to the store
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Backing file, if any
    pub fn path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }

    /// Append many records with a single file write
    pub async fn insert_batch(&self, batch: Vec<Submission>) -> Result<usize> {
        self.ensure_online()?;

        let mut submissions = self.submissions.write().await;
        let before = submissions.len();
        submissions.extend(batch);
        if let Err(e) = self.save(&submissions) {
            submissions.truncate(before);
            return Err(e);
        }

        Ok(submissions.len() - before)
    }

    fn ensure_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::StoreUnavailable("Store is offline".to_string()));
        }
        Ok(())
    }

    fn save(&self, submissions: &[Submission]) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::StoreUnavailable(format!("Failed to create data directory: {}", e))
            })?;
        }

        let content = serde_json::to_string_pretty(submissions)?;

        fs::write(path, content).map_err(|e| {
            Error::StoreUnavailable(format!("Failed to write submissions file: {}", e))
        })?;

        Ok(())
    }
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl SubmissionStore for DocumentStore {
    async fn query_range(&self, query: &RangeQuery) -> Result<Vec<Submission>> {
        self.ensure_online()?;

        let submissions = self.submissions.read().await;
        let mut matches: Vec<Submission> = submissions
            .iter()
            .filter(|s| query.matches(s))
            .cloned()
            .collect();

        matches.sort_by(|a, b| {
            a.spatial_key
                .cmp(&b.spatial_key)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        matches.truncate(query.limit);

        debug!(
            "Range query {}..{} returned {} records",
            query.range.min,
            query.range.max,
            matches.len()
        );

        Ok(matches)
    }

    async fn history_for(&self, submitter_id: &str) -> Result<Vec<Submission>> {
        self.ensure_online()?;

        let submissions = self.submissions.read().await;
        let mut history: Vec<Submission> = submissions
            .iter()
            .filter(|s| s.submitter_id == submitter_id)
            .cloned()
            .collect();
        history.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(history)
    }

    async fn insert(&self, submission: Submission) -> Result<()> {
        self.ensure_online()?;

        let mut submissions = self.submissions.write().await;
        submissions.push(submission);
        if let Err(e) = self.save(&submissions) {
            submissions.pop();
            return Err(e);
        }

        Ok(())
    }

    async fn len(&self) -> Result<usize> {
        self.ensure_online()?;
        Ok(self.submissions.read().await.len())
    }
}
