//! Debounced viewport coordinator
//!
//! Maps fire a viewport change on every pan frame. The coordinator runs a
//! background task that:
//! - Coalesces bursts of changes into one query for the latest viewport
//! - Never runs two queries at once (a change during a query restarts the
//!   debounce window instead)
//! - Tags each query with a request generation and only publishes results
//!   newer than what is already shown
//! - Keeps the last clusters on screen when the store is unreachable and
//!   flags the snapshot as degraded
//!
//! Snapshots are published on a `watch` channel.

use crate::cluster::Cluster;
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::geo::Viewport;
use crate::store::SubmissionStore;
use crate::viewport::{query_viewport, ViewportResult};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Duration, Instant};
use tracing::{debug, info, warn};

/// Whether the store answered the last query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ConnectivityStatus {
    /// No query has completed yet
    Idle,
    Online,
    /// The last query failed; clusters are from an earlier query
    Degraded { reason: String },
}

/// What the map should currently render
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSet {
    /// Generation of the request that produced `clusters`
    pub generation: u64,
    /// Viewport `clusters` were computed for
    pub viewport: Option<Viewport>,
    pub clusters: Vec<Cluster>,
    pub status: ConnectivityStatus,
    /// Last non-connectivity failure, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl Default for ClusterSet {
    fn default() -> Self {
        Self {
            generation: 0,
            viewport: None,
            clusters: Vec::new(),
            status: ConnectivityStatus::Idle,
            last_error: None,
        }
    }
}

impl ClusterSet {
    pub fn is_degraded(&self) -> bool {
        matches!(self.status, ConnectivityStatus::Degraded { .. })
    }
}

enum Command {
    Viewport(Viewport),
    Refresh,
}

struct Completed {
    generation: u64,
    viewport: Viewport,
    result: Result<ViewportResult>,
}

/// Handle to the background coordinator task
///
/// Dropping the handle stops the task.
pub struct ViewportCoordinator {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<ClusterSet>,
    task: JoinHandle<()>,
}

impl ViewportCoordinator {
    /// Start a coordinator over `store`
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<S>(store: Arc<S>, engine: EngineConfig) -> Self
    where
        S: SubmissionStore + 'static,
    {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (publisher, snapshots) = watch::channel(ClusterSet::default());

        let worker = Worker {
            debounce: engine.debounce(),
            store,
            engine,
            publisher,
            pending: None,
            deadline: None,
            current: None,
            refresh_requested: false,
            requested: 0,
            in_flight: None,
            applied: 0,
        };
        let task = tokio::spawn(worker.run(command_rx));

        Self {
            commands,
            snapshots,
            task,
        }
    }

    /// Report a new visible area; returns the clusters currently shown
    ///
    /// The query for this viewport runs once the debounce window passes
    /// without another change.
    pub fn on_viewport_change(&self, viewport: Viewport) -> Result<ClusterSet> {
        viewport.validate()?;
        self.send(Command::Viewport(viewport))?;
        Ok(self.current())
    }

    /// Re-query the current viewport now, e.g. after the user submitted
    pub fn refresh(&self) -> Result<()> {
        self.send(Command::Refresh)
    }

    /// Latest published snapshot
    pub fn current(&self) -> ClusterSet {
        self.snapshots.borrow().clone()
    }

    /// Receiver that wakes on every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<ClusterSet> {
        self.snapshots.clone()
    }

    fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| Error::Coordinator("Coordinator task has stopped".to_string()))
    }
}

impl Drop for ViewportCoordinator {
    fn drop(&mut self) {
        self.task.abort();
    }
}

struct Worker<S> {
    store: Arc<S>,
    engine: EngineConfig,
    debounce: Duration,
    publisher: watch::Sender<ClusterSet>,
    /// Viewport waiting for its debounce window to pass
    pending: Option<Viewport>,
    deadline: Option<Instant>,
    /// Viewport of the most recently launched query
    current: Option<Viewport>,
    refresh_requested: bool,
    /// Generation of the newest request received
    requested: u64,
    /// Generation of the query currently running
    in_flight: Option<u64>,
    /// Generation of the published snapshot
    applied: u64,
}

impl<S: SubmissionStore + 'static> Worker<S> {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Completed>();

        loop {
            let deadline = self.deadline;
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Viewport(viewport)) => self.on_viewport(viewport),
                    Some(Command::Refresh) => self.on_refresh(&done_tx),
                    None => break,
                },
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.on_deadline(&done_tx);
                }
                Some(completed) = done_rx.recv() => self.on_completed(completed, &done_tx),
            }
        }

        debug!("Viewport coordinator stopped");
    }

    fn on_viewport(&mut self, viewport: Viewport) {
        self.requested += 1;
        self.pending = Some(viewport);
        self.deadline = Some(Instant::now() + self.debounce);
    }

    fn on_refresh(&mut self, done: &mpsc::UnboundedSender<Completed>) {
        self.requested += 1;
        if self.pending.is_some() {
            // The debounced query will pick up the new data anyway
            return;
        }
        match (self.in_flight, self.current) {
            (Some(_), _) => self.refresh_requested = true,
            (None, Some(viewport)) => self.launch(viewport, done),
            (None, None) => debug!("Refresh ignored: no viewport yet"),
        }
    }

    fn on_deadline(&mut self, done: &mpsc::UnboundedSender<Completed>) {
        if self.in_flight.is_some() {
            debug!("Query in flight, restarting debounce window");
            self.deadline = Some(Instant::now() + self.debounce);
            return;
        }
        self.deadline = None;
        if let Some(viewport) = self.pending.take() {
            self.launch(viewport, done);
        }
    }

    fn launch(&mut self, viewport: Viewport, done: &mpsc::UnboundedSender<Completed>) {
        let generation = self.requested;
        self.in_flight = Some(generation);
        self.current = Some(viewport);
        self.refresh_requested = false;

        debug!("Launching viewport query generation {}", generation);

        let store = Arc::clone(&self.store);
        let engine = self.engine.clone();
        let done = done.clone();
        let query = tokio::spawn(async move {
            query_viewport(store.as_ref(), &viewport, &engine, Utc::now()).await
        });
        // Reports back even when the query task panics
        tokio::spawn(async move {
            let result = query.await.unwrap_or_else(|e| {
                Err(Error::Coordinator(format!("Viewport query task failed: {}", e)))
            });
            let _ = done.send(Completed {
                generation,
                viewport,
                result,
            });
        });
    }

    fn on_completed(&mut self, completed: Completed, done: &mpsc::UnboundedSender<Completed>) {
        if self.in_flight == Some(completed.generation) {
            self.in_flight = None;
        }

        if completed.generation <= self.applied {
            debug!("Dropping stale result generation {}", completed.generation);
        } else if self.pending.is_some() {
            debug!(
                "Dropping result generation {}: superseded by a newer viewport",
                completed.generation
            );
            if let Err(e) = &completed.result {
                if e.is_degraded() {
                    self.mark_degraded(completed.generation, e);
                }
            }
        } else {
            self.publish(completed);
        }

        if self.refresh_requested && self.pending.is_none() && self.in_flight.is_none() {
            if let Some(viewport) = self.current {
                self.launch(viewport, done);
            }
        }
    }

    fn publish(&mut self, completed: Completed) {
        let Completed {
            generation,
            viewport,
            result,
        } = completed;
        self.applied = generation;

        match result {
            Ok(result) => {
                info!(
                    "Publishing {} clusters ({} visible records)",
                    result.clusters.len(),
                    result.visible
                );
                self.publisher.send_replace(ClusterSet {
                    generation,
                    viewport: Some(viewport),
                    clusters: result.clusters,
                    status: ConnectivityStatus::Online,
                    last_error: None,
                });
            }
            Err(e) if e.is_degraded() => self.mark_degraded(generation, &e),
            Err(e) => {
                warn!("Viewport query failed: {}", e);
                self.publisher.send_modify(|set| {
                    set.generation = generation;
                    set.last_error = Some(e.to_string());
                });
            }
        }
    }

    /// Flag the snapshot degraded, leaving its clusters and viewport alone
    fn mark_degraded(&mut self, generation: u64, error: &Error) {
        warn!("Viewport query failed, connectivity degraded: {}", error);
        self.applied = self.applied.max(generation);
        self.publisher.send_modify(|set| {
            set.generation = generation;
            set.status = ConnectivityStatus::Degraded {
                reason: error.to_string(),
            };
        });
    }
}
