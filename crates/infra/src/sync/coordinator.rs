//! Sync coordinator for the durable operation queue.
//!
//! Drains the queue in FIFO order against the remote endpoints, one request
//! at a time, and owns the retry/abandonment policy: a failed attempt
//! increments the record's retry counter, and a record whose counter reaches
//! the budget is removed permanently with a diagnostic log entry. Passes
//! never overlap; a trigger that arrives while a pass is running is ignored.
//!
//! Two triggers share the single `sync` entry point: a recurring timer and
//! the connectivity-restored transition, both armed by `start_auto_sync`.
//! Join handles are tracked, cancellation is explicit, and every dispatch is
//! wrapped in a timeout.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use clubsync_infra::sync::{SyncCoordinator, SyncCoordinatorConfig};
//!
//! # async fn example() -> Result<(), clubsync_infra::sync::SyncError> {
//! // ... create queue store, dispatcher, and connectivity receiver ...
//! # let queue = todo!(); // Arc<dyn OperationQueue>
//! # let dispatcher = todo!(); // Arc<dyn OperationDispatcher>
//! # let connectivity = todo!(); // watch::Receiver<ConnectivityState>
//! let mut coordinator = SyncCoordinator::new(
//!     queue,
//!     dispatcher,
//!     connectivity,
//!     SyncCoordinatorConfig::default(),
//! );
//!
//! coordinator.start_auto_sync(Duration::from_secs(60)).await?;
//! // ... application runs; queued operations drain as connectivity allows ...
//! coordinator.stop_auto_sync().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use clubsync_core::OperationQueue;
use clubsync_domain::constants::{DEFAULT_DISPATCH_TIMEOUT_SECS, MAX_SYNC_ATTEMPTS};
use clubsync_domain::{ConnectivityState, OperationRecord};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use super::errors::SyncError;

/// Configuration for the sync coordinator.
#[derive(Debug, Clone)]
pub struct SyncCoordinatorConfig {
    /// Failed attempts after which a record is abandoned
    pub max_retries: i32,
    /// Timeout for a single remote dispatch
    pub dispatch_timeout: Duration,
    /// Join timeout when stopping
    pub join_timeout: Duration,
}

impl Default for SyncCoordinatorConfig {
    fn default() -> Self {
        Self {
            max_retries: MAX_SYNC_ATTEMPTS,
            dispatch_timeout: Duration::from_secs(DEFAULT_DISPATCH_TIMEOUT_SECS),
            join_timeout: Duration::from_secs(5),
        }
    }
}

/// Interface for submitting a queued operation to its remote endpoint.
#[async_trait]
pub trait OperationDispatcher: Send + Sync {
    /// Dispatch one operation record; `Ok` means the endpoint reported an
    /// explicit success status.
    async fn dispatch(&self, record: &OperationRecord) -> Result<(), SyncError>;
}

/// Counters for one completed sync pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Records in the snapshot the pass worked through
    pub attempted: usize,
    /// Records synced and removed
    pub synced: usize,
    /// Records left queued with an incremented retry counter
    pub requeued: usize,
    /// Records removed after exhausting the retry budget
    pub abandoned: usize,
}

/// Result of one call to [`SyncCoordinator::sync`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The pass ran to completion over its snapshot.
    Completed(SyncReport),
    /// Another pass was already in progress; this trigger was ignored.
    Skipped,
}

/// Shared pieces the background loop needs, bundled to keep the spawn site
/// readable.
struct SyncLoopContext {
    queue: Arc<dyn OperationQueue>,
    dispatcher: Arc<dyn OperationDispatcher>,
    pass_lock: Arc<Mutex<()>>,
    config: SyncCoordinatorConfig,
}

/// Sync coordinator with explicit lifecycle management.
pub struct SyncCoordinator {
    queue: Arc<dyn OperationQueue>,
    dispatcher: Arc<dyn OperationDispatcher>,
    connectivity: watch::Receiver<ConnectivityState>,
    config: SyncCoordinatorConfig,
    pass_lock: Arc<Mutex<()>>,
    cancellation: CancellationToken,
    task_handle: Option<JoinHandle<()>>,
}

impl SyncCoordinator {
    /// Create a new coordinator over the given queue store and dispatcher.
    pub fn new(
        queue: Arc<dyn OperationQueue>,
        dispatcher: Arc<dyn OperationDispatcher>,
        connectivity: watch::Receiver<ConnectivityState>,
        config: SyncCoordinatorConfig,
    ) -> Self {
        Self {
            queue,
            dispatcher,
            connectivity,
            config,
            pass_lock: Arc::new(Mutex::new(())),
            cancellation: CancellationToken::new(),
            task_handle: None,
        }
    }

    /// Run one synchronization pass over the queue as it exists right now.
    ///
    /// Records are processed in FIFO order, sequentially. A record's failure
    /// never aborts the pass for the remaining queue. If another pass is
    /// already running the call returns [`SyncOutcome::Skipped`] without
    /// touching the queue.
    ///
    /// # Errors
    ///
    /// Returns an error when the queue store itself fails (listing,
    /// removing, or updating records); dispatch failures are absorbed by the
    /// retry policy and reported through the [`SyncReport`] counters.
    #[instrument(skip(self))]
    pub async fn sync(&self) -> Result<SyncOutcome, SyncError> {
        Self::run_pass(&self.queue, &self.dispatcher, &self.pass_lock, &self.config).await
    }

    /// Start automatic synchronization.
    ///
    /// Spawns the background loop: a recurring timer at `interval` plus an
    /// immediate out-of-cadence pass whenever connectivity transitions from
    /// offline to online. Timer ticks while offline are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::AlreadyRunning`] if the loop is already active.
    #[instrument(skip(self))]
    pub async fn start_auto_sync(&mut self, interval: Duration) -> Result<(), SyncError> {
        if self.is_running() {
            return Err(SyncError::AlreadyRunning);
        }

        info!(interval_secs = interval.as_secs(), "starting auto sync");

        // Create fresh cancellation token (supports restart after stop)
        self.cancellation = CancellationToken::new();

        let context = SyncLoopContext {
            queue: Arc::clone(&self.queue),
            dispatcher: Arc::clone(&self.dispatcher),
            pass_lock: Arc::clone(&self.pass_lock),
            config: self.config.clone(),
        };
        let connectivity = self.connectivity.clone();
        let cancel = self.cancellation.clone();

        let handle = tokio::spawn(async move {
            Self::auto_sync_loop(context, connectivity, cancel, interval).await;
        });

        self.task_handle = Some(handle);
        info!("auto sync started");

        Ok(())
    }

    /// Stop automatic synchronization.
    ///
    /// Cancels the timer and the connectivity listener; an in-flight pass is
    /// allowed to finish its current dispatch before the loop exits.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NotRunning`] if the loop is not active, or a
    /// join error when the background task fails to wind down in time.
    #[instrument(skip(self))]
    pub async fn stop_auto_sync(&mut self) -> Result<(), SyncError> {
        if !self.is_running() {
            return Err(SyncError::NotRunning);
        }

        info!("stopping auto sync");

        // Cancel background task
        self.cancellation.cancel();

        // Await join handle with timeout
        if let Some(handle) = self.task_handle.take() {
            let join_timeout = self.config.join_timeout;
            match tokio::time::timeout(join_timeout, handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    warn!(error = %e, "auto sync task panicked");
                    return Err(SyncError::TaskJoin(e.to_string()));
                }
                Err(_) => {
                    warn!("auto sync task did not complete within timeout");
                    return Err(SyncError::Timeout(join_timeout));
                }
            }
        }

        info!("auto sync stopped");
        Ok(())
    }

    /// Returns true when the auto sync loop is active.
    pub fn is_running(&self) -> bool {
        self.task_handle.is_some()
    }

    /// Background loop: recurring timer plus connectivity trigger.
    async fn auto_sync_loop(
        context: SyncLoopContext,
        mut connectivity: watch::Receiver<ConnectivityState>,
        cancel: CancellationToken,
        interval: Duration,
    ) {
        let SyncLoopContext { queue, dispatcher, pass_lock, config } = context;
        let mut connectivity_open = true;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("auto sync loop cancelled");
                    break;
                }
                _ = tokio::time::sleep(interval) => {
                    if !connectivity.borrow().is_online() {
                        debug!("offline; skipping scheduled sync pass");
                        continue;
                    }
                    if let Err(e) = Self::run_pass(&queue, &dispatcher, &pass_lock, &config).await {
                        error!(error = %e, "scheduled sync pass failed");
                    }
                }
                changed = connectivity.changed(), if connectivity_open => {
                    match changed {
                        Ok(()) => {
                            if connectivity.borrow_and_update().is_online() {
                                info!("connectivity restored; triggering immediate sync pass");
                                if let Err(e) =
                                    Self::run_pass(&queue, &dispatcher, &pass_lock, &config).await
                                {
                                    error!(error = %e, "connectivity-triggered sync pass failed");
                                }
                            } else {
                                debug!("connectivity lost; pausing scheduled passes");
                            }
                        }
                        Err(_) => {
                            // Signal source dropped; keep running on the timer alone.
                            debug!("connectivity signal closed");
                            connectivity_open = false;
                        }
                    }
                }
            }
        }
    }

    /// One pass over the current queue snapshot.
    async fn run_pass(
        queue: &Arc<dyn OperationQueue>,
        dispatcher: &Arc<dyn OperationDispatcher>,
        pass_lock: &Arc<Mutex<()>>,
        config: &SyncCoordinatorConfig,
    ) -> Result<SyncOutcome, SyncError> {
        // Overlapping passes would dispatch the same record twice; a trigger
        // that loses the race is dropped, not queued.
        let Ok(_guard) = pass_lock.try_lock() else {
            debug!("sync pass already in progress; ignoring trigger");
            return Ok(SyncOutcome::Skipped);
        };

        let pending = queue.list_pending().await.map_err(SyncError::from)?;

        if pending.is_empty() {
            debug!("no pending operations to sync");
            return Ok(SyncOutcome::Completed(SyncReport::default()));
        }

        info!(count = pending.len(), "starting sync pass");

        let mut report = SyncReport { attempted: pending.len(), ..SyncReport::default() };
        let mut fatal_errors: Vec<String> = Vec::new();

        for record in pending {
            let outcome =
                tokio::time::timeout(config.dispatch_timeout, dispatcher.dispatch(&record)).await;

            let failure = match outcome {
                Ok(Ok(())) => None,
                Ok(Err(err)) => Some(err),
                Err(_) => Some(SyncError::Timeout(config.dispatch_timeout)),
            };

            match failure {
                None => {
                    debug!(operation_id = %record.id, "operation synced");
                    if let Err(err) = queue.remove(&record.id).await {
                        let msg = err.to_string();
                        warn!(operation_id = %record.id, error = %msg, "remove failed");
                        fatal_errors.push(format!("remove error for {}: {}", record.id, msg));
                    } else {
                        report.synced += 1;
                    }
                }
                Some(err) => {
                    warn!(
                        operation_id = %record.id,
                        error = %err,
                        "dispatch failed"
                    );

                    let new_count = match queue.increment_retry(&record.id).await {
                        Ok(count) => count,
                        Err(mark_err) => {
                            let msg = mark_err.to_string();
                            warn!(operation_id = %record.id, error = %msg, "increment_retry failed");
                            fatal_errors
                                .push(format!("increment_retry error for {}: {}", record.id, msg));
                            report.requeued += 1;
                            continue;
                        }
                    };

                    if new_count >= config.max_retries {
                        if let Err(remove_err) = queue.remove(&record.id).await {
                            let msg = remove_err.to_string();
                            warn!(operation_id = %record.id, error = %msg, "remove failed");
                            fatal_errors
                                .push(format!("remove error for {}: {}", record.id, msg));
                            continue;
                        }
                        warn!(
                            operation_id = %record.id,
                            resource = %record.resource,
                            kind = %record.kind,
                            retry_count = new_count,
                            "operation abandoned after exhausting retries"
                        );
                        report.abandoned += 1;
                    } else {
                        debug!(
                            operation_id = %record.id,
                            retry_count = new_count,
                            "operation requeued for a later pass"
                        );
                        report.requeued += 1;
                    }
                }
            }
        }

        info!(
            synced = report.synced,
            requeued = report.requeued,
            abandoned = report.abandoned,
            "sync pass completed"
        );

        if !fatal_errors.is_empty() {
            return Err(SyncError::Database(fatal_errors.join("; ")));
        }

        Ok(SyncOutcome::Completed(report))
    }
}

impl Drop for SyncCoordinator {
    fn drop(&mut self) {
        if self.is_running() {
            warn!("SyncCoordinator dropped while running; cancelling tasks");
            self.cancellation.cancel();
        }
    }
}
