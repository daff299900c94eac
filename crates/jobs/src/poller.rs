//! Periodic status checks for individual jobs.
//!
//! [`Poller::start_polling`] spawns one Tokio task per job. The task
//! checks the job every [`PollConfig::interval`] until it reaches a
//! terminal status, then releases its handle and invokes the caller's
//! callback exactly once. Ticks for one job never overlap: the next tick
//! is only awaited after the previous check has finished, and ticks missed
//! while a check was in flight are skipped.
//!
//! Each active poll is tracked by a [`PollHandle`] holding a
//! [`CancellationToken`] and a generation number. A poll whose handle was
//! stopped or replaced never invokes its callback, even if its in-flight
//! request resolves afterwards.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use banana_client::JobApi;
use banana_core::types::JobId;
use banana_core::{Asset, JobStatus};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::config::PollConfig;
use crate::error::JobError;

/// Terminal result of polling one job.
#[derive(Debug)]
pub enum PollOutcome {
    /// The job completed and its output asset was resolved.
    Completed(Asset),
    Failed(JobError),
}

/// Ownership token for one active poll.
struct PollHandle {
    generation: u64,
    cancel: CancellationToken,
}

type HandleMap = Mutex<HashMap<JobId, PollHandle>>;

/// Owns the active polls of one consumer. At most one poll per job id.
///
/// Dropping the poller cancels every poll it owns.
pub struct Poller {
    api: Arc<dyn JobApi>,
    config: PollConfig,
    handles: Arc<HandleMap>,
    next_generation: AtomicU64,
}

impl Poller {
    pub fn new(api: Arc<dyn JobApi>, config: PollConfig) -> Self {
        Self {
            api,
            config,
            handles: Arc::new(Mutex::new(HashMap::new())),
            next_generation: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Begin polling `job_id`, replacing any poll already active for it.
    ///
    /// `on_resolved` runs once when the job reaches a terminal outcome,
    /// after the handle has been released, so it may call back into this
    /// poller. It never runs if the poll is stopped first.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start_polling<F>(&self, job_id: impl Into<JobId>, on_resolved: F)
    where
        F: FnOnce(PollOutcome) + Send + 'static,
    {
        let job_id = job_id.into();
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let cancel = CancellationToken::new();

        let previous = lock(&self.handles).insert(
            job_id.clone(),
            PollHandle {
                generation,
                cancel: cancel.clone(),
            },
        );
        if let Some(previous) = previous {
            tracing::debug!(job_id = %job_id, "Replacing active poll");
            previous.cancel.cancel();
        }

        tracing::debug!(
            job_id = %job_id,
            interval_ms = self.config.interval.as_millis() as u64,
            "Polling started",
        );

        let task = PollTask {
            api: Arc::clone(&self.api),
            config: self.config.clone(),
            handles: Arc::clone(&self.handles),
            job_id,
            generation,
            cancel,
        };
        tokio::spawn(task.run(on_resolved));
    }

    /// Stop polling `job_id`. Safe to call repeatedly, or for a job that
    /// was never polled. Returns whether an active poll was stopped.
    pub fn stop_polling(&self, job_id: &str) -> bool {
        match lock(&self.handles).remove(job_id) {
            Some(handle) => {
                handle.cancel.cancel();
                tracing::debug!(job_id, "Polling stopped");
                true
            }
            None => false,
        }
    }

    /// Stop every active poll.
    pub fn stop_all(&self) {
        let drained: Vec<_> = lock(&self.handles).drain().collect();
        for (job_id, handle) in drained {
            handle.cancel.cancel();
            tracing::debug!(job_id = %job_id, "Polling stopped");
        }
    }

    pub fn is_polling(&self, job_id: &str) -> bool {
        lock(&self.handles).contains_key(job_id)
    }

    pub fn active_count(&self) -> usize {
        lock(&self.handles).len()
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop_all();
    }
}

/// State moved into a spawned poll task.
struct PollTask {
    api: Arc<dyn JobApi>,
    config: PollConfig,
    handles: Arc<HandleMap>,
    job_id: JobId,
    generation: u64,
    cancel: CancellationToken,
}

impl PollTask {
    async fn run<F>(self, on_resolved: F)
    where
        F: FnOnce(PollOutcome),
    {
        // `interval` panics on a zero period.
        let period = self.config.interval.max(Duration::from_millis(1));
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut attempts: u32 = 0;
        let outcome = loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return,
                _ = ticker.tick() => {}
            }

            attempts += 1;
            let checked = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return,
                checked = check_job(self.api.as_ref(), &self.job_id, &self.config) => checked,
            };

            match checked {
                Some(outcome) => break outcome,
                None if self.config.budget_exhausted(attempts) => {
                    tracing::warn!(job_id = %self.job_id, attempts, "Poll budget exhausted");
                    break PollOutcome::Failed(JobError::PollTimeout { attempts });
                }
                None => {
                    tracing::trace!(job_id = %self.job_id, attempt = attempts, "Job still running");
                }
            }
        };

        if release(&self.handles, &self.job_id, self.generation) {
            tracing::debug!(job_id = %self.job_id, attempts, "Polling resolved");
            on_resolved(outcome);
        }
    }
}

/// One status check. `None` means the job is still pending/processing.
async fn check_job(api: &dyn JobApi, job_id: &str, config: &PollConfig) -> Option<PollOutcome> {
    let job = match api.get_job(job_id).await {
        Ok(job) => job,
        Err(e) => {
            tracing::error!(job_id, error = %e, "Status check failed");
            return Some(PollOutcome::Failed(JobError::StatusCheck {
                reason: e.to_string(),
            }));
        }
    };

    match job.status {
        JobStatus::Pending | JobStatus::Processing => None,
        JobStatus::Failed => {
            let reason = job
                .error
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| config.failure_message.clone());
            tracing::info!(job_id, reason = %reason, "Job failed");
            Some(PollOutcome::Failed(JobError::JobFailed(reason)))
        }
        JobStatus::Completed => {
            let Some(asset_id) = job.output_asset_id else {
                tracing::error!(job_id, "Job completed without output asset");
                return Some(PollOutcome::Failed(JobError::ProtocolViolation {
                    job_id: job_id.to_string(),
                }));
            };

            match api.get_asset(&asset_id).await {
                Ok(asset) => {
                    tracing::info!(job_id, asset_id = %asset.id, "Job completed");
                    Some(PollOutcome::Completed(asset))
                }
                Err(e) => {
                    tracing::error!(job_id, asset_id = %asset_id, error = %e, "Asset fetch failed");
                    Some(PollOutcome::Failed(JobError::StatusCheck {
                        reason: e.to_string(),
                    }))
                }
            }
        }
    }
}

/// Release the handle for `job_id` if it still belongs to `generation`.
///
/// Returns `false` when the poll was stopped or replaced, in which case
/// its outcome must be discarded.
fn release(handles: &HandleMap, job_id: &str, generation: u64) -> bool {
    let mut handles = lock(handles);
    match handles.get(job_id) {
        Some(handle) if handle.generation == generation && !handle.cancel.is_cancelled() => {
            handles.remove(job_id);
            true
        }
        _ => false,
    }
}

fn lock(handles: &HandleMap) -> MutexGuard<'_, HashMap<JobId, PollHandle>> {
    // The map stays consistent across a panicking holder.
    handles.lock().unwrap_or_else(PoisonError::into_inner)
}
