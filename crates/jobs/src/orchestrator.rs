//! Fan-out of one user action into N independent job + poll pairs.
//!
//! [`SlotOrchestrator`] owns a fixed number of [`Slot`]s and a private
//! [`Poller`]. Each [`submit`](SlotOrchestrator::submit) starts a new
//! *run*: slots are reset, jobs are created concurrently, and each created
//! job is polled independently. Slots handed the same job id share one
//! poll. Slot updates only ever touch the slots bound to the resolving job,
//! so resolution order does not affect the final state.
//!
//! Every update is tagged with the run it belongs to. Updates from a run
//! that has since been replaced or disposed are dropped.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use banana_client::JobApi;
use banana_core::types::JobId;
use banana_core::{JobRequest, Slot};
use futures::future::join_all;
use tokio::sync::{broadcast, watch};

use crate::config::PollConfig;
use crate::error::{JobError, OrchestratorError};
use crate::events::SlotEvent;
use crate::poller::{PollOutcome, Poller};

/// Broadcast channel capacity for slot events.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Owns the slots and polls of one page session.
///
/// Dropping the orchestrator disposes it.
pub struct SlotOrchestrator {
    api: Arc<dyn JobApi>,
    poller: Poller,
    shared: Arc<Shared>,
}

/// State reachable from poll callbacks.
struct Shared {
    board: Mutex<SlotBoard>,
    event_tx: broadcast::Sender<SlotEvent>,
    settled_tx: watch::Sender<bool>,
}

struct SlotBoard {
    slots: Vec<Slot>,
    /// Incremented by every submit and dispose.
    run: u64,
    /// Slots of the current run without a terminal state.
    in_flight: usize,
    /// Slot indices waiting on each polled job of the current run.
    bindings: HashMap<JobId, Vec<usize>>,
}

impl SlotOrchestrator {
    /// Create an orchestrator with `capacity` idle slots.
    pub fn new(api: Arc<dyn JobApi>, capacity: usize, config: PollConfig) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (settled_tx, _) = watch::channel(true);

        Self {
            poller: Poller::new(Arc::clone(&api), config),
            api,
            shared: Arc::new(Shared {
                board: Mutex::new(SlotBoard {
                    slots: vec![Slot::Idle; capacity],
                    run: 0,
                    in_flight: 0,
                    bindings: HashMap::new(),
                }),
                event_tx,
                settled_tx,
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.shared.lock().slots.len()
    }

    /// Receive every slot update and settle notification from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SlotEvent> {
        self.shared.event_tx.subscribe()
    }

    pub fn snapshot(&self) -> Vec<Slot> {
        self.shared.lock().slots.clone()
    }

    pub fn slot(&self, index: usize) -> Option<Slot> {
        self.shared.lock().slots.get(index).cloned()
    }

    /// `true` once no slot of the current run is waiting on creation or
    /// polling. Also `true` before the first submit and after dispose.
    pub fn is_settled(&self) -> bool {
        self.shared.lock().in_flight == 0
    }

    /// Wait until [`is_settled`](Self::is_settled) holds.
    pub async fn wait_settled(&self) {
        let mut settled_rx = self.shared.settled_tx.subscribe();
        // The sender lives as long as `self`.
        let _ = settled_rx.wait_for(|settled| *settled).await;
    }

    /// Number of polls currently running.
    pub fn active_polls(&self) -> usize {
        self.poller.active_count()
    }

    /// Start a new run of `count` jobs, built by `build(slot_index)`.
    ///
    /// All requests are validated before any state changes. The previous
    /// run's polls are cancelled, the first `count` slots become loading
    /// and the rest idle. Creation calls are issued concurrently; a slot
    /// whose creation fails becomes failed without ever being polled.
    /// Returns once every creation call has finished; polling continues in
    /// the background.
    pub async fn submit<F>(&self, count: usize, build: F) -> Result<(), OrchestratorError>
    where
        F: Fn(usize) -> JobRequest,
    {
        let capacity = self.capacity();
        if count == 0 || count > capacity {
            return Err(OrchestratorError::InvalidCount { count, capacity });
        }

        let requests: Vec<JobRequest> = (0..count).map(build).collect();
        for request in &requests {
            request.check()?;
        }

        let run = {
            let mut board = self.shared.lock();
            self.poller.stop_all();
            board.run += 1;
            board.in_flight = count;
            board.bindings.clear();
            board.slots = (0..capacity)
                .map(|i| if i < count { Slot::loading() } else { Slot::Idle })
                .collect();

            self.shared.settled_tx.send_replace(false);
            for (index, slot) in board.slots.iter().enumerate() {
                self.shared.emit(SlotEvent::Updated {
                    index,
                    slot: slot.clone(),
                });
            }
            board.run
        };

        tracing::info!(run, count, "Submitting jobs");

        let creations = requests
            .iter()
            .enumerate()
            .map(|(index, request)| self.create_and_poll(run, index, request));
        join_all(creations).await;

        Ok(())
    }

    /// Cancel every poll and drop all late updates. Silent: no slot is
    /// marked failed.
    pub fn dispose(&self) {
        let run = {
            let mut board = self.shared.lock();
            board.run += 1;
            board.in_flight = 0;
            board.bindings.clear();
            self.poller.stop_all();
            self.shared.settled_tx.send_replace(true);
            board.run
        };
        tracing::debug!(run, "Orchestrator disposed");
    }

    async fn create_and_poll(&self, run: u64, index: usize, request: &JobRequest) {
        let job = match self.api.create_job(request).await {
            Ok(job) => job,
            Err(e) => {
                tracing::warn!(run, slot = index, error = %e, "Job creation failed");
                self.shared.fail_creation(run, index, JobError::Creation(e));
                return;
            }
        };

        tracing::info!(run, slot = index, job_id = %job.id, "Job created");

        // Bind and start under the board lock so a concurrent dispose or a
        // resolving poll cannot slip in between.
        let mut board = self.shared.lock();
        if board.run != run {
            tracing::debug!(run, slot = index, job_id = %job.id, "Run replaced before job was bound");
            return;
        }
        let slot = Slot::Loading {
            job_id: Some(job.id.clone()),
        };
        board.slots[index] = slot.clone();
        self.shared.emit(SlotEvent::Updated { index, slot });

        // One poll per job id. A slot handed an id that is already being
        // polled in this run joins that poll.
        let bound = board.bindings.entry(job.id.clone()).or_default();
        bound.push(index);
        if bound.len() > 1 {
            tracing::debug!(run, slot = index, job_id = %job.id, "Job already polled for another slot");
            return;
        }

        let shared = Arc::clone(&self.shared);
        let job_id = job.id.clone();
        self.poller.start_polling(job.id, move |outcome| {
            shared.resolve_job(run, &job_id, outcome);
        });
    }
}

impl Drop for SlotOrchestrator {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, SlotBoard> {
        self.board.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: SlotEvent) {
        // Ignore the SendError; it only means there are zero receivers.
        let _ = self.event_tx.send(event);
    }

    /// Fail slot `index` of `run` whose job was never created.
    fn fail_creation(&self, run: u64, index: usize, error: JobError) {
        let slot = Slot::Failed {
            job_id: None,
            error: error.to_string(),
        };
        let mut board = self.lock();
        if board.run != run {
            tracing::debug!(run, current = board.run, slot = index, "Dropping stale slot update");
            return;
        }
        self.settle_slot(&mut board, run, index, slot);
    }

    /// Move every slot of `run` bound to `job_id` to its terminal state.
    fn resolve_job(&self, run: u64, job_id: &str, outcome: PollOutcome) {
        let slot = match outcome {
            PollOutcome::Completed(asset) => Slot::Completed {
                job_id: job_id.to_string(),
                image_url: asset.url,
            },
            PollOutcome::Failed(e) => Slot::Failed {
                job_id: Some(job_id.to_string()),
                error: e.to_string(),
            },
        };

        let mut board = self.lock();
        if board.run != run {
            tracing::debug!(run, current = board.run, job_id, "Dropping stale job outcome");
            return;
        }
        let indices = board.bindings.remove(job_id).unwrap_or_default();
        for index in indices {
            self.settle_slot(&mut board, run, index, slot.clone());
        }
    }

    /// Store a terminal `slot`, count it off and announce it. Events go out
    /// under the board lock so they are observed in state order.
    fn settle_slot(&self, board: &mut SlotBoard, run: u64, index: usize, slot: Slot) {
        let Some(current) = board.slots.get_mut(index) else {
            return;
        };
        if current.is_terminal() {
            return;
        }
        *current = slot.clone();
        board.in_flight = board.in_flight.saturating_sub(1);

        tracing::info!(run, slot = index, status = ?slot.status(), "Slot resolved");
        self.emit(SlotEvent::Updated { index, slot });

        if board.in_flight == 0 {
            tracing::info!(run, "All slots settled");
            self.settled_tx.send_replace(true);
            self.emit(SlotEvent::Settled);
        }
    }
}
