//! Drive a terminal view from slot events until the run settles.

use std::future::Future;

use banana_core::Slot;
use banana_jobs::{SlotEvent, SlotOrchestrator};
use tokio::sync::broadcast::{self, error::RecvError};

/// How [`follow_slots`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowEnd {
    Settled,
    /// `shutdown` resolved first; the orchestrator was disposed.
    Interrupted,
}

/// Forward slot updates to `on_update` until the orchestrator settles or
/// `shutdown` resolves.
///
/// `events` must be subscribed before the run was submitted, otherwise the
/// settle notification may already have been sent.
pub async fn follow_slots<S, F>(
    orchestrator: &SlotOrchestrator,
    mut events: broadcast::Receiver<SlotEvent>,
    shutdown: S,
    mut on_update: F,
) -> FollowEnd
where
    S: Future<Output = ()>,
    F: FnMut(usize, &Slot),
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                orchestrator.dispose();
                tracing::info!("Interrupted, polling stopped");
                return FollowEnd::Interrupted;
            }
            event = events.recv() => match event {
                Ok(SlotEvent::Updated { index, slot }) => on_update(index, &slot),
                Ok(SlotEvent::Settled) => return FollowEnd::Settled,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Slot events lagged");
                    if orchestrator.is_settled() {
                        return FollowEnd::Settled;
                    }
                }
                Err(RecvError::Closed) => return FollowEnd::Settled,
            },
        }
    }
}
