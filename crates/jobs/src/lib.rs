//! Asynchronous job orchestration.
//!
//! A [`Poller`] drives single jobs to a terminal status on a fixed
//! interval. A [`SlotOrchestrator`] fans one user action out into N
//! independent job + poll pairs and projects their progress into N
//! [`Slot`](banana_core::Slot)s.

pub mod config;
pub mod error;
pub mod events;
pub mod orchestrator;
pub mod poller;

pub use config::PollConfig;
pub use error::{JobError, OrchestratorError};
pub use events::SlotEvent;
pub use orchestrator::SlotOrchestrator;
pub use poller::{PollOutcome, Poller};
