//! Shared domain types for the Nano Banana client.
//!
//! Jobs and assets mirror the remote API's wire shapes. Slots are the
//! client-local projection of one job's progress.

pub mod account;
pub mod error;
pub mod job;
pub mod request;
pub mod slot;
pub mod types;

pub use error::CoreError;
pub use job::{Asset, Job, JobStatus};
pub use request::{AspectRatio, EditRequest, GenerationRequest, JobRequest, StylePreset};
pub use slot::{Slot, SlotStatus};
